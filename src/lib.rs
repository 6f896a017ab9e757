use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod board;
pub mod game;
pub mod types;

use crate::game::KonaneGame;

static GAME: Lazy<Mutex<KonaneGame>> = Lazy::new(|| Mutex::new(KonaneGame::new()));

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

/// Starts a fresh game in the setup phase and returns its state.
#[wasm_bindgen]
pub fn reset_game() -> Result<JsValue, JsValue> {
    let mut game = lock_game()?;
    game.reset();
    to_js(&game.to_snapshot())
}

/// Forwards a board click and returns the resulting state.
#[wasm_bindgen]
pub fn select_cell(row: i32, col: i32) -> Result<JsValue, JsValue> {
    let mut game = lock_game()?;
    game.handle_cell_select(row, col);
    to_js(&game.to_snapshot())
}

#[wasm_bindgen]
pub fn get_state() -> Result<JsValue, JsValue> {
    to_js(&lock_game()?.to_snapshot())
}

#[wasm_bindgen]
pub fn get_legal_destinations() -> Result<JsValue, JsValue> {
    to_js(&lock_game()?.legal_destinations())
}

#[wasm_bindgen]
pub fn get_history() -> Result<JsValue, JsValue> {
    to_js(lock_game()?.history())
}

fn lock_game() -> Result<MutexGuard<'static, KonaneGame>, JsValue> {
    GAME.lock()
        .map_err(|_| JsValue::from_str("game state lock poisoned"))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}
