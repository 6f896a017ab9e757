use std::fmt;

use serde::Serialize;

use crate::board::BOARD_SIZE;

/// Piece color, which is also the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Black => "Black",
            Self::White => "White",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    /// Checked constructor for coordinates coming from outside the engine.
    pub fn new(row: i32, col: i32) -> Result<Self, GameError> {
        if !(0..BOARD_SIZE as i32).contains(&row) || !(0..BOARD_SIZE as i32).contains(&col) {
            return Err(GameError::OutOfBounds { row, col });
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    pub(crate) fn from_index(idx: usize) -> Self {
        Self {
            row: (idx / BOARD_SIZE) as u8,
            col: (idx % BOARD_SIZE) as u8,
        }
    }

    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    /// Position `steps` cells away in `dir`, if it is still on the board.
    pub fn offset(self, dir: Direction, steps: i32) -> Option<Self> {
        let (dr, dc) = dir.delta();
        Self::new(self.row as i32 + dr * steps, self.col as i32 + dc * steps).ok()
    }

    /// True when the two squares share an edge.
    pub fn is_adjacent(self, other: Self) -> bool {
        let dr = (self.row as i32 - other.row as i32).abs();
        let dc = (self.col as i32 - other.col as i32).abs();
        dr + dc == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four orthogonal jump directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Enumeration order used by move generation.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// `(d_row, d_col)` unit vector.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// Direction of travel from `from` toward `to`, when they share a row or column.
    pub fn between(from: Position, to: Position) -> Option<Self> {
        let dr = (to.row as i32 - from.row as i32).signum();
        let dc = (to.col as i32 - from.col as i32).signum();
        match (dr, dc) {
            (-1, 0) => Some(Self::Up),
            (1, 0) => Some(Self::Down),
            (0, -1) => Some(Self::Left),
            (0, 1) => Some(Self::Right),
            _ => None,
        }
    }
}

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Playing,
    Finished,
}

/// A completed turn: every hop of a chain is folded into one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRecord {
    pub color: Color,
    pub from: Position,
    pub to: Position,
    pub captured: Vec<Position>,
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Row-major cells: 0=empty, 1=black, 2=white.
    pub board: Vec<u8>,
    pub current_player: Color,
    pub selection: Option<Position>,
    pub pending_removal: Option<Position>,
    pub phase: Phase,
    pub winner: Option<Color>,
    pub move_count: u32,
    pub move_number: u32,
    /// Contract:
    /// - Empty unless the phase is `Playing` and a piece is selected.
    /// - Mid-chain, only destinations in the chain direction.
    pub legal_destinations: Vec<Position>,
    pub in_chain: bool,
    pub black_count: u8,
    pub white_count: u8,
    pub status: String,
    pub history: Vec<TurnRecord>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    #[error("position out of bounds: ({row}, {col})")]
    OutOfBounds { row: i32, col: i32 },

    #[error("invalid board layout: {0}")]
    InvalidLayout(String),
}
