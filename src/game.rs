use tracing::{debug, trace};

use crate::board::Board;
use crate::types::{Color, Direction, GameSnapshot, Phase, Position, TurnRecord};

const SETUP_STATUS: &str = "Remove two adjacent pieces to begin";

/// A turn that may still continue with further hops of the same piece.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chain {
    direction: Direction,
    record: TurnRecord,
}

/// The Konane rules engine. Every mutation goes through
/// [`KonaneGame::handle_cell_select`] or [`KonaneGame::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KonaneGame {
    board: Board,
    current_player: Color,
    selection: Option<Position>,
    pending_removal: Option<Position>,
    phase: Phase,
    winner: Option<Color>,
    move_count: u32,
    chain: Option<Chain>,
    history: Vec<TurnRecord>,
}

impl KonaneGame {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Color::Black,
            selection: None,
            pending_removal: None,
            phase: Phase::Setup,
            winner: None,
            move_count: 0,
            chain: None,
            history: Vec::new(),
        }
    }

    /// Starts directly in the playing phase from an arbitrary position.
    /// If `to_move` is already stalemated the game is finished and the
    /// other side wins.
    pub fn from_position(board: Board, to_move: Color) -> Self {
        let mut game = Self {
            board,
            current_player: to_move,
            phase: Phase::Playing,
            ..Self::new()
        };
        if !game.board.has_legal_moves(to_move) {
            game.finish(to_move.opponent());
        }
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Color {
        self.current_player
    }

    pub fn selection(&self) -> Option<Position> {
        self.selection
    }

    pub fn pending_removal(&self) -> Option<Position> {
        self.pending_removal
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Full-move number shown to players: both sides moving counts as one.
    pub fn move_number(&self) -> u32 {
        self.move_count / 2 + 1
    }

    pub fn in_chain(&self) -> bool {
        self.chain.is_some()
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    /// Single-hop destinations for the piece on `pos`. Always empty during setup.
    pub fn legal_moves(
        &self,
        pos: Position,
        color: Color,
        forced: Option<Direction>,
    ) -> Vec<Position> {
        if self.phase == Phase::Setup {
            return Vec::new();
        }
        self.board.legal_moves(pos, color, forced)
    }

    pub fn all_legal_moves(&self, color: Color) -> Vec<(Position, Position)> {
        self.board.all_legal_moves(color)
    }

    /// Destinations for the current selection, restricted to the chain
    /// direction mid-chain.
    pub fn legal_destinations(&self) -> Vec<Position> {
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        let Some(selected) = self.selection else {
            return Vec::new();
        };
        let forced = self.chain.as_ref().map(|chain| chain.direction);
        self.legal_moves(selected, self.current_player, forced)
    }

    pub fn status_message(&self) -> String {
        match (self.phase, self.winner) {
            (_, Some(winner)) => format!("{winner} Wins!"),
            (Phase::Setup, None) => SETUP_STATUS.to_string(),
            (Phase::Playing, None) => format!("{}'s Turn", self.current_player),
            (Phase::Finished, None) => "Game Over".to_string(),
        }
    }

    /// Dispatches one click. Invalid clicks are ignored; nothing here fails.
    pub fn handle_cell_select(&mut self, row: i32, col: i32) {
        let pos = match Position::new(row, col) {
            Ok(pos) => pos,
            Err(err) => {
                trace!(%err, "ignoring click");
                return;
            }
        };

        match self.phase {
            Phase::Setup => self.handle_setup_click(pos),
            Phase::Playing => self.handle_play_click(pos),
            Phase::Finished => trace!(%pos, "game finished, ignoring click"),
        }
    }

    pub fn reset(&mut self) {
        debug!("resetting game");
        *self = Self::new();
    }

    pub fn to_snapshot(&self) -> GameSnapshot {
        let (black_count, white_count) = self.board.count();
        GameSnapshot {
            board: self.board.to_array().to_vec(),
            current_player: self.current_player,
            selection: self.selection,
            pending_removal: self.pending_removal,
            phase: self.phase,
            winner: self.winner,
            move_count: self.move_count,
            move_number: self.move_number(),
            legal_destinations: self.legal_destinations(),
            in_chain: self.in_chain(),
            black_count,
            white_count,
            status: self.status_message(),
            history: self.history.clone(),
        }
    }

    fn handle_setup_click(&mut self, pos: Position) {
        let Some(removed) = self.board.remove(pos) else {
            trace!(%pos, "setup click on empty square");
            return;
        };

        let Some(first) = self.pending_removal else {
            debug!(%pos, color = %removed, "first setup removal");
            self.pending_removal = Some(pos);
            return;
        };

        if first.is_adjacent(pos) {
            debug!(%first, second = %pos, "setup complete");
            self.pending_removal = None;
            self.selection = None;
            self.phase = Phase::Playing;
        } else {
            debug!(%first, second = %pos, "setup pair not adjacent, restoring piece");
            self.board.place(pos, removed);
        }
    }

    fn handle_play_click(&mut self, pos: Position) {
        let clicked = self.board.color_at(pos);

        let Some(selected) = self.selection else {
            if clicked == Some(self.current_player) {
                self.selection = Some(pos);
            }
            return;
        };

        if self.legal_destinations().contains(&pos) {
            self.execute_move(selected, pos);
            return;
        }

        if self.chain.is_some() {
            trace!(%pos, "chain in progress, ignoring click");
            return;
        }

        if clicked == Some(self.current_player) {
            self.selection = Some(pos);
        } else {
            self.selection = None;
        }
    }

    /// Caller contract: `to` is a legal destination for the active piece on `from`.
    fn execute_move(&mut self, from: Position, to: Position) {
        let color = self.current_player;
        assert_eq!(
            self.board.color_at(from),
            Some(color),
            "execute_move from {from} without a {color} piece"
        );
        let Some(direction) = Direction::between(from, to) else {
            unreachable!("execute_move {from} -> {to} has no direction");
        };

        let captured = self.board.jump(from, to);
        debug!(%color, %from, %to, %captured, "hop");

        let mut record = match self.chain.take() {
            Some(chain) => chain.record,
            None => TurnRecord {
                color,
                from,
                to,
                captured: Vec::new(),
            },
        };
        record.to = to;
        record.captured.push(captured);

        if !self.board.legal_moves(to, color, Some(direction)).is_empty() {
            self.selection = Some(to);
            self.chain = Some(Chain { direction, record });
            return;
        }

        self.end_turn(record);
    }

    fn end_turn(&mut self, record: TurnRecord) {
        let mover = self.current_player;
        debug!(
            color = %mover,
            hops = record.captured.len(),
            "turn complete"
        );

        self.selection = None;
        self.chain = None;
        self.history.push(record);
        self.current_player = mover.opponent();
        self.move_count += 1;

        if self.board.all_legal_moves(self.current_player).is_empty() {
            self.finish(mover);
        }
    }

    fn finish(&mut self, winner: Color) {
        debug!(%winner, move_count = self.move_count, "game over");
        self.phase = Phase::Finished;
        self.winner = Some(winner);
        self.selection = None;
        self.chain = None;
    }
}

impl Default for KonaneGame {
    fn default() -> Self {
        Self::new()
    }
}
