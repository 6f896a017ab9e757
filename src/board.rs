use std::fmt;
use std::str::FromStr;

use crate::types::{Color, Direction, GameError, Position};

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;
pub const CELL_EMPTY: u8 = 0;
pub const CELL_BLACK: u8 = 1;
pub const CELL_WHITE: u8 = 2;

/// Squares with an even `row + col`.
const EVEN_SQUARES: u64 = 0xAA55_AA55_AA55_AA55;

/// Konane board state represented by two bitboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    black: u64,
    white: u64,
}

impl Board {
    /// Creates the starting board: every square filled, black on even
    /// `row + col`, white on odd.
    pub fn new() -> Self {
        Self {
            black: EVEN_SQUARES,
            white: !EVEN_SQUARES,
        }
    }

    pub fn empty() -> Self {
        Self { black: 0, white: 0 }
    }

    pub fn color_at(&self, pos: Position) -> Option<Color> {
        let square = bit(pos.index());
        if (self.black & square) != 0 {
            Some(Color::Black)
        } else if (self.white & square) != 0 {
            Some(Color::White)
        } else {
            None
        }
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.color_at(pos).is_none()
    }

    /// Puts a piece on `pos`, replacing whatever was there.
    pub fn place(&mut self, pos: Position, color: Color) {
        let square = bit(pos.index());
        match color {
            Color::Black => {
                self.black |= square;
                self.white &= !square;
            }
            Color::White => {
                self.white |= square;
                self.black &= !square;
            }
        }
    }

    /// Clears `pos` and returns the piece that stood there.
    pub fn remove(&mut self, pos: Position) -> Option<Color> {
        let removed = self.color_at(pos);
        let square = bit(pos.index());
        self.black &= !square;
        self.white &= !square;
        removed
    }

    /// Returns the landing squares reachable from `pos` by one hop of
    /// `color`, in `Direction::ALL` order. With `forced` set only that
    /// direction is considered.
    pub fn legal_moves(
        &self,
        pos: Position,
        color: Color,
        forced: Option<Direction>,
    ) -> Vec<Position> {
        if self.color_at(pos) != Some(color) {
            return Vec::new();
        }

        let candidates: &[Direction] = match forced {
            Some(ref dir) => std::slice::from_ref(dir),
            None => &Direction::ALL,
        };

        candidates
            .iter()
            .filter_map(|&dir| {
                let landing = pos.offset(dir, 2)?;
                let jumped = pos.offset(dir, 1)?;
                let legal = self.color_at(jumped) == Some(color.opponent())
                    && self.is_empty_at(landing);
                legal.then_some(landing)
            })
            .collect()
    }

    /// Every single-hop `(from, to)` pair available to `color`, scanning
    /// squares in row-major order.
    pub fn all_legal_moves(&self, color: Color) -> Vec<(Position, Position)> {
        bitmask_to_positions(self.pieces(color))
            .into_iter()
            .flat_map(|from| {
                self.legal_moves(from, color, None)
                    .into_iter()
                    .map(move |to| (from, to))
            })
            .collect()
    }

    pub fn has_legal_moves(&self, color: Color) -> bool {
        bitmask_to_positions(self.pieces(color))
            .into_iter()
            .any(|from| !self.legal_moves(from, color, None).is_empty())
    }

    /// Moves the piece on `from` two squares to `to` and removes the piece
    /// in between. Returns the captured square.
    ///
    /// Caller contract: `to` must be a legal destination for the piece on `from`.
    pub fn jump(&mut self, from: Position, to: Position) -> Position {
        let Some(color) = self.color_at(from) else {
            unreachable!("jump from empty square {from}");
        };
        let dir = match Direction::between(from, to) {
            Some(dir) if from.offset(dir, 2) == Some(to) => dir,
            _ => unreachable!("{from} -> {to} is not a two-square orthogonal jump"),
        };
        let Some(captured) = from.offset(dir, 1) else {
            unreachable!("jumped square of {from} -> {to} is off the board");
        };
        assert_eq!(
            self.color_at(captured),
            Some(color.opponent()),
            "jump {from} -> {to} does not pass over an opposing piece"
        );
        assert!(self.is_empty_at(to), "jump {from} -> {to} lands on a piece");

        self.remove(from);
        self.remove(captured);
        self.place(to, color);
        captured
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (u8, u8) {
        (self.black.count_ones() as u8, self.white.count_ones() as u8)
    }

    /// Converts board to `[u8; 64]` using the `CELL_*` codes.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [CELL_EMPTY; NUM_SQUARES];
        for (pos, cell) in board.iter_mut().enumerate() {
            *cell = match self.color_at(Position::from_index(pos)) {
                Some(Color::Black) => CELL_BLACK,
                Some(Color::White) => CELL_WHITE,
                None => CELL_EMPTY,
            };
        }
        board
    }

    fn pieces(&self, color: Color) -> u64 {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Eight rows of `B`, `W` or `.`, top row first. Blank lines and
/// surrounding whitespace are ignored.
impl FromStr for Board {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.len() != BOARD_SIZE {
            return Err(GameError::InvalidLayout(format!(
                "expected {BOARD_SIZE} rows, got {}",
                rows.len()
            )));
        }

        let mut board = Self::empty();
        for (row, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().collect();
            if cells.len() != BOARD_SIZE {
                return Err(GameError::InvalidLayout(format!(
                    "row {row} has {} cells, expected {BOARD_SIZE}",
                    cells.len()
                )));
            }
            for (col, ch) in cells.into_iter().enumerate() {
                let pos = Position::from_index(row * BOARD_SIZE + col);
                match ch {
                    'B' | 'b' => board.place(pos, Color::Black),
                    'W' | 'w' => board.place(pos, Color::White),
                    '.' => {}
                    other => {
                        return Err(GameError::InvalidLayout(format!(
                            "unexpected cell {other:?} at {pos}"
                        )));
                    }
                }
            }
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..BOARD_SIZE {
                let ch = match self.color_at(Position::from_index(row * BOARD_SIZE + col)) {
                    Some(Color::Black) => 'B',
                    Some(Color::White) => 'W',
                    None => '.',
                };
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

fn bit(pos: usize) -> u64 {
    if pos < NUM_SQUARES { 1u64 << pos } else { 0 }
}

fn bitmask_to_positions(mut mask: u64) -> Vec<Position> {
    let mut out = Vec::new();
    while mask != 0 {
        out.push(Position::from_index(mask.trailing_zeros() as usize));
        mask &= mask - 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: i32, col: i32) -> Position {
        Position::new(row, col).unwrap()
    }

    fn board(layout: &str) -> Board {
        layout.parse().unwrap()
    }

    #[test]
    fn initial_board_is_a_full_checkerboard() {
        let board = Board::new();

        for row in 0..BOARD_SIZE as i32 {
            for col in 0..BOARD_SIZE as i32 {
                let expected = if (row + col) % 2 == 0 {
                    Color::Black
                } else {
                    Color::White
                };
                assert_eq!(board.color_at(pos(row, col)), Some(expected));
            }
        }
        assert_eq!(board.count(), (32, 32));
    }

    #[test]
    fn initial_board_has_no_moves_until_gap_is_made() {
        let board = Board::new();

        assert!(board.all_legal_moves(Color::Black).is_empty());
        assert!(board.all_legal_moves(Color::White).is_empty());
    }

    #[test]
    fn single_hop_over_opponent_into_empty_square() {
        let board = board(
            "........
             ........
             ........
             ....BW..
             ........
             ........
             ........
             ........",
        );

        assert_eq!(
            board.legal_moves(pos(3, 4), Color::Black, None),
            vec![pos(3, 6)]
        );
        assert_eq!(
            board.legal_moves(pos(3, 5), Color::White, None),
            vec![pos(3, 3)]
        );
    }

    #[test]
    fn cannot_jump_own_piece_empty_square_or_onto_piece() {
        let board = board(
            "........
             .BB.....
             ........
             .B......
             .W......
             .W......
             ........
             ........",
        );

        // Right over own piece, down onto an occupied square, up over nothing.
        assert!(board.legal_moves(pos(1, 1), Color::Black, None).is_empty());
        assert!(board.legal_moves(pos(3, 1), Color::Black, None).is_empty());
    }

    #[test]
    fn legal_moves_require_owner_color() {
        let board = Board::new();

        assert!(board.legal_moves(pos(0, 0), Color::White, None).is_empty());
        assert!(
            Board::empty()
                .legal_moves(pos(0, 0), Color::Black, None)
                .is_empty()
        );
    }

    #[test]
    fn moves_follow_direction_order_and_forced_direction_filters() {
        let board = board(
            "........
             ........
             ...W....
             ..WBW...
             ...W....
             ........
             ........
             ........",
        );
        let center = pos(3, 3);

        assert_eq!(
            board.legal_moves(center, Color::Black, None),
            vec![pos(1, 3), pos(5, 3), pos(3, 1), pos(3, 5)]
        );
        assert_eq!(
            board.legal_moves(center, Color::Black, Some(Direction::Left)),
            vec![pos(3, 1)]
        );
    }

    #[test]
    fn forced_direction_blocked_yields_nothing() {
        let board = board(
            "........
             ...B....
             ...W....
             ...B....
             ...W....
             ........
             ........
             ........",
        );
        let piece = pos(3, 3);

        assert_eq!(board.legal_moves(piece, Color::Black, None), vec![pos(5, 3)]);
        assert!(
            board
                .legal_moves(piece, Color::Black, Some(Direction::Up))
                .is_empty()
        );
        assert!(
            board
                .legal_moves(piece, Color::Black, Some(Direction::Right))
                .is_empty()
        );
    }

    #[test]
    fn every_destination_has_opponent_at_midpoint() {
        let mut board = Board::new();
        board.remove(pos(3, 3));
        board.remove(pos(3, 4));

        for color in [Color::Black, Color::White] {
            let moves = board.all_legal_moves(color);
            assert!(!moves.is_empty());
            for (from, to) in moves {
                let dir = Direction::between(from, to).unwrap();
                let mid = from.offset(dir, 1).unwrap();
                assert_eq!(board.color_at(mid), Some(color.opponent()));
                assert!(board.is_empty_at(to));
            }
        }
    }

    #[test]
    fn jump_moves_piece_and_captures_midpoint() {
        let mut board = board(
            "........
             ........
             ........
             ....BW..
             ........
             ........
             ........
             ........",
        );

        let captured = board.jump(pos(3, 4), pos(3, 6));

        assert_eq!(captured, pos(3, 5));
        assert_eq!(board.color_at(pos(3, 6)), Some(Color::Black));
        assert!(board.is_empty_at(pos(3, 4)));
        assert!(board.is_empty_at(pos(3, 5)));
        assert_eq!(board.count(), (1, 0));
    }

    #[test]
    #[should_panic]
    fn jump_from_empty_square_panics() {
        Board::empty().jump(pos(0, 0), pos(0, 2));
    }

    #[test]
    fn remove_then_place_restores_board() {
        let mut board = Board::new();
        let before = board;

        let removed = board.remove(pos(5, 5));
        assert_eq!(removed, Some(Color::Black));
        board.place(pos(5, 5), Color::Black);

        assert_eq!(board, before);
    }

    #[test]
    fn layout_text_round_trips_and_rejects_bad_input() {
        let text = Board::new().to_string();

        assert_eq!(text.lines().next(), Some("BWBWBWBW"));
        assert_eq!(text.parse::<Board>().unwrap(), Board::new());
        assert!(matches!(
            "BW".parse::<Board>(),
            Err(GameError::InvalidLayout(_))
        ));
        let mut bad_cell = "........\n".repeat(7);
        bad_cell.push_str("....x...");
        assert!(matches!(
            bad_cell.parse::<Board>(),
            Err(GameError::InvalidLayout(_))
        ));
    }

    #[test]
    fn to_array_uses_cell_codes() {
        let cells = Board::new().to_array();

        assert_eq!(cells[0], CELL_BLACK);
        assert_eq!(cells[1], CELL_WHITE);
        assert_eq!(cells[8], CELL_WHITE);
        assert_eq!(cells[9], CELL_BLACK);
    }
}
