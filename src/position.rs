//! A board plus the move clocks `chess::Board` does not track.
//!
//! `Board` renders its FEN with the clocks fixed at `0 1`, so callers that
//! feed our FEN back to us would lose the move number and the 75-move
//! count. [`Position`] carries both clocks alongside the board and decides
//! when a game is over, including the draws `Board::status` cannot see.

use chess::{Board, BoardStatus, ChessMove, Color, Piece};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Plies without a capture or pawn move after which the game is drawn.
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEnd {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    /// Plies since the last capture or pawn move.
    pub halfmove_clock: u32,
    /// Starts at 1, incremented after each Black move.
    pub fullmove_number: u32,
}

impl Position {
    /// Parse a FEN. Missing clock fields default to `0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, chess::Error> {
        let board = Board::from_str(fen.trim())?;
        let mut fields = fen.split_whitespace().skip(4);
        let halfmove_clock = fields.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        let fullmove_number = fields
            .next()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);
        Ok(Self {
            board,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// The position after `mv`, which must be legal.
    pub fn play(&self, mv: ChessMove) -> Self {
        let resets_clock = self.board.piece_on(mv.get_source()) == Some(Piece::Pawn)
            || self.board.piece_on(mv.get_dest()).is_some();
        Self {
            board: self.board.make_move_new(mv),
            halfmove_clock: if resets_clock { 0 } else { self.halfmove_clock + 1 },
            fullmove_number: match self.board.side_to_move() {
                Color::White => self.fullmove_number,
                Color::Black => self.fullmove_number + 1,
            },
        }
    }

    /// Full FEN with this position's clocks.
    pub fn fen(&self) -> String {
        let board = self.board.to_string();
        let placement: Vec<&str> = board.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            placement.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// How the game ended, if it has.
    pub fn game_end(&self) -> Option<GameEnd> {
        match self.board.status() {
            BoardStatus::Checkmate => return Some(GameEnd::Checkmate),
            BoardStatus::Stalemate => return Some(GameEnd::Stalemate),
            BoardStatus::Ongoing => {}
        }
        if insufficient_material(&self.board) {
            return Some(GameEnd::InsufficientMaterial);
        }
        if self.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES {
            return Some(GameEnd::SeventyFiveMoves);
        }
        None
    }
}

/// Neither side can ever mate: bare kings, a single minor piece, or only
/// bishops that all stand on one square colour.
fn insufficient_material(board: &Board) -> bool {
    let heavy = *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
    if heavy.popcnt() > 0 {
        return false;
    }

    let knights = board.pieces(Piece::Knight).popcnt();
    let bishops = *board.pieces(Piece::Bishop);
    if knights + bishops.popcnt() <= 1 {
        return true;
    }
    if knights > 0 {
        return false;
    }

    let mut colours = bishops.map(|sq| (sq.get_rank().to_index() + sq.get_file().to_index()) % 2);
    match colours.next() {
        Some(first) => colours.all(|c| c == first),
        None => true,
    }
}
