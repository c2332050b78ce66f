//! UCI (Universal Chess Interface) codec for talking to an analysis engine.
//!
//! This is the client half of the protocol: it renders the commands we send
//! to the engine and decodes the lines the engine writes back. Process
//! handling lives in [`crate::oracle::session`].
//!
//! # Architecture
//!
//! ```text
//! oracle::session::UciSession
//!     ↓ position_command() / go_command() / setoption_command()
//! engine stdin
//!     ...
//! engine stdout
//!     ↓ parse_engine_line()
//! EngineMessage::{Id, UciOk, ReadyOk, Info, BestMove, Other}
//! ```

use chess::{Board, ChessMove, Piece, Square};
use std::str::FromStr;

use crate::oracle::SearchLimit;
use crate::score::Score;

/// The null move used by GUIs and our callers for "no move was played".
pub const NULL_MOVE: &str = "0000";

/// A decoded line of engine output.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// `id name <x>` / `id author <x>`.
    Id { key: String, value: String },
    UciOk,
    ReadyOk,
    Info(InfoLine),
    /// `bestmove <move> [ponder <move>]`; `None` for `bestmove (none)`.
    BestMove(Option<String>),
    /// Anything we do not interpret (`option ...`, banners, errors).
    Other(String),
}

/// Whether a reported score is exact or only an aspiration-window bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

/// One `info` line. Only the fields the adapter consumes are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoLine {
    pub depth: Option<u8>,
    /// 1-based line index in a multi-line search. Engines omit it when
    /// MultiPV is 1.
    pub multipv: usize,
    pub score: Option<Score>,
    pub bound: Option<Bound>,
    /// Principal variation as UCI move strings.
    pub pv: Vec<String>,
}

impl InfoLine {
    /// An info line that describes a complete, exact-scored line.
    pub fn is_scored_line(&self) -> bool {
        self.score.is_some() && self.bound.is_none() && !self.pv.is_empty()
    }
}

/// Decode a single line of engine output.
pub fn parse_engine_line(line: &str) -> EngineMessage {
    let trimmed = line.trim();
    let mut parts = trimmed.split_whitespace();

    match parts.next() {
        Some("uciok") => EngineMessage::UciOk,
        Some("readyok") => EngineMessage::ReadyOk,
        Some("id") => {
            let key = parts.next().unwrap_or_default().to_string();
            let value = parts.collect::<Vec<_>>().join(" ");
            EngineMessage::Id { key, value }
        }
        Some("bestmove") => match parts.next() {
            Some("(none)") | None => EngineMessage::BestMove(None),
            Some(m) => EngineMessage::BestMove(Some(m.to_string())),
        },
        Some("info") => EngineMessage::Info(parse_info(parts)),
        _ => EngineMessage::Other(trimmed.to_string()),
    }
}

fn parse_info<'a>(mut parts: impl Iterator<Item = &'a str>) -> InfoLine {
    let mut info = InfoLine {
        multipv: 1,
        ..InfoLine::default()
    };

    while let Some(token) = parts.next() {
        match token {
            "depth" => info.depth = parts.next().and_then(|s| s.parse().ok()),
            "multipv" => {
                info.multipv = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
            }
            "score" => {
                info.score = match (parts.next(), parts.next().and_then(|s| s.parse::<i32>().ok())) {
                    (Some("cp"), Some(v)) => Some(Score::Centipawns(v)),
                    (Some("mate"), Some(v)) => Some(Score::Mate(v)),
                    _ => None,
                };
            }
            "lowerbound" => info.bound = Some(Bound::Lower),
            "upperbound" => info.bound = Some(Bound::Upper),
            "pv" => {
                info.pv = parts.by_ref().map(str::to_string).collect();
            }
            // Free text runs to the end of the line.
            "string" => break,
            // Single-valued fields we skip along with their argument.
            "seldepth" | "time" | "nodes" | "nps" | "hashfull" | "tbhits" | "cpuload"
            | "currmove" | "currmovenumber" | "sbhits" => {
                parts.next();
            }
            _ => {}
        }
    }

    info
}

/// `position fen <fen>` for the given board.
pub fn position_command(board: &Board) -> String {
    format!("position fen {}", board)
}

/// `go` with exactly one limit.
pub fn go_command(limit: SearchLimit) -> String {
    match limit {
        SearchLimit::MoveTime(t) => format!("go movetime {}", t.as_millis().max(1)),
        SearchLimit::Depth(d) => format!("go depth {}", d.max(1)),
    }
}

/// `setoption name <name> value <value>`.
pub fn setoption_command(name: &str, value: &str) -> String {
    format!("setoption name {} value {}", name, value)
}

/// Parse the shape of a UCI move string without checking legality.
pub fn parse_move_syntax(move_str: &str) -> Option<ChessMove> {
    let move_str = move_str.trim();
    if move_str.len() < 4 || move_str.len() > 5 || !move_str.is_ascii() {
        return None;
    }

    let from = Square::from_str(&move_str[0..2]).ok()?;
    let to = Square::from_str(&move_str[2..4]).ok()?;

    let promotion = match move_str.as_bytes().get(4) {
        None => None,
        Some(b'q' | b'Q') => Some(Piece::Queen),
        Some(b'r' | b'R') => Some(Piece::Rook),
        Some(b'b' | b'B') => Some(Piece::Bishop),
        Some(b'n' | b'N') => Some(Piece::Knight),
        Some(_) => return None,
    };

    Some(ChessMove::new(from, to, promotion))
}

/// Parse a UCI move string (e.g., "e2e4", "e7e8q") into a ChessMove.
///
/// Returns `None` unless the move is legal on `board`.
pub fn parse_uci_move(board: &Board, move_str: &str) -> Option<ChessMove> {
    parse_move_syntax(move_str).filter(|m| board.legal(*m))
}

/// Format a ChessMove as a UCI string (e.g., "e2e4", "e7e8q").
pub fn format_move(m: ChessMove) -> String {
    let promo = match m.get_promotion() {
        Some(Piece::Queen) => "q",
        Some(Piece::Rook) => "r",
        Some(Piece::Bishop) => "b",
        Some(Piece::Knight) => "n",
        _ => "",
    };

    format!("{}{}{}", m.get_source(), m.get_dest(), promo)
}
