//! Evaluator adapter for the external analysis engine.
//!
//! The adaptive engine never scores a move itself. It asks an
//! [`Evaluator`] for the best line or the top-K lines of a position and
//! interprets the (normalized) answers.
//!
//! # Session ownership
//!
//! ```text
//! EvaluatorSource::acquire()          one per decision
//!     ├── SpawnPerDecision            fresh engine process, killed on drop
//!     └── EnginePool                  warm process, returned on drop
//!             ↓
//! Box<dyn Evaluator>
//!     ├── analyze_best(board, limit)
//!     └── analyze_top(board, limit, k)
//! ```
//!
//! An engine speaks a strict request/response protocol over one
//! conversation, so a session is never shared by two decisions in flight.

pub mod pool;
#[cfg(test)]
pub(crate) mod scripted;
pub mod session;

use async_trait::async_trait;
use chess::{Board, ChessMove};
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::score::Score;

pub use pool::{EnginePool, SpawnPerDecision};
pub use session::UciSession;

/// Bound on a single analysis request. Exactly one kind per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    /// Search for this long. Used for baseline evaluations.
    MoveTime(Duration),
    /// Search to this many plies. Used where reproducible strength matters.
    Depth(u8),
}

/// One analyzed line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationResult {
    /// Normalized centipawns from the side-to-move's perspective.
    pub score: i32,
    /// Score as the engine reported it.
    pub raw: Score,
    /// Depth the engine reached for this line.
    pub depth: u8,
    /// First move of the line.
    pub principal_move: ChessMove,
}

/// A line from a multi-line analysis, in the engine's own order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedLine {
    /// 0 = best.
    pub rank: usize,
    pub result: EvaluationResult,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("engine io error: {0}")]
    Io(#[from] io::Error),
    #[error("engine closed its output")]
    Disconnected,
    #[error("engine did not answer {0} in time")]
    Timeout(&'static str),
    #[error("engine returned no analysis lines")]
    NoLines,
    #[error("engine proposed illegal move {mv} in {fen}")]
    IllegalMove { mv: String, fen: String },
    #[error("no engine session became free within {0:?}")]
    PoolExhausted(Duration),
}

/// A live analysis session, exclusively owned by one decision.
#[async_trait]
pub trait Evaluator: Send {
    /// Analyze `board` and return up to `k` lines, best first.
    ///
    /// Fewer than `k` lines is fine (near-forced positions); zero lines is
    /// [`EngineError::NoLines`].
    async fn analyze_top(
        &mut self,
        board: &Board,
        limit: SearchLimit,
        k: usize,
    ) -> Result<Vec<RankedLine>, EngineError>;

    /// Analyze `board` and return the single best line.
    async fn analyze_best(
        &mut self,
        board: &Board,
        limit: SearchLimit,
    ) -> Result<EvaluationResult, EngineError> {
        let lines = self.analyze_top(board, limit, 1).await?;
        lines
            .into_iter()
            .next()
            .map(|line| line.result)
            .ok_or(EngineError::NoLines)
    }
}

/// Hands out sessions, one per decision.
#[async_trait]
pub trait EvaluatorSource: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn Evaluator>, EngineError>;
}
