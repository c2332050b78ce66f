//! Per-decision telemetry for offline tuning.
//!
//! Every bot decision produces exactly one [`LogRecord`]. Records are
//! appended to a sink and never touched again; rotation and analysis are
//! somebody else's job.
//!
//! # Record layout
//!
//! ```text
//! {timestamp_ms, game_id, move_number, human_move, human_latency_secs,
//!  human_score, best_score, quality_loss, is_blunder, persona,
//!  mistake_fallback, bot_move, search_depth}
//! ```
//!
//! Field order is fixed by the struct definition, so line-based tools can
//! rely on it.

pub mod jsonl;

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::policy::Persona;

pub use jsonl::{JsonlDecisionLog, MultiSink};

/// Record of a single bot decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Unix time in milliseconds.
    pub timestamp_ms: u64,
    pub game_id: Option<String>,
    /// Full-move number of the position the bot moved in.
    pub move_number: u32,
    /// The human's last move in UCI, `None` when the bot opened.
    pub human_move: Option<String>,
    pub human_latency_secs: f64,
    /// Advantage after the human's move, human's perspective.
    pub human_score: i32,
    /// Best score the human could have reached.
    pub best_score: Option<i32>,
    pub quality_loss: i32,
    pub is_blunder: bool,
    /// Persona the selector chose (kept even when the mistake fell back).
    pub persona: Persona,
    pub mistake_fallback: bool,
    pub bot_move: String,
    pub search_depth: u8,
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Trait for decision record sinks.
///
/// - JsonlDecisionLog: one JSON object per line in a file
/// - MultiSink: fans out to several sinks
/// - NullSink: discards records
#[async_trait]
pub trait DecisionSink: Send {
    async fn append(
        &mut self,
        record: &LogRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn flush(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Sink that discards all records (logging disabled).
pub struct NullSink;

#[async_trait]
impl DecisionSink for NullSink {
    async fn append(
        &mut self,
        _record: &LogRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Shared front for a sink.
///
/// Appends from concurrent games are serialized, and sink failures never
/// reach the decision that produced the record.
pub struct DecisionLogger {
    sink: Mutex<Box<dyn DecisionSink>>,
}

impl DecisionLogger {
    pub fn new(sink: Box<dyn DecisionSink>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Box::new(NullSink))
    }

    pub async fn record(&self, record: &LogRecord) {
        if let Err(e) = self.sink.lock().await.append(record).await {
            warn!(
                "Decision log append failed (move {}, game {:?}): {}",
                record.move_number, record.game_id, e
            );
        }
    }

    pub async fn flush(&self) {
        if let Err(e) = self.sink.lock().await.flush().await {
            warn!("Decision log flush failed: {}", e);
        }
    }
}
