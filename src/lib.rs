//! chessmorph: an adaptive-difficulty chess opponent.
//!
//! Rather than playing at a fixed strength, the bot watches how the human is
//! doing and tunes itself every move: it plays solidly when the human is
//! ahead, hands back material when the human is in trouble, and stays
//! roughly even otherwise. All chess judgement comes from an external UCI
//! engine (Stockfish or any compatible engine); this crate decides how
//! much of that strength to use.
//!
//! # Modules
//!
//! - [`adaptive`]: the per-move decision pipeline
//! - [`oracle`]: UCI engine sessions, pooling and the `Evaluator` seam
//! - [`tracker`]: how good was the human's last move
//! - [`policy`]: persona and directive selection
//! - [`mistake`]: choosing a calibrated inferior move
//! - [`position`]: board plus move clocks, game-end detection
//! - [`config`]: tunable thresholds and runtime settings
//! - [`decision_log`]: JSONL telemetry for offline tuning
//! - [`score`]: centipawn/mate normalization
//! - [`uci`]: UCI command and response codec

pub mod adaptive;
pub mod config;
pub mod decision_log;
pub mod mistake;
pub mod oracle;
pub mod policy;
pub mod position;
pub mod score;
pub mod tracker;
pub mod uci;

pub use adaptive::{AdaptiveEngine, Decision, DecisionError, DecisionOutcome, DecisionRequest};
pub use config::{Config, ConfigStore, ConfigUpdate, DecisionSettings, EngineSettings};
