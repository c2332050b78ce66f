//! Tunable thresholds and runtime settings.
//!
//! [`Config`] holds the difficulty thresholds every decision reads. It lives
//! in a [`ConfigStore`] that hands out whole-struct snapshots and swaps in a
//! new struct on update, so a decision never sees half an update.
//!
//! [`EngineSettings`] and [`DecisionSettings`] are fixed at startup and come
//! from the environment (a `.env` file is loaded by the binaries).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;

use crate::oracle::SearchLimit;

/// Difficulty thresholds, in centipawns from the human's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Above this the human is clearly winning.
    pub winning_margin: i32,
    /// Below this the human is clearly losing.
    pub losing_margin: i32,
    /// Human moves faster than this (seconds) count as quick play.
    pub fast_play_limit_secs: f64,
    /// Minimum drop for a deliberate, obvious mistake.
    pub severe_mistake_min_drop: u32,
    /// Window for a subtle, natural-looking mistake.
    pub natural_mistake_min_drop: u32,
    pub natural_mistake_max_drop: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            winning_margin: 200,
            losing_margin: -200,
            fast_play_limit_secs: 3.0,
            severe_mistake_min_drop: 300,
            natural_mistake_min_drop: 150,
            natural_mistake_max_drop: 250,
        }
    }
}

impl Config {
    /// Create config from environment variables, defaulting what is unset.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            winning_margin: env_or("MORPH_WINNING_MARGIN", d.winning_margin),
            losing_margin: env_or("MORPH_LOSING_MARGIN", d.losing_margin),
            fast_play_limit_secs: env_or("MORPH_FAST_PLAY_LIMIT", d.fast_play_limit_secs),
            severe_mistake_min_drop: env_or("MORPH_SEVERE_MIN", d.severe_mistake_min_drop),
            natural_mistake_min_drop: env_or("MORPH_NATURAL_MIN", d.natural_mistake_min_drop),
            natural_mistake_max_drop: env_or("MORPH_NATURAL_MAX", d.natural_mistake_max_drop),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.losing_margin >= self.winning_margin {
            return Err(ConfigError::EmptyEvenBand {
                losing: self.losing_margin,
                winning: self.winning_margin,
            });
        }
        if self.natural_mistake_min_drop > self.natural_mistake_max_drop {
            return Err(ConfigError::InvertedNaturalWindow {
                min: self.natural_mistake_min_drop,
                max: self.natural_mistake_max_drop,
            });
        }
        if !self.fast_play_limit_secs.is_finite() || self.fast_play_limit_secs < 0.0 {
            return Err(ConfigError::InvalidFastPlayLimit(self.fast_play_limit_secs));
        }
        Ok(())
    }

    /// This config with every field present in `update` replaced.
    pub fn merged(&self, update: &ConfigUpdate) -> Self {
        Self {
            winning_margin: update.winning_margin.unwrap_or(self.winning_margin),
            losing_margin: update.losing_margin.unwrap_or(self.losing_margin),
            fast_play_limit_secs: update
                .fast_play_limit_secs
                .unwrap_or(self.fast_play_limit_secs),
            severe_mistake_min_drop: update
                .severe_mistake_min_drop
                .unwrap_or(self.severe_mistake_min_drop),
            natural_mistake_min_drop: update
                .natural_mistake_min_drop
                .unwrap_or(self.natural_mistake_min_drop),
            natural_mistake_max_drop: update
                .natural_mistake_max_drop
                .unwrap_or(self.natural_mistake_max_drop),
        }
    }
}

/// A partial config. Absent fields keep their current value.
///
/// Accepts both our field names and the upper-case names used by the
/// tuning scripts (`USER_WINNING_MARGIN`, `FAST_PLAY_LIMIT`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(default, alias = "USER_WINNING_MARGIN", skip_serializing_if = "Option::is_none")]
    pub winning_margin: Option<i32>,
    #[serde(default, alias = "USER_LOSING_MARGIN", skip_serializing_if = "Option::is_none")]
    pub losing_margin: Option<i32>,
    #[serde(default, alias = "FAST_PLAY_LIMIT", skip_serializing_if = "Option::is_none")]
    pub fast_play_limit_secs: Option<f64>,
    #[serde(default, alias = "MISTAKE_SEVERE_MIN", skip_serializing_if = "Option::is_none")]
    pub severe_mistake_min_drop: Option<u32>,
    #[serde(default, alias = "MISTAKE_NATURAL_MIN", skip_serializing_if = "Option::is_none")]
    pub natural_mistake_min_drop: Option<u32>,
    #[serde(default, alias = "MISTAKE_NATURAL_MAX", skip_serializing_if = "Option::is_none")]
    pub natural_mistake_max_drop: Option<u32>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("losing margin {losing} must be below winning margin {winning}")]
    EmptyEvenBand { losing: i32, winning: i32 },
    #[error("natural mistake window {min}..{max} is inverted")]
    InvertedNaturalWindow { min: u32, max: u32 },
    #[error("fast play limit {0} must be a non-negative number of seconds")]
    InvalidFastPlayLimit(f64),
}

/// Process-wide holder of the current [`Config`].
///
/// Readers take an `Arc` snapshot; the single write path validates and
/// swaps the pointer.
#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Arc<Config>>,
}

impl ConfigStore {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            current: RwLock::new(Arc::new(config)),
        })
    }

    pub fn snapshot(&self) -> Arc<Config> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply a partial update atomically. On error nothing changes.
    pub fn apply(&self, update: &ConfigUpdate) -> Result<Arc<Config>, ConfigError> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = current.merged(update);
        next.validate()?;
        *current = Arc::new(next);
        Ok(current.clone())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            current: RwLock::new(Arc::new(Config::default())),
        }
    }
}

/// How to launch and manage the analysis engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Engine executable; resolved through `PATH` when not absolute.
    pub path: PathBuf,
    pub args: Vec<String>,
    /// `setoption` pairs sent after the handshake.
    pub options: Vec<(String, String)>,
    /// Warm sessions to keep. 0 spawns a fresh engine per decision.
    pub pool_size: usize,
    /// Engines alive at once when spawning per decision.
    pub max_sessions: usize,
    pub acquire_timeout: Duration,
    pub handshake_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stockfish"),
            args: Vec::new(),
            options: Vec::new(),
            pool_size: 0,
            max_sessions: 4,
            acquire_timeout: Duration::from_secs(5),
            handshake_timeout: Duration::from_secs(5),
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Self {
        let d = Self::default();
        let mut options = Vec::new();
        if let Ok(threads) = std::env::var("ENGINE_THREADS") {
            options.push(("Threads".to_string(), threads));
        }
        if let Ok(hash) = std::env::var("ENGINE_HASH_MB") {
            options.push(("Hash".to_string(), hash));
        }

        Self {
            path: std::env::var("ENGINE_PATH").map(PathBuf::from).unwrap_or(d.path),
            args: Vec::new(),
            options,
            pool_size: env_or("ENGINE_POOL_SIZE", d.pool_size),
            max_sessions: env_or("ENGINE_MAX_SESSIONS", d.max_sessions),
            acquire_timeout: env_millis("ENGINE_ACQUIRE_TIMEOUT_MS", d.acquire_timeout),
            handshake_timeout: env_millis("ENGINE_HANDSHAKE_TIMEOUT_MS", d.handshake_timeout),
        }
    }
}

/// Per-decision search budgets and the decision log location.
#[derive(Debug, Clone)]
pub struct DecisionSettings {
    /// Limit for the quick evaluations that feed the tracker and selector.
    pub baseline_limit: SearchLimit,
    /// Limit for the multi-line search on the mistake path.
    pub mistake_limit: SearchLimit,
    /// Number of candidate lines requested on the mistake path.
    pub multipv: usize,
    /// Wall-clock ceiling for a whole decision.
    pub decision_timeout: Duration,
    /// JSONL decision log. `None` disables logging.
    pub log_path: Option<PathBuf>,
}

impl Default for DecisionSettings {
    fn default() -> Self {
        Self {
            baseline_limit: SearchLimit::MoveTime(Duration::from_millis(100)),
            mistake_limit: SearchLimit::MoveTime(Duration::from_millis(500)),
            multipv: 20,
            decision_timeout: Duration::from_secs(10),
            log_path: Some(PathBuf::from("game_log.jsonl")),
        }
    }
}

impl DecisionSettings {
    pub fn from_env() -> Self {
        let d = Self::default();
        let log_path = match std::env::var("MORPH_LOG_PATH") {
            Ok(p) if p.is_empty() => None,
            Ok(p) => Some(PathBuf::from(p)),
            Err(_) => d.log_path,
        };

        Self {
            baseline_limit: std::env::var("MORPH_BASELINE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|ms| SearchLimit::MoveTime(Duration::from_millis(ms)))
                .unwrap_or(d.baseline_limit),
            mistake_limit: std::env::var("MORPH_MISTAKE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|ms| SearchLimit::MoveTime(Duration::from_millis(ms)))
                .unwrap_or(d.mistake_limit),
            multipv: env_or("MORPH_MULTIPV", d.multipv).max(2),
            decision_timeout: env_millis("MORPH_DECISION_TIMEOUT_MS", d.decision_timeout),
            log_path,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
