//! Difficulty selection.
//!
//! A stateless rule table from (human advantage, human think time, config)
//! to a persona and a move-selection directive. Rules are checked in order
//! and the first match wins:
//!
//! | Condition                                  | Persona              | Directive                      |
//! |--------------------------------------------|----------------------|--------------------------------|
//! | score > winning margin                     | Defensive Master     | best move at depth 6           |
//! | score < losing margin, score < -300        | Mercy Rescue         | mistake ≥ severe min           |
//! | score < losing margin, latency < fast play | Mercy Speed          | mistake ≥ severe min           |
//! | score < losing margin                      | Assist Mode          | mistake in natural window      |
//! | otherwise                                  | Balanced Challenger  | best move at depth 1           |
//!
//! Even the "best" directives are depth-bounded: an unconstrained engine is
//! unbeatable, which defeats the point.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;

/// Below this the human is in crisis, regardless of the losing margin.
pub const CRISIS_THRESHOLD: i32 = -300;

/// Search depth when the human is ahead.
pub const DEFENSIVE_DEPTH: u8 = 6;

/// Search depth in an even game.
pub const BALANCED_DEPTH: u8 = 1;

/// Named difficulty mode, attached to telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    DefensiveMaster,
    MercyRescue,
    MercySpeed,
    AssistMode,
    BalancedChallenger,
}

impl Persona {
    pub fn label(self) -> &'static str {
        match self {
            Self::DefensiveMaster => "Defensive Master",
            Self::MercyRescue => "Mercy Rescue",
            Self::MercySpeed => "Mercy Speed",
            Self::AssistMode => "Assist Mode",
            Self::BalancedChallenger => "Balanced Challenger",
        }
    }

    /// Whether this persona deliberately gives away advantage.
    pub fn is_mercy(self) -> bool {
        matches!(self, Self::MercyRescue | Self::MercySpeed | Self::AssistMode)
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the bot picks its move for one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    /// Play the engine's best move at a bounded depth.
    PlayBest { depth: u8 },
    /// Play a move whose loss versus the best move is in the window.
    PlayMistake { min_drop: u32, max_drop: Option<u32> },
}

/// Pick the persona and directive for the next bot move.
pub fn select(human_score: i32, latency_secs: f64, config: &Config) -> (Persona, Directive) {
    if human_score > config.winning_margin {
        return (
            Persona::DefensiveMaster,
            Directive::PlayBest {
                depth: DEFENSIVE_DEPTH,
            },
        );
    }

    if human_score < config.losing_margin {
        let severe = Directive::PlayMistake {
            min_drop: config.severe_mistake_min_drop,
            max_drop: None,
        };
        if human_score < CRISIS_THRESHOLD {
            return (Persona::MercyRescue, severe);
        }
        if latency_secs < config.fast_play_limit_secs {
            return (Persona::MercySpeed, severe);
        }
        return (
            Persona::AssistMode,
            Directive::PlayMistake {
                min_drop: config.natural_mistake_min_drop,
                max_drop: Some(config.natural_mistake_max_drop),
            },
        );
    }

    (
        Persona::BalancedChallenger,
        Directive::PlayBest {
            depth: BALANCED_DEPTH,
        },
    )
}
