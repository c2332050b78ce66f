//! Score normalization.
//!
//! Engines report either a finite centipawn value or a forced mate with a
//! signed distance. Everything downstream (quality loss, persona thresholds,
//! mistake drops) works on plain bounded integers, so mate handling lives
//! here and nowhere else.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel magnitude for a forced mate, in centipawns.
///
/// Must stay far above every tunable threshold so a mate always lands in
/// the winning or losing band.
pub const MATE_SCORE: i32 = 10_000;

/// Raw engine score, from the side-to-move's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    /// Finite evaluation in centipawns.
    Centipawns(i32),
    /// Forced mate. Positive N = side to move mates, negative N = side to
    /// move gets mated. `Mate(0)` is reported for an already-mated side.
    Mate(i32),
}

impl Score {
    /// Flip perspective to the other side.
    pub fn negate(self) -> Self {
        match self {
            Self::Centipawns(cp) => Self::Centipawns(-cp),
            Self::Mate(m) => Self::Mate(-m),
        }
    }

    pub fn is_mate(self) -> bool {
        matches!(self, Self::Mate(_))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Centipawns(cp) => write!(f, "{:+.2}", *cp as f64 / 100.0),
            Self::Mate(m) if *m > 0 => write!(f, "+M{}", m),
            Self::Mate(m) => write!(f, "-M{}", m.abs()),
        }
    }
}

/// Convert a raw score into canonical centipawns.
///
/// Finite scores pass through unchanged; mates collapse to `±MATE_SCORE`
/// regardless of distance.
pub fn normalize(raw: Score) -> i32 {
    match raw {
        Score::Centipawns(cp) => cp,
        Score::Mate(m) if m > 0 => MATE_SCORE,
        Score::Mate(_) => -MATE_SCORE,
    }
}
