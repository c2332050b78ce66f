//! Performance tracking for the human's last move.
//!
//! Compares the best score the human could have had before moving with the
//! score the human actually has after moving. Both come from quick baseline
//! searches, so small negative losses (the human "beat" the engine) are just
//! evaluation noise and are kept as-is.

use chess::Board;
use serde::Serialize;

use crate::oracle::{EngineError, Evaluator, SearchLimit};

/// Quality loss above which a move is tagged as a blunder in telemetry.
/// Does not influence difficulty selection.
pub const BLUNDER_THRESHOLD: i32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assessment {
    /// Current advantage in centipawns, from the human's side.
    pub human_score: i32,
    /// Best score available to the human before the move, if known.
    pub best_score: Option<i32>,
    /// `best_score - human_score`; zero when there is no prior position.
    pub quality_loss: i32,
    pub is_blunder: bool,
}

impl Assessment {
    pub fn from_scores(best_score: Option<i32>, human_score: i32) -> Self {
        let quality_loss = best_score.map_or(0, |best| best - human_score);
        Self {
            human_score,
            best_score,
            quality_loss,
            is_blunder: quality_loss > BLUNDER_THRESHOLD,
        }
    }
}

/// Evaluate the human's standing and their last move.
///
/// `current` is the position after the human moved, with the bot to move.
/// `prior` is the position the human moved from; pass `None` on the bot's
/// opening move.
pub async fn assess<E>(
    evaluator: &mut E,
    prior: Option<&Board>,
    current: &Board,
    limit: SearchLimit,
) -> Result<Assessment, EngineError>
where
    E: Evaluator + ?Sized,
{
    // The bot is to move in `current`, so flip to the human's side.
    let human_score = -evaluator.analyze_best(current, limit).await?.score;

    let best_score = match prior {
        // The human was to move in `prior`: no flip.
        Some(board) => Some(evaluator.analyze_best(board, limit).await?.score),
        None => None,
    };

    Ok(Assessment::from_scores(best_score, human_score))
}
