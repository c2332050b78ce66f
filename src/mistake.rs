//! Picking a calibrated mistake from a multi-line analysis.

use chess::ChessMove;

use crate::oracle::RankedLine;

/// The move chosen on the mistake path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MistakeChoice {
    pub mv: ChessMove,
    /// Rank of the chosen line (0 = best).
    pub rank: usize,
    /// Centipawns given up versus the best line.
    pub drop: i64,
    /// True when nothing fit the window and the best move was used.
    pub fallback: bool,
}

/// Choose the first line, in engine order, whose drop from the best line is
/// within `min_drop..=max_drop` (no upper bound when `max_drop` is `None`).
///
/// The first qualifier wins rather than the largest or smallest drop: the
/// engine ranks natural-looking moves higher. When no line qualifies the
/// best move is returned, since a legal position always has a move to play.
///
/// Returns `None` only for an empty slice.
pub fn select_mistake(
    lines: &[RankedLine],
    min_drop: u32,
    max_drop: Option<u32>,
) -> Option<MistakeChoice> {
    let best = lines.first()?;
    let best_value = i64::from(best.result.score);

    let qualifies = |drop: i64| {
        drop >= i64::from(min_drop) && max_drop.map_or(true, |max| drop <= i64::from(max))
    };

    let picked = lines.iter().skip(1).find_map(|line| {
        let drop = best_value - i64::from(line.result.score);
        qualifies(drop).then_some(MistakeChoice {
            mv: line.result.principal_move,
            rank: line.rank,
            drop,
            fallback: false,
        })
    });

    Some(picked.unwrap_or(MistakeChoice {
        mv: best.result.principal_move,
        rank: best.rank,
        drop: 0,
        fallback: true,
    }))
}
