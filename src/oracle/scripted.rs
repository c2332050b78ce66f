//! In-memory evaluator for tests.
//!
//! Positions with scripted lines answer with exactly those lines (in the
//! given order). Any other position answers with its legal moves, all
//! scored as dead even.

use async_trait::async_trait;
use chess::{Board, MoveGen};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{EngineError, EvaluationResult, Evaluator, EvaluatorSource, RankedLine, SearchLimit};
use crate::score::{normalize, Score};
use crate::uci::parse_uci_move;

const SCRIPTED_DEPTH: u8 = 10;

#[derive(Default)]
pub(crate) struct Script {
    lines: HashMap<Board, Vec<(Score, String)>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(Board, SearchLimit, usize)>>,
    acquires: AtomicUsize,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines for `board`, best first, as (side-to-move score, uci move).
    pub fn with_lines(mut self, board: Board, lines: &[(Score, &str)]) -> Self {
        self.lines.insert(
            board,
            lines.iter().map(|(s, m)| (*s, m.to_string())).collect(),
        );
        self
    }

    /// Every analysis call sleeps this long first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(Board, SearchLimit, usize)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn acquires(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    fn answer(&self, board: &Board, k: usize) -> Result<Vec<RankedLine>, EngineError> {
        let scripted = match self.lines.get(board) {
            Some(lines) => lines.clone(),
            None => MoveGen::new_legal(board)
                .map(|m| (Score::Centipawns(0), crate::uci::format_move(m)))
                .collect(),
        };

        let lines: Vec<RankedLine> = scripted
            .into_iter()
            .take(k.max(1))
            .enumerate()
            .map(|(rank, (raw, mv))| {
                let principal_move = parse_uci_move(board, &mv).ok_or_else(|| {
                    EngineError::IllegalMove {
                        mv: mv.clone(),
                        fen: board.to_string(),
                    }
                })?;
                Ok(RankedLine {
                    rank,
                    result: EvaluationResult {
                        score: normalize(raw),
                        raw,
                        depth: SCRIPTED_DEPTH,
                        principal_move,
                    },
                })
            })
            .collect::<Result<_, EngineError>>()?;

        if lines.is_empty() {
            return Err(EngineError::NoLines);
        }
        Ok(lines)
    }
}

#[derive(Clone)]
pub(crate) struct ScriptedSource(pub Arc<Script>);

#[async_trait]
impl EvaluatorSource for ScriptedSource {
    async fn acquire(&self) -> Result<Box<dyn Evaluator>, EngineError> {
        self.0.acquires.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession(Arc::clone(&self.0))))
    }
}

pub(crate) struct ScriptedSession(Arc<Script>);

#[async_trait]
impl Evaluator for ScriptedSession {
    async fn analyze_top(
        &mut self,
        board: &Board,
        limit: SearchLimit,
        k: usize,
    ) -> Result<Vec<RankedLine>, EngineError> {
        self.0.calls.lock().unwrap().push((*board, limit, k));
        if let Some(delay) = self.0.delay {
            tokio::time::sleep(delay).await;
        }
        self.0.answer(board, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::assess;
    use crate::uci::format_move;

    #[tokio::test]
    async fn test_unscripted_positions_are_even() {
        let script = Arc::new(Script::new());
        let mut session = ScriptedSource(Arc::clone(&script)).acquire().await.unwrap();
        let lines = session
            .analyze_top(&Board::default(), SearchLimit::Depth(1), 5)
            .await
            .unwrap();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.result.score == 0));
        assert_eq!(script.acquires(), 1);
    }

    #[tokio::test]
    async fn test_assess_flips_to_human_side() {
        let start = Board::default();
        let after = start.make_move_new(parse_uci_move(&start, "f2f3").unwrap());
        let script = Script::new()
            .with_lines(start, &[(Score::Centipawns(25), "e2e4")])
            .with_lines(after, &[(Score::Centipawns(90), "e7e5")]);
        let mut session = ScriptedSession(Arc::new(script));

        let limit = SearchLimit::MoveTime(Duration::from_millis(100));
        let a = assess(&mut session, Some(&start), &after, limit).await.unwrap();
        assert_eq!(a.human_score, -90);
        assert_eq!(a.best_score, Some(25));
        assert_eq!(a.quality_loss, 115);
        assert!(!a.is_blunder);

        let best = session.analyze_best(&start, limit).await.unwrap();
        assert_eq!(format_move(best.principal_move), "e2e4");
    }

    #[tokio::test]
    async fn test_assess_flips_mate_scores() {
        let start = Board::default();
        let script = Script::new().with_lines(start, &[(Score::Mate(-2), "f2f3")]);
        let mut session = ScriptedSession(Arc::new(script));
        // Bot to move and getting mated: the human is winning big.
        let a = assess(&mut session, None, &start, SearchLimit::Depth(1))
            .await
            .unwrap();
        assert_eq!(a.human_score, crate::score::MATE_SCORE);
        assert_eq!(a.quality_loss, 0);
    }
}
