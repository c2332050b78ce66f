//! The adaptive engine: one request in, one bot move out.
//!
//! # Pipeline
//!
//! ```text
//! DecisionRequest
//!     ↓ parse FEN, apply the human move          (no engine calls)
//! game over? ──────────────────────────────────→ DecisionOutcome::GameOver
//!     ↓ acquire session
//! tracker::assess      current (+ prior) baseline searches
//!     ↓ human_score
//! policy::select       persona + directive
//!     ↓
//! PlayBest  → analyze_best(Depth(d))
//! PlayMistake → analyze_top(mistake limit, multipv) → select_mistake
//!     ↓ legality check, LogRecord
//! DecisionOutcome::Played(Decision)
//! ```
//!
//! Everything from the session acquire to the chosen move runs under the
//! decision timeout. The session is dropped with the future, which kills
//! (or discards) the engine if the decision is cut short.

use chess::{Board, ChessMove};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::config::{Config, ConfigStore, DecisionSettings};
use crate::decision_log::{now_ms, DecisionLogger, LogRecord};
use crate::mistake::select_mistake;
use crate::oracle::{EngineError, EvaluatorSource, SearchLimit};
use crate::policy::{self, Directive, Persona};
use crate::position::{GameEnd, Position};
use crate::tracker::{self, Assessment};
use crate::uci::{format_move, parse_move_syntax, NULL_MOVE};

/// One bot turn as the caller describes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub game_id: Option<String>,
    /// Position before `human_move`, or the position the bot moves in when
    /// there is no human move.
    pub fen: String,
    /// The human's move in UCI. Absent or `0000` when the bot opens.
    #[serde(default, alias = "user_move")]
    pub human_move: Option<String>,
    /// How long the human thought, in seconds.
    #[serde(alias = "time_taken")]
    pub latency_secs: f64,
    /// Overrides the move number taken from the FEN.
    #[serde(default)]
    pub move_number: Option<u32>,
}

/// The bot's move and the reasoning behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub bot_move: String,
    pub persona: Persona,
    pub directive: Directive,
    pub search_depth: u8,
    pub human_score: i32,
    pub quality_loss: i32,
    pub is_blunder: bool,
    pub mistake_fallback: bool,
    /// Centipawns the bot gave up versus its best line, on the mistake path.
    pub mistake_drop: Option<i64>,
    /// Position after the bot's move, clocks included.
    pub fen_after: String,
    /// Whether the bot's move ended the game.
    pub game_over: bool,
    pub game_end: Option<GameEnd>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecisionOutcome {
    Played(Decision),
    /// The human's move (or the given position) already ended the game.
    GameOver { fen: String, reason: GameEnd },
}

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("invalid position {fen:?}: {reason}")]
    InvalidPosition { fen: String, reason: String },
    #[error("malformed move {0:?}")]
    InvalidMove(String),
    #[error("illegal move {mv} in {fen}")]
    IllegalMove { mv: String, fen: String },
    #[error("latency {0} must be a non-negative number of seconds")]
    InvalidLatency(f64),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("decision did not finish within {0:?}")]
    Timeout(Duration),
}

impl DecisionError {
    /// Bad requests, as opposed to failures on our side.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPosition { .. }
                | Self::InvalidMove(_)
                | Self::IllegalMove { .. }
                | Self::InvalidLatency(_)
        )
    }
}

/// A validated turn: where the human moved from, and where the bot moves.
struct Turn {
    prior: Option<Board>,
    current: Position,
    human_move: Option<String>,
    move_number: u32,
}

impl Turn {
    fn parse(request: &DecisionRequest) -> Result<Self, DecisionError> {
        if !request.latency_secs.is_finite() || request.latency_secs < 0.0 {
            return Err(DecisionError::InvalidLatency(request.latency_secs));
        }

        let position =
            Position::from_fen(&request.fen).map_err(|e| DecisionError::InvalidPosition {
                fen: request.fen.clone(),
                reason: format!("{:?}", e),
            })?;

        let human_move = request
            .human_move
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty() && *m != NULL_MOVE);

        let Some(mv_str) = human_move else {
            return Ok(Self {
                prior: None,
                current: position,
                human_move: None,
                move_number: request.move_number.unwrap_or(position.fullmove_number),
            });
        };

        let mv = parse_move_syntax(mv_str)
            .ok_or_else(|| DecisionError::InvalidMove(mv_str.to_string()))?;
        if !position.board.legal(mv) {
            return Err(DecisionError::IllegalMove {
                mv: mv_str.to_string(),
                fen: position.fen(),
            });
        }

        // The bot moves in the full move the clock shows after the human's move.
        let current = position.play(mv);
        Ok(Self {
            prior: Some(position.board),
            current,
            human_move: Some(format_move(mv)),
            move_number: request.move_number.unwrap_or(current.fullmove_number),
        })
    }
}

/// What the engine-facing half of a decision produced.
struct Played {
    assessment: Assessment,
    persona: Persona,
    directive: Directive,
    mv: ChessMove,
    search_depth: u8,
    fallback: bool,
    drop: Option<i64>,
}

/// Rubber-banding opponent over an external analysis engine.
pub struct AdaptiveEngine {
    source: Arc<dyn EvaluatorSource>,
    config: Arc<ConfigStore>,
    logger: Arc<DecisionLogger>,
    settings: DecisionSettings,
}

impl AdaptiveEngine {
    pub fn new(
        source: Arc<dyn EvaluatorSource>,
        config: Arc<ConfigStore>,
        logger: Arc<DecisionLogger>,
        settings: DecisionSettings,
    ) -> Self {
        Self {
            source,
            config,
            logger,
            settings,
        }
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub fn logger(&self) -> &Arc<DecisionLogger> {
        &self.logger
    }

    /// Decide the bot's reply to one human move.
    pub async fn decide(&self, request: &DecisionRequest) -> Result<DecisionOutcome, DecisionError> {
        let turn = Turn::parse(request)?;
        let tag = request.game_id.as_deref().unwrap_or("-");

        if let Some(reason) = turn.current.game_end() {
            info!("[{}] Game over before bot move: {:?}", tag, reason);
            return Ok(DecisionOutcome::GameOver {
                fen: turn.current.fen(),
                reason,
            });
        }

        let config = self.config.snapshot();
        let ceiling = self.settings.decision_timeout;
        let played = timeout(ceiling, self.play(&turn, request.latency_secs, &config))
            .await
            .map_err(|_| DecisionError::Timeout(ceiling))??;

        if !turn.current.board.legal(played.mv) {
            return Err(EngineError::IllegalMove {
                mv: format_move(played.mv),
                fen: turn.current.fen(),
            }
            .into());
        }

        let after = turn.current.play(played.mv);
        let game_end = after.game_end();
        let bot_move = format_move(played.mv);
        let assessment = played.assessment;

        info!(
            "[{}] Move {}: human {} ({:+} cp, loss {}) in {:.1}s -> {} plays {}{}",
            tag,
            turn.move_number,
            turn.human_move.as_deref().unwrap_or(NULL_MOVE),
            assessment.human_score,
            assessment.quality_loss,
            request.latency_secs,
            played.persona,
            bot_move,
            if played.fallback { " (fallback)" } else { "" }
        );

        let record = LogRecord {
            timestamp_ms: now_ms(),
            game_id: request.game_id.clone(),
            move_number: turn.move_number,
            human_move: turn.human_move.clone(),
            human_latency_secs: request.latency_secs,
            human_score: assessment.human_score,
            best_score: assessment.best_score,
            quality_loss: assessment.quality_loss,
            is_blunder: assessment.is_blunder,
            persona: played.persona,
            mistake_fallback: played.fallback,
            bot_move: bot_move.clone(),
            search_depth: played.search_depth,
        };
        self.logger.record(&record).await;

        Ok(DecisionOutcome::Played(Decision {
            bot_move,
            persona: played.persona,
            directive: played.directive,
            search_depth: played.search_depth,
            human_score: assessment.human_score,
            quality_loss: assessment.quality_loss,
            is_blunder: assessment.is_blunder,
            mistake_fallback: played.fallback,
            mistake_drop: played.drop,
            fen_after: after.fen(),
            game_over: game_end.is_some(),
            game_end,
        }))
    }

    async fn play(
        &self,
        turn: &Turn,
        latency_secs: f64,
        config: &Config,
    ) -> Result<Played, DecisionError> {
        let mut evaluator = self.source.acquire().await?;

        let board = &turn.current.board;
        let assessment = tracker::assess(
            evaluator.as_mut(),
            turn.prior.as_ref(),
            board,
            self.settings.baseline_limit,
        )
        .await?;

        let (persona, directive) = policy::select(assessment.human_score, latency_secs, config);
        debug!(
            "Selected {} ({:?}) for human score {}",
            persona, directive, assessment.human_score
        );

        let (mv, search_depth, fallback, drop) = match directive {
            Directive::PlayBest { depth } => {
                let best = evaluator
                    .analyze_best(board, SearchLimit::Depth(depth))
                    .await?;
                // Engines that omit `depth` still searched to the limit.
                let reached = if best.depth > 0 { best.depth } else { depth };
                (best.principal_move, reached, false, None)
            }
            Directive::PlayMistake { min_drop, max_drop } => {
                let lines = evaluator
                    .analyze_top(board, self.settings.mistake_limit, self.settings.multipv)
                    .await?;
                let choice =
                    select_mistake(&lines, min_drop, max_drop).ok_or(EngineError::NoLines)?;
                debug!(
                    "Mistake: rank {} of {}, drop {} (window {}..{:?})",
                    choice.rank,
                    lines.len(),
                    choice.drop,
                    min_drop,
                    max_drop
                );
                let depth = lines.get(choice.rank).map_or(0, |l| l.result.depth);
                (choice.mv, depth, choice.fallback, Some(choice.drop))
            }
        };

        Ok(Played {
            assessment,
            persona,
            directive,
            mv,
            search_depth,
            fallback,
            drop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigUpdate;
    use crate::decision_log::testing::{FailingSink, MemorySink};
    use crate::oracle::scripted::{Script, ScriptedSource};
    use crate::score::Score;
    use crate::uci::parse_uci_move;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn settings() -> DecisionSettings {
        DecisionSettings {
            decision_timeout: Duration::from_secs(5),
            log_path: None,
            ..DecisionSettings::default()
        }
    }

    fn engine(script: Script, sink: MemorySink) -> (AdaptiveEngine, Arc<Script>) {
        let script = Arc::new(script);
        let engine = AdaptiveEngine::new(
            Arc::new(ScriptedSource(Arc::clone(&script))),
            Arc::new(ConfigStore::default()),
            Arc::new(DecisionLogger::new(Box::new(sink))),
            settings(),
        );
        (engine, script)
    }

    fn after(moves: &[&str]) -> Board {
        moves.iter().fold(Board::default(), |board, m| {
            board.make_move_new(parse_uci_move(&board, m).unwrap())
        })
    }

    fn request(human_move: &str, latency_secs: f64) -> DecisionRequest {
        DecisionRequest {
            game_id: Some("test".to_string()),
            fen: START.to_string(),
            human_move: Some(human_move.to_string()),
            latency_secs,
            move_number: None,
        }
    }

    fn played(outcome: DecisionOutcome) -> Decision {
        match outcome {
            DecisionOutcome::Played(decision) => decision,
            other => panic!("expected a move, got {:?}", other),
        }
    }

    /// After 1.e4, black (the bot) to move, scored from black's side.
    fn losing_human_script(best: i32, lines: &[(i32, &str)]) -> Script {
        let mut all = vec![(Score::Centipawns(best), "e7e5")];
        all.extend(lines.iter().map(|&(cp, m)| (Score::Centipawns(cp), m)));
        Script::new()
            .with_lines(Board::default(), &[(Score::Centipawns(30), "e2e4")])
            .with_lines(after(&["e2e4"]), &all)
    }

    #[tokio::test]
    async fn test_neutral_opening_gets_balanced_challenger() {
        let sink = MemorySink::default();
        let (engine, script) = engine(Script::new(), sink.clone());

        let decision = played(engine.decide(&request("e2e4", 2.0)).await.unwrap());
        assert_eq!(decision.persona, Persona::BalancedChallenger);
        assert_eq!(decision.directive, Directive::PlayBest { depth: 1 });
        // Depth the evaluator reports, not the one requested.
        assert_eq!(decision.search_depth, 10);
        assert!(parse_uci_move(&after(&["e2e4"]), &decision.bot_move).is_some());
        assert!(!decision.game_over);

        // Current, prior and play searches all run on one session.
        let calls = script.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].0, after(&["e2e4"]));
        assert_eq!(calls[1].0, Board::default());
        assert_eq!(calls[2].1, SearchLimit::Depth(1));
        assert_eq!(script.acquires(), 1);

        let records = sink.taken();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].move_number, 1);
        assert_eq!(records[0].human_move.as_deref(), Some("e2e4"));
        assert_eq!(records[0].bot_move, decision.bot_move);
        assert_eq!(records[0].persona, Persona::BalancedChallenger);
    }

    #[tokio::test]
    async fn test_crisis_plays_a_severe_mistake() {
        // Drops 0, 50, 340, 500: the first qualifier for >= 300 is g8f6.
        let script = losing_human_script(400, &[(350, "d7d5"), (60, "g8f6"), (-100, "a7a6")]);
        let sink = MemorySink::default();
        let (engine, script) = engine(script, sink.clone());

        let decision = played(engine.decide(&request("e2e4", 0.5)).await.unwrap());
        assert_eq!(decision.human_score, -400);
        assert_eq!(decision.persona, Persona::MercyRescue);
        assert_eq!(decision.bot_move, "g8f6");
        assert!(!decision.mistake_fallback);
        assert_eq!(decision.mistake_drop, Some(340));
        assert_eq!(decision.quality_loss, 430);
        assert!(decision.is_blunder);

        let play_call = script.calls().pop().unwrap();
        assert_eq!(play_call.2, 20);
        assert_eq!(play_call.1, settings().mistake_limit);

        assert_eq!(sink.taken()[0].best_score, Some(30));
    }

    #[tokio::test]
    async fn test_fast_losing_human_gets_mercy_speed() {
        let script = losing_human_script(250, &[(200, "d7d5"), (-100, "g8f6")]);
        let (engine, _) = engine(script, MemorySink::default());

        let decision = played(engine.decide(&request("e2e4", 0.5)).await.unwrap());
        assert_eq!(decision.persona, Persona::MercySpeed);
        assert_eq!(decision.bot_move, "g8f6");
    }

    #[tokio::test]
    async fn test_fallback_keeps_selected_persona() {
        let script = losing_human_script(250, &[(240, "d7d5"), (200, "g8f6")]);
        let sink = MemorySink::default();
        let (engine, _) = engine(script, sink.clone());

        let decision = played(engine.decide(&request("e2e4", 0.5)).await.unwrap());
        assert_eq!(decision.persona, Persona::MercySpeed);
        assert!(decision.mistake_fallback);
        assert_eq!(decision.bot_move, "e7e5");

        let record = &sink.taken()[0];
        assert_eq!(record.persona, Persona::MercySpeed);
        assert!(record.mistake_fallback);
    }

    #[tokio::test]
    async fn test_config_update_applies_to_next_decision() {
        let script = losing_human_script(250, &[(200, "d7d5"), (60, "g8f6")]);
        let (engine, _) = engine(script, MemorySink::default());

        let first = played(engine.decide(&request("e2e4", 0.5)).await.unwrap());
        assert_eq!(first.persona, Persona::MercySpeed);

        engine
            .config()
            .apply(&ConfigUpdate {
                fast_play_limit_secs: Some(0.2),
                ..ConfigUpdate::default()
            })
            .unwrap();

        // 0.5s is no longer fast: natural window 150..=250 picks g8f6 (drop 190).
        let second = played(engine.decide(&request("e2e4", 0.5)).await.unwrap());
        assert_eq!(second.persona, Persona::AssistMode);
        assert_eq!(
            second.directive,
            Directive::PlayMistake {
                min_drop: 150,
                max_drop: Some(250)
            }
        );
        assert_eq!(second.bot_move, "g8f6");
        assert_eq!(engine.config().snapshot().losing_margin, -200);
    }

    #[tokio::test]
    async fn test_timeout_fails_the_decision() {
        let script = Arc::new(Script::new().with_delay(Duration::from_millis(500)));
        let engine = AdaptiveEngine::new(
            Arc::new(ScriptedSource(Arc::clone(&script))),
            Arc::new(ConfigStore::default()),
            Arc::new(DecisionLogger::disabled()),
            DecisionSettings {
                decision_timeout: Duration::from_millis(50),
                ..settings()
            },
        );

        let err = engine.decide(&request("e2e4", 1.0)).await.unwrap_err();
        assert!(matches!(err, DecisionError::Timeout(_)));
        assert!(!err.is_input_error());
    }

    #[tokio::test]
    async fn test_bad_input_is_rejected_before_engine_calls() {
        let (engine, script) = engine(Script::new(), MemorySink::default());

        let err = engine.decide(&request("e2e5", 1.0)).await.unwrap_err();
        assert!(matches!(err, DecisionError::IllegalMove { .. }));

        let err = engine.decide(&request("e2", 1.0)).await.unwrap_err();
        assert!(matches!(err, DecisionError::InvalidMove(_)));

        let bad_fen = DecisionRequest {
            fen: "not a fen".to_string(),
            ..request("e2e4", 1.0)
        };
        let err = engine.decide(&bad_fen).await.unwrap_err();
        assert!(matches!(err, DecisionError::InvalidPosition { .. }));
        assert!(err.is_input_error());

        assert_eq!(script.acquires(), 0);
    }

    #[tokio::test]
    async fn test_mating_move_returns_game_over() {
        let (engine, script) = engine(Script::new(), MemorySink::default());
        let request = DecisionRequest {
            fen: "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2".to_string(),
            human_move: Some("d8h4".to_string()),
            ..DecisionRequest::default()
        };

        let outcome = engine.decide(&request).await.unwrap();
        assert!(matches!(
            outcome,
            DecisionOutcome::GameOver {
                reason: GameEnd::Checkmate,
                ..
            }
        ));
        assert_eq!(script.acquires(), 0);
    }

    #[tokio::test]
    async fn test_dead_draws_return_game_over() {
        let (engine, script) = engine(Script::new(), MemorySink::default());

        let bare_kings = DecisionRequest {
            fen: "8/8/8/4k3/8/8/8/4K3 w - - 0 40".to_string(),
            human_move: Some("e1e2".to_string()),
            ..DecisionRequest::default()
        };
        let DecisionOutcome::GameOver { fen, reason } = engine.decide(&bare_kings).await.unwrap()
        else {
            panic!("expected game over");
        };
        assert_eq!(reason, GameEnd::InsufficientMaterial);
        assert!(fen.ends_with(" 1 40"), "{}", fen);

        let quiet_rook_ending = DecisionRequest {
            fen: "8/8/8/4k3/8/8/8/R3K3 w - - 149 120".to_string(),
            human_move: Some("a1a2".to_string()),
            ..DecisionRequest::default()
        };
        let outcome = engine.decide(&quiet_rook_ending).await.unwrap();
        assert!(matches!(
            outcome,
            DecisionOutcome::GameOver {
                reason: GameEnd::SeventyFiveMoves,
                ..
            }
        ));
        assert_eq!(script.acquires(), 0);
    }

    #[tokio::test]
    async fn test_fen_after_keeps_move_counters() {
        let sink = MemorySink::default();
        let (engine, _) = engine(Script::new(), sink.clone());

        let mut fen = START.to_string();
        for (i, human_move) in ["e2e4", "d2d4", "g1f3"].iter().enumerate() {
            let request = DecisionRequest {
                fen: fen.clone(),
                ..request(human_move, 2.0)
            };
            // Unscripted replies are arbitrary; skip lines where ours is illegal.
            let decision = match engine.decide(&request).await {
                Ok(outcome) => played(outcome),
                Err(DecisionError::IllegalMove { .. }) => break,
                Err(e) => panic!("{}", e),
            };
            assert!(
                decision.fen_after.ends_with(&format!(" {}", i + 2)),
                "{}",
                decision.fen_after
            );
            fen = decision.fen_after;
        }

        let numbers: Vec<u32> = sink.taken().iter().map(|r| r.move_number).collect();
        assert!(numbers.len() >= 2, "{:?}", numbers);
        assert!(numbers.windows(2).all(|w| w[1] == w[0] + 1), "{:?}", numbers);
        assert_eq!(numbers[0], 1);
    }

    #[tokio::test]
    async fn test_negative_latency_is_rejected() {
        let (engine, script) = engine(Script::new(), MemorySink::default());
        for latency in [-0.5, f64::NAN] {
            let err = engine.decide(&request("e2e4", latency)).await.unwrap_err();
            assert!(matches!(err, DecisionError::InvalidLatency(_)));
            assert!(err.is_input_error());
        }
        assert_eq!(script.acquires(), 0);
    }

    #[test]
    fn test_request_requires_latency() {
        let missing = format!(r#"{{"fen":"{}","human_move":"e2e4"}}"#, START);
        assert!(serde_json::from_str::<DecisionRequest>(&missing).is_err());
    }

    #[tokio::test]
    async fn test_null_move_lets_bot_open() {
        let sink = MemorySink::default();
        let (engine, script) = engine(Script::new(), sink.clone());

        let decision = played(engine.decide(&request(NULL_MOVE, 0.0)).await.unwrap());
        assert_eq!(decision.quality_loss, 0);
        assert!(parse_uci_move(&Board::default(), &decision.bot_move).is_some());
        // No prior-position search.
        assert_eq!(script.calls().len(), 2);
        assert_eq!(sink.taken()[0].human_move, None);
        assert_eq!(sink.taken()[0].best_score, None);
    }

    #[tokio::test]
    async fn test_logging_failure_does_not_fail_decision() {
        let engine = AdaptiveEngine::new(
            Arc::new(ScriptedSource(Arc::new(Script::new()))),
            Arc::new(ConfigStore::default()),
            Arc::new(DecisionLogger::new(Box::new(FailingSink))),
            settings(),
        );
        assert!(engine.decide(&request("d2d4", 1.0)).await.is_ok());
    }

    #[test]
    fn test_move_number_follows_side_to_move() {
        let black_to_move = DecisionRequest {
            fen: "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 7".to_string(),
            human_move: Some("e7e5".to_string()),
            ..DecisionRequest::default()
        };
        assert_eq!(Turn::parse(&black_to_move).unwrap().move_number, 8);

        let explicit = DecisionRequest {
            move_number: Some(42),
            ..black_to_move
        };
        assert_eq!(Turn::parse(&explicit).unwrap().move_number, 42);
    }

    #[test]
    fn test_request_accepts_legacy_field_names() {
        let request: DecisionRequest =
            serde_json::from_str(&format!(r#"{{"fen":"{}","user_move":"e2e4","time_taken":2.5}}"#, START))
                .unwrap();
        assert_eq!(request.human_move.as_deref(), Some("e2e4"));
        assert_eq!(request.latency_secs, 2.5);
        assert_eq!(request.game_id, None);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(DecisionOutcome::GameOver {
            fen: START.to_string(),
            reason: GameEnd::Stalemate,
        })
        .unwrap();
        assert_eq!(json["status"], "game_over");
        assert_eq!(json["reason"], "stalemate");
    }
}
