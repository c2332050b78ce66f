//! chessmorph-sim: self-play harness for tuning the thresholds.
//!
//! A weak engine session plays the "human" (white): short searches, a share
//! of random legal moves, random think times. The adaptive engine plays
//! black. Every decision goes to the decision log, so a batch of simulated
//! games gives the same telemetry as real ones.
//!
//! # Usage
//!
//! ```bash
//! export ENGINE_PATH=/usr/bin/stockfish
//! export SIM_GAMES=5             # Games to play
//! export SIM_USER_MS=50          # Search time for the simulated human
//! export SIM_BLUNDER_RATE=0.2    # Share of random human moves
//! export SIM_MAX_PLIES=200       # Adjudicate a draw after this many plies
//! export SIM_SEED=7              # Reproducible randomness (optional)
//!
//! cargo run --bin chessmorph-sim --release
//! ```

use chess::{Board, ChessMove, Color, MoveGen};
use colored::*;
use dotenv::dotenv;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use chessmorph::decision_log::{DecisionLogger, JsonlDecisionLog};
use chessmorph::oracle::{EnginePool, Evaluator, EvaluatorSource, SearchLimit, SpawnPerDecision, UciSession};
use chessmorph::policy::Persona;
use chessmorph::position::{GameEnd, Position};
use chessmorph::uci::format_move;
use chessmorph::{
    AdaptiveEngine, Config, ConfigStore, DecisionOutcome, DecisionRequest, DecisionSettings,
    EngineSettings,
};

struct SimConfig {
    games: usize,
    user_time: Duration,
    blunder_rate: f64,
    max_plies: usize,
    seed: Option<u64>,
}

impl SimConfig {
    fn from_env() -> Self {
        Self {
            games: env_or("SIM_GAMES", 1),
            user_time: Duration::from_millis(env_or("SIM_USER_MS", 50)),
            blunder_rate: env_or("SIM_BLUNDER_RATE", 0.2_f64).clamp(0.0, 1.0),
            max_plies: env_or("SIM_MAX_PLIES", 200),
            seed: std::env::var("SIM_SEED").ok().and_then(|s| s.parse().ok()),
        }
    }
}

#[derive(Default)]
struct GameSummary {
    personas: HashMap<Persona, usize>,
    human_blunders: usize,
    fallbacks: usize,
    score_total: i64,
    decisions: usize,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    println!("{}", "=== chessmorph-sim ===".bold());
    println!("Weak engine \"human\" (white) vs adaptive engine (black)");
    println!();

    if let Err(e) = run().await {
        eprintln!("{} {}", "Simulation error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let sim = SimConfig::from_env();
    let engine_settings = EngineSettings::from_env();
    let settings = DecisionSettings::from_env();
    let store = Arc::new(ConfigStore::new(Config::from_env())?);

    info!(
        "Sim: games={}, user_ms={}, blunder_rate={}, max_plies={}",
        sim.games,
        sim.user_time.as_millis(),
        sim.blunder_rate,
        sim.max_plies
    );

    let mut rng = match sim.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut user = UciSession::start(&engine_settings).await?;

    let source: Arc<dyn EvaluatorSource> = if engine_settings.pool_size == 0 {
        Arc::new(SpawnPerDecision::new(engine_settings))
    } else {
        let pool = EnginePool::new(engine_settings);
        pool.warm_up().await?;
        Arc::new(pool)
    };
    let logger = match &settings.log_path {
        Some(path) => DecisionLogger::new(Box::new(JsonlDecisionLog::new(path))),
        None => DecisionLogger::disabled(),
    };
    let engine = AdaptiveEngine::new(source, store, Arc::new(logger), settings);

    for game in 1..=sim.games {
        println!("{}", format!("--- Game {}/{} ---", game, sim.games).bold());
        let summary = play_game(&engine, &mut user, &sim, &mut rng, game).await?;
        print_summary(&summary);
    }

    engine.logger().flush().await;
    user.quit().await;
    Ok(())
}

async fn play_game(
    engine: &AdaptiveEngine,
    user: &mut UciSession,
    sim: &SimConfig,
    rng: &mut StdRng,
    game: usize,
) -> Result<GameSummary, Box<dyn Error>> {
    let game_id = format!("sim-{}", game);
    let mut position = Position::from_fen(&Board::default().to_string())
        .map_err(|e| format!("bad start position: {:?}", e))?;
    let mut summary = GameSummary::default();
    let mut plies = 0;

    while position.game_end().is_none() && plies < sim.max_plies {
        let (human_move, random) = human_move(user, &position.board, sim, rng).await?;
        let latency_secs: f64 = rng.gen_range(1.0..6.0);
        let move_number = position.fullmove_number;

        let request = DecisionRequest {
            game_id: Some(game_id.clone()),
            fen: position.fen(),
            human_move: Some(format_move(human_move)),
            latency_secs,
            move_number: None,
        };
        let after_human = position.play(human_move);
        plies += 1;

        let decision = match engine.decide(&request).await? {
            DecisionOutcome::Played(decision) => decision,
            DecisionOutcome::GameOver { .. } => {
                position = after_human;
                break;
            }
        };

        position = Position::from_fen(&decision.fen_after)
            .map_err(|e| format!("bot returned bad FEN {}: {:?}", decision.fen_after, e))?;
        plies += 1;

        println!(
            "{:>3}. {:<6}{} {:>5.1}s  score {:>6}  loss {:>5}  {:<20} -> {}{}",
            move_number,
            request.human_move.as_deref().unwrap_or_default(),
            if random { "?".red().to_string() } else { " ".to_string() },
            latency_secs,
            decision.human_score,
            decision.quality_loss,
            persona_label(decision.persona),
            decision.bot_move.bold(),
            if decision.mistake_fallback {
                " (fallback)".dimmed().to_string()
            } else {
                String::new()
            }
        );

        *summary.personas.entry(decision.persona).or_default() += 1;
        summary.human_blunders += usize::from(decision.is_blunder);
        summary.fallbacks += usize::from(decision.mistake_fallback);
        summary.score_total += i64::from(decision.human_score);
        summary.decisions += 1;
    }

    let result = match position.game_end() {
        Some(GameEnd::Checkmate) if position.board.side_to_move() == Color::White => {
            "0-1 (bot mates)".red()
        }
        Some(GameEnd::Checkmate) => "1-0 (human mates)".green(),
        Some(GameEnd::Stalemate) => "1/2-1/2 (stalemate)".yellow(),
        Some(GameEnd::InsufficientMaterial) => "1/2-1/2 (insufficient material)".yellow(),
        Some(GameEnd::SeventyFiveMoves) => "1/2-1/2 (75-move rule)".yellow(),
        None => "1/2-1/2 (ply limit)".yellow(),
    };
    println!("Result: {}", result.bold());
    Ok(summary)
}

/// The simulated human's move: usually the weak engine's pick, sometimes a
/// random legal move.
async fn human_move(
    user: &mut UciSession,
    board: &Board,
    sim: &SimConfig,
    rng: &mut StdRng,
) -> Result<(ChessMove, bool), Box<dyn Error>> {
    if rng.gen_bool(sim.blunder_rate) {
        let moves: Vec<ChessMove> = MoveGen::new_legal(board).collect();
        if let Some(&mv) = moves.choose(rng) {
            return Ok((mv, true));
        }
    }
    let best = user
        .analyze_best(board, SearchLimit::MoveTime(sim.user_time))
        .await?;
    Ok((best.principal_move, false))
}

fn persona_label(persona: Persona) -> ColoredString {
    let label = persona.label();
    match persona {
        Persona::DefensiveMaster => label.red(),
        Persona::MercyRescue => label.green(),
        Persona::MercySpeed => label.cyan(),
        Persona::AssistMode => label.yellow(),
        Persona::BalancedChallenger => label.blue(),
    }
}

fn print_summary(summary: &GameSummary) {
    if summary.decisions == 0 {
        println!("No decisions made.");
        return;
    }
    println!(
        "Decisions: {}  avg human score: {}  human blunders: {}  fallbacks: {}",
        summary.decisions,
        summary.score_total / summary.decisions as i64,
        summary.human_blunders,
        summary.fallbacks
    );
    let mut personas: Vec<_> = summary.personas.iter().collect();
    personas.sort_by(|a, b| b.1.cmp(a.1));
    for (persona, count) in personas {
        println!("  {:<20} {}", persona_label(*persona), count);
    }
    println!();
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
