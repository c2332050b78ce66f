//! chessmorph: adaptive opponent as a JSON-lines service.
//!
//! Reads one JSON request per line on stdin and writes one JSON response per
//! line on stdout. Requests are handled concurrently, so responses can come
//! back out of order; pass an `id` to match them up.
//!
//! ```text
//! {"type":"move","id":1,"game_id":"g1","fen":"<fen before human move>","human_move":"e2e4","latency_secs":2.4}
//! {"type":"update_config","id":2,"fast_play_limit_secs":4.0}
//! {"type":"config","id":3}
//! ```
//!
//! # Usage
//!
//! ```bash
//! export ENGINE_PATH=/usr/bin/stockfish   # UCI engine binary
//! export ENGINE_POOL_SIZE=4               # Warm sessions (0 = spawn per move)
//! export MORPH_LOG_PATH=game_log.jsonl    # Decision log (empty disables)
//! export RUST_LOG=info
//!
//! cargo run --bin chessmorph --release
//! ```

use dotenv::dotenv;
use log::{error, info, warn};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

use chessmorph::decision_log::{DecisionLogger, JsonlDecisionLog};
use chessmorph::oracle::{EnginePool, EvaluatorSource, SpawnPerDecision};
use chessmorph::{
    AdaptiveEngine, Config, ConfigStore, ConfigUpdate, DecisionRequest, DecisionSettings,
    EngineSettings,
};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let store = match ConfigStore::new(config) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Config: {:?}", store.snapshot());

    let engine_settings = EngineSettings::from_env();
    let settings = DecisionSettings::from_env();
    info!(
        "Engine: path={}, pool_size={}, options={:?}",
        engine_settings.path.display(),
        engine_settings.pool_size,
        engine_settings.options
    );

    let source: Arc<dyn EvaluatorSource> = if engine_settings.pool_size == 0 {
        info!(
            "Engine sessions: one fresh process per decision, at most {} at once",
            engine_settings.max_sessions.max(1)
        );
        Arc::new(SpawnPerDecision::new(engine_settings))
    } else {
        let pool = EnginePool::new(engine_settings);
        if let Err(e) = pool.warm_up().await {
            eprintln!("Error: could not start engine: {}", e);
            std::process::exit(1);
        }
        Arc::new(pool)
    };

    let logger = match &settings.log_path {
        Some(path) => {
            info!("Decision log: {}", path.display());
            DecisionLogger::new(Box::new(JsonlDecisionLog::new(path)))
        }
        None => {
            info!("Decision log: disabled");
            DecisionLogger::disabled()
        }
    };

    let engine = Arc::new(AdaptiveEngine::new(source, store, Arc::new(logger), settings));

    // Single writer so concurrent responses never interleave mid-line.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            let written = async {
                stdout.write_all(line.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await
            };
            if let Err(e) = written.await {
                error!("Failed to write response: {}", e);
                break;
            }
        }
    });

    info!("Ready for requests on stdin");
    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let engine = Arc::clone(&engine);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = handle(&engine, &line).await;
            if tx.send(response.to_string()).is_err() {
                warn!("Response writer is gone");
            }
        });
    }

    // Writer exits once every in-flight request has answered.
    drop(tx);
    if let Err(e) = writer.await {
        error!("Response writer panicked: {}", e);
    }
    engine.logger().flush().await;
    info!("stdin closed, shutting down");
}

async fn handle(engine: &AdaptiveEngine, line: &str) -> Value {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return failure(Value::Null, "input", e.to_string()),
    };
    let id = value.get("id").cloned().unwrap_or(Value::Null);

    match value.get("type").and_then(Value::as_str) {
        Some("move") => {
            let request: DecisionRequest = match serde_json::from_value(value) {
                Ok(request) => request,
                Err(e) => return failure(id, "input", e.to_string()),
            };
            match engine.decide(&request).await {
                Ok(outcome) => success(id, json!(outcome)),
                Err(e) if e.is_input_error() => failure(id, "input", e.to_string()),
                Err(e) => {
                    error!("[{}] Decision failed: {}", request.game_id.as_deref().unwrap_or("-"), e);
                    failure(id, "engine", e.to_string())
                }
            }
        }
        Some("update_config") => {
            let update: ConfigUpdate = match serde_json::from_value(value) {
                Ok(update) => update,
                Err(e) => return failure(id, "input", e.to_string()),
            };
            if update.is_empty() {
                return failure(id, "input", "no config fields given".to_string());
            }
            match engine.config().apply(&update) {
                Ok(config) => {
                    info!("Config updated: {:?}", config);
                    success(id, json!(*config))
                }
                Err(e) => {
                    warn!("Rejected config update {:?}: {}", update, e);
                    failure(id, "input", e.to_string())
                }
            }
        }
        Some("config") => success(id, json!(*engine.config().snapshot())),
        other => failure(id, "input", format!("unknown request type {:?}", other)),
    }
}

fn success(id: Value, result: Value) -> Value {
    json!({ "id": id, "ok": true, "result": result })
}

fn failure(id: Value, kind: &str, message: String) -> Value {
    json!({ "id": id, "ok": false, "kind": kind, "error": message })
}
