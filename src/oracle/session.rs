//! A single UCI engine process.
//!
//! The process is spawned with `kill_on_drop`, so however a decision ends
//! (success, error, timeout, or the caller going away) dropping the session
//! tears the engine down.

use async_trait::async_trait;
use chess::Board;
use log::{debug, info, warn};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

use super::{EngineError, EvaluationResult, Evaluator, RankedLine, SearchLimit};
use crate::config::EngineSettings;
use crate::score::normalize;
use crate::uci::{
    go_command, parse_engine_line, parse_uci_move, position_command, setoption_command,
    EngineMessage, InfoLine,
};

/// How long `quit` waits for the engine to exit before killing it.
const QUIT_GRACE: Duration = Duration::from_millis(500);

pub struct UciSession {
    child: Child,
    stdin: ChildStdin,
    lines: LinesStream<BufReader<ChildStdout>>,
    engine_name: Option<String>,
    /// MultiPV value currently set on the engine.
    multipv: usize,
}

impl UciSession {
    /// Spawn the engine and complete the `uci` / `isready` handshake.
    pub async fn start(settings: &EngineSettings) -> Result<Self, EngineError> {
        let mut child = Command::new(&settings.path)
            .args(&settings.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: settings.path.display().to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(EngineError::Disconnected)?;
        let stdout = child.stdout.take().ok_or(EngineError::Disconnected)?;

        let mut session = Self {
            child,
            stdin,
            lines: LinesStream::new(BufReader::new(stdout).lines()),
            engine_name: None,
            multipv: 1,
        };

        timeout(settings.handshake_timeout, session.handshake(&settings.options))
            .await
            .map_err(|_| EngineError::Timeout("uci handshake"))??;

        info!(
            "Engine session started: {}",
            session.engine_name.as_deref().unwrap_or("unknown engine")
        );
        Ok(session)
    }

    pub fn engine_name(&self) -> Option<&str> {
        self.engine_name.as_deref()
    }

    /// Prepare a reused session for an unrelated game.
    pub async fn reset(&mut self, within: Duration) -> Result<(), EngineError> {
        self.send("ucinewgame").await?;
        timeout(within, self.sync())
            .await
            .map_err(|_| EngineError::Timeout("isready"))?
    }

    /// Ask the engine to exit, killing it if it does not.
    pub async fn quit(mut self) {
        if let Err(e) = self.send("quit").await {
            debug!("Engine quit failed: {}", e);
        }
        if timeout(QUIT_GRACE, self.child.wait()).await.is_err() {
            warn!("Engine ignored quit, killing it");
            if let Err(e) = self.child.kill().await {
                warn!("Failed to kill engine: {}", e);
            }
        }
    }

    async fn handshake(&mut self, options: &[(String, String)]) -> Result<(), EngineError> {
        self.send("uci").await?;
        loop {
            match parse_engine_line(&self.next_line().await?) {
                EngineMessage::Id { key, value } if key == "name" => {
                    self.engine_name = Some(value);
                }
                EngineMessage::UciOk => break,
                _ => {}
            }
        }

        for (name, value) in options {
            self.send(&setoption_command(name, value)).await?;
        }

        self.sync().await
    }

    async fn sync(&mut self) -> Result<(), EngineError> {
        self.send("isready").await?;
        loop {
            if parse_engine_line(&self.next_line().await?) == EngineMessage::ReadyOk {
                return Ok(());
            }
        }
    }

    async fn set_multipv(&mut self, k: usize) -> Result<(), EngineError> {
        if self.multipv != k {
            self.send(&setoption_command("MultiPV", &k.to_string())).await?;
            self.multipv = k;
        }
        Ok(())
    }

    async fn send(&mut self, command: &str) -> Result<(), EngineError> {
        debug!(">> {}", command);
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn next_line(&mut self) -> Result<String, EngineError> {
        match self.lines.next().await {
            Some(Ok(line)) => {
                debug!("<< {}", line);
                Ok(line)
            }
            Some(Err(e)) => Err(e.into()),
            None => Err(EngineError::Disconnected),
        }
    }
}

#[async_trait]
impl Evaluator for UciSession {
    async fn analyze_top(
        &mut self,
        board: &Board,
        limit: SearchLimit,
        k: usize,
    ) -> Result<Vec<RankedLine>, EngineError> {
        let k = k.max(1);
        self.set_multipv(k).await?;
        self.send(&position_command(board)).await?;
        self.send(&go_command(limit)).await?;

        // Latest exact line per multipv slot; deeper iterations overwrite.
        let mut latest: Vec<Option<InfoLine>> = vec![None; k];
        loop {
            match parse_engine_line(&self.next_line().await?) {
                EngineMessage::Info(info) if info.is_scored_line() => {
                    if let Some(slot) = info.multipv.checked_sub(1).and_then(|i| latest.get_mut(i)) {
                        *slot = Some(info);
                    }
                }
                EngineMessage::BestMove(_) => break,
                _ => {}
            }
        }

        let lines = ranked_lines(board, latest)?;
        if lines.is_empty() {
            return Err(EngineError::NoLines);
        }
        Ok(lines)
    }
}

/// Turn the collected info lines into ranked results.
///
/// Stops at the first empty slot so ranks stay contiguous from 0.
fn ranked_lines(board: &Board, latest: Vec<Option<InfoLine>>) -> Result<Vec<RankedLine>, EngineError> {
    latest
        .into_iter()
        .map_while(|slot| slot)
        .enumerate()
        .map(|(rank, info)| {
            let raw = info.score.ok_or(EngineError::NoLines)?;
            let first = info.pv.first().ok_or(EngineError::NoLines)?;
            let principal_move = parse_uci_move(board, first).ok_or_else(|| EngineError::IllegalMove {
                mv: first.clone(),
                fen: board.to_string(),
            })?;
            Ok(RankedLine {
                rank,
                result: EvaluationResult {
                    score: normalize(raw),
                    raw,
                    depth: info.depth.unwrap_or(0),
                    principal_move,
                },
            })
        })
        .collect()
}
