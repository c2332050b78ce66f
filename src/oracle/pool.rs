//! Session sources: one fresh process per decision, or a bounded warm pool.

use async_trait::async_trait;
use chess::Board;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;

use super::{EngineError, Evaluator, EvaluatorSource, RankedLine, SearchLimit, UciSession};
use crate::config::EngineSettings;

/// Starts a new engine for every decision and lets it die with the decision.
///
/// No more than `max_sessions` engines run at once; further callers wait up
/// to `acquire_timeout` for one to finish.
pub struct SpawnPerDecision {
    settings: EngineSettings,
    permits: Arc<Semaphore>,
}

impl SpawnPerDecision {
    pub fn new(settings: EngineSettings) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_sessions.max(1)));
        Self { settings, permits }
    }
}

#[async_trait]
impl EvaluatorSource for SpawnPerDecision {
    async fn acquire(&self) -> Result<Box<dyn Evaluator>, EngineError> {
        let permit = acquire_permit(&self.permits, self.settings.acquire_timeout).await?;
        let session = UciSession::start(&self.settings).await?;
        Ok(Box::new(SpawnedSession {
            session,
            _permit: permit,
        }))
    }
}

/// A one-off session; its permit is released when the engine is dropped.
struct SpawnedSession {
    session: UciSession,
    _permit: OwnedSemaphorePermit,
}

#[async_trait]
impl Evaluator for SpawnedSession {
    async fn analyze_top(
        &mut self,
        board: &Board,
        limit: SearchLimit,
        k: usize,
    ) -> Result<Vec<RankedLine>, EngineError> {
        self.session.analyze_top(board, limit, k).await
    }
}

async fn acquire_permit(
    permits: &Arc<Semaphore>,
    wait: Duration,
) -> Result<OwnedSemaphorePermit, EngineError> {
    timeout(wait, Arc::clone(permits).acquire_owned())
        .await
        .map_err(|_| EngineError::PoolExhausted(wait))?
        .map_err(|_| EngineError::Disconnected)
}

/// Bounded pool of long-lived engine sessions.
///
/// At most `pool_size` sessions exist at once. Callers wait up to
/// `acquire_timeout` for a free one instead of spawning more.
pub struct EnginePool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    settings: EngineSettings,
    idle: Mutex<Vec<UciSession>>,
    permits: Arc<Semaphore>,
}

impl PoolInner {
    fn take_idle(&self) -> Option<UciSession> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).pop()
    }

    fn put_idle(&self, session: UciSession) {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(session);
    }
}

impl EnginePool {
    pub fn new(settings: EngineSettings) -> Self {
        let size = settings.pool_size.max(1);
        Self {
            inner: Arc::new(PoolInner {
                settings,
                idle: Mutex::new(Vec::with_capacity(size)),
                permits: Arc::new(Semaphore::new(size)),
            }),
        }
    }

    /// Start every session up front so the first games don't pay for it.
    pub async fn warm_up(&self) -> Result<(), EngineError> {
        let size = self.inner.settings.pool_size.max(1);
        while self.idle_count() < size {
            let session = UciSession::start(&self.inner.settings).await?;
            self.inner.put_idle(session);
        }
        info!("Engine pool warmed up with {} sessions", size);
        Ok(())
    }

    pub fn idle_count(&self) -> usize {
        self.inner
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl EvaluatorSource for EnginePool {
    async fn acquire(&self) -> Result<Box<dyn Evaluator>, EngineError> {
        let permit =
            acquire_permit(&self.inner.permits, self.inner.settings.acquire_timeout).await?;

        let session = match self.inner.take_idle() {
            Some(mut session) => match session.reset(self.inner.settings.handshake_timeout).await {
                Ok(()) => session,
                Err(e) => {
                    warn!("Discarding pooled engine session: {}", e);
                    UciSession::start(&self.inner.settings).await?
                }
            },
            None => UciSession::start(&self.inner.settings).await?,
        };

        Ok(Box::new(PooledSession {
            session: Some(session),
            pool: Arc::clone(&self.inner),
            healthy: true,
            _permit: permit,
        }))
    }
}

/// A session on loan from the pool.
///
/// Goes back to the pool on drop, unless a call failed or was abandoned
/// halfway, in which case the engine's state is unknown and it is killed.
struct PooledSession {
    session: Option<UciSession>,
    pool: Arc<PoolInner>,
    healthy: bool,
    _permit: OwnedSemaphorePermit,
}

#[async_trait]
impl Evaluator for PooledSession {
    async fn analyze_top(
        &mut self,
        board: &Board,
        limit: SearchLimit,
        k: usize,
    ) -> Result<Vec<RankedLine>, EngineError> {
        let session = self.session.as_mut().ok_or(EngineError::Disconnected)?;
        self.healthy = false;
        let result = session.analyze_top(board, limit, k).await;
        self.healthy = result.is_ok();
        result
    }
}

impl Drop for PooledSession {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            if self.healthy {
                self.pool.put_idle(session);
            } else {
                debug!("Dropping unhealthy engine session");
            }
        }
    }
}
