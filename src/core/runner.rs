//! # Async front end: one task owns the engine, callers send it jobs.
//!
//! ```text
//!  EngineHandle::submit(f) ──► [mpsc, request_capacity] ──► engine task
//!         ▲                                                     │
//!         └──────────────── oneshot reply ◄── f(&mut Engine) ◄──┘
//! ```
//!
//! Jobs run one at a time in arrival order, so concurrent callers observe a
//! single serial history of engine operations.
//!
//! A panicking job stops the task: the state it left behind is not trusted.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::commands::{Reply, dispatch};
use crate::error::SubmitError;

use super::engine::Engine;
use super::outcome::Requester;

type Job = Box<dyn FnOnce(&mut Engine) + Send>;

/// Handle for submitting work to a spawned engine.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Job>,
}

impl EngineHandle {
    /// Runs `f` on the engine and waits for its result (waits if the queue is full).
    pub async fn submit<F, R>(&self, f: F) -> Result<R, SubmitError>
    where
        F: FnOnce(&mut Engine) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (job, reply) = wrap(f);
        self.tx.send(job).await.map_err(|_| SubmitError::Closed)?;
        reply.await.map_err(|_| SubmitError::Closed)
    }

    /// Queues `f` without waiting for room; the receiver yields its result.
    pub fn try_submit<F, R>(&self, f: F) -> Result<oneshot::Receiver<R>, SubmitError>
    where
        F: FnOnce(&mut Engine) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (job, reply) = wrap(f);
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SubmitError::Full,
            mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
        })?;
        Ok(reply)
    }

    /// Parses and executes one chat line, returning the rendered reply.
    pub async fn command(
        &self,
        requester: Requester,
        line: impl Into<String>,
    ) -> Result<Reply, SubmitError> {
        let line = line.into();
        self.submit(move |engine| dispatch(engine, &requester, &line))
            .await
    }

    /// Whether the engine task has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

fn wrap<F, R>(f: F) -> (Job, oneshot::Receiver<R>)
where
    F: FnOnce(&mut Engine) -> R + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let job: Job = Box::new(move |engine| {
        // The caller may have given up waiting.
        let _ = tx.send(f(engine));
    });
    (job, rx)
}

/// Moves `engine` onto its own task and returns a handle to it.
///
/// Must be called inside a tokio runtime. The task ends when `token` is
/// cancelled, when every handle is dropped, or when a job panics.
pub fn spawn(engine: Engine, token: CancellationToken) -> EngineHandle {
    let (tx, rx) = mpsc::channel(engine.config().request_capacity_clamped());
    tokio::spawn(async move {
        if let Err(e) = run_inner(engine, rx, token).await {
            error!(error = %e, "engine task stopped");
        }
    });
    EngineHandle { tx }
}

async fn run_inner(
    mut engine: Engine,
    mut rx: mpsc::Receiver<Job>,
    token: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,

            job = rx.recv() => {
                let Some(job) = job else { break };
                if catch_unwind(AssertUnwindSafe(|| job(&mut engine))).is_err() {
                    anyhow::bail!("engine job panicked");
                }
            }
        }
    }
    debug!("engine task finished");
    Ok(())
}
