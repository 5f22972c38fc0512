//! Command-channel front for the engine.
//!
//! [`run_service`] owns an [`Ensemble`] and processes [`EnsembleCommand`]s
//! from an mpsc channel, so callers never touch engine state directly and
//! all mutation stays on one logical loop. Submissions are acknowledged
//! immediately; draining happens after the already-queued commands have
//! been absorbed, so a burst of submissions lands in one priority-ordered
//! drain.

use tokio::sync::{mpsc, oneshot};

use crate::core::message::WorkerMessage;
use crate::core::task::{Task, TaskId};
use crate::error::{Error, Result};
use crate::metrics::MetricsSummary;

use super::ensemble::{Ensemble, EnsembleStatus, TaskReport};
use super::executor::TaskExecutor;

/// Requests accepted by the service loop.
#[derive(Debug)]
pub enum EnsembleCommand {
    /// Queue a task; the reply carries its id before processing starts.
    Submit {
        task: Task,
        reply: oneshot::Sender<TaskId>,
    },
    /// Snapshot of queue depth and worker states.
    Status {
        reply: oneshot::Sender<EnsembleStatus>,
    },
    /// Route an ad-hoc message to a worker.
    Route {
        message: WorkerMessage,
        reply: oneshot::Sender<Result<Option<WorkerMessage>>>,
    },
    /// Terminal report for a finished task, if any.
    Outcome {
        task_id: TaskId,
        reply: oneshot::Sender<Option<TaskReport>>,
    },
    /// Aggregated execution metrics.
    Metrics {
        reply: oneshot::Sender<MetricsSummary>,
    },
}

/// Create a command channel pair: a client and the receiver to hand to
/// [`run_service`].
pub fn service_channel(buffer: usize) -> (EnsembleClient, mpsc::Receiver<EnsembleCommand>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EnsembleClient::new(tx), rx)
}

/// Drive the engine from a command channel until every client is dropped.
pub async fn run_service<E: TaskExecutor>(
    mut engine: Ensemble<E>,
    mut commands: mpsc::Receiver<EnsembleCommand>,
) {
    while let Some(command) = commands.recv().await {
        let mut submitted = apply(&mut engine, command);
        // Absorb everything already queued before draining, so near-
        // simultaneous submissions are ordered by priority, not arrival.
        while let Ok(command) = commands.try_recv() {
            submitted |= apply(&mut engine, command);
        }
        if submitted {
            engine.drain().await;
        }
    }
}

/// Apply one command. Returns whether a task was queued.
fn apply<E: TaskExecutor>(engine: &mut Ensemble<E>, command: EnsembleCommand) -> bool {
    match command {
        EnsembleCommand::Submit { task, reply } => {
            let id = engine.submit(task);
            let _ = reply.send(id);
            true
        }
        EnsembleCommand::Status { reply } => {
            let _ = reply.send(engine.status());
            false
        }
        EnsembleCommand::Route { message, reply } => {
            let _ = reply.send(engine.route_message(&message));
            false
        }
        EnsembleCommand::Outcome { task_id, reply } => {
            let _ = reply.send(engine.outcome(&task_id).cloned());
            false
        }
        EnsembleCommand::Metrics { reply } => {
            let _ = reply.send(engine.metrics_summary());
            false
        }
    }
}

/// Cheap cloneable handle for talking to a running service loop.
#[derive(Debug, Clone)]
pub struct EnsembleClient {
    tx: mpsc::Sender<EnsembleCommand>,
}

impl EnsembleClient {
    pub fn new(tx: mpsc::Sender<EnsembleCommand>) -> Self {
        Self { tx }
    }

    /// Queue a task for processing. Returns once the engine has accepted
    /// it, without waiting for execution.
    pub async fn submit(&self, task: Task) -> Result<TaskId> {
        self.request(|reply| EnsembleCommand::Submit { task, reply })
            .await
    }

    pub async fn status(&self) -> Result<EnsembleStatus> {
        self.request(|reply| EnsembleCommand::Status { reply }).await
    }

    pub async fn route(&self, message: WorkerMessage) -> Result<Option<WorkerMessage>> {
        self.request(|reply| EnsembleCommand::Route { message, reply })
            .await?
    }

    pub async fn outcome(&self, task_id: TaskId) -> Result<Option<TaskReport>> {
        self.request(|reply| EnsembleCommand::Outcome { task_id, reply })
            .await
    }

    pub async fn metrics(&self) -> Result<MetricsSummary> {
        self.request(|reply| EnsembleCommand::Metrics { reply })
            .await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> EnsembleCommand,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| Error::ServiceStopped)?;
        reply_rx.await.map_err(|_| Error::ServiceStopped)
    }
}
