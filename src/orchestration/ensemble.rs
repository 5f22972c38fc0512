//! The ensemble engine: priority scheduling, decomposition, consensus.
//!
//! [`Ensemble`] owns the worker pool, the pending queue, and all task
//! bookkeeping behind a single `&mut self` surface. Tasks are submitted,
//! then [`Ensemble::drain`] processes the queue in priority order:
//! simple tasks dispatch straight to the best-scoring worker, complex
//! tasks are decomposed by the planner and executed in dependency waves,
//! and every complex task ends with a consensus review that can trigger
//! one collaboration round.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::config::Config;
use crate::core::message::WorkerMessage;
use crate::core::plan::{Plan, SubTask, SubTaskSpec};
use crate::core::task::{PendingEntry, PendingQueue, Task, TaskId, TaskState};
use crate::error::{Error, Result};
use crate::metrics::{MetricsCollector, MetricsSummary};
use crate::worker::{WorkerId, WorkerRole, WorkerSnapshot};
use crate::{elog, elog_debug, elog_error, elog_warn};

use super::executor::{TaskExecutor, TaskOutput};
use super::pool::WorkerPool;
use super::scoring;

/// Keywords that mark a task as simple enough to skip decomposition.
const SIMPLE_KEYWORDS: &[&str] = &["read", "write", "list", "search", "replace"];

/// Events emitted by the engine while draining the queue.
///
/// Sends are best effort; a full or closed channel never stalls the
/// engine.
#[derive(Debug, Clone)]
pub enum EnsembleEvent {
    /// A task was popped from the queue and is being processed.
    TaskStarted { task_id: TaskId },
    /// A task finished with a completed outcome.
    TaskCompleted { task_id: TaskId },
    /// A task finished with a failed outcome.
    TaskFailed { task_id: TaskId, error: String },
    /// A sub-task was claimed by a worker.
    SubTaskStarted { task_id: TaskId, worker: WorkerId },
    /// A sub-task reached a terminal state.
    SubTaskFinished {
        task_id: TaskId,
        worker: WorkerId,
        success: bool,
    },
    /// A sub-task can never run because its dependencies failed.
    SubTaskBlocked { task_id: TaskId, reason: String },
    /// The consensus review produced a verdict.
    ConsensusEvaluated {
        task_id: TaskId,
        score: f64,
        accepted: bool,
    },
    /// A collaboration round started with the listed participants.
    CollaborationTriggered {
        task_id: TaskId,
        participants: Vec<WorkerId>,
    },
    /// Consensus failed but no collaboration round could run.
    CollaborationSkipped { task_id: TaskId, reason: String },
    /// The pending queue is empty.
    QueueDrained { completed: usize, failed: usize },
}

/// Terminal record for one sub-task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTaskReport {
    pub task_id: TaskId,
    pub local_id: String,
    pub worker: Option<WorkerId>,
    pub state: TaskState,
    pub summary: Option<String>,
}

/// Consensus verdict for a complex task, including any collaboration
/// round that ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusReport {
    pub score: f64,
    pub threshold: f64,
    pub accepted: bool,
    pub reviewer: Option<WorkerId>,
    pub collaborators: Vec<WorkerId>,
    pub recommendations: Vec<String>,
}

/// Terminal record for one submitted task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    pub task_id: TaskId,
    pub description: String,
    pub state: TaskState,
    /// Execution attempts made for the task itself (simple path) or its
    /// decomposition (complex path).
    pub attempts: u32,
    pub worker: Option<WorkerId>,
    pub summary: Option<String>,
    pub sub_tasks: Vec<SubTaskReport>,
    pub consensus: Option<ConsensusReport>,
    pub finished_at: DateTime<Utc>,
}

impl TaskReport {
    fn completed(task: &Task, attempts: u32, worker: Option<WorkerId>, summary: String) -> Self {
        Self {
            task_id: task.id.clone(),
            description: task.description.clone(),
            state: TaskState::Completed,
            attempts,
            worker,
            summary: Some(summary),
            sub_tasks: Vec::new(),
            consensus: None,
            finished_at: Utc::now(),
        }
    }

    fn failed(task: &Task, attempts: u32, error: String) -> Self {
        Self {
            task_id: task.id.clone(),
            description: task.description.clone(),
            state: TaskState::Failed { error },
            attempts,
            worker: None,
            summary: None,
            sub_tasks: Vec::new(),
            consensus: None,
            finished_at: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == TaskState::Completed
    }
}

/// Point-in-time engine status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleStatus {
    pub total_workers: usize,
    pub idle_workers: usize,
    pub pending_tasks: usize,
    pub in_flight_tasks: usize,
    pub workers: Vec<WorkerSnapshot>,
    pub consensus_threshold: f64,
}

/// A sub-task claimed by a worker for the current wave.
struct Claimed {
    worker_id: WorkerId,
    role: WorkerRole,
    sub_task: SubTask,
}

/// The orchestration engine. Single owner of all mutable state.
pub struct Ensemble<E: TaskExecutor> {
    pool: WorkerPool,
    pending: PendingQueue,
    in_flight: HashMap<TaskId, Task>,
    outcomes: HashMap<TaskId, TaskReport>,
    config: Config,
    task_timeout: Duration,
    executor: E,
    metrics: MetricsCollector,
    event_tx: mpsc::Sender<EnsembleEvent>,
    seq: u64,
}

impl<E: TaskExecutor> Ensemble<E> {
    /// Create an engine with the standard five-specialist pool.
    pub fn new(config: Config, executor: E, event_tx: mpsc::Sender<EnsembleEvent>) -> Self {
        let task_timeout = config.task_timeout();
        Self {
            pool: WorkerPool::standard(),
            pending: PendingQueue::new(),
            in_flight: HashMap::new(),
            outcomes: HashMap::new(),
            config,
            task_timeout,
            executor,
            metrics: MetricsCollector::new(),
            event_tx,
            seq: 0,
        }
    }

    /// Queue a task. Returns its id for later outcome lookup.
    pub fn submit(&mut self, task: Task) -> TaskId {
        let id = task.id.clone();
        elog!(
            "queued task {} (priority {}): {}",
            id.short(),
            task.priority,
            task.description
        );
        self.pending.push(PendingEntry::new(task, self.seq));
        self.seq += 1;
        id
    }

    /// Process the queue until empty: highest priority first, FIFO within
    /// a priority band.
    pub async fn drain(&mut self) {
        let mut completed = 0usize;
        let mut failed = 0usize;

        while let Some(entry) = self.pending.pop() {
            let task = entry.task;
            let task_id = task.id.clone();
            self.in_flight.insert(task_id.clone(), task.clone());
            self.emit(EnsembleEvent::TaskStarted {
                task_id: task_id.clone(),
            })
            .await;

            let report = self.process(task).await;
            self.in_flight.remove(&task_id);

            match &report.state {
                TaskState::Completed => {
                    completed += 1;
                    elog!("task {} completed", task_id.short());
                    self.emit(EnsembleEvent::TaskCompleted {
                        task_id: task_id.clone(),
                    })
                    .await;
                }
                TaskState::Failed { error } => {
                    failed += 1;
                    elog_error!("task {} failed: {}", task_id.short(), error);
                    self.emit(EnsembleEvent::TaskFailed {
                        task_id: task_id.clone(),
                        error: error.clone(),
                    })
                    .await;
                }
                other => {
                    // Reports are terminal by construction.
                    elog_warn!("task {} ended in unexpected state {}", task_id.short(), other);
                }
            }

            self.metrics.record_task(&report);
            self.outcomes.insert(task_id, report);
            self.pool.reset_errored();
        }

        self.emit(EnsembleEvent::QueueDrained { completed, failed })
            .await;
    }

    /// Route a message to its recipient worker.
    ///
    /// An unknown recipient is logged and swallowed; the router itself
    /// never fails on bad addressing. Worker-level errors propagate.
    pub fn route_message(&mut self, msg: &WorkerMessage) -> Result<Option<WorkerMessage>> {
        match self.pool.get_mut(&msg.recipient) {
            Some(worker) => worker.handle_message(msg),
            None => {
                let err = Error::UnknownRecipient(msg.recipient.clone());
                elog_warn!("dropping message: {}", err);
                Ok(None)
            }
        }
    }

    pub fn status(&self) -> EnsembleStatus {
        EnsembleStatus {
            total_workers: self.pool.len(),
            idle_workers: self.pool.idle_count(),
            pending_tasks: self.pending.len(),
            in_flight_tasks: self.in_flight.len(),
            workers: self.pool.snapshots(),
            consensus_threshold: self.config.consensus_threshold,
        }
    }

    pub fn outcome(&self, id: &TaskId) -> Option<&TaskReport> {
        self.outcomes.get(id)
    }

    pub fn metrics_summary(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    async fn emit(&self, event: EnsembleEvent) {
        let _ = self.event_tx.send(event).await;
    }

    async fn process(&mut self, task: Task) -> TaskReport {
        if is_simple(&task.description) {
            elog_debug!("task {} classified simple", task.id.short());
            self.run_simple(task).await
        } else {
            elog_debug!("task {} classified complex", task.id.short());
            self.run_complex(task).await
        }
    }

    /// One claim-execute-complete cycle against the best-scoring idle
    /// worker. The claim flips the worker to working before any await so
    /// a concurrent status probe never sees a double assignment.
    async fn attempt_once(&mut self, task: &Task) -> Result<(WorkerId, TaskOutput)> {
        let (worker_id, score) = scoring::find_best(self.pool.iter(), task)
            .ok_or_else(|| Error::NoSuitableWorker(task.id.clone()))?;
        let worker = self
            .pool
            .get_mut(&worker_id)
            .ok_or_else(|| Error::NotAvailable(worker_id.clone()))?;
        let role = worker.role;
        worker.assign(task.clone())?;
        elog_debug!(
            "assigned {} to {} (score {:.2})",
            task.id.short(),
            worker_id,
            score
        );

        let result = timeout(self.task_timeout, self.executor.execute(role, task))
            .await
            .map_err(|_| Error::Timeout(self.task_timeout))
            .and_then(|r| r);

        match result {
            Ok(output) => {
                worker.complete()?;
                self.metrics.record_execution(&worker_id, true);
                Ok((worker_id, output))
            }
            Err(e) => {
                let _ = worker.fail();
                self.metrics.record_execution(&worker_id, false);
                Err(e)
            }
        }
    }

    /// Simple path: direct dispatch with exactly one retry. The retry
    /// re-scores against the then-idle pool, so it may land on the same
    /// worker after its error state is cleared.
    async fn run_simple(&mut self, task: Task) -> TaskReport {
        match self.attempt_once(&task).await {
            Ok((worker_id, output)) => {
                TaskReport::completed(&task, 1, Some(worker_id), output.summary)
            }
            Err(Error::NoSuitableWorker(id)) => {
                let err = Error::NoSuitableWorker(id);
                TaskReport::failed(&task, 0, err.to_string())
            }
            Err(first) => {
                elog_warn!(
                    "task {} failed ({}), retrying once",
                    task.id.short(),
                    first
                );
                self.pool.reset_errored();
                match self.attempt_once(&task).await {
                    Ok((worker_id, output)) => {
                        TaskReport::completed(&task, 2, Some(worker_id), output.summary)
                    }
                    Err(second) => {
                        let err = Error::UnrecoverableTask {
                            id: task.id.clone(),
                            cause: second.to_string(),
                        };
                        TaskReport::failed(&task, 2, err.to_string())
                    }
                }
            }
        }
    }

    /// Complex path: decompose, execute dependency waves, then run the
    /// consensus review. A planner execution failure gets the same
    /// one-retry treatment as any other execution; an invalid plan is
    /// deterministic and fails outright.
    async fn run_complex(&mut self, task: Task) -> TaskReport {
        let mut attempts = 1;
        let plan = match self.decompose(&task).await {
            Ok(plan) => plan,
            Err(invalid @ Error::Validation(_)) => {
                return TaskReport::failed(&task, 1, invalid.to_string());
            }
            Err(first) => {
                elog_warn!(
                    "decomposition of {} failed ({}), retrying once",
                    task.id.short(),
                    first
                );
                self.pool.reset_errored();
                attempts = 2;
                match self.decompose(&task).await {
                    Ok(plan) => plan,
                    Err(second) => {
                        let err = Error::UnrecoverableTask {
                            id: task.id.clone(),
                            cause: second.to_string(),
                        };
                        return TaskReport::failed(&task, 2, err.to_string());
                    }
                }
            }
        };
        elog!(
            "task {} decomposed into {} sub-tasks",
            task.id.short(),
            plan.len()
        );

        let sub_reports = self.run_waves(&plan).await;
        let completed_count = sub_reports
            .iter()
            .filter(|r| r.state == TaskState::Completed)
            .count();

        // Consensus runs on whatever the waves produced, even a partial
        // or empty result set.
        let consensus = self.consensus_round(&task).await;

        let mut report = if completed_count > 0 {
            TaskReport::completed(
                &task,
                attempts,
                None,
                format!("{}/{} sub-tasks completed", completed_count, plan.len()),
            )
        } else {
            let err = Error::UnrecoverableTask {
                id: task.id.clone(),
                cause: "no sub-tasks completed".to_string(),
            };
            TaskReport::failed(&task, attempts, err.to_string())
        };
        report.sub_tasks = sub_reports;
        report.consensus = Some(consensus);
        report
    }

    /// Run the planner over the parent task and validate its plan.
    async fn decompose(&mut self, task: &Task) -> Result<Plan> {
        let planner_id = WorkerId::for_role(WorkerRole::Planner);
        let worker = self
            .pool
            .get_mut(&planner_id)
            .ok_or_else(|| Error::NoSuitableWorker(task.id.clone()))?;
        let role = worker.role;
        worker.assign(task.clone())?;

        let result = timeout(self.task_timeout, self.executor.execute(role, task))
            .await
            .map_err(|_| Error::Timeout(self.task_timeout))
            .and_then(|r| r);

        let output = match result {
            Ok(output) => {
                worker.complete()?;
                self.metrics.record_execution(&planner_id, true);
                output
            }
            Err(e) => {
                let _ = worker.fail();
                self.metrics.record_execution(&planner_id, false);
                return Err(e);
            }
        };

        let mut specs = output.sub_tasks;
        if specs.is_empty() {
            // A planner that returns no steps still yields a one-step plan.
            specs = vec![SubTaskSpec::new("execute", &task.description, 1, &[])];
        }
        Plan::from_specs(task, specs, self.config.max_sub_tasks)
    }

    /// Execute the plan in dependency waves. Each wave claims the best
    /// idle worker per ready sub-task, runs the batch concurrently, then
    /// fans in sequentially. A sub-task whose execution fails gets one
    /// sequential retry; a failed sub-task never satisfies a dependency.
    async fn run_waves(&mut self, plan: &Plan) -> Vec<SubTaskReport> {
        let mut completed: BTreeSet<String> = BTreeSet::new();
        let mut dispatched: BTreeSet<String> = BTreeSet::new();
        let mut reports: Vec<SubTaskReport> = Vec::new();

        while dispatched.len() < plan.len() {
            let ready: Vec<SubTask> = plan
                .ready(&completed, &dispatched)
                .into_iter()
                .cloned()
                .collect();

            if ready.is_empty() {
                self.block_remaining(plan, &mut dispatched, &mut reports, "dependencies failed")
                    .await;
                break;
            }

            // Claim phase: flip workers to working before any await.
            let mut batch: Vec<Claimed> = Vec::new();
            for sub_task in ready {
                let Some((worker_id, _)) = scoring::find_best(self.pool.iter(), &sub_task.task)
                else {
                    // No idle worker for this one; a later wave retries it.
                    continue;
                };
                let Some(worker) = self.pool.get_mut(&worker_id) else {
                    continue;
                };
                if worker.assign(sub_task.task.clone()).is_err() {
                    continue;
                }
                let role = worker.role;
                dispatched.insert(sub_task.local_id.clone());
                self.emit(EnsembleEvent::SubTaskStarted {
                    task_id: sub_task.task.id.clone(),
                    worker: worker_id.clone(),
                })
                .await;
                batch.push(Claimed {
                    worker_id,
                    role,
                    sub_task,
                });
            }

            if batch.is_empty() {
                self.block_remaining(plan, &mut dispatched, &mut reports, "no idle workers")
                    .await;
                break;
            }

            // Execute phase: the whole batch runs concurrently.
            let results = join_all(batch.iter().map(|claimed| async {
                timeout(
                    self.task_timeout,
                    self.executor.execute(claimed.role, &claimed.sub_task.task),
                )
                .await
                .map_err(|_| Error::Timeout(self.task_timeout))
                .and_then(|r| r)
            }))
            .await;

            // Fan-in phase: settle workers and reports sequentially.
            for (claimed, result) in batch.into_iter().zip(results) {
                let report = self.settle_sub_task(claimed, result).await;
                if report.state == TaskState::Completed {
                    completed.insert(report.local_id.clone());
                }
                reports.push(report);
            }

            self.pool.reset_errored();
        }

        reports
    }

    /// Fold one wave result into a sub-task report, retrying a failed
    /// execution once against the re-scored pool.
    async fn settle_sub_task(
        &mut self,
        claimed: Claimed,
        result: Result<TaskOutput>,
    ) -> SubTaskReport {
        let task = &claimed.sub_task.task;
        match result {
            Ok(output) => {
                let settle = self
                    .pool
                    .get_mut(&claimed.worker_id)
                    .map(|w| w.complete())
                    .transpose();
                match settle {
                    Ok(_) => {
                        self.metrics.record_execution(&claimed.worker_id, true);
                        self.emit(EnsembleEvent::SubTaskFinished {
                            task_id: task.id.clone(),
                            worker: claimed.worker_id.clone(),
                            success: true,
                        })
                        .await;
                        SubTaskReport {
                            task_id: task.id.clone(),
                            local_id: claimed.sub_task.local_id.clone(),
                            worker: Some(claimed.worker_id),
                            state: TaskState::Completed,
                            summary: Some(output.summary),
                        }
                    }
                    Err(e) => self.retry_sub_task(&claimed, e).await,
                }
            }
            Err(e) => {
                if let Some(worker) = self.pool.get_mut(&claimed.worker_id) {
                    let _ = worker.fail();
                }
                self.metrics.record_execution(&claimed.worker_id, false);
                self.retry_sub_task(&claimed, e).await
            }
        }
    }

    async fn retry_sub_task(&mut self, claimed: &Claimed, first: Error) -> SubTaskReport {
        let task = &claimed.sub_task.task;
        elog_warn!(
            "sub-task {} failed ({}), retrying once",
            task.id.short(),
            first
        );
        self.pool.reset_errored();

        match self.attempt_once(task).await {
            Ok((worker_id, output)) => {
                self.emit(EnsembleEvent::SubTaskFinished {
                    task_id: task.id.clone(),
                    worker: worker_id.clone(),
                    success: true,
                })
                .await;
                SubTaskReport {
                    task_id: task.id.clone(),
                    local_id: claimed.sub_task.local_id.clone(),
                    worker: Some(worker_id),
                    state: TaskState::Completed,
                    summary: Some(output.summary),
                }
            }
            Err(second) => {
                let err = Error::UnrecoverableTask {
                    id: task.id.clone(),
                    cause: second.to_string(),
                };
                elog_error!("{}", err);
                self.pool.reset_errored();
                self.emit(EnsembleEvent::SubTaskFinished {
                    task_id: task.id.clone(),
                    worker: claimed.worker_id.clone(),
                    success: false,
                })
                .await;
                SubTaskReport {
                    task_id: task.id.clone(),
                    local_id: claimed.sub_task.local_id.clone(),
                    worker: Some(claimed.worker_id.clone()),
                    state: TaskState::Failed {
                        error: err.to_string(),
                    },
                    summary: None,
                }
            }
        }
    }

    /// Mark every not-yet-dispatched sub-task blocked.
    async fn block_remaining(
        &mut self,
        plan: &Plan,
        dispatched: &mut BTreeSet<String>,
        reports: &mut Vec<SubTaskReport>,
        reason: &str,
    ) {
        for sub_task in plan.sub_tasks.iter() {
            if dispatched.contains(&sub_task.local_id) {
                continue;
            }
            dispatched.insert(sub_task.local_id.clone());
            elog_warn!(
                "sub-task {} blocked: {}",
                sub_task.task.id.short(),
                reason
            );
            self.emit(EnsembleEvent::SubTaskBlocked {
                task_id: sub_task.task.id.clone(),
                reason: reason.to_string(),
            })
            .await;
            reports.push(SubTaskReport {
                task_id: sub_task.task.id.clone(),
                local_id: sub_task.local_id.clone(),
                worker: None,
                state: TaskState::Blocked {
                    reason: reason.to_string(),
                },
                summary: None,
            });
        }
    }

    /// Synthesize the review task, score it, and trigger at most one
    /// collaboration round when the verdict falls below the threshold.
    /// A review that fails or omits its score counts as 0.0.
    async fn consensus_round(&mut self, task: &Task) -> ConsensusReport {
        let review_task = Task::with_id(
            task.id.child("review"),
            format!("Review and validate results for task {}", task.id),
        )
        .with_requirements(vec![
            "comprehensive_review".to_string(),
            "quality_assessment".to_string(),
        ])
        .with_priority(task.priority);

        let (reviewer, score, recommendations) = match self.attempt_once(&review_task).await {
            Ok((worker_id, output)) => {
                let score = output.consensus_score.unwrap_or(0.0);
                (Some(worker_id), score, output.recommendations)
            }
            Err(e) => {
                elog_warn!("review of {} failed: {}", task.id.short(), e);
                self.pool.reset_errored();
                (None, 0.0, Vec::new())
            }
        };

        let threshold = self.config.consensus_threshold;
        let accepted = score >= threshold;
        elog!(
            "consensus for {}: {:.2} (threshold {:.2}, {})",
            task.id.short(),
            score,
            threshold,
            if accepted { "accepted" } else { "rejected" }
        );
        self.emit(EnsembleEvent::ConsensusEvaluated {
            task_id: task.id.clone(),
            score,
            accepted,
        })
        .await;

        let collaborators = if accepted {
            Vec::new()
        } else {
            self.collaboration_round(task).await
        };

        ConsensusReport {
            score,
            threshold,
            accepted,
            reviewer,
            collaborators,
            recommendations,
        }
    }

    /// One collaboration round: up to `max_collaborators` idle workers
    /// sequentially refine the shared collaboration task. Skipped when
    /// fewer than two workers are idle.
    async fn collaboration_round(&mut self, task: &Task) -> Vec<WorkerId> {
        let idle: Vec<WorkerId> = self.pool.idle().map(|w| w.id.clone()).collect();
        if idle.len() < 2 {
            let reason = format!("{} idle workers, need at least 2", idle.len());
            elog!("skipping collaboration for {}: {}", task.id.short(), reason);
            self.emit(EnsembleEvent::CollaborationSkipped {
                task_id: task.id.clone(),
                reason,
            })
            .await;
            return Vec::new();
        }

        let participants: Vec<WorkerId> = idle
            .into_iter()
            .take(self.config.max_collaborators)
            .collect();
        elog!(
            "collaboration for {} with {} workers",
            task.id.short(),
            participants.len()
        );
        self.emit(EnsembleEvent::CollaborationTriggered {
            task_id: task.id.clone(),
            participants: participants.clone(),
        })
        .await;

        let collab_id = task.id.child("collaboration");
        let description = format!("Collaborative refinement for task {}", task.id);

        for worker_id in &participants {
            let collab_task = Task::with_id(collab_id.clone(), &description)
                .with_requirements(vec![
                    "consensus_building".to_string(),
                    "solution_refinement".to_string(),
                ])
                .with_priority(task.priority);

            let Some(worker) = self.pool.get_mut(worker_id) else {
                continue;
            };
            let role = worker.role;
            if worker.assign(collab_task.clone()).is_err() {
                continue;
            }

            let result = timeout(self.task_timeout, self.executor.execute(role, &collab_task))
                .await
                .map_err(|_| Error::Timeout(self.task_timeout))
                .and_then(|r| r);

            match result {
                Ok(_) => {
                    if let Some(worker) = self.pool.get_mut(worker_id) {
                        let _ = worker.complete();
                    }
                    self.metrics.record_execution(worker_id, true);
                }
                Err(e) => {
                    elog_warn!("collaborator {} failed: {}", worker_id, e);
                    if let Some(worker) = self.pool.get_mut(worker_id) {
                        let _ = worker.fail();
                    }
                    self.metrics.record_execution(worker_id, false);
                    self.pool.reset_errored();
                }
            }
        }

        participants
    }
}

/// Whether the description marks a directly dispatchable task.
pub fn is_simple(description: &str) -> bool {
    let lowered = description.to_lowercase();
    SIMPLE_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}
