//! Test fixtures for integration tests.
//!
//! Provides:
//! - `StubSkills`: a scripted, deterministic executor
//! - engine and service harness constructors
//! - event collection helpers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use ensemble::config::Config;
use ensemble::core::message::{MessageKind, WorkerMessage};
use ensemble::core::plan::SubTaskSpec;
use ensemble::core::task::{Task, TaskId};
use ensemble::error::{Error, Result};
use ensemble::orchestration::{
    service_channel, Ensemble, EnsembleClient, EnsembleCommand, EnsembleEvent, TaskExecutor,
    TaskOutput,
};
use ensemble::worker::{WorkerId, WorkerRole};

/// Scripted executor: the planner returns a fixed plan, review tasks
/// return a fixed score, and chosen descriptions can be made to fail.
pub struct StubSkills {
    plan: Vec<SubTaskSpec>,
    review_score: Option<f64>,
    review_recommendations: Vec<String>,
    fail_matches: Vec<String>,
    /// Fail this many calls before succeeding, across all tasks.
    fail_first: usize,
    calls: Arc<AtomicUsize>,
}

impl StubSkills {
    pub fn new() -> Self {
        Self {
            plan: Vec::new(),
            review_score: Some(0.9),
            review_recommendations: Vec::new(),
            fail_matches: Vec::new(),
            fail_first: 0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_plan(mut self, plan: Vec<SubTaskSpec>) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_review_score(mut self, score: f64) -> Self {
        self.review_score = Some(score);
        self
    }

    pub fn with_recommendations(mut self, recommendations: Vec<&str>) -> Self {
        self.review_recommendations = recommendations.iter().map(|r| r.to_string()).collect();
        self
    }

    /// Every execution of a task whose description contains `text` fails.
    pub fn failing_on(mut self, text: &str) -> Self {
        self.fail_matches.push(text.to_string());
        self
    }

    pub fn failing_first(mut self, count: usize) -> Self {
        self.fail_first = count;
        self
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl TaskExecutor for StubSkills {
    async fn execute(&self, role: WorkerRole, task: &Task) -> Result<TaskOutput> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(Error::Execution("scripted early failure".to_string()));
        }
        if self
            .fail_matches
            .iter()
            .any(|text| task.description.contains(text))
        {
            return Err(Error::Execution("scripted failure".to_string()));
        }
        if task.id.as_str().ends_with("_review") {
            let mut output = TaskOutput::with_summary("reviewed")
                .with_recommendations(self.review_recommendations.clone());
            output.consensus_score = self.review_score;
            return Ok(output);
        }
        if role == WorkerRole::Planner && !task.id.as_str().contains('_') {
            return Ok(TaskOutput::with_summary("planned").with_sub_tasks(self.plan.clone()));
        }
        Ok(TaskOutput::with_summary(format!("done by {}", role)))
    }
}

/// The spec's running example: design/implementation/validation are
/// mutually independent, testing waits on implementation.
pub fn payment_api_plan() -> Vec<SubTaskSpec> {
    vec![
        SubTaskSpec::new("design", "Design the payment API", 1, &[]),
        SubTaskSpec::new("implementation", "Implement the payment API", 2, &["design"]),
        SubTaskSpec::new("validation", "Validate the requirements", 2, &[]),
        SubTaskSpec::new("testing", "Test the payment API", 3, &["implementation"]),
    ]
}

pub fn test_config() -> Config {
    Config {
        consensus_threshold: 0.7,
        max_sub_tasks: 10,
        max_collaborators: 3,
        task_timeout_secs: 5,
    }
}

/// Engine plus its event stream.
pub fn harness<E: TaskExecutor>(executor: E) -> (Ensemble<E>, mpsc::Receiver<EnsembleEvent>) {
    harness_with(test_config(), executor)
}

pub fn harness_with<E: TaskExecutor>(
    config: Config,
    executor: E,
) -> (Ensemble<E>, mpsc::Receiver<EnsembleEvent>) {
    let (event_tx, event_rx) = mpsc::channel(256);
    (Ensemble::new(config, executor, event_tx), event_rx)
}

/// Service-front harness: the engine behind a command channel.
pub fn service_harness<E: TaskExecutor>(
    executor: E,
) -> (
    Ensemble<E>,
    mpsc::Receiver<EnsembleCommand>,
    EnsembleClient,
    mpsc::Receiver<EnsembleEvent>,
) {
    let (engine, event_rx) = harness(executor);
    let (client, command_rx) = service_channel(16);
    (engine, command_rx, client, event_rx)
}

/// Drain every event already emitted.
pub fn collect_events(rx: &mut mpsc::Receiver<EnsembleEvent>) -> Vec<EnsembleEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Ids of tasks popped from the queue, in dispatch order.
pub fn started_ids(events: &[EnsembleEvent]) -> Vec<TaskId> {
    events
        .iter()
        .filter_map(|event| match event {
            EnsembleEvent::TaskStarted { task_id } => Some(task_id.clone()),
            _ => None,
        })
        .collect()
}

/// Sub-task ids claimed by workers, in claim order.
pub fn sub_task_started_ids(events: &[EnsembleEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            EnsembleEvent::SubTaskStarted { task_id, .. } => Some(task_id.as_str().to_string()),
            _ => None,
        })
        .collect()
}

/// Park a worker on a synthetic assignment so it is no longer idle.
pub fn occupy<E: TaskExecutor>(engine: &mut Ensemble<E>, worker: &str) {
    let msg = WorkerMessage::new(
        WorkerId::from("orchestrator"),
        WorkerId::from(worker),
        MessageKind::TaskAssignment,
        serde_json::json!({"task": Task::new("hold this slot")}),
    );
    engine
        .route_message(&msg)
        .expect("occupying assignment failed");
}
