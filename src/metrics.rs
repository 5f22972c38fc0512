//! Execution metrics fed by the drain loop.
//!
//! The collector is a plain owned value inside the engine; nothing polls
//! it in the background. It counts task outcomes and per-worker execution
//! attempts and folds them into a [`MetricsSummary`] on demand.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::task::TaskState;
use crate::orchestration::ensemble::TaskReport;
use crate::worker::WorkerId;

/// Counters for one worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerMetrics {
    pub executions: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Aggregate view handed to status surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    /// `completed / total`, 0.0 before any task finished.
    pub success_rate: f64,
    pub total_executions: u64,
    pub workers: BTreeMap<WorkerId, WorkerMetrics>,
}

/// Accumulates counts as the engine settles tasks and executions.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    total_tasks: u64,
    completed_tasks: u64,
    failed_tasks: u64,
    workers: BTreeMap<WorkerId, WorkerMetrics>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a terminal task report.
    pub fn record_task(&mut self, report: &TaskReport) {
        self.total_tasks += 1;
        match report.state {
            TaskState::Completed => self.completed_tasks += 1,
            _ => self.failed_tasks += 1,
        }
    }

    /// Record one execution attempt by a worker.
    pub fn record_execution(&mut self, worker: &WorkerId, success: bool) {
        let entry = self.workers.entry(worker.clone()).or_default();
        entry.executions += 1;
        if success {
            entry.succeeded += 1;
        } else {
            entry.failed += 1;
        }
        entry.last_activity = Some(Utc::now());
    }

    pub fn summary(&self) -> MetricsSummary {
        let total_executions = self.workers.values().map(|w| w.executions).sum();
        MetricsSummary {
            total_tasks: self.total_tasks,
            completed_tasks: self.completed_tasks,
            failed_tasks: self.failed_tasks,
            success_rate: self.completed_tasks as f64 / self.total_tasks.max(1) as f64,
            total_executions,
            workers: self.workers.clone(),
        }
    }
}
