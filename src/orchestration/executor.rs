//! Execution seam between the engine and whatever does the actual work.
//!
//! The engine never bakes in how a task runs. It hands a role and a task
//! to a [`TaskExecutor`] and consumes the structured [`TaskOutput`]:
//! built-in heuristics in production, scripted stubs in tests.

use serde::{Deserialize, Serialize};

use crate::core::plan::SubTaskSpec;
use crate::core::task::Task;
use crate::error::Result;
use crate::worker::WorkerRole;

/// Structured result of one execution attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskOutput {
    /// One-line account of what was done.
    pub summary: String,
    /// Decomposition descriptors; meaningful only for planner output.
    #[serde(default)]
    pub sub_tasks: Vec<SubTaskSpec>,
    /// Reviewer verdict in `[0, 1]`; absent when the task was not a review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consensus_score: Option<f64>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Role-specific detail, free-form.
    #[serde(default)]
    pub details: serde_json::Value,
}

impl TaskOutput {
    pub fn with_summary(text: impl Into<String>) -> Self {
        Self {
            summary: text.into(),
            ..Default::default()
        }
    }

    pub fn with_sub_tasks(mut self, sub_tasks: Vec<SubTaskSpec>) -> Self {
        self.sub_tasks = sub_tasks;
        self
    }

    pub fn with_consensus(mut self, score: f64) -> Self {
        self.consensus_score = Some(score);
        self
    }

    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// Executes a task on behalf of a worker with the given role.
///
/// Implementations must be deterministic for the engine's scheduling
/// guarantees to mean anything; all model- or tool-calling variance
/// belongs behind this trait, not inside the engine.
#[allow(async_fn_in_trait)]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, role: WorkerRole, task: &Task) -> Result<TaskOutput>;
}
