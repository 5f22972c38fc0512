//! Task model for the ensemble engine.
//!
//! A [`Task`] is a natural-language work item. Top-level tasks get fresh
//! UUID-derived ids; sub-tasks produced by decomposition are scoped under
//! their parent as `{parent}_{local}` (see [`TaskId::child`]).

use std::collections::BinaryHeap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a task.
///
/// Backed by a string so that decomposition can mint composite child ids
/// under a parent id. Top-level ids come from UUIDv4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a fresh unique task ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Derive the id of a child scoped under this task.
    pub fn child(&self, local: &str) -> Self {
        Self(format!("{}_{}", self.0, local))
    }

    /// Short form for display (first 8 characters).
    pub fn short(&self) -> String {
        self.0.chars().take(8).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Terminal and in-flight states recorded for a task.
///
/// `Blocked` is reserved for sub-tasks whose dependencies can never
/// complete; it is distinct from `Failed` so a caller can tell "never ran"
/// from "ran and failed".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed { error: String },
    Blocked { reason: String },
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Pending | TaskState::Running)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Pending => write!(f, "pending"),
            TaskState::Running => write!(f, "running"),
            TaskState::Completed => write!(f, "completed"),
            TaskState::Failed { error } => write!(f, "failed: {}", error),
            TaskState::Blocked { reason } => write!(f, "blocked: {}", reason),
        }
    }
}

/// A unit of work described in natural language.
///
/// Immutable once dispatched; status bookkeeping lives in the engine's
/// in-flight map and outcome records, not on the task itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Higher values are more urgent.
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with a fresh id and default priority 1.
    pub fn new(description: impl Into<String>) -> Self {
        Self::with_id(TaskId::new(), description)
    }

    /// Create a task with an explicit id (sub-tasks, synthesized tasks).
    pub fn with_id(id: TaskId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            requirements: Vec::new(),
            constraints: Vec::new(),
            priority: 1,
            deadline: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_requirements(mut self, requirements: Vec<String>) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<String>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Queue entry pairing a task with its intake order.
///
/// Orders by descending priority, then FIFO within a priority band via the
/// monotonic sequence number handed out at submission.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub task: Task,
    pub seq: u64,
}

impl PendingEntry {
    pub fn new(task: Task, seq: u64) -> Self {
        Self { task, seq }
    }
}

impl PartialEq for PendingEntry {
    fn eq(&self, other: &Self) -> bool {
        self.task.priority == other.task.priority && self.seq == other.seq
    }
}

impl Eq for PendingEntry {}

impl PartialOrd for PendingEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Max-heap: highest priority first; earlier sequence wins a tie.
        self.task
            .priority
            .cmp(&other.task.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of pending tasks.
pub type PendingQueue = BinaryHeap<PendingEntry>;
