//! Role-specialized workers and their lifecycle state machine.
//!
//! Each worker is a named slot in the pool with a fixed role, a capability
//! tag list used by the scorer, and a small state machine:
//! `Idle -> Working -> Idle`, with `Working -> Error` on failure
//! (recoverable by [`Worker::reset`]) and `Waiting` reserved for handoffs
//! that park a worker without freeing it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::message::{MessageKind, WorkerMessage};
use crate::core::task::{Task, TaskId};
use crate::error::{Error, Result};

/// Unique identifier for a worker.
///
/// Pool workers use the stable `{role}_agent` form so that ids survive
/// restarts and appear readable in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub String);

impl WorkerId {
    pub fn for_role(role: WorkerRole) -> Self {
        Self(format!("{}_agent", role))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WorkerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WorkerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The specialization a worker brings to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerRole {
    Planner,
    Coder,
    Reviewer,
    Debugger,
    Tester,
    /// Coordination role; never placed in the worker pool.
    Orchestrator,
}

impl WorkerRole {
    /// The five specialist roles that make up a standard pool.
    pub fn specialists() -> [WorkerRole; 5] {
        [
            WorkerRole::Planner,
            WorkerRole::Coder,
            WorkerRole::Reviewer,
            WorkerRole::Debugger,
            WorkerRole::Tester,
        ]
    }

    /// Capability tags advertised by a freshly created worker of this role.
    pub fn default_capabilities(&self) -> Vec<String> {
        let caps: &[&str] = match self {
            WorkerRole::Planner => &[
                "task_decomposition",
                "dependency_analysis",
                "resource_estimation",
                "timeline_planning",
                "risk_assessment",
                "strategy_selection",
                "workflow_design",
            ],
            WorkerRole::Coder => &[
                "code_generation",
                "refactoring",
                "api_development",
                "database_operations",
                "integration",
                "optimization",
                "testing",
                "documentation",
            ],
            WorkerRole::Reviewer => &[
                "code_quality_analysis",
                "security_assessment",
                "performance_review",
                "best_practices_validation",
                "documentation_review",
                "vulnerability_detection",
                "consensus_building",
                "quality_scoring",
            ],
            WorkerRole::Debugger => &[
                "error_analysis",
                "root_cause_identification",
                "fix_implementation",
                "testing_validation",
                "prevention_strategies",
                "log_analysis",
                "performance_debugging",
                "systematic_debugging",
            ],
            WorkerRole::Tester => &[
                "test_case_generation",
                "test_execution",
                "coverage_analysis",
                "performance_testing",
                "integration_testing",
                "security_testing",
                "test_automation",
                "quality_assurance",
            ],
            WorkerRole::Orchestrator => &[
                "task_routing",
                "consensus_coordination",
                "worker_supervision",
            ],
        };
        caps.iter().map(|c| c.to_string()).collect()
    }
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerRole::Planner => write!(f, "planner"),
            WorkerRole::Coder => write!(f, "coder"),
            WorkerRole::Reviewer => write!(f, "reviewer"),
            WorkerRole::Debugger => write!(f, "debugger"),
            WorkerRole::Tester => write!(f, "tester"),
            WorkerRole::Orchestrator => write!(f, "orchestrator"),
        }
    }
}

/// Lifecycle states of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Idle,
    Working,
    Waiting,
    Error,
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerStatus::Idle => write!(f, "idle"),
            WorkerStatus::Working => write!(f, "working"),
            WorkerStatus::Waiting => write!(f, "waiting"),
            WorkerStatus::Error => write!(f, "error"),
        }
    }
}

/// Whether the state machine permits moving from `from` to `to`.
pub fn is_legal_transition(from: WorkerStatus, to: WorkerStatus) -> bool {
    use WorkerStatus::*;
    matches!(
        (from, to),
        (Idle, Working)
            | (Working, Idle)
            | (Working, Error)
            | (Working, Waiting)
            | (Waiting, Working)
            | (Waiting, Idle)
            | (Error, Idle)
    )
}

/// Point-in-time view of a worker for status reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSnapshot {
    pub id: WorkerId,
    pub role: WorkerRole,
    pub status: WorkerStatus,
    pub current_task: Option<TaskId>,
}

/// A pool member: identity, role, capability tags, and current assignment.
#[derive(Debug, Clone)]
pub struct Worker {
    pub id: WorkerId,
    pub role: WorkerRole,
    pub capabilities: Vec<String>,
    status: WorkerStatus,
    current_task: Option<Task>,
}

impl Worker {
    pub fn new(role: WorkerRole) -> Self {
        Self {
            id: WorkerId::for_role(role),
            role,
            capabilities: role.default_capabilities(),
            status: WorkerStatus::Idle,
            current_task: None,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn status(&self) -> WorkerStatus {
        self.status
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.status == WorkerStatus::Idle
    }

    /// Move to `to` if the state machine allows it.
    pub fn transition(&mut self, to: WorkerStatus) -> Result<()> {
        if !is_legal_transition(self.status, to) {
            return Err(Error::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }

    /// Accept a task; the worker must be idle.
    pub fn assign(&mut self, task: Task) -> Result<()> {
        if self.status != WorkerStatus::Idle {
            return Err(Error::NotAvailable(self.id.clone()));
        }
        self.transition(WorkerStatus::Working)?;
        self.current_task = Some(task);
        Ok(())
    }

    /// Finish the current task, returning it and going idle.
    pub fn complete(&mut self) -> Result<Task> {
        let task = self
            .current_task
            .take()
            .ok_or_else(|| Error::NoCurrentTask(self.id.clone()))?;
        self.transition(WorkerStatus::Idle)?;
        Ok(task)
    }

    /// Mark the current attempt failed. The task stays attached so the
    /// failure can be inspected before [`Worker::reset`] clears it.
    pub fn fail(&mut self) -> Result<()> {
        self.transition(WorkerStatus::Error)
    }

    /// Recovery escape hatch: force the worker back to idle and drop any
    /// attached task. Always permitted, unlike [`Worker::transition`].
    pub fn reset(&mut self) {
        self.status = WorkerStatus::Idle;
        self.current_task = None;
    }

    /// Handle a routed message, optionally producing a reply.
    pub fn handle_message(&mut self, msg: &WorkerMessage) -> Result<Option<WorkerMessage>> {
        match msg.kind {
            MessageKind::TaskAssignment => {
                let payload = msg.payload.get("task").cloned().ok_or_else(|| {
                    Error::Validation(format!(
                        "task assignment to {} carries no task",
                        self.id
                    ))
                })?;
                let task: Task = serde_json::from_value(payload)?;
                self.assign(task)?;
                Ok(Some(msg.reply(json!({
                    "status": "accepted",
                    "worker_id": self.id,
                }))))
            }
            MessageKind::CollaborationRequest => Ok(Some(msg.reply(json!({
                "available": self.is_available(),
                "capabilities": self.capabilities,
            })))),
            MessageKind::StatusInquiry => Ok(Some(msg.reply(json!({
                "status": self.status,
                "current_task_id": self.current_task.as_ref().map(|t| t.id.clone()),
                "capabilities": self.capabilities,
            })))),
            MessageKind::Response => Ok(None),
        }
    }

    pub fn snapshot(&self) -> WorkerSnapshot {
        WorkerSnapshot {
            id: self.id.clone(),
            role: self.role,
            status: self.status,
            current_task: self.current_task.as_ref().map(|t| t.id.clone()),
        }
    }
}
