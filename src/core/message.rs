//! Inter-worker message protocol.
//!
//! Workers and the orchestrator exchange [`WorkerMessage`] values through
//! the engine's router. Payloads are free-form JSON; the [`MessageKind`]
//! tag tells the receiving worker how to interpret them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::worker::WorkerId;

/// What a message asks of (or reports to) its recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Hand a task to the recipient.
    TaskAssignment,
    /// Ask the recipient whether it can join a collaboration round.
    CollaborationRequest,
    /// Ask the recipient for its current status.
    StatusInquiry,
    /// Reply to any of the above.
    Response,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::TaskAssignment => write!(f, "task_assignment"),
            MessageKind::CollaborationRequest => write!(f, "collaboration_request"),
            MessageKind::StatusInquiry => write!(f, "status_inquiry"),
            MessageKind::Response => write!(f, "response"),
        }
    }
}

/// A routed message between two workers (or the orchestrator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerMessage {
    pub sender: WorkerId,
    pub recipient: WorkerId,
    pub kind: MessageKind,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl WorkerMessage {
    pub fn new(
        sender: WorkerId,
        recipient: WorkerId,
        kind: MessageKind,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            sender,
            recipient,
            kind,
            payload,
            timestamp: Utc::now(),
            correlation_id: None,
        }
    }

    pub fn with_correlation(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Build a response to this message: sender and recipient swap, the
    /// correlation id carries over.
    pub fn reply(&self, payload: serde_json::Value) -> Self {
        Self {
            sender: self.recipient.clone(),
            recipient: self.sender.clone(),
            kind: MessageKind::Response,
            payload,
            timestamp: Utc::now(),
            correlation_id: self.correlation_id.clone(),
        }
    }
}
