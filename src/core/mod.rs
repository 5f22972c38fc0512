//! Core domain models for the ensemble engine.
//!
//! This module contains the fundamental data structures used throughout
//! the orchestration system: tasks, decomposition plans, and the
//! inter-worker message protocol.

pub mod message;
pub mod plan;
pub mod task;

pub use message::{MessageKind, WorkerMessage};
pub use plan::{Plan, SubTask, SubTaskSpec};
pub use task::{PendingEntry, PendingQueue, Task, TaskId, TaskState};
