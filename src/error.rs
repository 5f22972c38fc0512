use thiserror::Error;

use crate::core::task::TaskId;
use crate::worker::WorkerId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Worker not available: {0}")]
    NotAvailable(WorkerId),

    #[error("Worker {0} has no current task")]
    NoCurrentTask(WorkerId),

    #[error("No suitable idle worker for task {0}")]
    NoSuitableWorker(TaskId),

    #[error("Unknown message recipient: {0}")]
    UnknownRecipient(WorkerId),

    #[error("Task {id} is unrecoverable: {cause}")]
    UnrecoverableTask { id: TaskId, cause: String },

    #[error("Invalid worker transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Ensemble service is not running")]
    ServiceStopped,

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

pub type Result<T> = std::result::Result<T, Error>;
