//! Orchestration layer for the ensemble engine.
//!
//! This module coordinates the worker pool: scoring-based assignment,
//! the drain loop with decomposition and consensus, the execution seam
//! for pluggable skills, and the command-channel service front.

pub mod ensemble;
pub mod executor;
pub mod pool;
pub mod scoring;
pub mod service;
pub mod skills;

pub use ensemble::{
    ConsensusReport, Ensemble, EnsembleEvent, EnsembleStatus, SubTaskReport, TaskReport,
};
pub use executor::{TaskExecutor, TaskOutput};
pub use pool::WorkerPool;
pub use service::{run_service, service_channel, EnsembleClient, EnsembleCommand};
pub use skills::BuiltinSkills;
