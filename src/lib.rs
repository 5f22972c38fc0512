//! Ensemble: a role-specialized task orchestration engine.
//!
//! Natural-language work items are queued by priority, classified as
//! simple or complex, and dispatched to a fixed pool of specialist
//! workers (planner, coder, reviewer, debugger, tester). Complex tasks
//! are decomposed by the planner into dependency-ordered sub-tasks that
//! run concurrently where the pool allows, and every complex task ends
//! with a consensus review that can trigger one collaboration round.
//!
//! The crate splits into:
//! - [`core`]: tasks, decomposition plans, and the message protocol
//! - [`worker`]: the role-tagged worker state machine
//! - [`orchestration`]: scoring, the engine, and the service front
//! - [`config`], [`log`], [`metrics`], [`error`]: the ambient stack
//!
//! What a task *does* when it runs lives behind
//! [`orchestration::executor::TaskExecutor`]; the engine ships
//! deterministic built-in skills and tests inject scripted ones.

pub mod config;
pub mod core;
pub mod error;
pub mod log;
pub mod metrics;
pub mod orchestration;
pub mod worker;

pub use error::{Error, Result};
