//! Integration test suite for the ensemble engine.
//!
//! These tests exercise full flows from submission to terminal report,
//! including dependency-ordered sub-task execution and the consensus
//! loop. Everything runs against scripted deterministic executors; no
//! test calls out of process.
//!
//! # Test Categories
//!
//! - `ensemble_e2e`: submission-to-report flows, service front, config
//! - `consensus`: review scoring and collaboration rounds
//! - `recovery`: retry policy, unrecoverable failures, blocked sub-tasks

mod fixtures;

mod consensus;
mod ensemble_e2e;
mod recovery;
