//! Retry, unrecoverable failure, and blocked sub-task reporting.

use std::sync::atomic::Ordering;

use ensemble::core::plan::SubTaskSpec;
use ensemble::core::task::{Task, TaskState};
use ensemble::orchestration::EnsembleEvent;

use crate::fixtures::{collect_events, harness, StubSkills};

#[tokio::test]
async fn test_first_failure_recovers_on_retry() {
    let executor = StubSkills::new().failing_first(1);
    let calls = executor.call_counter();
    let (mut engine, _events) = harness(executor);

    let id = engine.submit(Task::new("read the flaky file"));
    engine.drain().await;

    let report = engine.outcome(&id).unwrap();
    assert!(report.is_completed(), "retry should recover the task");
    assert_eq!(report.attempts, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_planner_failure_recovers_on_retry() {
    let executor = StubSkills::new()
        .with_plan(vec![SubTaskSpec::new("step", "carry out the work", 1, &[])])
        .failing_first(1);
    let calls = executor.call_counter();
    let (mut engine, _events) = harness(executor);

    let id = engine.submit(Task::new("assemble the quarterly report"));
    engine.drain().await;

    let report = engine.outcome(&id).unwrap();
    assert!(report.is_completed(), "planner retry should recover the task");
    assert_eq!(report.attempts, 2);
    assert_eq!(report.sub_tasks.len(), 1);
    // Failed planner call, planner retry, the sub-task, the review.
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_planner_failing_twice_is_terminal() {
    let executor = StubSkills::new().failing_first(2);
    let (mut engine, _events) = harness(executor);

    let id = engine.submit(Task::new("assemble the quarterly report"));
    engine.drain().await;

    let report = engine.outcome(&id).unwrap();
    assert_eq!(report.attempts, 2, "exactly one decomposition retry");
    match &report.state {
        TaskState::Failed { error } => assert!(error.contains("unrecoverable")),
        other => panic!("expected failed state, got {:?}", other),
    }
    assert!(report.sub_tasks.is_empty());
    assert!(report.consensus.is_none());
}

#[tokio::test]
async fn test_second_failure_is_terminal_and_reported() {
    let executor = StubSkills::new().failing_on("doomed");
    let (mut engine, mut events) = harness(executor);

    let id = engine.submit(Task::new("read the doomed file"));
    engine.drain().await;

    let report = engine.outcome(&id).unwrap();
    assert_eq!(report.attempts, 2, "exactly one retry");
    match &report.state {
        TaskState::Failed { error } => assert!(error.contains("unrecoverable")),
        other => panic!("expected failed state, got {:?}", other),
    }

    // The failure is reported, not swallowed.
    let events = collect_events(&mut events);
    assert!(events
        .iter()
        .any(|e| matches!(e, EnsembleEvent::TaskFailed { .. })));

    // The pool recovers for subsequent tasks.
    let status = engine.status();
    assert_eq!(status.idle_workers, status.total_workers);
}

#[tokio::test]
async fn test_queue_continues_past_a_failed_task() {
    let executor = StubSkills::new().failing_on("doomed");
    let (mut engine, _events) = harness(executor);

    let doomed = engine.submit(Task::new("read the doomed file").with_priority(9));
    let healthy = engine.submit(Task::new("read the healthy file").with_priority(1));
    engine.drain().await;

    assert!(!engine.outcome(&doomed).unwrap().is_completed());
    assert!(engine.outcome(&healthy).unwrap().is_completed());
}

#[tokio::test]
async fn test_upstream_failure_blocks_dependents_distinctly() {
    let plan = vec![
        SubTaskSpec::new("fragile", "run the fragile step", 1, &[]),
        SubTaskSpec::new("independent", "run the sturdy step", 1, &[]),
        SubTaskSpec::new("downstream", "finish after fragile", 2, &["fragile"]),
    ];
    let executor = StubSkills::new().with_plan(plan).failing_on("fragile step");
    let (mut engine, mut events) = harness(executor);

    let id = engine.submit(Task::new("run the brittle pipeline"));
    engine.drain().await;

    let report = engine.outcome(&id).unwrap();
    let state_of = |local: &str| {
        report
            .sub_tasks
            .iter()
            .find(|s| s.local_id == local)
            .unwrap_or_else(|| panic!("missing sub-task {}", local))
            .state
            .clone()
    };

    // "ran and failed" vs "never ran" are distinguishable.
    assert!(matches!(state_of("fragile"), TaskState::Failed { .. }));
    assert!(matches!(state_of("downstream"), TaskState::Blocked { .. }));
    assert_eq!(state_of("independent"), TaskState::Completed);

    let events = collect_events(&mut events);
    assert!(events
        .iter()
        .any(|e| matches!(e, EnsembleEvent::SubTaskBlocked { .. })));

    // Partial success still counts as a completed parent with consensus.
    assert!(report.is_completed());
    assert!(report.consensus.is_some());
}

#[tokio::test]
async fn test_cyclic_decomposition_is_rejected() {
    let plan = vec![
        SubTaskSpec::new("a", "first step", 1, &["b"]),
        SubTaskSpec::new("b", "second step", 1, &["a"]),
    ];
    let executor = StubSkills::new().with_plan(plan);
    let (mut engine, _events) = harness(executor);

    let id = engine.submit(Task::new("untangle the graph"));
    engine.drain().await;

    let report = engine.outcome(&id).unwrap();
    match &report.state {
        TaskState::Failed { error } => assert!(error.contains("cycle")),
        other => panic!("expected failed state, got {:?}", other),
    }
    assert!(report.sub_tasks.is_empty(), "nothing from a cyclic plan runs");
}

#[tokio::test]
async fn test_oversized_plan_is_truncated() {
    let plan: Vec<SubTaskSpec> = (0..14)
        .map(|i| SubTaskSpec::new(&format!("s{}", i), "run one shard", 1, &[]))
        .collect();
    let executor = StubSkills::new().with_plan(plan);
    let (mut engine, _events) = harness(executor);

    let id = engine.submit(Task::new("process every shard"));
    engine.drain().await;

    let report = engine.outcome(&id).unwrap();
    assert!(report.is_completed());
    assert_eq!(report.sub_tasks.len(), 10, "ceiling drops the excess");
}

#[tokio::test]
async fn test_empty_decomposition_falls_back_to_one_step() {
    let executor = StubSkills::new();
    let (mut engine, _events) = harness(executor);

    let id = engine.submit(Task::new("summarize the changelog"));
    engine.drain().await;

    let report = engine.outcome(&id).unwrap();
    assert!(report.is_completed());
    assert_eq!(report.sub_tasks.len(), 1);
    assert_eq!(report.sub_tasks[0].local_id, "execute");
}
