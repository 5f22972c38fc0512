//! Consensus review and collaboration round behavior.

use ensemble::config::Config;
use ensemble::core::plan::SubTaskSpec;
use ensemble::core::task::Task;
use ensemble::orchestration::EnsembleEvent;

use crate::fixtures::{collect_events, harness, harness_with, occupy, test_config, StubSkills};

fn single_step_plan() -> Vec<SubTaskSpec> {
    vec![SubTaskSpec::new("step", "carry out the work", 1, &[])]
}

#[tokio::test]
async fn test_low_score_triggers_exactly_one_round() {
    let executor = StubSkills::new()
        .with_plan(single_step_plan())
        .with_review_score(0.5);
    let (mut engine, mut events) = harness(executor);

    let id = engine.submit(Task::new("assemble the quarterly report"));
    engine.drain().await;

    let consensus = engine.outcome(&id).unwrap().consensus.clone().unwrap();
    assert!(!consensus.accepted);
    assert!((consensus.score - 0.5).abs() < 1e-9);
    assert!((consensus.threshold - 0.7).abs() < 1e-9);
    assert!(!consensus.collaborators.is_empty());
    assert!(consensus.collaborators.len() <= 3);

    // Single round only: no recursive re-review in this design.
    let events = collect_events(&mut events);
    let rounds = events
        .iter()
        .filter(|e| matches!(e, EnsembleEvent::CollaborationTriggered { .. }))
        .count();
    assert_eq!(rounds, 1);
    let reviews = events
        .iter()
        .filter(|e| matches!(e, EnsembleEvent::ConsensusEvaluated { .. }))
        .count();
    assert_eq!(reviews, 1);
}

#[tokio::test]
async fn test_passing_score_skips_collaboration() {
    let executor = StubSkills::new()
        .with_plan(single_step_plan())
        .with_review_score(0.85);
    let (mut engine, mut events) = harness(executor);

    let id = engine.submit(Task::new("assemble the quarterly report"));
    engine.drain().await;

    let consensus = engine.outcome(&id).unwrap().consensus.clone().unwrap();
    assert!(consensus.accepted);
    assert!(consensus.collaborators.is_empty());

    let events = collect_events(&mut events);
    assert!(!events
        .iter()
        .any(|e| matches!(e, EnsembleEvent::CollaborationTriggered { .. })));
}

#[tokio::test]
async fn test_round_skipped_with_single_idle_worker() {
    let executor = StubSkills::new()
        .with_plan(single_step_plan())
        .with_review_score(0.2);
    let (mut engine, mut events) = harness(executor);

    // Leave only the planner idle.
    occupy(&mut engine, "coder_agent");
    occupy(&mut engine, "reviewer_agent");
    occupy(&mut engine, "debugger_agent");
    occupy(&mut engine, "tester_agent");

    let id = engine.submit(Task::new("assemble the quarterly report"));
    engine.drain().await;

    let consensus = engine.outcome(&id).unwrap().consensus.clone().unwrap();
    assert!(!consensus.accepted);
    assert!(consensus.collaborators.is_empty());

    let events = collect_events(&mut events);
    assert!(events
        .iter()
        .any(|e| matches!(e, EnsembleEvent::CollaborationSkipped { .. })));
}

#[tokio::test]
async fn test_threshold_comes_from_config() {
    let config = Config {
        consensus_threshold: 0.95,
        ..test_config()
    };
    let executor = StubSkills::new()
        .with_plan(single_step_plan())
        .with_review_score(0.9);
    let (mut engine, _events) = harness_with(config, executor);

    let id = engine.submit(Task::new("assemble the quarterly report"));
    engine.drain().await;

    // 0.9 passes the default threshold but not this one.
    let consensus = engine.outcome(&id).unwrap().consensus.clone().unwrap();
    assert!(!consensus.accepted);
    assert!((consensus.threshold - 0.95).abs() < 1e-9);
}

#[tokio::test]
async fn test_collaborator_cap_from_config() {
    let config = Config {
        max_collaborators: 2,
        ..test_config()
    };
    let executor = StubSkills::new()
        .with_plan(single_step_plan())
        .with_review_score(0.1);
    let (mut engine, _events) = harness_with(config, executor);

    let id = engine.submit(Task::new("assemble the quarterly report"));
    engine.drain().await;

    let consensus = engine.outcome(&id).unwrap().consensus.clone().unwrap();
    assert_eq!(consensus.collaborators.len(), 2);
}

#[tokio::test]
async fn test_reviewer_recommendations_surface_in_report() {
    let executor = StubSkills::new()
        .with_plan(single_step_plan())
        .with_review_score(0.9)
        .with_recommendations(vec!["tighten input validation", "add a rollback path"]);
    let (mut engine, _events) = harness(executor);

    let id = engine.submit(Task::new("assemble the quarterly report"));
    engine.drain().await;

    let consensus = engine.outcome(&id).unwrap().consensus.clone().unwrap();
    assert_eq!(consensus.recommendations.len(), 2);
    assert!(consensus.recommendations[0].contains("input validation"));
}

#[tokio::test]
async fn test_failed_review_counts_as_zero() {
    let executor = StubSkills::new()
        .with_plan(single_step_plan())
        .failing_on("Review and validate");
    let (mut engine, _events) = harness(executor);

    let id = engine.submit(Task::new("assemble the quarterly report"));
    engine.drain().await;

    let consensus = engine.outcome(&id).unwrap().consensus.clone().unwrap();
    assert_eq!(consensus.score, 0.0);
    assert!(!consensus.accepted);
    assert!(consensus.reviewer.is_none());
}
