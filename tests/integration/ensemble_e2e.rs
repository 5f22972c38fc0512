//! End-to-end flows: submission through dispatch to terminal reports,
//! both directly against the engine and through the service front.

use ensemble::config::Config;
use ensemble::core::message::{MessageKind, WorkerMessage};
use ensemble::core::task::{Task, TaskState};
use ensemble::orchestration::{run_service, BuiltinSkills, EnsembleEvent};
use ensemble::worker::{WorkerId, WorkerStatus};

use crate::fixtures::{
    collect_events, harness, payment_api_plan, service_harness, started_ids, sub_task_started_ids,
    test_config, StubSkills,
};

#[tokio::test]
async fn test_simple_read_task_full_cycle() {
    let (mut engine, _events) = harness(StubSkills::new());
    let id = engine.submit(Task::new("read file config.json").with_priority(1));
    engine.drain().await;

    let report = engine.outcome(&id).expect("report should exist");
    assert!(report.is_completed());
    assert_eq!(report.attempts, 1);
    assert!(report.sub_tasks.is_empty(), "simple path skips decomposition");
    assert!(report.consensus.is_none());

    // The worker that ran it is back to idle.
    let status = engine.status();
    assert_eq!(status.idle_workers, status.total_workers);
    assert!(status
        .workers
        .iter()
        .all(|w| w.status == WorkerStatus::Idle && w.current_task.is_none()));
}

#[tokio::test]
async fn test_complex_payment_api_dependency_waves() {
    let executor = StubSkills::new()
        .with_plan(payment_api_plan())
        .with_review_score(0.9);
    let (mut engine, mut events) = harness(executor);

    let id = engine.submit(Task::new("implement and test a new payment API").with_priority(2));
    engine.drain().await;

    let report = engine.outcome(&id).unwrap();
    assert!(report.is_completed());
    assert_eq!(report.sub_tasks.len(), 4);
    assert!(report
        .sub_tasks
        .iter()
        .all(|s| s.state == TaskState::Completed));

    // Independent sub-tasks start before the dependent one.
    let started = sub_task_started_ids(&collect_events(&mut events));
    let pos = |local: &str| {
        started
            .iter()
            .position(|id| id.ends_with(&format!("_{}", local)))
            .unwrap_or_else(|| panic!("sub-task {} never started", local))
    };
    assert!(pos("design") < pos("implementation"));
    assert!(pos("implementation") < pos("testing"));
    assert!(pos("validation") < pos("testing"));
}

#[tokio::test]
async fn test_priority_order_with_fifo_ties() {
    let (mut engine, mut events) = harness(BuiltinSkills);
    let low = engine.submit(Task::new("read the low file").with_priority(1));
    let first_high = engine.submit(Task::new("read the first high file").with_priority(5));
    let second_high = engine.submit(Task::new("read the second high file").with_priority(5));
    engine.drain().await;

    let started = started_ids(&collect_events(&mut events));
    assert_eq!(started, vec![first_high, second_high, low]);
}

#[tokio::test]
async fn test_service_front_submit_status_route() {
    let (engine, command_rx, client, _events) = service_harness(StubSkills::new());

    let ((), ()) = tokio::join!(run_service(engine, command_rx), async move {
        let status = client.status().await.unwrap();
        assert_eq!(status.total_workers, 5);
        assert_eq!(status.pending_tasks, 0);

        let id = client
            .submit(Task::new("search the error logs"))
            .await
            .unwrap();
        let report = client.outcome(id).await.unwrap().unwrap();
        assert!(report.is_completed());

        // Ad-hoc messaging still works alongside task processing.
        let inquiry = WorkerMessage::new(
            WorkerId::from("orchestrator"),
            WorkerId::from("tester_agent"),
            MessageKind::StatusInquiry,
            serde_json::json!({}),
        )
        .with_correlation("probe-1");
        let reply = client.route(inquiry).await.unwrap().unwrap();
        assert_eq!(reply.sender, WorkerId::from("tester_agent"));
        assert_eq!(reply.payload["status"], "idle");
        assert_eq!(reply.correlation_id.as_deref(), Some("probe-1"));

        let metrics = client.metrics().await.unwrap();
        assert_eq!(metrics.completed_tasks, 1);
        drop(client);
    });
}

#[tokio::test]
async fn test_service_front_batched_submissions_all_complete() {
    let (engine, command_rx, client, _events) = service_harness(BuiltinSkills);

    let ((), reports) = tokio::join!(run_service(engine, command_rx), async move {
        let submissions = (0..4).map(|i| {
            client.submit(Task::new(format!("read shard {}", i)).with_priority(i))
        });
        let ids = futures::future::try_join_all(submissions).await.unwrap();

        let mut reports = Vec::new();
        for id in ids {
            reports.push(client.outcome(id).await.unwrap().unwrap());
        }
        drop(client);
        reports
    });

    assert_eq!(reports.len(), 4);
    assert!(reports.iter().all(|r| r.is_completed()));
}

#[tokio::test]
async fn test_config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ensemble.toml");

    let config = Config {
        consensus_threshold: 0.8,
        max_sub_tasks: 6,
        max_collaborators: 2,
        task_timeout_secs: 45,
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[tokio::test]
async fn test_metrics_reflect_drained_queue() {
    let executor = StubSkills::new().failing_on("doomed");
    let (mut engine, mut events) = harness(executor);

    engine.submit(Task::new("read the healthy file"));
    engine.submit(Task::new("read the doomed file"));
    engine.drain().await;

    let summary = engine.metrics_summary();
    assert_eq!(summary.total_tasks, 2);
    assert_eq!(summary.completed_tasks, 1);
    assert_eq!(summary.failed_tasks, 1);
    assert!((summary.success_rate - 0.5).abs() < 1e-9);
    // One clean run plus two failed attempts on the doomed task.
    assert_eq!(summary.total_executions, 3);

    let events = collect_events(&mut events);
    let drained = events
        .iter()
        .find_map(|event| match event {
            EnsembleEvent::QueueDrained { completed, failed } => Some((*completed, *failed)),
            _ => None,
        })
        .unwrap();
    assert_eq!(drained, (1, 1));
}

#[tokio::test]
async fn test_custom_config_threshold_reaches_status() {
    let config = Config {
        consensus_threshold: 0.95,
        ..test_config()
    };
    let (engine, _events) = crate::fixtures::harness_with(config, BuiltinSkills);
    assert_eq!(engine.status().consensus_threshold, 0.95);
}
