//! A full decision cycle: load config, read history, schedule, report.

mod common;

use common::{decode, successful_events, timed_out_events};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use taran_engine::{BrokerAck, Foreman, InMemoryBroker, TaranConfig, Worker};
use taran_types::{
    ActivityId, ActivityStatus, ActivityTask, ActivityType, ChildPolicy, ConfigurationError,
    Decision, DecisionTask, TaranError, TaskToken, TerminateRequest, Timeout, WorkflowExecution,
    WorkflowType,
};

const CONFIG: &str = r#"
domain_name = "test_domain"
workflow_name = "wftype"
workflow_version = "1"
foreman_task_list = "default"

[[activities]]
name = "activity1"
version = "1"
task_list = "i-6fbd1de3"

[[activities]]
name = "activity2"
version = "4"
task_list = "i-6fbd1de3"

[history]
page_size = 100

[logging]
level = 20
"#;

fn load_config() -> TaranConfig {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taran.toml");
    std::fs::write(&path, CONFIG).unwrap();
    TaranConfig::load(&path).unwrap()
}

fn decision_task(events: serde_json::Value) -> DecisionTask {
    DecisionTask {
        task_token: TaskToken::new("decision-token"),
        workflow_execution: WorkflowExecution::new("wf-1", "run-1"),
        workflow_type: WorkflowType {
            name: "wftype".into(),
            version: "1".into(),
        },
        events: decode(events),
        next_page_token: None,
        previous_started_event_id: None,
    }
}

#[tokio::test]
async fn timed_out_activity_is_rescheduled() {
    let config = load_config();
    assert_eq!(config.history.page_size, 100);
    assert_eq!(config.logging.level, "info");

    let broker = Arc::new(InMemoryBroker::new());
    let foreman = Foreman::connect(&config, broker.clone()).await.unwrap();
    let task = decision_task(timed_out_events());

    let history = foreman.history_for(&task).await.unwrap();
    // A seed without a continuation token needs no broker round-trip
    assert!(broker.history_requests().is_empty());

    let summary = foreman.activity_status(&history, "activity1").unwrap();
    assert_eq!(summary.count(ActivityStatus::TimedOut), 1);

    let input = history.workflow_input().unwrap().unwrap();
    let task_list = input["task_list"].as_str().unwrap();
    let decisions = vec![Decision::new("activity1", task_list)
        .with_input(input.to_string())
        .with_timeouts(Timeout::secs(10), Timeout::secs(5), Timeout::secs(20))];

    let batch = foreman
        .schedule_activity_tasks(&task, &decisions)
        .await
        .unwrap();

    let submitted = broker.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].1, batch);

    let wire = serde_json::to_value(&batch).unwrap();
    let attrs = &wire[0]["scheduleActivityTaskDecisionAttributes"];
    assert_eq!(attrs["activityType"], json!({"name": "activity1", "version": "1"}));
    assert_eq!(attrs["taskList"], json!({"name": "i-e4c7ba6c"}));
    assert_eq!(attrs["scheduleToCloseTimeout"], "20");
}

#[tokio::test]
async fn batch_ids_are_distinct_and_versions_resolved() {
    let config = load_config();
    let broker = Arc::new(InMemoryBroker::new());
    let foreman = Foreman::connect(&config, broker.clone()).await.unwrap();
    let task = decision_task(successful_events());

    let decisions = vec![
        Decision::new("activity1", "t"),
        Decision::new("activity2", "t"),
        Decision::new("activity2", "t"),
    ];
    let batch = foreman
        .schedule_activity_tasks(&task, &decisions)
        .await
        .unwrap();

    let ids: HashSet<&ActivityId> = batch.iter().map(|d| d.activity_id()).collect();
    assert_eq!(ids.len(), 3);

    let wire = serde_json::to_value(&batch).unwrap();
    let versions: Vec<&str> = (0..3)
        .map(|i| {
            wire[i]["scheduleActivityTaskDecisionAttributes"]["activityType"]["version"]
                .as_str()
                .unwrap()
        })
        .collect();
    assert_eq!(versions, vec!["1", "4", "4"]);
}

#[tokio::test]
async fn unregistered_activity_aborts_the_cycle() {
    let config = load_config();
    let broker = Arc::new(InMemoryBroker::new());
    let foreman = Foreman::connect(&config, broker.clone()).await.unwrap();

    let result = foreman
        .schedule_activity_tasks(
            &decision_task(successful_events()),
            &[Decision::new("activity1", "t"), Decision::new("activity9", "t")],
        )
        .await;

    assert!(matches!(
        result,
        Err(TaranError::Configuration(ConfigurationError::UnregisteredActivity { .. }))
    ));
    assert!(broker.submitted().is_empty());
}

#[tokio::test]
async fn worker_reports_and_foreman_terminates() {
    let config = load_config();
    let broker = Arc::new(InMemoryBroker::new());
    let worker = Worker::connect(&config, broker.clone()).await.unwrap();
    let foreman = Foreman::connect(&config, broker.clone()).await.unwrap();

    let task = ActivityTask {
        task_token: TaskToken::new("activity-token"),
        activity_id: ActivityId::generate(),
        activity_type: ActivityType {
            name: "activity1".into(),
            version: "1".into(),
        },
        workflow_execution: WorkflowExecution::new("wf-1", "run-1"),
        input: Some("{}".into()),
    };

    let ack = worker
        .complete(&task, r#"{"result": "the_result"}"#)
        .await
        .unwrap();
    assert_eq!(ack, BrokerAck::Accepted);

    let request =
        TerminateRequest::new("finished", "all activities done").with_child_policy(ChildPolicy::Abandon);
    let ack = foreman
        .terminate(&task.workflow_execution, &request)
        .await
        .unwrap();
    assert!(ack.is_accepted());
    assert_eq!(broker.terminations()[0].request.child_policy, ChildPolicy::Abandon);

    // Once the run is gone, late reports are acknowledged as such
    broker.mark_execution_gone();
    let ack = worker.fail(&task, Some("late"), None).await.unwrap();
    assert_eq!(ack, BrokerAck::ExecutionGone);
    assert!(broker.failures().is_empty());
}

#[tokio::test]
async fn polled_decision_task_drives_the_cycle() {
    let config = load_config();
    let task = decision_task(successful_events());
    let broker = Arc::new(InMemoryBroker::new().with_decision_task(task.clone()));
    let foreman = Foreman::connect(&config, broker.clone()).await.unwrap();

    let polled = foreman.poll().await.unwrap().unwrap();
    assert_eq!(polled.task_token, task.task_token);
    assert_eq!(broker.polls()[0].task_list, "default");

    let history = foreman.history_for(&polled).await.unwrap();
    let summary = foreman.activity_status(&history, "activity1").unwrap();
    assert_eq!(summary.settled(), 1);

    foreman
        .schedule_activity_tasks(&polled, &[Decision::new("activity2", "i-6fbd1de3")])
        .await
        .unwrap();
    assert_eq!(broker.submitted()[0].0, TaskToken::new("decision-token"));

    // Nothing left to hand out
    assert!(foreman.poll().await.unwrap().is_none());
}

#[tokio::test]
async fn pinned_account_refuses_foreign_credentials() {
    let config = TaranConfig::from_toml_str(
        r#"
domain_name = "test_domain"
account_id = "000000000000"
"#,
    )
    .unwrap();
    let broker = Arc::new(InMemoryBroker::new().with_account("123456789012"));

    let foreman = Foreman::connect(&config, broker.clone()).await;
    assert!(matches!(
        foreman,
        Err(TaranError::Configuration(ConfigurationError::Invalid(_)))
    ));
    let worker = Worker::connect(&config, broker.clone()).await;
    assert!(matches!(
        worker,
        Err(TaranError::Configuration(ConfigurationError::Invalid(_)))
    ));
    assert!(broker.history_requests().is_empty());
    assert!(broker.polls().is_empty());
}
