//! Recorded workflow histories shared by the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use taran_types::{HistoryEvent, WorkflowHistory};

pub fn decode(events: Value) -> Vec<HistoryEvent> {
    serde_json::from_value(events).unwrap()
}

/// Two activities run to completion. The result of `activity2` is not
/// valid JSON (note the stray closing brace).
pub fn successful_events() -> Value {
    json!([
        {"eventId": 1, "eventType": "WorkflowExecutionStarted", "eventTimestamp": 1460914951.949,
         "workflowExecutionStartedEventAttributes": {
             "taskList": {"name": "default"}, "parentInitiatedEventId": 0,
             "taskStartToCloseTimeout": "10", "childPolicy": "TERMINATE",
             "executionStartToCloseTimeout": "3600",
             "input": "{\"test\": \"test\",\"task_list\": \"i-6fbd1de3\"}",
             "workflowType": {"version": "1", "name": "wftype"}}},
        {"eventId": 2, "eventType": "DecisionTaskScheduled", "eventTimestamp": 1460914951.949,
         "decisionTaskScheduledEventAttributes": {
             "startToCloseTimeout": "10", "taskList": {"name": "default"}}},
        {"eventId": 3, "eventType": "DecisionTaskStarted", "eventTimestamp": 1460914952.009,
         "decisionTaskStartedEventAttributes": {"scheduledEventId": 2, "identity": "localhost"}},
        {"eventId": 4, "eventType": "DecisionTaskCompleted", "eventTimestamp": 1460914952.136,
         "decisionTaskCompletedEventAttributes": {"startedEventId": 3, "scheduledEventId": 2}},
        {"eventId": 5, "eventType": "ActivityTaskScheduled", "eventTimestamp": 1460914952.136,
         "activityTaskScheduledEventAttributes": {
             "taskList": {"name": "i-6fbd1de3"}, "scheduleToCloseTimeout": "20",
             "activityType": {"version": "1", "name": "activity1"},
             "decisionTaskCompletedEventId": 4, "heartbeatTimeout": "600",
             "activityId": "6167c0d7-04bb-11e6-8cab-3c15c2e45d3a",
             "scheduleToStartTimeout": "10", "startToCloseTimeout": "5", "input": "input"}},
        {"eventId": 6, "eventType": "ActivityTaskStarted", "eventTimestamp": 1460914952.174,
         "activityTaskStartedEventAttributes": {"scheduledEventId": 5, "identity": "i-6fbd1de3"}},
        {"eventId": 7, "eventType": "ActivityTaskCompleted", "eventTimestamp": 1460914953.517,
         "activityTaskCompletedEventAttributes": {
             "startedEventId": 6, "scheduledEventId": 5,
             "result": "{\"result\": \"the_result\"}"}},
        {"eventId": 8, "eventType": "DecisionTaskScheduled", "eventTimestamp": 1460914953.517,
         "decisionTaskScheduledEventAttributes": {
             "startToCloseTimeout": "10", "taskList": {"name": "default"}}},
        {"eventId": 9, "eventType": "DecisionTaskStarted", "eventTimestamp": 1460914953.552,
         "decisionTaskStartedEventAttributes": {"scheduledEventId": 8, "identity": "localhost"}},
        {"eventId": 10, "eventType": "DecisionTaskCompleted", "eventTimestamp": 1460914953.751,
         "decisionTaskCompletedEventAttributes": {"startedEventId": 9, "scheduledEventId": 8}},
        {"eventId": 11, "eventType": "ActivityTaskScheduled", "eventTimestamp": 1460914953.751,
         "activityTaskScheduledEventAttributes": {
             "taskList": {"name": "i-6fbd1de3"}, "scheduleToCloseTimeout": "80",
             "activityType": {"version": "1", "name": "activity2"},
             "decisionTaskCompletedEventId": 10, "heartbeatTimeout": "600",
             "activityId": "625d765e-04bb-11e6-b6a9-3c15c2e45d3a",
             "scheduleToStartTimeout": "60", "startToCloseTimeout": "20",
             "input": "{\"test\": \"test\""}},
        {"eventId": 12, "eventType": "ActivityTaskStarted", "eventTimestamp": 1460914954.323,
         "activityTaskStartedEventAttributes": {"scheduledEventId": 11, "identity": "i-6fbd1de3"}},
        {"eventId": 13, "eventType": "ActivityTaskCompleted", "eventTimestamp": 1460914956.071,
         "activityTaskCompletedEventAttributes": {
             "startedEventId": 12, "scheduledEventId": 11,
             "result": "{\"instance_id\": \"i-6fbd1de3\", \"test\": \"test\"}}"}},
        {"eventId": 14, "eventType": "DecisionTaskScheduled", "eventTimestamp": 1460914956.071,
         "decisionTaskScheduledEventAttributes": {
             "startToCloseTimeout": "10", "taskList": {"name": "default"}}},
        {"eventId": 15, "eventType": "DecisionTaskStarted", "eventTimestamp": 1460914956.104,
         "decisionTaskStartedEventAttributes": {"scheduledEventId": 14, "identity": "localhost"}}
    ])
}

/// `activity1` is scheduled and times out before any worker picks it up.
pub fn timed_out_events() -> Value {
    json!([
        {"eventId": 1, "eventType": "WorkflowExecutionStarted", "eventTimestamp": 1460914472.234,
         "workflowExecutionStartedEventAttributes": {
             "taskList": {"name": "task_list"}, "parentInitiatedEventId": 0,
             "taskStartToCloseTimeout": "10", "childPolicy": "TERMINATE",
             "executionStartToCloseTimeout": "3600",
             "input": "{\"test\": \"test\", \"task_list\": \"i-e4c7ba6c\"}",
             "workflowType": {"version": "1", "name": "activity1"}}},
        {"eventId": 2, "eventType": "DecisionTaskScheduled", "eventTimestamp": 1460914472.234,
         "decisionTaskScheduledEventAttributes": {
             "startToCloseTimeout": "10", "taskList": {"name": "task_list"}}},
        {"eventId": 3, "eventType": "DecisionTaskStarted", "eventTimestamp": 1460914472.298,
         "decisionTaskStartedEventAttributes": {"scheduledEventId": 2, "identity": "localhost"}},
        {"eventId": 4, "eventType": "DecisionTaskCompleted", "eventTimestamp": 1460914472.420,
         "decisionTaskCompletedEventAttributes": {"startedEventId": 3, "scheduledEventId": 2}},
        {"eventId": 5, "eventType": "ActivityTaskScheduled", "eventTimestamp": 1460914472.420,
         "activityTaskScheduledEventAttributes": {
             "taskList": {"name": "i-e4c7ba6c"}, "scheduleToCloseTimeout": "20",
             "activityType": {"version": "1", "name": "activity1"},
             "decisionTaskCompletedEventId": 4, "heartbeatTimeout": "600",
             "activityId": "4378db30-04ba-11e6-859f-3c15c2e45d3a",
             "scheduleToStartTimeout": "10", "startToCloseTimeout": "5", "input": ""}},
        {"eventId": 6, "eventType": "ActivityTaskTimedOut", "eventTimestamp": 1460914482.425,
         "activityTaskTimedOutEventAttributes": {
             "startedEventId": 0, "timeoutType": "SCHEDULE_TO_START", "scheduledEventId": 5}},
        {"eventId": 7, "eventType": "DecisionTaskScheduled", "eventTimestamp": 1460914482.425,
         "decisionTaskScheduledEventAttributes": {
             "startToCloseTimeout": "10", "taskList": {"name": "task_list"}}},
        {"eventId": 8, "eventType": "DecisionTaskStarted", "eventTimestamp": 1460914482.468,
         "decisionTaskStartedEventAttributes": {"scheduledEventId": 7, "identity": "localhost"}}
    ])
}

pub fn successful_history() -> WorkflowHistory {
    WorkflowHistory::new(decode(successful_events())).with_previous_started_event_id(9u64)
}

pub fn timed_out_history() -> WorkflowHistory {
    WorkflowHistory::new(decode(timed_out_events())).with_previous_started_event_id(3u64)
}
