//! Workflow history events
//!
//! The broker emits each event as a flat JSON object: an `eventId`, an
//! `eventType` tag, an optional `eventTimestamp`, and one attribute bag
//! whose key is derived from the tag (`ActivityTaskScheduled` carries
//! `activityTaskScheduledEventAttributes`). [`RawEvent`] mirrors that shape;
//! [`HistoryEvent`] is the decoded form with a closed [`EventKind`].

use crate::{ActivityId, EventId, TaranError, TaranResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const WORKFLOW_EXECUTION_STARTED: &str = "WorkflowExecutionStarted";
pub const ACTIVITY_TASK_SCHEDULED: &str = "ActivityTaskScheduled";
pub const ACTIVITY_TASK_STARTED: &str = "ActivityTaskStarted";
pub const ACTIVITY_TASK_COMPLETED: &str = "ActivityTaskCompleted";
pub const ACTIVITY_TASK_FAILED: &str = "ActivityTaskFailed";
pub const ACTIVITY_TASK_TIMED_OUT: &str = "ActivityTaskTimedOut";
pub const ACTIVITY_TASK_CANCELED: &str = "ActivityTaskCanceled";
pub const ACTIVITY_TASK_CANCEL_REQUESTED: &str = "ActivityTaskCancelRequested";

/// Every decision-task event type starts with this prefix
pub const DECISION_EVENT_PREFIX: &str = "Decision";

// ── Wire Shape ───────────────────────────────────────────────────────

/// An event exactly as the broker returns it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub event_id: EventId,
    pub event_type: String,
    /// Seconds since the Unix epoch, possibly fractional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_timestamp: Option<f64>,
    /// The type-specific attribute bag(s), keyed by their wire name
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl RawEvent {
    pub fn new(event_id: impl Into<EventId>, event_type: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            event_timestamp: None,
            attributes: Map::new(),
        }
    }

    /// Attach the attribute bag under the key matching this event's type
    pub fn with_attributes(mut self, attributes: Value) -> Self {
        self.attributes
            .insert(attribute_key(&self.event_type), attributes);
        self
    }

    pub fn with_timestamp(mut self, epoch_seconds: f64) -> Self {
        self.event_timestamp = Some(epoch_seconds);
        self
    }
}

/// Wire key of the attribute bag for an event type
/// (`ActivityTaskScheduled` -> `activityTaskScheduledEventAttributes`)
pub fn attribute_key(event_type: &str) -> String {
    let mut chars = event_type.chars();
    match chars.next() {
        Some(first) => format!(
            "{}{}EventAttributes",
            first.to_ascii_lowercase(),
            chars.as_str()
        ),
        None => "EventAttributes".to_string(),
    }
}

// ── Attribute Payloads ───────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityType {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowType {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub name: String,
}

impl TaskList {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecutionStartedAttributes {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub task_list: Option<TaskList>,
    #[serde(default)]
    pub workflow_type: Option<WorkflowType>,
    #[serde(default)]
    pub child_policy: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTaskScheduledAttributes {
    pub activity_type: ActivityType,
    pub task_list: TaskList,
    #[serde(default)]
    pub activity_id: Option<ActivityId>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub schedule_to_start_timeout: Option<String>,
    #[serde(default)]
    pub start_to_close_timeout: Option<String>,
    #[serde(default)]
    pub schedule_to_close_timeout: Option<String>,
    #[serde(default)]
    pub heartbeat_timeout: Option<String>,
    #[serde(default)]
    pub decision_task_completed_event_id: Option<EventId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTaskStartedAttributes {
    pub scheduled_event_id: EventId,
    #[serde(default)]
    pub identity: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTaskCompletedAttributes {
    pub scheduled_event_id: EventId,
    #[serde(default)]
    pub started_event_id: Option<EventId>,
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTaskFailedAttributes {
    pub scheduled_event_id: EventId,
    #[serde(default)]
    pub started_event_id: Option<EventId>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Which timer expired for a timed-out activity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeoutType {
    StartToClose,
    ScheduleToStart,
    ScheduleToClose,
    Heartbeat,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTaskTimedOutAttributes {
    pub scheduled_event_id: EventId,
    #[serde(default)]
    pub started_event_id: Option<EventId>,
    #[serde(default)]
    pub timeout_type: Option<TimeoutType>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTaskCanceledAttributes {
    pub scheduled_event_id: EventId,
    #[serde(default)]
    pub started_event_id: Option<EventId>,
    #[serde(default)]
    pub latest_cancel_requested_event_id: Option<EventId>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTaskCancelRequestedAttributes {
    pub scheduled_event_id: EventId,
    #[serde(default)]
    pub activity_id: Option<ActivityId>,
    #[serde(default)]
    pub decision_task_completed_event_id: Option<EventId>,
}

// ── Decoded Event ────────────────────────────────────────────────────

/// The closed set of event kinds the projection engine distinguishes
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    WorkflowExecutionStarted(WorkflowExecutionStartedAttributes),
    ActivityTaskScheduled(ActivityTaskScheduledAttributes),
    ActivityTaskStarted(ActivityTaskStartedAttributes),
    ActivityTaskCompleted(ActivityTaskCompletedAttributes),
    ActivityTaskFailed(ActivityTaskFailedAttributes),
    ActivityTaskTimedOut(ActivityTaskTimedOutAttributes),
    ActivityTaskCanceled(ActivityTaskCanceledAttributes),
    ActivityTaskCancelRequested(ActivityTaskCancelRequestedAttributes),
    /// `DecisionTaskScheduled`, `DecisionTaskStarted`, `DecisionTaskCompleted`, ...
    DecisionTask { event_type: String, attributes: Value },
    /// Anything else the broker records (timers, signals, markers, ...)
    Other { event_type: String, attributes: Value },
}

/// One decoded entry of a workflow history
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawEvent")]
pub struct HistoryEvent {
    pub event_id: EventId,
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: EventKind,
}

impl HistoryEvent {
    pub fn new(event_id: impl Into<EventId>, kind: EventKind) -> Self {
        Self {
            event_id: event_id.into(),
            timestamp: None,
            kind,
        }
    }

    /// The wire name of this event's type
    pub fn event_type(&self) -> &str {
        match &self.kind {
            EventKind::WorkflowExecutionStarted(_) => WORKFLOW_EXECUTION_STARTED,
            EventKind::ActivityTaskScheduled(_) => ACTIVITY_TASK_SCHEDULED,
            EventKind::ActivityTaskStarted(_) => ACTIVITY_TASK_STARTED,
            EventKind::ActivityTaskCompleted(_) => ACTIVITY_TASK_COMPLETED,
            EventKind::ActivityTaskFailed(_) => ACTIVITY_TASK_FAILED,
            EventKind::ActivityTaskTimedOut(_) => ACTIVITY_TASK_TIMED_OUT,
            EventKind::ActivityTaskCanceled(_) => ACTIVITY_TASK_CANCELED,
            EventKind::ActivityTaskCancelRequested(_) => ACTIVITY_TASK_CANCEL_REQUESTED,
            EventKind::DecisionTask { event_type, .. } | EventKind::Other { event_type, .. } => {
                event_type
            }
        }
    }

    /// Back-reference to the `ActivityTaskScheduled` event, for activity
    /// lifecycle events other than the scheduling itself
    pub fn scheduled_event_id(&self) -> Option<EventId> {
        match &self.kind {
            EventKind::ActivityTaskStarted(a) => Some(a.scheduled_event_id),
            EventKind::ActivityTaskCompleted(a) => Some(a.scheduled_event_id),
            EventKind::ActivityTaskFailed(a) => Some(a.scheduled_event_id),
            EventKind::ActivityTaskTimedOut(a) => Some(a.scheduled_event_id),
            EventKind::ActivityTaskCanceled(a) => Some(a.scheduled_event_id),
            EventKind::ActivityTaskCancelRequested(a) => Some(a.scheduled_event_id),
            _ => None,
        }
    }

    /// Activity type name, for `ActivityTaskScheduled` events only
    pub fn scheduled_activity_name(&self) -> Option<&str> {
        match &self.kind {
            EventKind::ActivityTaskScheduled(a) => Some(a.activity_type.name.as_str()),
            _ => None,
        }
    }

    pub fn is_decision_task(&self) -> bool {
        matches!(self.kind, EventKind::DecisionTask { .. })
    }
}

impl TryFrom<RawEvent> for HistoryEvent {
    type Error = TaranError;

    fn try_from(raw: RawEvent) -> TaranResult<Self> {
        let RawEvent {
            event_id,
            event_type,
            event_timestamp,
            mut attributes,
        } = raw;
        let bag = attributes.remove(&attribute_key(&event_type));

        let kind = match event_type.as_str() {
            WORKFLOW_EXECUTION_STARTED => {
                EventKind::WorkflowExecutionStarted(decode_bag(event_id, &event_type, bag)?)
            }
            // Strict for every activity type: a scheduling event without
            // `activityType` or `taskList` fails the whole page, even one the
            // caller is not filtering for.
            ACTIVITY_TASK_SCHEDULED => {
                EventKind::ActivityTaskScheduled(decode_bag(event_id, &event_type, bag)?)
            }
            ACTIVITY_TASK_STARTED => {
                EventKind::ActivityTaskStarted(decode_bag(event_id, &event_type, bag)?)
            }
            ACTIVITY_TASK_COMPLETED => {
                EventKind::ActivityTaskCompleted(decode_bag(event_id, &event_type, bag)?)
            }
            ACTIVITY_TASK_FAILED => {
                EventKind::ActivityTaskFailed(decode_bag(event_id, &event_type, bag)?)
            }
            ACTIVITY_TASK_TIMED_OUT => {
                EventKind::ActivityTaskTimedOut(decode_bag(event_id, &event_type, bag)?)
            }
            ACTIVITY_TASK_CANCELED => {
                EventKind::ActivityTaskCanceled(decode_bag(event_id, &event_type, bag)?)
            }
            ACTIVITY_TASK_CANCEL_REQUESTED => {
                EventKind::ActivityTaskCancelRequested(decode_bag(event_id, &event_type, bag)?)
            }
            other if other.starts_with(DECISION_EVENT_PREFIX) => EventKind::DecisionTask {
                event_type: other.to_string(),
                attributes: bag.unwrap_or(Value::Null),
            },
            other => EventKind::Other {
                event_type: other.to_string(),
                attributes: bag.unwrap_or(Value::Null),
            },
        };

        Ok(Self {
            event_id,
            timestamp: event_timestamp.and_then(timestamp_from_epoch_seconds),
            kind,
        })
    }
}

fn decode_bag<T: DeserializeOwned>(
    event_id: EventId,
    event_type: &str,
    bag: Option<Value>,
) -> TaranResult<T> {
    let malformed = |reason: String| TaranError::MalformedEvent {
        event_id,
        event_type: event_type.to_string(),
        reason,
    };
    let bag = bag.ok_or_else(|| malformed(format!("missing {}", attribute_key(event_type))))?;
    serde_json::from_value(bag).map_err(|e| malformed(e.to_string()))
}

fn timestamp_from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
}
