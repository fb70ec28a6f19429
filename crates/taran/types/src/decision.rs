//! Scheduling decisions and the broker payloads they encode to
//!
//! A [`Decision`] is what the decision policy wants scheduled. The engine
//! turns a list of them into a [`BrokerDecisionBatch`], the shape the broker
//! accepts when a decision task completes.

use crate::{ActivityId, ActivityType, TaskList};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default for each activity timeout, in seconds
pub const DEFAULT_ACTIVITY_TIMEOUT_SECS: u64 = 60;

// ── Timeouts ─────────────────────────────────────────────────────────

/// An activity timeout as the broker expects it: a number of seconds,
/// or `"NONE"` for no limit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Timeout {
    Seconds(u64),
    Unlimited,
}

impl Timeout {
    pub fn secs(seconds: u64) -> Self {
        Timeout::Seconds(seconds)
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Timeout::Seconds(DEFAULT_ACTIVITY_TIMEOUT_SECS)
    }
}

impl std::fmt::Display for Timeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeout::Seconds(s) => write!(f, "{}", s),
            Timeout::Unlimited => f.write_str("NONE"),
        }
    }
}

impl std::str::FromStr for Timeout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("NONE") {
            return Ok(Timeout::Unlimited);
        }
        s.trim()
            .parse::<u64>()
            .map(Timeout::Seconds)
            .map_err(|_| format!("invalid timeout: {:?}", s))
    }
}

impl Serialize for Timeout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timeout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ── Decision ─────────────────────────────────────────────────────────

/// One activity to schedule.
///
/// `name` is sent as the activity type name; `activity_type` selects the
/// catalog entry whose version is sent alongside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default)]
    pub schedule_to_start_timeout: Timeout,
    #[serde(default)]
    pub start_to_close_timeout: Timeout,
    #[serde(default)]
    pub schedule_to_close_timeout: Timeout,
    pub task_list: String,
    #[serde(default)]
    pub input: Option<String>,
}

impl Decision {
    /// A decision for `activity`, used both as type name and catalog key
    pub fn new(activity: impl Into<String>, task_list: impl Into<String>) -> Self {
        let activity = activity.into();
        Self {
            name: activity.clone(),
            activity_type: activity,
            schedule_to_start_timeout: Timeout::default(),
            start_to_close_timeout: Timeout::default(),
            schedule_to_close_timeout: Timeout::default(),
            task_list: task_list.into(),
            input: None,
        }
    }

    pub fn with_activity_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = activity_type.into();
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_timeouts(
        mut self,
        schedule_to_start: Timeout,
        start_to_close: Timeout,
        schedule_to_close: Timeout,
    ) -> Self {
        self.schedule_to_start_timeout = schedule_to_start;
        self.start_to_close_timeout = start_to_close;
        self.schedule_to_close_timeout = schedule_to_close;
        self
    }
}

// ── Broker Payloads ──────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleActivityTaskAttributes {
    pub activity_type: ActivityType,
    pub activity_id: ActivityId,
    pub schedule_to_start_timeout: Timeout,
    pub start_to_close_timeout: Timeout,
    pub schedule_to_close_timeout: Timeout,
    pub task_list: TaskList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

/// One instruction in a decision batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decisionType")]
pub enum BrokerDecision {
    #[serde(rename_all = "camelCase")]
    ScheduleActivityTask {
        schedule_activity_task_decision_attributes: ScheduleActivityTaskAttributes,
    },
}

impl BrokerDecision {
    pub fn activity_id(&self) -> &ActivityId {
        match self {
            BrokerDecision::ScheduleActivityTask {
                schedule_activity_task_decision_attributes: attrs,
            } => &attrs.activity_id,
        }
    }
}

/// Instructions submitted together when a decision task completes.
///
/// The broker schedules them in order; it does not order their execution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BrokerDecisionBatch {
    pub decisions: Vec<BrokerDecision>,
}

impl BrokerDecisionBatch {
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BrokerDecision> {
        self.decisions.iter()
    }
}

// ── Workflow Termination ─────────────────────────────────────────────

/// What happens to child workflows when their parent is terminated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChildPolicy {
    #[default]
    Terminate,
    RequestCancel,
    Abandon,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminateRequest {
    pub reason: String,
    pub details: String,
    pub child_policy: ChildPolicy,
}

impl TerminateRequest {
    pub fn new(reason: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            details: details.into(),
            child_policy: ChildPolicy::default(),
        }
    }

    pub fn with_child_policy(mut self, child_policy: ChildPolicy) -> Self {
        self.child_policy = child_policy;
        self
    }
}
