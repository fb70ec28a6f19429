//! Activity status projections
//!
//! [`ActivityStatusRecord`] is the fine-grained output of correlation: one
//! record per matching history event, ids included. [`ActivityStatusSummary`]
//! is the coarser caller-facing view: statuses (plus decoded results for
//! completions) and a frequency table.

use crate::EventId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle status of an activity invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Scheduled,
    Started,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
    CancelRequested,
}

impl ActivityStatus {
    pub const ALL: [ActivityStatus; 7] = [
        ActivityStatus::Scheduled,
        ActivityStatus::Started,
        ActivityStatus::Completed,
        ActivityStatus::Failed,
        ActivityStatus::TimedOut,
        ActivityStatus::Cancelled,
        ActivityStatus::CancelRequested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Scheduled => "scheduled",
            ActivityStatus::Started => "started",
            ActivityStatus::Completed => "completed",
            ActivityStatus::Failed => "failed",
            ActivityStatus::TimedOut => "timed_out",
            ActivityStatus::Cancelled => "cancelled",
            ActivityStatus::CancelRequested => "cancel_requested",
        }
    }

    /// No further lifecycle events follow this status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActivityStatus::Completed
                | ActivityStatus::Failed
                | ActivityStatus::TimedOut
                | ActivityStatus::Cancelled
        )
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Correlator Output ────────────────────────────────────────────────

/// One correlated lifecycle event of an activity invocation.
///
/// Records are never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActivityStatusRecord {
    Scheduled {
        event_id: EventId,
        task_list: String,
    },
    Started {
        event_id: EventId,
        scheduled_event_id: EventId,
        identity: Option<String>,
    },
    Completed {
        event_id: EventId,
        scheduled_event_id: EventId,
        /// Raw result payload; decoding is left to the caller
        result: Option<String>,
    },
    Failed {
        event_id: EventId,
    },
    TimedOut {
        event_id: EventId,
    },
    Cancelled {
        event_id: EventId,
    },
    CancelRequested {
        event_id: EventId,
    },
}

impl ActivityStatusRecord {
    pub fn status(&self) -> ActivityStatus {
        match self {
            ActivityStatusRecord::Scheduled { .. } => ActivityStatus::Scheduled,
            ActivityStatusRecord::Started { .. } => ActivityStatus::Started,
            ActivityStatusRecord::Completed { .. } => ActivityStatus::Completed,
            ActivityStatusRecord::Failed { .. } => ActivityStatus::Failed,
            ActivityStatusRecord::TimedOut { .. } => ActivityStatus::TimedOut,
            ActivityStatusRecord::Cancelled { .. } => ActivityStatus::Cancelled,
            ActivityStatusRecord::CancelRequested { .. } => ActivityStatus::CancelRequested,
        }
    }

    pub fn event_id(&self) -> EventId {
        match self {
            ActivityStatusRecord::Scheduled { event_id, .. }
            | ActivityStatusRecord::Started { event_id, .. }
            | ActivityStatusRecord::Completed { event_id, .. }
            | ActivityStatusRecord::Failed { event_id }
            | ActivityStatusRecord::TimedOut { event_id }
            | ActivityStatusRecord::Cancelled { event_id }
            | ActivityStatusRecord::CancelRequested { event_id } => *event_id,
        }
    }

    /// Back-reference carried by `started` and `completed` records
    pub fn scheduled_event_id(&self) -> Option<EventId> {
        match self {
            ActivityStatusRecord::Started {
                scheduled_event_id, ..
            }
            | ActivityStatusRecord::Completed {
                scheduled_event_id, ..
            } => Some(*scheduled_event_id),
            _ => None,
        }
    }
}

// ── Caller-Facing Summary ────────────────────────────────────────────

/// A status entry with ids stripped; completions carry their decoded result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: ActivityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl StatusEntry {
    pub fn new(status: ActivityStatus) -> Self {
        Self {
            status,
            result: None,
        }
    }

    pub fn completed(result: serde_json::Value) -> Self {
        Self {
            status: ActivityStatus::Completed,
            result: Some(result),
        }
    }
}

/// Ordered status entries and their frequency table.
///
/// Statuses that never occur are absent from `counts`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityStatusSummary {
    pub events: Vec<StatusEntry>,
    pub counts: BTreeMap<ActivityStatus, usize>,
}

impl ActivityStatusSummary {
    /// Build a summary, deriving `counts` from `events`
    pub fn from_entries(events: Vec<StatusEntry>) -> Self {
        let mut counts = BTreeMap::new();
        for entry in &events {
            *counts.entry(entry.status).or_insert(0) += 1;
        }
        Self { events, counts }
    }

    pub fn count(&self, status: ActivityStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Entries whose status admits no further lifecycle events
    pub fn settled(&self) -> usize {
        self.counts
            .iter()
            .filter(|(status, _)| status.is_terminal())
            .map(|(_, n)| n)
            .sum()
    }

    /// Decoded results of completed entries, in order
    pub fn results(&self) -> impl Iterator<Item = &serde_json::Value> {
        self.events.iter().filter_map(|e| e.result.as_ref())
    }
}
