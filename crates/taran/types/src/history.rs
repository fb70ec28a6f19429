//! Workflow histories and the tasks that carry them
//!
//! A [`WorkflowHistory`] is the ordered event log of one workflow run.
//! The broker serves it in pages; a history is complete once no
//! continuation token remains.

use crate::{
    ActivityType, EventId, EventKind, HistoryEvent, TaranError, TaranResult, TaskToken,
    WorkflowExecution, WorkflowType,
};
use serde::{Deserialize, Serialize};

/// Largest page the broker will return in one response
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Order in which the broker emits history pages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryOrder {
    /// Newest event first
    #[default]
    Reverse,
    /// Oldest event first
    Forward,
}

impl HistoryOrder {
    pub fn is_reverse(&self) -> bool {
        matches!(self, HistoryOrder::Reverse)
    }
}

/// Parameters of one `get_history_page` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryPageRequest {
    pub domain: String,
    pub execution: WorkflowExecution,
    pub next_page_token: Option<String>,
    pub maximum_page_size: u32,
    pub order: HistoryOrder,
}

/// One page of events as returned by the broker
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    #[serde(default)]
    pub events: Vec<HistoryEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl HistoryPage {
    pub fn new(events: Vec<HistoryEvent>, next_page_token: Option<String>) -> Self {
        Self {
            events,
            next_page_token,
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }
}

// ── Workflow History ─────────────────────────────────────────────────

/// The event log of one workflow run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkflowHistory {
    /// Events in the order the broker emitted them
    pub events: Vec<HistoryEvent>,
    /// Set while more pages remain to be fetched
    pub next_page_token: Option<String>,
    /// Id of the `DecisionTaskStarted` event of the previous decision task
    pub previous_started_event_id: Option<EventId>,
}

impl WorkflowHistory {
    pub fn new(events: Vec<HistoryEvent>) -> Self {
        Self {
            events,
            next_page_token: None,
            previous_started_event_id: None,
        }
    }

    pub fn with_next_page_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }

    pub fn with_previous_started_event_id(mut self, id: impl Into<EventId>) -> Self {
        self.previous_started_event_id = Some(id.into());
        self
    }

    /// True once every page has been merged
    pub fn is_complete(&self) -> bool {
        self.next_page_token.is_none()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// A copy of the events ordered by ascending event id.
    ///
    /// The merged history keeps the broker's order; this is for callers
    /// that want to walk the log forward.
    pub fn sorted_oldest_first(&self) -> Vec<HistoryEvent> {
        let mut events = self.events.clone();
        events.sort_by_key(|e| e.event_id);
        events
    }

    /// Decoded input of the `WorkflowExecutionStarted` event.
    ///
    /// `None` if that event is not part of this history or carried no input.
    pub fn workflow_input(&self) -> TaranResult<Option<serde_json::Value>> {
        let started = self.events.iter().find_map(|e| match &e.kind {
            EventKind::WorkflowExecutionStarted(attrs) => Some((e.event_id, attrs)),
            _ => None,
        });

        match started {
            Some((event_id, attrs)) => match attrs.input.as_deref() {
                Some(input) => serde_json::from_str(input)
                    .map(Some)
                    .map_err(|source| TaranError::Decoding { event_id, source }),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }
}

// ── Polled Tasks ─────────────────────────────────────────────────────

/// A decision task handed to a foreman, carrying the first history page
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTask {
    pub task_token: TaskToken,
    pub workflow_execution: WorkflowExecution,
    pub workflow_type: WorkflowType,
    #[serde(default)]
    pub events: Vec<HistoryEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub previous_started_event_id: Option<EventId>,
}

impl DecisionTask {
    /// The first page as a (possibly incomplete) history
    pub fn seed_history(&self) -> WorkflowHistory {
        WorkflowHistory {
            events: self.events.clone(),
            next_page_token: self.next_page_token.clone(),
            previous_started_event_id: self.previous_started_event_id,
        }
    }
}

/// An activity task handed to a worker
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTask {
    pub task_token: TaskToken,
    pub activity_id: crate::ActivityId,
    pub activity_type: ActivityType,
    pub workflow_execution: WorkflowExecution,
    #[serde(default)]
    pub input: Option<String>,
}
