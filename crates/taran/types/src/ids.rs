//! Identifiers shared by the event model and the broker payloads

use serde::{Deserialize, Serialize};

// ── Event Identifier ─────────────────────────────────────────────────

/// Position of an event within one workflow run's history.
///
/// Assigned by the broker, strictly increasing in log order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl EventId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Workflow Execution ───────────────────────────────────────────────

/// Reference to one run of a workflow
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecution {
    pub workflow_id: String,
    pub run_id: String,
}

impl WorkflowExecution {
    pub fn new(workflow_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
        }
    }
}

impl std::fmt::Display for WorkflowExecution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.workflow_id, self.run_id)
    }
}

// ── Activity Invocation Identifier ───────────────────────────────────

/// Caller-chosen identifier of one activity invocation
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub String);

impl ActivityId {
    /// Generate a fresh, time-ordered identifier (UUID v7)
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Task Token ───────────────────────────────────────────────────────

/// Opaque token the broker hands out with a decision or activity task
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskToken(pub String);

impl TaskToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials for one task; keep them out of logs.
impl std::fmt::Debug for TaskToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TaskToken(..{})", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_ordering() {
        assert!(EventId::new(5) < EventId::new(6));
        assert_eq!(EventId::from(7).value(), 7);
        assert_eq!(EventId::new(11).to_string(), "11");
    }

    #[test]
    fn test_event_id_serializes_as_number() {
        let json = serde_json::to_string(&EventId::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_activity_ids_are_unique() {
        let a = ActivityId::generate();
        let b = ActivityId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_task_token_debug_hides_value() {
        let token = TaskToken::new("secret-token");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_workflow_execution_wire_names() {
        let exec = WorkflowExecution::new("wf-1", "run-1");
        let json = serde_json::to_value(&exec).unwrap();
        assert_eq!(json["workflowId"], "wf-1");
        assert_eq!(json["runId"], "run-1");
        assert_eq!(exec.to_string(), "wf-1/run-1");
    }
}
