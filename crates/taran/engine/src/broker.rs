//! The broker boundary
//!
//! Transport, authentication and retry policy belong to the implementor.
//! The engine only shapes requests and consumes responses.

use async_trait::async_trait;
use taran_types::{
    ActivityTask, BrokerDecisionBatch, BrokerError, DecisionTask, HistoryPage,
    HistoryPageRequest, TaskToken, TerminateRequest, WorkflowExecution,
};

/// Stateless RPCs against the workflow broker
#[async_trait]
pub trait Broker: Send + Sync {
    /// Account the broker credentials belong to, `None` if it cannot tell
    async fn caller_account(&self) -> Result<Option<String>, BrokerError>;

    /// Long-poll `task_list` for a decision task.
    ///
    /// `Ok(None)` means the poll timed out with no task assigned.
    async fn poll_decision_task(
        &self,
        domain: &str,
        task_list: &str,
        identity: Option<&str>,
    ) -> Result<Option<DecisionTask>, BrokerError>;

    /// Long-poll `task_list` for an activity task
    async fn poll_activity_task(
        &self,
        domain: &str,
        task_list: &str,
        identity: Option<&str>,
    ) -> Result<Option<ActivityTask>, BrokerError>;

    /// Fetch one page of a run's history.
    ///
    /// `Ok(None)` means the broker returned no response object at all,
    /// which is distinct from a page with no events.
    async fn get_history_page(
        &self,
        request: &HistoryPageRequest,
    ) -> Result<Option<HistoryPage>, BrokerError>;

    /// Complete a decision task with a batch of instructions
    async fn submit_decisions(
        &self,
        task_token: &TaskToken,
        batch: &BrokerDecisionBatch,
    ) -> Result<(), BrokerError>;

    /// Report an activity task as completed
    async fn complete_activity(&self, task_token: &TaskToken, result: &str)
        -> Result<(), BrokerError>;

    /// Report an activity task as failed
    async fn fail_activity(
        &self,
        task_token: &TaskToken,
        reason: Option<&str>,
        details: Option<&str>,
    ) -> Result<(), BrokerError>;

    /// Terminate a workflow run
    async fn terminate_workflow(
        &self,
        domain: &str,
        execution: &WorkflowExecution,
        request: &TerminateRequest,
    ) -> Result<(), BrokerError>;
}

/// How the broker received a write that targets a specific execution
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrokerAck {
    Accepted,
    /// The execution no longer exists (already closed or terminated)
    ExecutionGone,
}

impl BrokerAck {
    /// Fold an `UnknownExecution` failure into [`BrokerAck::ExecutionGone`];
    /// every other failure is returned unchanged
    pub fn from_result(result: Result<(), BrokerError>) -> Result<Self, BrokerError> {
        match result {
            Ok(()) => Ok(BrokerAck::Accepted),
            Err(BrokerError::UnknownExecution) => Ok(BrokerAck::ExecutionGone),
            Err(e) => Err(e),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, BrokerAck::Accepted)
    }
}
