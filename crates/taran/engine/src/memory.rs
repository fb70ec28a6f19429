//! In-memory broker for development and testing.
//!
//! Serves scripted history pages keyed by continuation token and records
//! every write it receives. Not suitable for production use.

use crate::broker::Broker;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use taran_types::{
    ActivityTask, BrokerDecisionBatch, BrokerError, DecisionTask, HistoryEvent, HistoryPage,
    HistoryPageRequest, TaskToken, TerminateRequest, WorkflowExecution,
};

/// A recorded poll for either kind of task
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedPoll {
    pub domain: String,
    pub task_list: String,
    pub identity: Option<String>,
}

/// A recorded `fail_activity` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedFailure {
    pub task_token: TaskToken,
    pub reason: Option<String>,
    pub details: Option<String>,
}

/// A recorded `terminate_workflow` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedTermination {
    pub domain: String,
    pub execution: WorkflowExecution,
    pub request: TerminateRequest,
}

/// Scripted [`Broker`] implementation
#[derive(Default)]
pub struct InMemoryBroker {
    /// Pages indexed by the token that requests them (`None` for the first page)
    pages: HashMap<Option<String>, HistoryPage>,
    history_error: Option<BrokerError>,
    poll_error: Option<BrokerError>,
    account: Option<String>,
    execution_gone: RwLock<bool>,

    /// Tasks handed out one per poll, oldest first
    decision_tasks: RwLock<VecDeque<DecisionTask>>,
    activity_tasks: RwLock<VecDeque<ActivityTask>>,

    requests: RwLock<Vec<HistoryPageRequest>>,
    polls: RwLock<Vec<RecordedPoll>>,
    submitted: RwLock<Vec<(TaskToken, BrokerDecisionBatch)>>,
    completions: RwLock<Vec<(TaskToken, String)>>,
    failures: RwLock<Vec<RecordedFailure>>,
    terminations: RwLock<Vec<RecordedTermination>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` for requests carrying `token`. Tokens with no page
    /// scripted get no response at all.
    pub fn with_page(mut self, token: Option<&str>, page: HistoryPage) -> Self {
        self.pages.insert(token.map(str::to_string), page);
        self
    }

    /// Serve `pages` in sequence, linked by generated tokens
    /// (`page-1`, `page-2`, ...)
    pub fn from_pages(pages: Vec<Vec<HistoryEvent>>) -> Self {
        let count = pages.len();
        pages
            .into_iter()
            .enumerate()
            .fold(Self::new(), |broker, (index, events)| {
                let token = (index > 0).then(|| format!("page-{}", index));
                let next = (index + 1 < count).then(|| format!("page-{}", index + 1));
                broker.with_page(token.as_deref(), HistoryPage::new(events, next))
            })
    }

    /// Fail every history request with `error`
    pub fn failing_history_with(mut self, error: BrokerError) -> Self {
        self.history_error = Some(error);
        self
    }

    /// Fail every poll with `error`
    pub fn failing_polls_with(mut self, error: BrokerError) -> Self {
        self.poll_error = Some(error);
        self
    }

    /// Report `account` as the owner of the broker credentials
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Queue a decision task for the next poll
    pub fn with_decision_task(self, task: DecisionTask) -> Self {
        self.decision_tasks.write().push_back(task);
        self
    }

    /// Queue an activity task for the next poll
    pub fn with_activity_task(self, task: ActivityTask) -> Self {
        self.activity_tasks.write().push_back(task);
        self
    }

    /// Reject every later write with [`BrokerError::UnknownExecution`]
    pub fn mark_execution_gone(&self) {
        *self.execution_gone.write() = true;
    }

    pub fn history_requests(&self) -> Vec<HistoryPageRequest> {
        self.requests.read().clone()
    }

    pub fn polls(&self) -> Vec<RecordedPoll> {
        self.polls.read().clone()
    }

    pub fn submitted(&self) -> Vec<(TaskToken, BrokerDecisionBatch)> {
        self.submitted.read().clone()
    }

    pub fn completions(&self) -> Vec<(TaskToken, String)> {
        self.completions.read().clone()
    }

    pub fn failures(&self) -> Vec<RecordedFailure> {
        self.failures.read().clone()
    }

    pub fn terminations(&self) -> Vec<RecordedTermination> {
        self.terminations.read().clone()
    }

    fn record_poll(
        &self,
        domain: &str,
        task_list: &str,
        identity: Option<&str>,
    ) -> Result<(), BrokerError> {
        self.polls.write().push(RecordedPoll {
            domain: domain.to_string(),
            task_list: task_list.to_string(),
            identity: identity.map(str::to_string),
        });
        match &self.poll_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn check_execution(&self) -> Result<(), BrokerError> {
        if *self.execution_gone.read() {
            return Err(BrokerError::UnknownExecution);
        }
        Ok(())
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn caller_account(&self) -> Result<Option<String>, BrokerError> {
        Ok(self.account.clone())
    }

    async fn poll_decision_task(
        &self,
        domain: &str,
        task_list: &str,
        identity: Option<&str>,
    ) -> Result<Option<DecisionTask>, BrokerError> {
        self.record_poll(domain, task_list, identity)?;
        Ok(self.decision_tasks.write().pop_front())
    }

    async fn poll_activity_task(
        &self,
        domain: &str,
        task_list: &str,
        identity: Option<&str>,
    ) -> Result<Option<ActivityTask>, BrokerError> {
        self.record_poll(domain, task_list, identity)?;
        Ok(self.activity_tasks.write().pop_front())
    }

    async fn get_history_page(
        &self,
        request: &HistoryPageRequest,
    ) -> Result<Option<HistoryPage>, BrokerError> {
        self.requests.write().push(request.clone());
        if let Some(error) = &self.history_error {
            return Err(error.clone());
        }
        Ok(self.pages.get(&request.next_page_token).cloned())
    }

    async fn submit_decisions(
        &self,
        task_token: &TaskToken,
        batch: &BrokerDecisionBatch,
    ) -> Result<(), BrokerError> {
        self.check_execution()?;
        self.submitted
            .write()
            .push((task_token.clone(), batch.clone()));
        Ok(())
    }

    async fn complete_activity(
        &self,
        task_token: &TaskToken,
        result: &str,
    ) -> Result<(), BrokerError> {
        self.check_execution()?;
        self.completions
            .write()
            .push((task_token.clone(), result.to_string()));
        Ok(())
    }

    async fn fail_activity(
        &self,
        task_token: &TaskToken,
        reason: Option<&str>,
        details: Option<&str>,
    ) -> Result<(), BrokerError> {
        self.check_execution()?;
        self.failures.write().push(RecordedFailure {
            task_token: task_token.clone(),
            reason: reason.map(str::to_string),
            details: details.map(str::to_string),
        });
        Ok(())
    }

    async fn terminate_workflow(
        &self,
        domain: &str,
        execution: &WorkflowExecution,
        request: &TerminateRequest,
    ) -> Result<(), BrokerError> {
        self.check_execution()?;
        self.terminations.write().push(RecordedTermination {
            domain: domain.to_string(),
            execution: execution.clone(),
            request: request.clone(),
        });
        Ok(())
    }
}
