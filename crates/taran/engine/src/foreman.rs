//! Foreman: the decision side of a workflow
//!
//! Reads a decision task's full history, projects activity statuses from
//! it, and submits the next batch of scheduling decisions. Which activities
//! to schedule is left to the caller.

use crate::aggregator;
use crate::broker::{Broker, BrokerAck};
use crate::config::TaranConfig;
use crate::context::RunContext;
use crate::encoder::encode_schedule_batch;
use crate::paginator::HistoryPaginator;
use serde_json::Value;
use std::sync::Arc;
use taran_types::{
    ActivityStatusSummary, BrokerDecisionBatch, BrokerError, Decision, DecisionTask, TaranError, TaranResult,
    TerminateRequest, WorkflowExecution, WorkflowHistory,
};
use tracing::Instrument;

/// Decision-task client bound to one configuration and broker
pub struct Foreman<'c> {
    config: &'c TaranConfig,
    broker: Arc<dyn Broker>,
}

impl<'c> Foreman<'c> {
    /// Bind to `broker` once its credentials pass the account check
    pub async fn connect(config: &'c TaranConfig, broker: Arc<dyn Broker>) -> TaranResult<Self> {
        config.verify_account(broker.as_ref()).await?;
        Ok(Self::new(config, broker))
    }

    pub(crate) fn new(config: &'c TaranConfig, broker: Arc<dyn Broker>) -> Self {
        Self { config, broker }
    }

    pub fn config(&self) -> &TaranConfig {
        self.config
    }

    /// Log context for a decision task
    pub fn context_for(&self, task: &DecisionTask) -> RunContext {
        RunContext::from_config(self.config)
            .with_workflow_type(&task.workflow_type)
            .with_execution(task.workflow_execution.clone())
    }

    /// Poll the foreman task list for a decision task.
    ///
    /// `Ok(None)` when the poll ends without a task. Access failures are
    /// returned as [`BrokerError::AccessDenied`] for the caller to act on.
    pub async fn poll(&self) -> TaranResult<Option<DecisionTask>> {
        let task_list = self.config.foreman_task_list.as_str();
        let ctx = RunContext::from_config(self.config);
        async {
            let polled = self
                .broker
                .poll_decision_task(
                    &self.config.domain_name,
                    task_list,
                    self.config.identity.as_deref(),
                )
                .await;
            match polled {
                Ok(Some(task)) => {
                    tracing::debug!(
                        task_list,
                        workflow_id = %task.workflow_execution.workflow_id,
                        run_id = %task.workflow_execution.run_id,
                        events = task.events.len(),
                        "Decision task received"
                    );
                    Ok(Some(task))
                }
                Ok(None) => {
                    tracing::trace!(task_list, "No decision task");
                    Ok(None)
                }
                Err(e @ BrokerError::AccessDenied(_)) => {
                    tracing::error!(task_list, error = %e, "Insufficient privileges to poll for decision");
                    Err(TaranError::from(e))
                }
                Err(e) => Err(TaranError::from(e)),
            }
        }
        .instrument(ctx.span())
        .await
    }

    fn paginator(&self) -> HistoryPaginator<'_, dyn Broker> {
        HistoryPaginator::from_config(self.broker.as_ref(), self.config)
    }

    /// The task's full history: its first page plus every remaining page
    pub async fn history_for(&self, task: &DecisionTask) -> TaranResult<WorkflowHistory> {
        let ctx = self.context_for(task);
        async {
            let history = self
                .paginator()
                .complete_history(&task.workflow_execution, task.seed_history())
                .await?;
            tracing::debug!(events = history.len(), "Decision task history loaded");
            Ok::<_, TaranError>(history)
        }
        .instrument(ctx.span())
        .await
    }

    /// A run's full history, fetched from the first page
    pub async fn fetch_history(&self, execution: &WorkflowExecution) -> TaranResult<WorkflowHistory> {
        let ctx = RunContext::from_config(self.config).with_execution(execution.clone());
        self.paginator()
            .fetch_full_history(execution)
            .instrument(ctx.span())
            .await
    }

    /// Status summary for one activity type
    pub fn activity_status(
        &self,
        history: &WorkflowHistory,
        activity_type: &str,
    ) -> TaranResult<ActivityStatusSummary> {
        let summary = aggregator::summarize(history, activity_type)?;
        tracing::debug!(
            activity_type,
            total = summary.total(),
            settled = summary.settled(),
            counts = ?summary.counts,
            "Activity status"
        );
        Ok(summary)
    }

    /// Decoded results of one activity type's completed invocations
    pub fn activity_results(
        &self,
        history: &WorkflowHistory,
        activity_type: &str,
    ) -> TaranResult<Vec<Value>> {
        aggregator::activity_results(history, activity_type)
    }

    /// Encode `decisions` and complete the decision task with them.
    ///
    /// Nothing is submitted when any decision names an unregistered activity.
    pub async fn schedule_activity_tasks(
        &self,
        task: &DecisionTask,
        decisions: &[Decision],
    ) -> TaranResult<BrokerDecisionBatch> {
        let ctx = self.context_for(task);
        async {
            let batch = encode_schedule_batch(decisions, &self.config.activities)?;
            self.broker
                .submit_decisions(&task.task_token, &batch)
                .await?;

            for decision in decisions {
                tracing::info!(
                    activity = %decision.name,
                    task_list = %decision.task_list,
                    "Scheduled activity"
                );
            }
            Ok::<_, TaranError>(batch)
        }
        .instrument(ctx.span())
        .await
    }

    /// Terminate a run; a run that no longer exists is reported, not an error
    pub async fn terminate(
        &self,
        execution: &WorkflowExecution,
        request: &TerminateRequest,
    ) -> TaranResult<BrokerAck> {
        let ctx = RunContext::from_config(self.config).with_execution(execution.clone());
        async {
            let result = self
                .broker
                .terminate_workflow(&self.config.domain_name, execution, request)
                .await;
            let ack = BrokerAck::from_result(result)?;
            match ack {
                BrokerAck::Accepted => {
                    tracing::info!(reason = %request.reason, "Workflow terminated")
                }
                BrokerAck::ExecutionGone => {
                    tracing::warn!("Workflow execution already gone; nothing to terminate")
                }
            }
            Ok::<_, TaranError>(ack)
        }
        .instrument(ctx.span())
        .await
    }
}
