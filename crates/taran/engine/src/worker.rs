//! Worker: reports the outcome of activity tasks

use crate::broker::{Broker, BrokerAck};
use crate::config::TaranConfig;
use crate::context::RunContext;
use std::sync::Arc;
use taran_types::{ActivityTask, BrokerError, TaranError, TaranResult};
use tracing::Instrument;

/// Activity-task client bound to one configuration and broker
pub struct Worker<'c> {
    config: &'c TaranConfig,
    broker: Arc<dyn Broker>,
}

impl<'c> Worker<'c> {
    /// Bind to `broker` once its credentials pass the account check
    pub async fn connect(config: &'c TaranConfig, broker: Arc<dyn Broker>) -> TaranResult<Self> {
        config.verify_account(broker.as_ref()).await?;
        Ok(Self::new(config, broker))
    }

    pub(crate) fn new(config: &'c TaranConfig, broker: Arc<dyn Broker>) -> Self {
        Self { config, broker }
    }

    /// Poll `task_list` for an activity task; `Ok(None)` when none arrives
    pub async fn poll(&self, task_list: &str) -> TaranResult<Option<ActivityTask>> {
        let ctx = RunContext::from_config(self.config);
        async {
            tracing::debug!(task_list, "Polling for activity task");
            let polled = self
                .broker
                .poll_activity_task(
                    &self.config.domain_name,
                    task_list,
                    self.config.identity.as_deref(),
                )
                .await;
            let task = match polled {
                Ok(task) => task,
                Err(e @ BrokerError::AccessDenied(_)) => {
                    tracing::error!(task_list, error = %e, "Insufficient privileges to poll for task");
                    return Err(TaranError::from(e));
                }
                Err(e) => return Err(TaranError::from(e)),
            };

            if let Some(task) = &task {
                if !self.config.activities.contains(&task.activity_type.name) {
                    tracing::warn!(
                        activity = %task.activity_type.name,
                        "Polled activity type is not in the catalog"
                    );
                }
                tracing::info!(
                    activity = %task.activity_type.name,
                    activity_id = %task.activity_id,
                    run_id = %task.workflow_execution.run_id,
                    "Activity task received"
                );
            }
            Ok::<_, TaranError>(task)
        }
        .instrument(ctx.span())
        .await
    }

    fn context_for(&self, task: &ActivityTask) -> RunContext {
        RunContext::from_config(self.config).with_execution(task.workflow_execution.clone())
    }

    /// Report `task` as completed with `result`
    pub async fn complete(&self, task: &ActivityTask, result: &str) -> TaranResult<BrokerAck> {
        let response = self
            .broker
            .complete_activity(&task.task_token, result)
            .instrument(self.context_for(task).span())
            .await;
        self.acknowledge(task, "completed", response)
    }

    /// Report `task` as failed
    pub async fn fail(
        &self,
        task: &ActivityTask,
        reason: Option<&str>,
        details: Option<&str>,
    ) -> TaranResult<BrokerAck> {
        let response = self
            .broker
            .fail_activity(&task.task_token, reason, details)
            .instrument(self.context_for(task).span())
            .await;
        self.acknowledge(task, "failed", response)
    }

    fn acknowledge(
        &self,
        task: &ActivityTask,
        outcome: &str,
        response: Result<(), BrokerError>,
    ) -> TaranResult<BrokerAck> {
        let _entered = self.context_for(task).span().entered();
        let ack = BrokerAck::from_result(response)?;
        match ack {
            BrokerAck::Accepted => tracing::info!(
                activity = %task.activity_type.name,
                activity_id = %task.activity_id,
                outcome,
                "Activity task reported"
            ),
            // The workflow closed while the activity ran
            BrokerAck::ExecutionGone => tracing::warn!(
                activity = %task.activity_type.name,
                activity_id = %task.activity_id,
                outcome,
                "Workflow execution gone; activity outcome dropped"
            ),
        }
        Ok(ack)
    }
}
