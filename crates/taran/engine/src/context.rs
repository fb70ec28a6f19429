//! Log context for broker-facing operations

use crate::config::TaranConfig;
use taran_types::{WorkflowExecution, WorkflowType};

/// Identifies the workflow run an operation belongs to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunContext {
    pub domain: String,
    pub workflow_name: String,
    pub workflow_version: String,
    pub execution: Option<WorkflowExecution>,
}

impl RunContext {
    pub fn from_config(config: &TaranConfig) -> Self {
        Self {
            domain: config.domain_name.clone(),
            workflow_name: config.workflow_name.clone(),
            workflow_version: config.workflow_version.clone(),
            execution: None,
        }
    }

    pub fn with_execution(mut self, execution: WorkflowExecution) -> Self {
        self.execution = Some(execution);
        self
    }

    /// Name and version as reported by the broker for this run
    pub fn with_workflow_type(mut self, workflow_type: &WorkflowType) -> Self {
        self.workflow_name = workflow_type.name.clone();
        self.workflow_version = workflow_type.version.clone();
        self
    }

    /// Span carrying domain, workflow type and run identifiers
    pub fn span(&self) -> tracing::Span {
        let (workflow_id, run_id) = match &self.execution {
            Some(e) => (e.workflow_id.as_str(), e.run_id.as_str()),
            None => ("-", "-"),
        };
        tracing::info_span!(
            "workflow",
            domain = %self.domain,
            workflow = %self.workflow_name,
            version = %self.workflow_version,
            workflow_id = %workflow_id,
            run_id = %run_id,
        )
    }
}
