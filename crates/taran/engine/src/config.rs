//! Process configuration
//!
//! Loaded once at start-up from a TOML file, validated, then passed by
//! reference to everything that needs it.

use crate::broker::Broker;
use crate::telemetry::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use taran_types::{ActivityCatalog, ConfigurationError, HistoryOrder, TaranResult, MAX_PAGE_SIZE};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaranConfig {
    /// Broker domain the workflow lives in
    pub domain_name: String,

    #[serde(default = "default_unset")]
    pub workflow_name: String,

    #[serde(default = "default_unset")]
    pub workflow_version: String,

    /// Task list foremen poll for decision tasks
    #[serde(default = "default_task_list")]
    pub foreman_task_list: String,

    /// Refuse to run outside this account, when set
    #[serde(default)]
    pub account_id: Option<String>,

    /// Identity reported to the broker when polling for tasks
    #[serde(default)]
    pub identity: Option<String>,

    /// Registered activity types
    #[serde(default)]
    pub activities: ActivityCatalog,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// History pagination settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Events per page, at most 1000
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub order: HistoryOrder,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            order: HistoryOrder::default(),
        }
    }
}

fn default_unset() -> String {
    "-".to_string()
}

fn default_task_list() -> String {
    "default".to_string()
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

impl TaranConfig {
    /// Minimal configuration for a domain; everything else at defaults
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            workflow_name: default_unset(),
            workflow_version: default_unset(),
            foreman_task_list: default_task_list(),
            account_id: None,
            identity: None,
            activities: ActivityCatalog::default(),
            history: HistoryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_workflow(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.workflow_name = name.into();
        self.workflow_version = version.into();
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_activities(mut self, activities: ActivityCatalog) -> Self {
        self.activities = activities;
        self
    }

    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigurationError> {
        let config: TaranConfig =
            toml::from_str(contents).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.domain_name.trim().is_empty() {
            return Err(ConfigurationError::Invalid(
                "domain_name must not be empty".into(),
            ));
        }
        if self.history.page_size == 0 || self.history.page_size > MAX_PAGE_SIZE {
            return Err(ConfigurationError::Invalid(format!(
                "history.page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.history.page_size
            )));
        }
        if matches!(&self.account_id, Some(id) if id.trim().is_empty()) {
            return Err(ConfigurationError::Invalid(
                "account_id must not be empty when set".into(),
            ));
        }
        self.activities.validate()
    }

    /// Reject credentials belonging to any account other than `account_id`.
    ///
    /// An account the broker cannot report does not satisfy a configured one.
    pub fn check_account(&self, actual: Option<&str>) -> Result<(), ConfigurationError> {
        match (self.account_id.as_deref(), actual) {
            (None, _) => Ok(()),
            (Some(expected), Some(actual)) if expected == actual => Ok(()),
            (Some(expected), actual) => Err(ConfigurationError::Invalid(format!(
                "refusing to run outside account {} (credentials belong to {})",
                expected,
                actual.unwrap_or("an unknown account")
            ))),
        }
    }

    /// Ask `broker` for the caller account and check it
    pub async fn verify_account(&self, broker: &dyn Broker) -> TaranResult<()> {
        if self.account_id.is_none() {
            return Ok(());
        }
        let actual = broker.caller_account().await?;
        if let Err(e) = self.check_account(actual.as_deref()) {
            tracing::error!(error = %e, "Account check failed");
            return Err(e.into());
        }
        Ok(())
    }
}
