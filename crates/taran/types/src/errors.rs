//! Error types for the Taran layer

use crate::EventId;

/// Errors that can occur while projecting a workflow history or shaping
/// broker payloads
#[derive(Debug, thiserror::Error)]
pub enum TaranError {
    #[error("scheduled_ids and/or activity_type required")]
    MissingSelector,

    #[error("No response for history page {page} (token: {next_page_token:?})")]
    TransportExhausted {
        page: usize,
        next_page_token: Option<String>,
    },

    #[error("Malformed result payload in event {event_id}: {source}")]
    Decoding {
        event_id: EventId,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Malformed {event_type} event {event_id}: {reason}")]
    MalformedEvent {
        event_id: EventId,
        event_type: String,
        reason: String,
    },

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),
}

/// Configuration problems, including activity types missing from the catalog
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Activity type not registered in catalog: {activity_type}")]
    UnregisteredActivity { activity_type: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Failures reported by the broker transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    /// The workflow execution no longer exists (already closed or terminated)
    #[error("Unknown workflow execution")]
    UnknownExecution,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Transport failure: {0}")]
    Transport(String),
}

/// Result type alias for Taran operations
pub type TaranResult<T> = Result<T, TaranError>;
