//! Activity Status Projection Engine for Taran
//!
//! The engine reconstructs what already happened in a workflow run from
//! the broker's event log. It never decides what to schedule next; that
//! belongs to the caller's decision policy.
//!
//! # Architecture
//!
//! - [`HistoryPaginator`]: Follows continuation tokens and merges every
//!   page of a run's history, in the broker's order
//! - [`correlate`]: Links lifecycle events to their scheduling event and
//!   emits one status record per match
//! - [`summarize`]: Turns correlated records into statuses, decoded
//!   results and status counts
//! - [`encode_schedule_batch`]: Shapes scheduling decisions into the
//!   broker's batch format
//! - [`Foreman`] / [`Worker`]: Broker-facing facades for decision and
//!   activity tasks
//!
//! # Example
//!
//! ```rust
//! use taran_engine::{correlate, summarize};
//! use taran_types::*;
//! use serde_json::json;
//!
//! let event = |id: u64, event_type: &str, attrs: serde_json::Value| {
//!     HistoryEvent::try_from(RawEvent::new(id, event_type).with_attributes(attrs)).unwrap()
//! };
//! let history = WorkflowHistory::new(vec![
//!     event(5, "ActivityTaskScheduled", json!({
//!         "activityType": {"name": "activity1", "version": "1"},
//!         "taskList": {"name": "default"}
//!     })),
//!     event(6, "ActivityTaskStarted", json!({"scheduledEventId": 5})),
//! ]);
//!
//! let records = correlate(&history, Some("activity1"), None).unwrap();
//! assert_eq!(records.len(), 2);
//!
//! let summary = summarize(&history, "activity1").unwrap();
//! assert_eq!(summary.count(ActivityStatus::Started), 1);
//! ```

#![deny(unsafe_code)]

pub mod aggregator;
pub mod broker;
pub mod config;
pub mod context;
pub mod correlator;
pub mod encoder;
pub mod foreman;
pub mod memory;
pub mod paginator;
pub mod telemetry;
pub mod worker;

pub use aggregator::{activity_results, decode_result, summarize};
pub use broker::{Broker, BrokerAck};
pub use config::{HistoryConfig, TaranConfig};
pub use context::RunContext;
pub use correlator::{correlate, scheduled_event_ids};
pub use encoder::{encode_schedule_batch, encode_schedule_batch_with};
pub use foreman::Foreman;
pub use memory::{InMemoryBroker, RecordedFailure, RecordedPoll, RecordedTermination};
pub use paginator::HistoryPaginator;
pub use telemetry::{init_tracing, LoggingConfig};
pub use worker::Worker;
