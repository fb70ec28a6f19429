//! Domain Types for Taran
//!
//! Taran reads the event log a workflow broker keeps for each workflow run
//! and projects it into per-activity status. These are the types that flow
//! through that projection.
//!
//! # Key Concepts
//!
//! - **HistoryEvent**: One decoded entry of the event log. Every activity
//!   lifecycle event after `ActivityTaskScheduled` points back at the
//!   scheduling event through its `scheduled_event_id`.
//! - **WorkflowHistory**: The ordered event log of one run, plus the
//!   continuation token while pages are still outstanding.
//! - **ActivityStatusRecord**: One correlated lifecycle event of an
//!   activity invocation.
//! - **ActivityStatusSummary**: The caller-facing projection: statuses,
//!   decoded results and a frequency table.
//! - **Decision**: An activity the decision policy wants scheduled.
//! - **ActivityCatalog**: The registered activity types and their versions.

#![deny(unsafe_code)]

mod catalog;
mod decision;
mod errors;
mod event;
mod history;
mod ids;
mod status;

pub use catalog::*;
pub use decision::*;
pub use errors::*;
pub use event::*;
pub use history::*;
pub use ids::*;
pub use status::*;
