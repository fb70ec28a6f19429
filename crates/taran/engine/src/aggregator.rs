//! Status aggregator: the caller-facing view of an activity type's history
//!
//! A result payload that fails to decode fails the whole summary; partial
//! summaries are never returned.

use crate::correlator::correlate;
use serde_json::Value;
use taran_types::{
    ActivityStatusRecord, ActivityStatusSummary, EventId, StatusEntry, TaranError, TaranResult,
    WorkflowHistory,
};

/// Statuses and status counts for every invocation of `activity_type`
pub fn summarize(history: &WorkflowHistory, activity_type: &str) -> TaranResult<ActivityStatusSummary> {
    let entries = correlate(history, Some(activity_type), None)?
        .into_iter()
        .map(|record| match record {
            ActivityStatusRecord::Completed {
                event_id, result, ..
            } => decode_result(event_id, result.as_deref()).map(StatusEntry::completed),
            other => Ok(StatusEntry::new(other.status())),
        })
        .collect::<TaranResult<Vec<_>>>()?;

    Ok(ActivityStatusSummary::from_entries(entries))
}

/// Decoded results of the completed invocations of `activity_type`, in history order
pub fn activity_results(history: &WorkflowHistory, activity_type: &str) -> TaranResult<Vec<Value>> {
    correlate(history, Some(activity_type), None)?
        .into_iter()
        .filter_map(|record| match record {
            ActivityStatusRecord::Completed {
                event_id, result, ..
            } => Some(decode_result(event_id, result.as_deref())),
            _ => None,
        })
        .collect()
}

/// Parse a completion payload; an absent payload is `null`
pub fn decode_result(event_id: EventId, result: Option<&str>) -> TaranResult<Value> {
    match result {
        Some(raw) => {
            serde_json::from_str(raw).map_err(|source| TaranError::Decoding { event_id, source })
        }
        None => Ok(Value::Null),
    }
}
