//! Activity correlator
//!
//! Links every activity lifecycle event back to the `ActivityTaskScheduled`
//! event it belongs to and emits one [`ActivityStatusRecord`] per match, in
//! history order.
//!
//! Selection works in two phases. Given only an activity type, a pre-pass
//! collects the ids of that type's scheduled events; the main pass then
//! keeps lifecycle events referencing one of those ids. The `scheduled`
//! branch of the main pass matches on the type name alone, so a caller that
//! passes a restricted id set together with a type still receives every
//! scheduled event of that type.

use std::collections::BTreeSet;
use taran_types::{
    ActivityStatusRecord, EventId, EventKind, HistoryEvent, TaranError, TaranResult,
    WorkflowHistory,
};

/// How the scheduled-id set for the main pass was obtained
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Ids discovered by scanning for the activity type
    ByType,
    /// Ids supplied by the caller
    ByIds,
}

/// Correlate the history's activity events for a type and/or scheduled ids.
///
/// An empty type name or an empty id set counts as not supplied; supplying
/// neither is [`TaranError::MissingSelector`].
pub fn correlate(
    history: &WorkflowHistory,
    activity_type: Option<&str>,
    scheduled_ids: Option<&BTreeSet<EventId>>,
) -> TaranResult<Vec<ActivityStatusRecord>> {
    let activity_type = activity_type.filter(|t| !t.is_empty());
    let scheduled_ids = scheduled_ids.filter(|ids| !ids.is_empty());

    let (phase, ids) = match (scheduled_ids, activity_type) {
        (Some(ids), _) => (Phase::ByIds, ids.clone()),
        (None, Some(activity_type)) => (
            Phase::ByType,
            scheduled_event_ids(&history.events, activity_type),
        ),
        (None, None) => return Err(TaranError::MissingSelector),
    };

    if ids.is_empty() {
        tracing::trace!(activity_type = ?activity_type, "No scheduled events for activity type");
        return Ok(Vec::new());
    }

    let records: Vec<ActivityStatusRecord> = history
        .events
        .iter()
        .filter_map(|event| correlate_event(event, activity_type, &ids))
        .collect();

    tracing::trace!(
        activity_type = ?activity_type,
        ?phase,
        scheduled = ids.len(),
        records = records.len(),
        "Activity events correlated"
    );
    Ok(records)
}

/// Ids of every `ActivityTaskScheduled` event whose activity type is `activity_type`
pub fn scheduled_event_ids(events: &[HistoryEvent], activity_type: &str) -> BTreeSet<EventId> {
    events
        .iter()
        .filter(|e| e.scheduled_activity_name() == Some(activity_type))
        .map(|e| e.event_id)
        .collect()
}

fn correlate_event(
    event: &HistoryEvent,
    activity_type: Option<&str>,
    ids: &BTreeSet<EventId>,
) -> Option<ActivityStatusRecord> {
    let event_id = event.event_id;
    let linked = |scheduled: &EventId| ids.contains(scheduled);

    match &event.kind {
        EventKind::ActivityTaskScheduled(attrs) => {
            let same_type = activity_type == Some(attrs.activity_type.name.as_str());
            same_type.then(|| ActivityStatusRecord::Scheduled {
                event_id,
                task_list: attrs.task_list.name.clone(),
            })
        }
        EventKind::ActivityTaskStarted(attrs) => {
            linked(&attrs.scheduled_event_id).then(|| ActivityStatusRecord::Started {
                event_id,
                scheduled_event_id: attrs.scheduled_event_id,
                identity: attrs.identity.clone(),
            })
        }
        EventKind::ActivityTaskCompleted(attrs) => {
            linked(&attrs.scheduled_event_id).then(|| ActivityStatusRecord::Completed {
                event_id,
                scheduled_event_id: attrs.scheduled_event_id,
                result: attrs.result.clone(),
            })
        }
        EventKind::ActivityTaskFailed(attrs) => linked(&attrs.scheduled_event_id)
            .then_some(ActivityStatusRecord::Failed { event_id }),
        EventKind::ActivityTaskTimedOut(attrs) => linked(&attrs.scheduled_event_id)
            .then_some(ActivityStatusRecord::TimedOut { event_id }),
        EventKind::ActivityTaskCanceled(attrs) => linked(&attrs.scheduled_event_id)
            .then_some(ActivityStatusRecord::Cancelled { event_id }),
        EventKind::ActivityTaskCancelRequested(attrs) => linked(&attrs.scheduled_event_id)
            .then_some(ActivityStatusRecord::CancelRequested { event_id }),
        // Decision events are not decision input
        EventKind::DecisionTask { .. } => None,
        EventKind::WorkflowExecutionStarted(_) | EventKind::Other { .. } => None,
    }
}
