//! Decision encoder
//!
//! Turns the decision policy's [`Decision`]s into the batch the broker
//! accepts. Every decision gets a fresh invocation id, and the version sent
//! with it comes from the activity catalog.

use taran_types::{
    ActivityCatalog, ActivityId, ActivityType, BrokerDecision, BrokerDecisionBatch, Decision,
    ScheduleActivityTaskAttributes, TaranResult, TaskList,
};

/// Encode `decisions` in order, each with a new time-ordered id.
///
/// A decision whose type is missing from the catalog fails the whole batch.
pub fn encode_schedule_batch(
    decisions: &[Decision],
    catalog: &ActivityCatalog,
) -> TaranResult<BrokerDecisionBatch> {
    encode_schedule_batch_with(decisions, catalog, ActivityId::generate)
}

/// Like [`encode_schedule_batch`], drawing invocation ids from `next_id`
pub fn encode_schedule_batch_with(
    decisions: &[Decision],
    catalog: &ActivityCatalog,
    mut next_id: impl FnMut() -> ActivityId,
) -> TaranResult<BrokerDecisionBatch> {
    // Resolve every version first so nothing is generated for a failing batch
    let versions = decisions
        .iter()
        .map(|d| catalog.version_of(&d.activity_type))
        .collect::<TaranResult<Vec<_>>>()?;

    let decisions = decisions
        .iter()
        .zip(versions)
        .map(|(decision, version)| BrokerDecision::ScheduleActivityTask {
            schedule_activity_task_decision_attributes: ScheduleActivityTaskAttributes {
                activity_type: ActivityType {
                    name: decision.name.clone(),
                    version: version.to_string(),
                },
                activity_id: next_id(),
                schedule_to_start_timeout: decision.schedule_to_start_timeout,
                start_to_close_timeout: decision.start_to_close_timeout,
                schedule_to_close_timeout: decision.schedule_to_close_timeout,
                task_list: TaskList::new(decision.task_list.clone()),
                input: decision.input.clone(),
            },
        })
        .collect();

    Ok(BrokerDecisionBatch { decisions })
}
