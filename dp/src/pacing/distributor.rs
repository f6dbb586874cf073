//! Sequential week distributor

use tracing::debug;

use crate::domain::{PacingSchedule, PlannedTopic, WeekSlot};

/// Assign topics to weeks in input order
///
/// Each topic starts at the current week cursor, which then advances by the
/// topic's duration. Topics that start on the same week (only possible after
/// a zero-week topic) share one slot.
///
/// The planning window is not an input: topics that run past the available
/// weeks are kept, and the risk detector reports the overflow.
pub fn distribute(topics: &[PlannedTopic]) -> PacingSchedule {
    debug!(topics = topics.len(), "distribute: called");
    let mut slots: Vec<WeekSlot> = Vec::new();
    let mut cursor: u32 = 1;

    for topic in topics {
        let span = topic.weeks.max(1);
        match slots.last_mut() {
            Some(slot) if slot.week == cursor => {
                slot.span_weeks = slot.span_weeks.max(span);
                slot.topics.push(topic.clone());
            }
            _ => slots.push(WeekSlot {
                week: cursor,
                span_weeks: span,
                topics: vec![topic.clone()],
            }),
        }
        cursor = cursor.saturating_add(topic.weeks);
    }

    let schedule = PacingSchedule { slots };
    debug!(
        slots = schedule.slots.len(),
        max_week = schedule.max_week(),
        "distribute: done"
    );
    schedule
}
