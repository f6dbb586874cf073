//! Pacing schedule: week slots holding topics

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::curriculum::PlannedTopic;

/// One week-indexed entry in a pacing schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSlot {
    /// Starting week (1-based)
    pub week: u32,
    /// Weeks occupied by the longest topic in this slot (at least 1)
    pub span_weeks: u32,
    /// Topics starting in this week, in schedule order
    pub topics: Vec<PlannedTopic>,
}

impl WeekSlot {
    /// Last week this slot occupies
    pub fn last_week(&self) -> u32 {
        self.week.saturating_add(self.span_weeks.max(1) - 1)
    }
}

/// Ordered week slots produced by the distributor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingSchedule {
    pub slots: Vec<WeekSlot>,
}

impl PacingSchedule {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of topics across all slots
    pub fn topic_count(&self) -> usize {
        self.slots.iter().map(|s| s.topics.len()).sum()
    }

    /// Highest week occupied by any slot (0 for an empty schedule)
    pub fn max_week(&self) -> u32 {
        self.slots.iter().map(WeekSlot::last_week).max().unwrap_or(0)
    }

    /// Every week occupied by at least one topic
    pub fn occupied_weeks(&self) -> BTreeSet<u32> {
        self.slots.iter().flat_map(|s| s.week..=s.last_week()).collect()
    }

    /// Number of topics occupying each week
    ///
    /// A topic occupies every week of its own span, so two topics sharing a
    /// slot count separately even when only one of them is long.
    pub fn topics_per_week(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for slot in &self.slots {
            for topic in &slot.topics {
                for week in slot.week..slot.week + topic.weeks.max(1) {
                    *counts.entry(week).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Iterate (slot, topic) pairs in week order
    pub fn iter_topics(&self) -> impl Iterator<Item = (&WeekSlot, &PlannedTopic)> {
        let mut slots: Vec<&WeekSlot> = self.slots.iter().collect();
        slots.sort_by_key(|s| s.week);
        slots
            .into_iter()
            .flat_map(|slot| slot.topics.iter().map(move |topic| (slot, topic)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TopicId, UnitId};

    fn topic(id: &str, weeks: u32) -> PlannedTopic {
        PlannedTopic {
            topic_id: TopicId::from(id),
            topic_name: id.to_uppercase(),
            unit_id: UnitId::from("u1"),
            unit_name: "Unit".to_string(),
            weeks,
        }
    }

    fn slot(week: u32, topics: Vec<PlannedTopic>) -> WeekSlot {
        let span_weeks = topics.iter().map(|t| t.weeks.max(1)).max().unwrap_or(1);
        WeekSlot {
            week,
            span_weeks,
            topics,
        }
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = PacingSchedule::default();
        assert!(schedule.is_empty());
        assert_eq!(schedule.max_week(), 0);
        assert!(schedule.occupied_weeks().is_empty());
    }

    #[test]
    fn test_max_week_counts_span() {
        let schedule = PacingSchedule {
            slots: vec![slot(1, vec![topic("a", 2)]), slot(3, vec![topic("b", 3)])],
        };
        assert_eq!(schedule.max_week(), 5);
        assert_eq!(schedule.occupied_weeks(), (1..=5).collect::<BTreeSet<u32>>());
    }

    #[test]
    fn test_topics_per_week_shared_slot() {
        let schedule = PacingSchedule {
            slots: vec![slot(1, vec![topic("a", 0), topic("b", 0), topic("c", 2)])],
        };
        let counts = schedule.topics_per_week();
        assert_eq!(counts[&1], 3);
        assert_eq!(counts[&2], 1);
        assert_eq!(schedule.topic_count(), 3);
    }

    #[test]
    fn test_iter_topics_in_week_order() {
        let schedule = PacingSchedule {
            slots: vec![slot(2, vec![topic("b", 1)]), slot(1, vec![topic("a", 1)])],
        };
        let ids: Vec<_> = schedule.iter_topics().map(|(_, t)| t.topic_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
