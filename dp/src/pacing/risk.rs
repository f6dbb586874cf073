//! Risk detection over a pacing schedule

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::DEFAULT_OVERLOAD_THRESHOLD;
use crate::domain::{ExistingContext, PacingSchedule, PlanningWindow, RiskKind, RiskSignal, RiskSignalSet, Severity};

/// Runs the compression, overload and gap checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskDetector {
    /// Topics per week above which an overload signal fires
    pub overload_threshold: usize,
}

impl Default for RiskDetector {
    fn default() -> Self {
        Self {
            overload_threshold: DEFAULT_OVERLOAD_THRESHOLD,
        }
    }
}

impl RiskDetector {
    pub fn new(overload_threshold: usize) -> Self {
        Self { overload_threshold }
    }

    /// Check `schedule` against `available_weeks`
    ///
    /// `context` has no week mapping here, so gap signals carry no detail.
    pub fn detect(&self, schedule: &PacingSchedule, available_weeks: u32, context: &ExistingContext) -> RiskSignalSet {
        debug!(available_weeks, "RiskDetector::detect: called");
        self.run(schedule, available_weeks, context, None)
    }

    /// Check `schedule` against a planning window
    ///
    /// Gap weeks that already hold existing lessons or assessments are noted
    /// in the gap signal's detail.
    pub fn detect_in_window(
        &self,
        schedule: &PacingSchedule,
        window: &PlanningWindow,
        context: &ExistingContext,
    ) -> RiskSignalSet {
        debug!(available_weeks = window.available_weeks, "RiskDetector::detect_in_window: called");
        self.run(schedule, window.available_weeks, context, Some(window))
    }

    fn run(
        &self,
        schedule: &PacingSchedule,
        available_weeks: u32,
        context: &ExistingContext,
        window: Option<&PlanningWindow>,
    ) -> RiskSignalSet {
        let mut signals = RiskSignalSet::new();
        signals.extend(self.compression(schedule, available_weeks));
        signals.extend(self.overload(schedule));
        signals.extend(self.gap(schedule, available_weeks, context, window));

        debug!(
            signals = signals.len(),
            max_severity = ?signals.max_severity(),
            "RiskDetector::run: done"
        );
        signals
    }

    fn compression(&self, schedule: &PacingSchedule, available_weeks: u32) -> Option<RiskSignal> {
        let max_week = schedule.max_week();
        if max_week <= available_weeks {
            return None;
        }

        let overflow: Vec<u32> = (available_weeks + 1..=max_week).collect();
        Some(RiskSignal {
            kind: RiskKind::Compression,
            severity: Severity::Warning,
            message: format!(
                "Schedule needs {} week(s) but only {} are available; over by {}",
                max_week,
                available_weeks,
                overflow.len()
            ),
            affected_weeks: overflow,
            detail: None,
        })
    }

    fn overload(&self, schedule: &PacingSchedule) -> Vec<RiskSignal> {
        schedule
            .topics_per_week()
            .into_iter()
            .filter(|(_, count)| *count > self.overload_threshold)
            .map(|(week, count)| RiskSignal {
                kind: RiskKind::Overload,
                severity: Severity::Info,
                message: format!(
                    "Week {} has {} topics (threshold {})",
                    week, count, self.overload_threshold
                ),
                affected_weeks: vec![week],
                detail: None,
            })
            .collect()
    }

    fn gap(
        &self,
        schedule: &PacingSchedule,
        available_weeks: u32,
        context: &ExistingContext,
        window: Option<&PlanningWindow>,
    ) -> Option<RiskSignal> {
        let occupied = schedule.occupied_weeks();
        let gaps: Vec<u32> = (1..=available_weeks).filter(|w| !occupied.contains(w)).collect();
        if gaps.is_empty() {
            return None;
        }

        let detail = window.and_then(|window| gap_detail(&gaps, window, context));
        Some(RiskSignal {
            kind: RiskKind::Gap,
            severity: Severity::Info,
            message: format!("{} available week(s) have no planned topic", gaps.len()),
            affected_weeks: gaps,
            detail,
        })
    }
}

/// Describe existing items that fall in gap weeks, if any
fn gap_detail(gaps: &[u32], window: &PlanningWindow, context: &ExistingContext) -> Option<String> {
    if context.is_empty() {
        return None;
    }

    let mut seen = BTreeSet::new();
    let mut notes = Vec::new();
    for week in gaps {
        let span = window.week_span(*week, 1);
        for item in context.items_between(span.start, span.end) {
            if seen.insert(&item.id) {
                notes.push(format!("week {}: {} ({})", week, item.label, item.date));
            }
        }
    }

    if notes.is_empty() {
        None
    } else {
        Some(format!("Already on the calendar: {}", notes.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::build_window;
    use crate::domain::{ContextItem, DateRange, PlannedTopic, TopicId, UnitId};
    use crate::pacing::distribute;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn topic(id: &str, weeks: u32) -> PlannedTopic {
        PlannedTopic {
            topic_id: TopicId::from(id),
            topic_name: id.to_string(),
            unit_id: UnitId::from("u"),
            unit_name: "U".to_string(),
            weeks,
        }
    }

    fn schedule(weeks: &[u32]) -> PacingSchedule {
        let topics: Vec<_> = weeks.iter().enumerate().map(|(i, w)| topic(&format!("t{}", i), *w)).collect();
        distribute(&topics)
    }

    #[test]
    fn test_compression_names_overflow_weeks() {
        let signals = RiskDetector::default().detect(&schedule(&[2, 1, 3, 1, 1]), 7, &ExistingContext::default());

        let compression: Vec<_> = signals.of_kind(RiskKind::Compression).collect();
        assert_eq!(compression.len(), 1);
        assert_eq!(compression[0].severity, Severity::Warning);
        assert_eq!(compression[0].affected_weeks, vec![8]);
        assert_eq!(signals.of_kind(RiskKind::Gap).count(), 0);
    }

    #[test]
    fn test_no_compression_when_it_fits() {
        let signals = RiskDetector::default().detect(&schedule(&[1, 1, 1]), 3, &ExistingContext::default());
        assert!(signals.is_empty());
    }

    #[test]
    fn test_overload_counts_shared_weeks() {
        // Three zero-week topics share week 1 with a one-week topic
        let signals = RiskDetector::default().detect(&schedule(&[0, 0, 0, 1]), 1, &ExistingContext::default());

        let overload: Vec<_> = signals.of_kind(RiskKind::Overload).collect();
        assert_eq!(overload.len(), 1);
        assert_eq!(overload[0].affected_weeks, vec![1]);
        assert_eq!(overload[0].severity, Severity::Info);
        assert!(overload[0].message.contains("4 topics"));
    }

    #[test]
    fn test_overload_threshold_is_configurable() {
        let detector = RiskDetector::new(3);
        let signals = detector.detect(&schedule(&[0, 0, 1]), 1, &ExistingContext::default());
        assert_eq!(signals.of_kind(RiskKind::Overload).count(), 0);
    }

    #[test]
    fn test_gap_lists_unused_weeks() {
        let signals = RiskDetector::default().detect(&schedule(&[1, 1]), 5, &ExistingContext::default());

        let gap: Vec<_> = signals.of_kind(RiskKind::Gap).collect();
        assert_eq!(gap.len(), 1);
        assert_eq!(gap[0].affected_weeks, vec![3, 4, 5]);
        assert!(gap[0].detail.is_none());
    }

    #[test]
    fn test_empty_schedule_is_all_gap() {
        let signals = RiskDetector::default().detect(&PacingSchedule::default(), 2, &ExistingContext::default());
        assert_eq!(signals.len(), 1);
        assert_eq!(signals.iter().next().unwrap().affected_weeks, vec![1, 2]);
    }

    #[test]
    fn test_gap_detail_mentions_existing_items() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 4, day).unwrap();
        // Two full weeks of weekdays: Apr 1-5 and Apr 8-12
        let teaching: Vec<_> = (1..=5).chain(8..=12).map(d).collect();
        let window = build_window(DateRange::new(d(1), d(12)).unwrap(), &teaching, &[], 5);
        let context = ExistingContext {
            scheduled_items: vec![ContextItem::new("l1", d(2), "Lab day")],
            assessment_items: vec![ContextItem::new("a1", d(10), "Unit quiz")],
        };

        let signals = RiskDetector::default().detect_in_window(&schedule(&[1]), &window, &context);

        let gap = signals.of_kind(RiskKind::Gap).next().unwrap();
        assert_eq!(gap.affected_weeks, vec![2]);
        let detail = gap.detail.as_deref().unwrap();
        assert!(detail.contains("Unit quiz"));
        assert!(!detail.contains("Lab day"));
    }

    proptest! {
        #[test]
        fn prop_compression_iff_overflow(
            weeks in proptest::collection::vec(1u32..4, 0..15),
            available in 0u32..30,
        ) {
            let schedule = schedule(&weeks);
            let signals = RiskDetector::default().detect(&schedule, available, &ExistingContext::default());

            let total: u32 = weeks.iter().sum();
            let compression: Vec<_> = signals.of_kind(RiskKind::Compression).collect();
            if total > available {
                prop_assert_eq!(compression.len(), 1);
                prop_assert_eq!(compression[0].affected_weeks.clone(), (available + 1..=total).collect::<Vec<u32>>());
            } else {
                prop_assert!(compression.is_empty());
            }
            prop_assert!(signals.iter().all(|s| s.severity != Severity::Critical));
        }

        #[test]
        fn prop_gaps_are_unoccupied_available_weeks(
            weeks in proptest::collection::vec(0u32..4, 0..15),
            available in 0u32..30,
            threshold in 1usize..4,
        ) {
            let schedule = schedule(&weeks);
            let signals = RiskDetector::new(threshold).detect(&schedule, available, &ExistingContext::default());
            let occupied = schedule.occupied_weeks();

            let gaps: Vec<u32> = signals.of_kind(RiskKind::Gap).flat_map(|s| s.affected_weeks.clone()).collect();
            prop_assert!(gaps.iter().all(|w| (1..=available).contains(w)));
            prop_assert!(gaps.iter().all(|w| !occupied.contains(w)));

            let expected: Vec<u32> = (1..=available).filter(|w| !occupied.contains(w)).collect();
            prop_assert_eq!(gaps, expected);

            for signal in signals.of_kind(RiskKind::Overload) {
                prop_assert!(signal.severity <= Severity::Info);
                prop_assert_eq!(signal.affected_weeks.len(), 1);
            }
        }
    }
}
