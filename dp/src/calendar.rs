//! CalendarWindow calculator
//!
//! Turns a date range into usable teaching time for a scope.
//!
//! # Precedence
//! Exclusions override teaching dates. A date is usable iff:
//! - the calendar source lists it as a teaching date, AND
//! - it does NOT fall within any exclusion span.
//!
//! Week counts are an approximation (`days / days_per_week`); nothing here
//! claims alignment to Monday–Friday calendar weeks.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{CalendarExclusion, DateRange, LostDay, PlanningWindow, Scope};
use crate::error::PlanError;
use crate::source::CalendarSource;

/// Computes planning windows from calendar data
#[derive(Clone)]
pub struct WindowCalculator {
    source: Arc<dyn CalendarSource>,
    days_per_week: u32,
}

impl WindowCalculator {
    pub fn new(source: Arc<dyn CalendarSource>, days_per_week: u32) -> Self {
        Self {
            source,
            days_per_week: days_per_week.max(1),
        }
    }

    /// Compute the planning window for `scope` over `start..=end`
    pub async fn compute(&self, scope: &Scope, start: NaiveDate, end: NaiveDate) -> Result<PlanningWindow, PlanError> {
        let range = DateRange::new(start, end)?;
        self.compute_range(scope, range).await
    }

    /// Compute the planning window for an already-validated range
    pub async fn compute_range(&self, scope: &Scope, range: DateRange) -> Result<PlanningWindow, PlanError> {
        debug!(%scope, %range, "WindowCalculator::compute_range: called");
        let teaching_dates = self.source.teaching_dates(scope, &range).await?;
        let exclusions = self.source.exclusions(scope, &range).await?;

        let window = build_window(range, &teaching_dates, &exclusions, self.days_per_week);
        debug!(
            available_teaching_days = window.available_teaching_days,
            available_weeks = window.available_weeks,
            lost_days = window.lost_days.len(),
            "WindowCalculator::compute_range: window built"
        );
        Ok(window)
    }
}

/// Derive a planning window from raw calendar data
///
/// Inputs outside `range` are ignored, so sources may over-fetch.
pub fn build_window(
    range: DateRange,
    teaching_dates: &[NaiveDate],
    exclusions: &[CalendarExclusion],
    days_per_week: u32,
) -> PlanningWindow {
    let days_per_week = days_per_week.max(1);

    // One entry per (date, reason); BTreeSet keeps them sorted and unique
    let mut lost: BTreeSet<LostDay> = BTreeSet::new();
    let mut excluded: BTreeSet<NaiveDate> = BTreeSet::new();
    for exclusion in exclusions {
        let Some(span) = exclusion.span.intersect(&range) else {
            continue;
        };
        for date in span.days() {
            excluded.insert(date);
            lost.insert(LostDay {
                date,
                reason: exclusion.reason,
                description: None,
            });
        }
    }

    let teaching_days: Vec<NaiveDate> = teaching_dates
        .iter()
        .copied()
        .filter(|d| range.contains(*d) && !excluded.contains(d))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // Descriptions are attached after de-duplication so two exclusions with the
    // same reason on one date still yield a single lost day
    let lost_days = lost
        .into_iter()
        .map(|mut day| {
            day.description = exclusions
                .iter()
                .filter(|e| e.reason == day.reason && e.span.contains(day.date))
                .find_map(|e| e.description.clone());
            day
        })
        .collect();

    let available_teaching_days = teaching_days.len();
    PlanningWindow {
        range,
        available_weeks: (available_teaching_days / days_per_week as usize) as u32,
        available_teaching_days,
        teaching_days,
        days_per_week,
        lost_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExclusionReason;
    use crate::source::MemorySource;
    use proptest::prelude::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    fn scope() -> Scope {
        Scope::new("north", "g9", "math")
    }

    /// Weekdays Jan 15 – Mar 15 2024, two holidays, a five-day exam period
    fn winter_term() -> MemorySource {
        MemorySource::new()
            .with_weekdays("north", range(d(1, 15), d(3, 15)))
            .with_exclusion(
                "north",
                CalendarExclusion::new("presidents", DateRange::single(d(2, 19)), ExclusionReason::Holiday)
                    .with_description("Presidents Day"),
            )
            .with_exclusion(
                "north",
                CalendarExclusion::new("inservice", DateRange::single(d(1, 26)), ExclusionReason::Holiday),
            )
            .with_exclusion(
                "north",
                CalendarExclusion::new("midterms", range(d(3, 4), d(3, 8)), ExclusionReason::ExamPeriod),
            )
    }

    #[tokio::test]
    async fn test_winter_term_window() {
        let calc = WindowCalculator::new(Arc::new(winter_term()), 5);
        let window = calc.compute(&scope(), d(1, 15), d(3, 15)).await.unwrap();

        // 45 weekdays minus 2 holidays minus 5 exam days
        assert_eq!(window.available_teaching_days, 38);
        assert_eq!(window.available_weeks, 7);
        assert_eq!(window.lost_days.len(), 7);
        assert_eq!(window.lost_days[0].date, d(1, 26));

        let presidents = window.lost_days.iter().find(|l| l.date == d(2, 19)).unwrap();
        assert_eq!(presidents.reason, ExclusionReason::Holiday);
        assert_eq!(presidents.description.as_deref(), Some("Presidents Day"));

        let exam_days = window
            .lost_days
            .iter()
            .filter(|l| l.reason == ExclusionReason::ExamPeriod)
            .count();
        assert_eq!(exam_days, 5);
    }

    #[tokio::test]
    async fn test_reversed_range_fails() {
        let calc = WindowCalculator::new(Arc::new(winter_term()), 5);
        let err = calc.compute(&scope(), d(3, 15), d(1, 15)).await.unwrap_err();
        assert!(matches!(err, PlanError::InvalidRange { .. }));
    }

    #[tokio::test]
    async fn test_calendar_failure_propagates() {
        let source = winter_term();
        source.set_calendar_unavailable(true);
        let calc = WindowCalculator::new(Arc::new(source), 5);
        let err = calc.compute(&scope(), d(1, 15), d(3, 15)).await.unwrap_err();
        assert!(matches!(err, PlanError::Source(_)));
    }

    #[test]
    fn test_overlapping_reasons_recorded_once_per_reason() {
        let teaching: Vec<_> = range(d(5, 6), d(5, 10)).days().collect();
        let exclusions = vec![
            CalendarExclusion::new("a", range(d(5, 7), d(5, 8)), ExclusionReason::ExamPeriod),
            CalendarExclusion::new("b", DateRange::single(d(5, 8)), ExclusionReason::Holiday),
            CalendarExclusion::new("c", range(d(5, 8), d(5, 9)), ExclusionReason::ExamPeriod),
        ];

        let window = build_window(range(d(5, 6), d(5, 10)), &teaching, &exclusions, 5);

        assert_eq!(window.teaching_days, vec![d(5, 6), d(5, 10)]);
        let on_8th: Vec<_> = window.lost_days.iter().filter(|l| l.date == d(5, 8)).collect();
        assert_eq!(on_8th.len(), 2);
        assert_eq!(window.lost_days.len(), 4); // 7 exam, 8 exam, 8 holiday, 9 exam
    }

    #[test]
    fn test_description_from_any_matching_exclusion() {
        let teaching: Vec<_> = range(d(5, 6), d(5, 10)).days().collect();
        let exclusions = vec![
            CalendarExclusion::new("closure", DateRange::single(d(5, 8)), ExclusionReason::Holiday),
            CalendarExclusion::new("founders", DateRange::single(d(5, 8)), ExclusionReason::Holiday)
                .with_description("Founders Day"),
        ];

        let window = build_window(range(d(5, 6), d(5, 10)), &teaching, &exclusions, 5);
        assert_eq!(window.lost_days.len(), 1);
        assert_eq!(window.lost_days[0].description.as_deref(), Some("Founders Day"));
    }

    #[test]
    fn test_exclusions_clipped_to_range() {
        let teaching: Vec<_> = range(d(6, 1), d(6, 30)).days().collect();
        let exclusions = vec![CalendarExclusion::new(
            "summer",
            range(d(6, 25), d(8, 31)),
            ExclusionReason::NonTeaching,
        )];

        let window = build_window(range(d(6, 1), d(6, 30)), &teaching, &exclusions, 5);
        assert_eq!(window.lost_days.len(), 6);
        assert_eq!(window.available_teaching_days, 24);
        assert_eq!(window.available_weeks, 4);
    }

    #[test]
    fn test_teaching_dates_outside_range_ignored() {
        let teaching = vec![d(1, 1), d(1, 2), d(1, 2), d(2, 1)];
        let window = build_window(range(d(1, 1), d(1, 31)), &teaching, &[], 5);
        assert_eq!(window.teaching_days, vec![d(1, 1), d(1, 2)]);
        assert_eq!(window.available_weeks, 0);
    }

    proptest! {
        #[test]
        fn prop_available_days_is_set_difference(
            teaching_offsets in proptest::collection::btree_set(0u64..120, 0..80),
            exclusion_spans in proptest::collection::vec((0u64..120, 0u64..10), 0..6),
            dpw in 1u32..8,
        ) {
            let start = d(1, 1);
            let window_range = range(start, start + chrono::Days::new(89));
            let teaching: Vec<_> = teaching_offsets.iter().map(|o| start + chrono::Days::new(*o)).collect();
            let exclusions: Vec<_> = exclusion_spans
                .iter()
                .enumerate()
                .map(|(i, (off, len))| {
                    let s = start + chrono::Days::new(*off);
                    CalendarExclusion::new(format!("x{}", i), range(s, s + chrono::Days::new(*len)), ExclusionReason::Holiday)
                })
                .collect();

            let window = build_window(window_range, &teaching, &exclusions, dpw);

            let expected = teaching
                .iter()
                .filter(|t| window_range.contains(**t))
                .filter(|t| !exclusions.iter().any(|e| e.span.contains(**t)))
                .count();
            prop_assert_eq!(window.available_teaching_days, expected);
            prop_assert_eq!(window.available_weeks as usize, expected / dpw as usize);
            prop_assert!(window.lost_days.iter().all(|l| window_range.contains(l.date)));
            prop_assert!(window.teaching_days.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
