//! Calendar types: exclusions, lost days, and the planning window

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::dates::DateRange;

/// Why a date is not available for teaching
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Holiday,
    ExamPeriod,
    NonTeaching,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Holiday => write!(f, "holiday"),
            Self::ExamPeriod => write!(f, "exam_period"),
            Self::NonTeaching => write!(f, "non_teaching"),
        }
    }
}

impl std::str::FromStr for ExclusionReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "holiday" => Ok(Self::Holiday),
            "exam_period" | "exam" => Ok(Self::ExamPeriod),
            "non_teaching" => Ok(Self::NonTeaching),
            _ => Err(format!("Unknown exclusion reason: {}", s)),
        }
    }
}

/// A holiday, examination interval, or other non-teaching span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarExclusion {
    pub id: String,
    pub span: DateRange,
    pub reason: ExclusionReason,
    #[serde(default)]
    pub description: Option<String>,
}

impl CalendarExclusion {
    pub fn new(id: impl Into<String>, span: DateRange, reason: ExclusionReason) -> Self {
        Self {
            id: id.into(),
            span,
            reason,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A date inside the planning range that is excluded, with its reason
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LostDay {
    pub date: NaiveDate,
    pub reason: ExclusionReason,
    #[serde(default)]
    pub description: Option<String>,
}

/// Usable teaching time inside a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningWindow {
    /// Requested range (inclusive)
    pub range: DateRange,

    /// Teaching dates left after exclusions, ascending
    pub teaching_days: Vec<NaiveDate>,

    /// `teaching_days.len()`
    pub available_teaching_days: usize,

    /// `available_teaching_days / days_per_week`, rounded down
    pub available_weeks: u32,

    /// Teaching-days-per-week used for the conversion above
    pub days_per_week: u32,

    /// Excluded dates, one entry per (date, reason)
    pub lost_days: Vec<LostDay>,
}

impl PlanningWindow {
    /// Coarse date span for a slot starting at `week` and occupying `span_weeks` weeks
    ///
    /// Week k covers the teaching days at positions `(k-1)*dpw .. k*dpw`. Weeks
    /// beyond the last teaching day have no teaching dates to anchor on and are
    /// laid out as consecutive 7-day blocks after the window end.
    pub fn week_span(&self, week: u32, span_weeks: u32) -> DateRange {
        let week = week.max(1);
        let first = self.week_bounds(week);
        let last = self.week_bounds(week.saturating_add(span_weeks.max(1) - 1));
        DateRange {
            start: first.start,
            end: last.end,
        }
    }

    /// Number of weeks with at least one teaching day, including a trailing partial week
    pub fn covered_weeks(&self) -> u32 {
        let dpw = self.days_per_week.max(1) as usize;
        self.teaching_days.len().div_ceil(dpw) as u32
    }

    fn week_bounds(&self, week: u32) -> DateRange {
        let dpw = self.days_per_week.max(1) as usize;
        let start_idx = (week as usize - 1) * dpw;

        if start_idx < self.teaching_days.len() {
            let end_idx = (start_idx + dpw).min(self.teaching_days.len()) - 1;
            return DateRange {
                start: self.teaching_days[start_idx],
                end: self.teaching_days[end_idx],
            };
        }

        let overflow = (week - self.covered_weeks()) as u64;
        let start = self
            .range
            .end
            .checked_add_days(Days::new(1 + 7 * (overflow - 1)))
            .unwrap_or(NaiveDate::MAX);
        DateRange {
            start,
            end: start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX),
        }
    }
}
