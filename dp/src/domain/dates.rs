//! Inclusive date ranges

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// An inclusive date range [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First date (inclusive)
    pub start: NaiveDate,
    /// Last date (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, failing when `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PlanError> {
        if start > end {
            return Err(PlanError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering a single date
    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    /// Whether a date falls within this range
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whether two ranges share at least one date
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The dates common to both ranges, if any
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Self { start, end })
    }

    /// Iterate every date in the range in ascending order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start
            .iter_days()
            .take_while(move |d| *d <= self.end)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}
