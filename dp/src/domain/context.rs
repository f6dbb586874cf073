//! Read-only snapshots of lessons and assessments already on the calendar

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An existing scheduled lesson or assessment (display context only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextItem {
    pub id: String,
    pub date: NaiveDate,
    pub label: String,
}

impl ContextItem {
    pub fn new(id: impl Into<String>, date: NaiveDate, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date,
            label: label.into(),
        }
    }
}

/// Everything already on the calendar inside a draft's range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingContext {
    pub scheduled_items: Vec<ContextItem>,
    pub assessment_items: Vec<ContextItem>,
}

impl ExistingContext {
    pub fn is_empty(&self) -> bool {
        self.scheduled_items.is_empty() && self.assessment_items.is_empty()
    }

    /// All items (lessons first, then assessments) whose date falls in [start, end]
    pub fn items_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&ContextItem> {
        self.scheduled_items
            .iter()
            .chain(self.assessment_items.iter())
            .filter(|item| item.date >= start && item.date <= end)
            .collect()
    }
}
