//! YAML fixture describing one institution's calendar, curricula and context
//!
//! ```yaml
//! institution: north-high
//! teaching-days:
//!   weekdays: { start: 2024-01-15, end: 2024-03-15 }
//!   dates: [2024-03-16]
//! exclusions:
//!   - id: winter-break
//!     start: 2024-02-19
//!     reason: holiday
//! curricula:
//!   - level: grade-9
//!     subject: math
//!     units: [...]
//! scheduled-items:
//!   - { class-id: 9a, id: l1, date: 2024-01-16, label: Intro }
//! ```

use std::path::Path;

use chrono::NaiveDate;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::MemorySource;
use crate::domain::{CalendarExclusion, ContextItem, DateRange, ExclusionReason, Scope, Unit};

/// Generated or explicit teaching dates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeachingDaysSpec {
    /// Every Monday–Friday in this range
    pub weekdays: Option<DateRange>,
    /// Additional explicit dates
    pub dates: Vec<NaiveDate>,
}

/// A single-day or multi-day exclusion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionSpec {
    pub id: String,
    pub start: NaiveDate,
    /// Defaults to `start` for single-day exclusions
    #[serde(default)]
    pub end: Option<NaiveDate>,
    pub reason: ExclusionReason,
    #[serde(default)]
    pub description: Option<String>,
}

/// Curriculum for one (level, subject) of the fixture's institution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumSpec {
    pub level: String,
    pub subject: String,
    #[serde(default)]
    pub units: Vec<Unit>,
}

/// An existing lesson or assessment for a class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSpec {
    #[serde(rename = "class-id")]
    pub class_id: String,
    pub id: String,
    pub date: NaiveDate,
    pub label: String,
}

/// Fixture file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub institution: String,

    #[serde(default, rename = "teaching-days")]
    pub teaching_days: TeachingDaysSpec,

    #[serde(default)]
    pub exclusions: Vec<ExclusionSpec>,

    #[serde(default)]
    pub curricula: Vec<CurriculumSpec>,

    #[serde(default, rename = "scheduled-items")]
    pub scheduled_items: Vec<ContextSpec>,

    #[serde(default)]
    pub assessments: Vec<ContextSpec>,
}

impl Fixture {
    /// Load a fixture from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Fixture::load: called");
        let content = std::fs::read_to_string(path).context(format!("Failed to read fixture {}", path.display()))?;
        let fixture = Self::parse(&content).context(format!("Failed to parse fixture {}", path.display()))?;
        info!(
            institution = %fixture.institution,
            curricula = fixture.curricula.len(),
            exclusions = fixture.exclusions.len(),
            "Loaded fixture from: {}",
            path.display()
        );
        Ok(fixture)
    }

    /// Parse fixture YAML
    pub fn parse(content: &str) -> Result<Self> {
        let fixture: Self = serde_yaml::from_str(content)?;
        for exclusion in &fixture.exclusions {
            if let Some(end) = exclusion.end
                && end < exclusion.start
            {
                eyre::bail!("Exclusion '{}' ends before it starts", exclusion.id);
            }
        }
        Ok(fixture)
    }

    /// Build a scope for this fixture's institution
    pub fn scope(&self, level: &str, subject: &str) -> Scope {
        Scope::new(&self.institution, level, subject)
    }

    /// Materialize the fixture as an in-memory source
    pub fn into_source(self) -> MemorySource {
        let institution = self.institution.as_str();
        let mut source = MemorySource::new().with_teaching_dates(institution, self.teaching_days.dates.iter().copied());

        if let Some(range) = self.teaching_days.weekdays {
            source = source.with_weekdays(institution, range);
        }

        for entry in &self.exclusions {
            let span = DateRange {
                start: entry.start,
                end: entry.end.unwrap_or(entry.start),
            };
            let mut exclusion = CalendarExclusion::new(&entry.id, span, entry.reason);
            exclusion.description = entry.description.clone();
            source = source.with_exclusion(institution, exclusion);
        }

        for curriculum in &self.curricula {
            source = source.with_curriculum(self.scope(&curriculum.level, &curriculum.subject), curriculum.units.clone());
        }

        for item in &self.scheduled_items {
            source = source.with_scheduled_item(&item.class_id, ContextItem::new(&item.id, item.date, &item.label));
        }

        for item in &self.assessments {
            source = source.with_assessment_item(&item.class_id, ContextItem::new(&item.id, item.date, &item.label));
        }

        source
    }
}
