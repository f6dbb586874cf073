//! Collaborator contracts consumed by the planning engine
//!
//! Calendar, curriculum and existing-schedule data are read-only here.
//! `LessonRecordSink` is the only write path, and the draft manager calls it
//! exclusively from a confirmed commit.
//!
//! # Implementations
//!
//! - [`MemorySource`] - in-memory data, implements every contract (tests, fixtures)
//! - [`Fixture`] - YAML description of one institution loaded into a `MemorySource`
//! - [`JsonlLessonSink`] - appends committed lesson records to a JSON-lines file

mod fixture;
mod jsonl;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CalendarExclusion, ContextItem, DateRange, RecordId, RequesterContext, Scope, TopicId, Unit};

pub use fixture::Fixture;
pub use jsonl::JsonlLessonSink;
pub use memory::{LessonRecord, MemorySource};

/// Errors raised by collaborators
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Calendar data: teaching dates and exclusions for an institution
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Dates on which instruction occurs, restricted to `range`
    async fn teaching_dates(&self, scope: &Scope, range: &DateRange) -> Result<Vec<NaiveDate>, SourceError>;

    /// Holidays, exam periods and other exclusions overlapping `range`
    async fn exclusions(&self, scope: &Scope, range: &DateRange) -> Result<Vec<CalendarExclusion>, SourceError>;
}

/// Curriculum data: units with their topics
#[async_trait]
pub trait CurriculumSource: Send + Sync {
    /// Units for the scope, or `None` when no curriculum is loaded
    async fn hierarchy(&self, scope: &Scope) -> Result<Option<Vec<Unit>>, SourceError>;
}

/// Lessons and assessments already on the calendar (display context only)
#[async_trait]
pub trait ScheduleContextSource: Send + Sync {
    async fn scheduled_items(
        &self,
        scope: &Scope,
        requester: &RequesterContext,
        range: &DateRange,
    ) -> Result<Vec<ContextItem>, SourceError>;

    async fn assessment_items(
        &self,
        scope: &Scope,
        requester: &RequesterContext,
        range: &DateRange,
    ) -> Result<Vec<ContextItem>, SourceError>;
}

/// Status given to lesson records created from a committed draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    /// Scaffold the teacher still has to review and edit
    #[default]
    NotFinalized,
}

impl std::fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFinalized => write!(f, "not_finalized"),
        }
    }
}

/// Everything the lesson store needs to create one record
///
/// Only the topic name is carried as content; no instructional text is synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecordRequest {
    pub requester: RequesterContext,
    pub subject: String,
    pub topic_id: TopicId,
    pub topic_label: String,
    /// Coarse week-level span, not day-locked
    pub span: DateRange,
    pub status: LessonStatus,
}

/// Durable lesson-record persistence
#[async_trait]
pub trait LessonRecordSink: Send + Sync {
    async fn create(&self, request: LessonRecordRequest) -> Result<RecordId, SourceError>;
}

/// The full set of collaborators a draft manager talks to
#[derive(Clone)]
pub struct PlanningSources {
    pub calendar: Arc<dyn CalendarSource>,
    pub curriculum: Arc<dyn CurriculumSource>,
    pub context: Arc<dyn ScheduleContextSource>,
    pub lessons: Arc<dyn LessonRecordSink>,
}

impl PlanningSources {
    /// Use one value for every contract (e.g. a `MemorySource`)
    pub fn from_single<T>(source: Arc<T>) -> Self
    where
        T: CalendarSource + CurriculumSource + ScheduleContextSource + LessonRecordSink + 'static,
    {
        Self {
            calendar: source.clone(),
            curriculum: source.clone(),
            context: source.clone(),
            lessons: source,
        }
    }

    /// Replace the lesson sink, keeping the read-only sources
    pub fn with_lessons(mut self, lessons: Arc<dyn LessonRecordSink>) -> Self {
        self.lessons = lessons;
        self
    }
}

impl std::fmt::Debug for PlanningSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanningSources").finish_non_exhaustive()
    }
}
