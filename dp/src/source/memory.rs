//! In-memory collaborator implementing every source contract

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::{
    CalendarSource, CurriculumSource, LessonRecordRequest, LessonRecordSink, ScheduleContextSource, SourceError,
};
use crate::domain::{CalendarExclusion, ContextItem, DateRange, RecordId, RequesterContext, Scope, Unit, generate_id};

/// A lesson record created through [`MemorySource`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub request: LessonRecordRequest,
}

#[derive(Debug, Default)]
struct LessonLog {
    records: Vec<LessonRecord>,
    /// Fail every create once this many records exist
    fail_after: Option<usize>,
}

/// Calendar, curriculum, context and lesson data held in memory
///
/// Calendar data is keyed by institution, curricula by full scope, and
/// context items by class.
#[derive(Debug, Default)]
pub struct MemorySource {
    teaching_dates: HashMap<String, BTreeSet<NaiveDate>>,
    exclusions: HashMap<String, Vec<CalendarExclusion>>,
    curricula: HashMap<Scope, Vec<Unit>>,
    scheduled_items: HashMap<String, Vec<ContextItem>>,
    assessment_items: HashMap<String, Vec<ContextItem>>,
    calendar_unavailable: AtomicBool,
    lessons: Mutex<LessonLog>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add teaching dates for an institution
    pub fn with_teaching_dates(mut self, institution: &str, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.teaching_dates
            .entry(institution.to_string())
            .or_default()
            .extend(dates);
        self
    }

    /// Add every Monday–Friday in `range` as a teaching date
    pub fn with_weekdays(self, institution: &str, range: DateRange) -> Self {
        use chrono::Datelike;
        let weekdays: Vec<_> = range
            .days()
            .filter(|d| d.weekday().number_from_monday() <= 5)
            .collect();
        self.with_teaching_dates(institution, weekdays)
    }

    pub fn with_exclusion(mut self, institution: &str, exclusion: CalendarExclusion) -> Self {
        self.exclusions
            .entry(institution.to_string())
            .or_default()
            .push(exclusion);
        self
    }

    pub fn with_curriculum(mut self, scope: Scope, units: Vec<Unit>) -> Self {
        self.curricula.insert(scope, units);
        self
    }

    pub fn with_scheduled_item(mut self, class_id: &str, item: ContextItem) -> Self {
        self.scheduled_items
            .entry(class_id.to_string())
            .or_default()
            .push(item);
        self
    }

    pub fn with_assessment_item(mut self, class_id: &str, item: ContextItem) -> Self {
        self.assessment_items
            .entry(class_id.to_string())
            .or_default()
            .push(item);
        self
    }

    /// Make calendar reads fail (or succeed again)
    pub fn set_calendar_unavailable(&self, unavailable: bool) {
        self.calendar_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail every lesson creation once `count` records exist
    pub async fn fail_creates_after(&self, count: usize) {
        self.lessons.lock().await.fail_after = Some(count);
    }

    /// Stop injecting lesson-creation failures
    pub async fn clear_create_failure(&self) {
        self.lessons.lock().await.fail_after = None;
    }

    /// Snapshot of every lesson record created so far
    pub async fn created_lessons(&self) -> Vec<LessonRecord> {
        self.lessons.lock().await.records.clone()
    }

    fn check_calendar(&self) -> Result<(), SourceError> {
        if self.calendar_unavailable.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("calendar".to_string()));
        }
        Ok(())
    }

    fn items_in_range(items: &HashMap<String, Vec<ContextItem>>, class_id: &str, range: &DateRange) -> Vec<ContextItem> {
        let mut found: Vec<ContextItem> = items
            .get(class_id)
            .map(|items| items.iter().filter(|i| range.contains(i.date)).cloned().collect())
            .unwrap_or_default();
        found.sort_by_key(|i| i.date);
        found
    }
}

#[async_trait]
impl CalendarSource for MemorySource {
    async fn teaching_dates(&self, scope: &Scope, range: &DateRange) -> Result<Vec<NaiveDate>, SourceError> {
        debug!(%scope, %range, "MemorySource::teaching_dates: called");
        self.check_calendar()?;
        Ok(self
            .teaching_dates
            .get(&scope.institution)
            .map(|dates| dates.range(range.start..=range.end).copied().collect())
            .unwrap_or_default())
    }

    async fn exclusions(&self, scope: &Scope, range: &DateRange) -> Result<Vec<CalendarExclusion>, SourceError> {
        debug!(%scope, %range, "MemorySource::exclusions: called");
        self.check_calendar()?;
        Ok(self
            .exclusions
            .get(&scope.institution)
            .map(|all| all.iter().filter(|e| e.span.overlaps(range)).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl CurriculumSource for MemorySource {
    async fn hierarchy(&self, scope: &Scope) -> Result<Option<Vec<Unit>>, SourceError> {
        debug!(%scope, "MemorySource::hierarchy: called");
        Ok(self.curricula.get(scope).cloned())
    }
}

#[async_trait]
impl ScheduleContextSource for MemorySource {
    async fn scheduled_items(
        &self,
        _scope: &Scope,
        requester: &RequesterContext,
        range: &DateRange,
    ) -> Result<Vec<ContextItem>, SourceError> {
        Ok(Self::items_in_range(&self.scheduled_items, &requester.class_id, range))
    }

    async fn assessment_items(
        &self,
        _scope: &Scope,
        requester: &RequesterContext,
        range: &DateRange,
    ) -> Result<Vec<ContextItem>, SourceError> {
        Ok(Self::items_in_range(&self.assessment_items, &requester.class_id, range))
    }
}

#[async_trait]
impl LessonRecordSink for MemorySource {
    async fn create(&self, request: LessonRecordRequest) -> Result<RecordId, SourceError> {
        debug!(topic = %request.topic_label, span = %request.span, "MemorySource::create: called");
        let mut log = self.lessons.lock().await;

        if let Some(limit) = log.fail_after
            && log.records.len() >= limit
        {
            debug!(limit, "MemorySource::create: injected failure");
            return Err(SourceError::Unavailable("lesson store".to_string()));
        }

        let id = RecordId::from(generate_id("lesson", &request.topic_label));
        log.records.push(LessonRecord {
            id: id.clone(),
            request,
        });
        Ok(id)
    }
}
