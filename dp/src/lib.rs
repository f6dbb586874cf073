//! DraftPlan - calendar-aware draft planning engine
//!
//! Turns a curriculum outline and an academic calendar into a proposed
//! week-by-week teaching schedule (a *draft*), lets the owning teacher edit it
//! freely, and only writes lesson records after explicit confirmation.
//!
//! # Core Concepts
//!
//! - **Drafts are never persisted**: sessions live in memory until committed or discarded
//! - **Exclusions win**: a teaching date inside any exclusion span is not usable
//! - **Advisory pacing**: risk signals describe the schedule, they never block it
//! - **Confirm to commit**: every revision mints a single-use confirmation token
//!
//! # Modules
//!
//! - [`calendar`] - Planning window from teaching dates and exclusions
//! - [`curriculum`] - Ordered unit/topic hierarchy
//! - [`pacing`] - Week distribution and risk detection
//! - [`draft`] - Draft sessions, edits, and the confirm-to-commit lifecycle
//! - [`source`] - Collaborator contracts and in-memory/fixture implementations
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod calendar;
pub mod cli;
pub mod config;
pub mod curriculum;
pub mod domain;
pub mod draft;
pub mod error;
pub mod pacing;
pub mod source;

// Re-export commonly used types
pub use calendar::WindowCalculator;
pub use config::{Config, PlanningConfig};
pub use curriculum::CurriculumReader;
pub use domain::{
    CalendarExclusion, ConfirmationToken, CurriculumHierarchy, DateRange, ExclusionReason, ExistingContext,
    PacingSchedule, PlannedTopic, PlanningWindow, RecordId, RequesterContext, RiskKind, RiskSignal, RiskSignalSet,
    Scope, SessionToken, Severity, Topic, TopicId, Unit, WeekSlot,
};
pub use draft::{DraftManager, DraftProposal, DraftSession, Edit, SessionState, SessionStore};
pub use error::{PlanError, PlanResult};
pub use pacing::{RiskDetector, distribute};
pub use source::{
    CalendarSource, CurriculumSource, Fixture, JsonlLessonSink, LessonRecordSink, LessonStatus, MemorySource,
    PlanningSources, ScheduleContextSource, SourceError,
};
