//! Domain types for draft planning
//!
//! Value types shared by the calendar, curriculum, pacing and draft modules.
//! Curriculum and calendar entities are read-only snapshots of collaborator data.

mod calendar;
mod context;
mod curriculum;
mod dates;
mod id;
mod risk;
mod schedule;
mod scope;

pub use calendar::{CalendarExclusion, ExclusionReason, LostDay, PlanningWindow};
pub use context::{ContextItem, ExistingContext};
pub use curriculum::{CurriculumHierarchy, DEFAULT_TOPIC_WEEKS, MAX_TOPIC_WEEKS, PlannedTopic, Topic, Unit};
pub use dates::DateRange;
pub use id::{ConfirmationToken, RecordId, SessionToken, TopicId, UnitId, generate_id};
pub use risk::{RiskKind, RiskSignal, RiskSignalSet, Severity};
pub use schedule::{PacingSchedule, WeekSlot};
pub use scope::{RequesterContext, Scope};
