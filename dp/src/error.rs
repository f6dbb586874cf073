//! Error types for the draft planning engine

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{RecordId, TopicId};
use crate::draft::SessionState;
use crate::source::SourceError;

/// Errors from planning operations
///
/// Every variant is scoped to the single call or session that produced it.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("No curriculum loaded for scope {0}")]
    CurriculumNotFound(String),

    #[error("Draft session not found: {0}")]
    SessionNotFound(String),

    #[error("Draft session {token} is {state}, expected active")]
    InvalidSessionState { token: String, state: SessionState },

    #[error("Confirmation token does not match the pending confirmation for session {0}")]
    InvalidConfirmation(String),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("Commit stopped at topic {failed_topic} after creating {} record(s): {source}", created.len())]
    Persistence {
        created: Vec<RecordId>,
        failed_topic: TopicId,
        #[source]
        source: SourceError,
    },

    #[error("Collaborator error: {0}")]
    Source(#[from] SourceError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PlanError {
    /// Record ids created before a partial commit failure
    pub fn created_records(&self) -> &[RecordId] {
        match self {
            PlanError::Persistence { created, .. } => created,
            _ => &[],
        }
    }
}

/// Result alias for planning operations
pub type PlanResult<T> = Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_records_on_persistence_failure() {
        let err = PlanError::Persistence {
            created: vec![RecordId::from("r1"), RecordId::from("r2")],
            failed_topic: TopicId::from("t3"),
            source: SourceError::Unavailable("disk full".to_string()),
        };
        assert_eq!(err.created_records().len(), 2);
        assert!(err.to_string().contains("2 record(s)"));
        assert!(err.to_string().contains("t3"));

        let other = PlanError::SessionNotFound("x".to_string());
        assert!(other.created_records().is_empty());
    }

    #[test]
    fn test_invalid_range_display() {
        let err = PlanError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: start 2024-03-01 is after end 2024-02-01"
        );
    }
}
