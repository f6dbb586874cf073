//! Planning scope and requester context

use serde::{Deserialize, Serialize};

/// The (institution, level, subject) triple that partitions curriculum and calendar data
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// School or institution identifier (calendar data is keyed by this)
    pub institution: String,
    /// Level or grade identifier
    pub level: String,
    /// Subject identifier
    pub subject: String,
}

impl Scope {
    pub fn new(institution: impl Into<String>, level: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            institution: institution.into(),
            level: level.into(),
            subject: subject.into(),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.institution, self.level, self.subject)
    }
}

/// Who asked for the draft and for which class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequesterContext {
    /// Teacher who owns the draft
    pub teacher_id: String,
    /// Class the draft is planned for
    pub class_id: String,
}

impl RequesterContext {
    pub fn new(teacher_id: impl Into<String>, class_id: impl Into<String>) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            class_id: class_id.into(),
        }
    }
}
