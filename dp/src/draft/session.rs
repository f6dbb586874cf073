//! Draft session state

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ConfirmationToken, ExistingContext, PacingSchedule, PlannedTopic, PlanningWindow, RecordId, RequesterContext,
    RiskSignalSet, Scope, SessionToken, TopicId,
};
use crate::pacing::{RiskDetector, distribute};

/// Lifecycle state of a draft session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Active,
    Committed,
    Discarded,
}

impl SessionState {
    /// Committed and discarded sessions accept no further operations
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Discarded)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Committed => write!(f, "committed"),
            Self::Discarded => write!(f, "discarded"),
        }
    }
}

/// A curriculum topic as it sits in one teacher's draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTopic {
    /// Topic as read from the curriculum, with its estimated weeks
    pub topic: PlannedTopic,
    /// Excluded topics stay in the list but are not scheduled
    pub included: bool,
    /// Teacher's re-pace override, replacing the estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_override: Option<u32>,
}

impl SessionTopic {
    pub fn new(topic: PlannedTopic) -> Self {
        Self {
            topic,
            included: true,
            weeks_override: None,
        }
    }

    pub fn id(&self) -> &TopicId {
        &self.topic.topic_id
    }

    /// The topic as the distributor should see it
    pub fn planned(&self) -> PlannedTopic {
        PlannedTopic {
            weeks: self.weeks_override.unwrap_or(self.topic.weeks),
            ..self.topic.clone()
        }
    }
}

/// An editable, never-persisted pacing proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftSession {
    pub token: SessionToken,
    pub requester: RequesterContext,
    pub scope: Scope,
    pub window: PlanningWindow,
    /// Curriculum topics in the teacher's current order
    pub topics: Vec<SessionTopic>,
    pub schedule: PacingSchedule,
    pub risks: RiskSignalSet,
    /// Lessons and assessments already on the calendar in `window.range`
    pub existing: ExistingContext,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,

    /// Pending confirmation; `None` once consumed
    #[serde(skip)]
    pub(crate) confirmation: Option<ConfirmationToken>,

    /// Records already created by an interrupted commit
    #[serde(skip)]
    pub(crate) committed: HashMap<TopicId, RecordId>,
}

impl DraftSession {
    /// Build an active session from a window, topics and existing context
    pub fn new(
        requester: RequesterContext,
        scope: Scope,
        window: PlanningWindow,
        topics: Vec<PlannedTopic>,
        existing: ExistingContext,
    ) -> Self {
        let now = Utc::now();
        Self {
            token: SessionToken::generate(),
            requester,
            scope,
            window,
            topics: topics.into_iter().map(SessionTopic::new).collect(),
            schedule: PacingSchedule::default(),
            risks: RiskSignalSet::new(),
            existing,
            state: SessionState::Active,
            created_at: now,
            modified_at: now,
            confirmation: None,
            committed: HashMap::new(),
        }
    }

    /// Included topics in order, with overrides applied
    pub fn planned_topics(&self) -> Vec<PlannedTopic> {
        self.topics
            .iter()
            .filter(|t| t.included)
            .map(SessionTopic::planned)
            .collect()
    }

    pub fn topic(&self, id: &TopicId) -> Option<&SessionTopic> {
        self.topics.iter().find(|t| t.id() == id)
    }

    /// Re-run distribution and risk detection over the current topics
    pub fn replan(&mut self, detector: &RiskDetector) {
        self.schedule = distribute(&self.planned_topics());
        self.risks = detector.detect_in_window(&self.schedule, &self.window, &self.existing);
    }

    /// Records created so far by an interrupted commit
    pub fn persisted_records(&self) -> &HashMap<TopicId, RecordId> {
        &self.committed
    }

    /// Replace any pending confirmation with a fresh one
    pub(crate) fn mint_confirmation(&mut self) -> ConfirmationToken {
        let token = ConfirmationToken::generate();
        self.confirmation = Some(token.clone());
        token
    }

    pub(crate) fn confirmation_matches(&self, token: &ConfirmationToken) -> bool {
        self.confirmation.as_ref() == Some(token)
    }

    pub(crate) fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}
