//! Teacher edits applied to a draft session

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::session::SessionTopic;
use crate::domain::{DateRange, MAX_TOPIC_WEEKS, TopicId};
use crate::error::PlanError;

/// One modification to a draft
///
/// Edits are validated before anything changes; a rejected edit leaves the
/// session exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Edit {
    /// Replace the topic order; must be a permutation of the session's topics
    Reorder { order: Vec<TopicId> },

    /// Move one topic to a 0-based position, shifting the rest
    Move { topic_id: TopicId, position: usize },

    /// Include or exclude a topic from the schedule
    SetIncluded { topic_id: TopicId, included: bool },

    /// Override a topic's duration; `None` restores the curriculum estimate
    Repace { topic_id: TopicId, weeks: Option<u32> },

    /// Move the draft to another date range
    ShiftWindow { range: DateRange },
}

impl Edit {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reorder { .. } => "reorder",
            Self::Move { .. } => "move",
            Self::SetIncluded { .. } => "set_included",
            Self::Repace { .. } => "repace",
            Self::ShiftWindow { .. } => "shift_window",
        }
    }

    /// Apply a topic-level edit to a copy of `topics`
    ///
    /// `ShiftWindow` does not touch topics and returns them unchanged.
    pub fn apply(&self, topics: &[SessionTopic]) -> Result<Vec<SessionTopic>, PlanError> {
        let mut topics = topics.to_vec();
        match self {
            Self::Reorder { order } => {
                let reordered = reorder(&topics, order)?;
                topics = reordered;
            }
            Self::Move { topic_id, position } => {
                let from = index_of(&topics, topic_id)?;
                if *position >= topics.len() {
                    return Err(PlanError::InvalidEdit(format!(
                        "Position {} is out of range for {} topics",
                        position,
                        topics.len()
                    )));
                }
                let topic = topics.remove(from);
                topics.insert(*position, topic);
            }
            Self::SetIncluded { topic_id, included } => {
                let idx = index_of(&topics, topic_id)?;
                topics[idx].included = *included;
            }
            Self::Repace { topic_id, weeks } => {
                let idx = index_of(&topics, topic_id)?;
                if let Some(weeks) = weeks
                    && *weeks > MAX_TOPIC_WEEKS
                {
                    return Err(PlanError::InvalidEdit(format!(
                        "Topic {} cannot take {} weeks (at most {})",
                        topic_id, weeks, MAX_TOPIC_WEEKS
                    )));
                }
                topics[idx].weeks_override = *weeks;
            }
            Self::ShiftWindow { .. } => {}
        }
        Ok(topics)
    }
}

fn index_of(topics: &[SessionTopic], id: &TopicId) -> Result<usize, PlanError> {
    topics
        .iter()
        .position(|t| t.id() == id)
        .ok_or_else(|| PlanError::InvalidEdit(format!("Unknown topic: {}", id)))
}

fn reorder(topics: &[SessionTopic], order: &[TopicId]) -> Result<Vec<SessionTopic>, PlanError> {
    let unique: HashSet<&TopicId> = order.iter().collect();
    if order.len() != topics.len() || unique.len() != order.len() {
        return Err(PlanError::InvalidEdit(format!(
            "Reorder must list each of the {} topics exactly once",
            topics.len()
        )));
    }

    order
        .iter()
        .map(|id| index_of(topics, id).map(|idx| topics[idx].clone()))
        .collect()
}
