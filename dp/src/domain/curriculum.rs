//! Curriculum hierarchy: units containing topics

use serde::{Deserialize, Serialize};

use super::id::{TopicId, UnitId};
use super::scope::Scope;

/// Estimated duration for topics that do not specify one
pub const DEFAULT_TOPIC_WEEKS: u32 = 1;

/// Longest duration a single topic may take, one school year
pub const MAX_TOPIC_WEEKS: u32 = 52;

/// A topic inside a curriculum unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub unit_id: UnitId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit ordering key; topics without one sort last
    #[serde(default)]
    pub ordering: Option<i64>,
    /// Estimated duration in weeks (defaults to 1)
    #[serde(default)]
    pub estimated_weeks: Option<u32>,
}

impl Topic {
    pub fn new(id: impl Into<TopicId>, unit_id: impl Into<UnitId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            unit_id: unit_id.into(),
            name: name.into(),
            description: None,
            ordering: None,
            estimated_weeks: None,
        }
    }

    pub fn with_ordering(mut self, ordering: i64) -> Self {
        self.ordering = Some(ordering);
        self
    }

    pub fn with_weeks(mut self, weeks: u32) -> Self {
        self.estimated_weeks = Some(weeks);
        self
    }

    /// Estimated weeks, falling back to the default and capped at [`MAX_TOPIC_WEEKS`]
    pub fn weeks(&self) -> u32 {
        self.estimated_weeks.unwrap_or(DEFAULT_TOPIC_WEEKS).min(MAX_TOPIC_WEEKS)
    }
}

/// An instructional unit grouping ordered topics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit ordering key; units without one sort last
    #[serde(default)]
    pub ordering: Option<i64>,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

impl Unit {
    pub fn new(id: impl Into<UnitId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            ordering: None,
            topics: Vec::new(),
        }
    }

    pub fn with_ordering(mut self, ordering: i64) -> Self {
        self.ordering = Some(ordering);
        self
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topics.push(topic);
        self
    }
}

/// Ordered curriculum for one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumHierarchy {
    pub scope: Scope,
    pub units: Vec<Unit>,
}

impl CurriculumHierarchy {
    /// Flatten units and topics into curriculum order
    pub fn ordered_topics(&self) -> Vec<PlannedTopic> {
        self.units
            .iter()
            .flat_map(|unit| unit.topics.iter().map(move |topic| PlannedTopic::from_curriculum(unit, topic)))
            .collect()
    }

    /// Total number of topics across all units
    pub fn topic_count(&self) -> usize {
        self.units.iter().map(|u| u.topics.len()).sum()
    }
}

/// A curriculum topic as the planner sees it, carrying its unit identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTopic {
    pub topic_id: TopicId,
    pub topic_name: String,
    pub unit_id: UnitId,
    pub unit_name: String,
    /// Weeks this topic advances the schedule (0 shares the week with the next topic)
    pub weeks: u32,
}

impl PlannedTopic {
    pub fn from_curriculum(unit: &Unit, topic: &Topic) -> Self {
        Self {
            topic_id: topic.id.clone(),
            topic_name: topic.name.clone(),
            unit_id: unit.id.clone(),
            unit_name: unit.name.clone(),
            weeks: topic.weeks(),
        }
    }
}
