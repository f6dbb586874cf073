//! Curriculum reader
//!
//! Loads the unit/topic hierarchy for a scope and puts it in teaching order.
//! Read-only: nothing here writes back to the curriculum source.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{CurriculumHierarchy, Scope, Topic, Unit};
use crate::error::PlanError;
use crate::source::CurriculumSource;

/// Reads ordered curricula from a [`CurriculumSource`]
#[derive(Clone)]
pub struct CurriculumReader {
    source: Arc<dyn CurriculumSource>,
}

impl CurriculumReader {
    pub fn new(source: Arc<dyn CurriculumSource>) -> Self {
        Self { source }
    }

    /// Get the ordered hierarchy for `scope`
    ///
    /// A scope with no units is reported as `CurriculumNotFound`.
    pub async fn get_hierarchy(&self, scope: &Scope) -> Result<CurriculumHierarchy, PlanError> {
        debug!(%scope, "CurriculumReader::get_hierarchy: called");
        let units = match self.source.hierarchy(scope).await? {
            Some(units) if !units.is_empty() => units,
            _ => {
                debug!(%scope, "CurriculumReader::get_hierarchy: no curriculum");
                return Err(PlanError::CurriculumNotFound(scope.to_string()));
            }
        };

        let hierarchy = CurriculumHierarchy {
            scope: scope.clone(),
            units: sort_units(units),
        };
        debug!(
            units = hierarchy.units.len(),
            topics = hierarchy.topic_count(),
            "CurriculumReader::get_hierarchy: loaded"
        );
        Ok(hierarchy)
    }
}

/// Sort units and their topics into teaching order
pub fn sort_units(mut units: Vec<Unit>) -> Vec<Unit> {
    units.sort_by(|a, b| by_ordering(a.ordering, &a.name, b.ordering, &b.name));
    for unit in &mut units {
        sort_topics(&mut unit.topics);
    }
    units
}

fn sort_topics(topics: &mut [Topic]) {
    topics.sort_by(|a, b| by_ordering(a.ordering, &a.name, b.ordering, &b.name));
}

/// Keyed entities first (ascending), unkeyed last, ties by case-insensitive name
fn by_ordering(a_key: Option<i64>, a_name: &str, b_key: Option<i64>, b_name: &str) -> Ordering {
    let keyed = match (a_key, b_key) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    keyed.then_with(|| a_name.to_lowercase().cmp(&b_name.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn scope() -> Scope {
        Scope::new("north", "g7", "science")
    }

    fn reader(source: MemorySource) -> CurriculumReader {
        CurriculumReader::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_units_and_topics_sorted() {
        let units = vec![
            Unit::new("u-late", "zoology"),
            Unit::new("u2", "Matter")
                .with_ordering(2)
                .with_topic(Topic::new("t-free", "u2", "appendix"))
                .with_topic(Topic::new("t2", "u2", "States").with_ordering(2))
                .with_topic(Topic::new("t1", "u2", "Atoms").with_ordering(1)),
            Unit::new("u-also-late", "Astronomy"),
            Unit::new("u1", "Cells").with_ordering(1),
        ];
        let source = MemorySource::new().with_curriculum(scope(), units);

        let hierarchy = reader(source).get_hierarchy(&scope()).await.unwrap();

        let unit_ids: Vec<_> = hierarchy.units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(unit_ids, vec!["u1", "u2", "u-also-late", "u-late"]);

        let topic_ids: Vec<_> = hierarchy.units[1].topics.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(topic_ids, vec!["t1", "t2", "t-free"]);
    }

    #[tokio::test]
    async fn test_ties_broken_by_case_insensitive_name() {
        let units = vec![
            Unit::new("u1", "Unit")
                .with_topic(Topic::new("b", "u1", "beta").with_ordering(1))
                .with_topic(Topic::new("a", "u1", "Alpha").with_ordering(1))
                .with_topic(Topic::new("c", "u1", "Gamma").with_ordering(0)),
        ];
        let source = MemorySource::new().with_curriculum(scope(), units);

        let hierarchy = reader(source).get_hierarchy(&scope()).await.unwrap();
        let ids: Vec<_> = hierarchy.ordered_topics().iter().map(|t| t.topic_id.to_string()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_missing_curriculum() {
        let err = reader(MemorySource::new()).get_hierarchy(&scope()).await.unwrap_err();
        assert!(matches!(err, PlanError::CurriculumNotFound(ref s) if s == "north/g7/science"));
    }

    #[tokio::test]
    async fn test_empty_curriculum_is_not_found() {
        let source = MemorySource::new().with_curriculum(scope(), Vec::new());
        let err = reader(source).get_hierarchy(&scope()).await.unwrap_err();
        assert!(matches!(err, PlanError::CurriculumNotFound(_)));
    }

    #[test]
    fn test_negative_keys_sort_first() {
        let units = sort_units(vec![
            Unit::new("a", "A").with_ordering(3),
            Unit::new("b", "B").with_ordering(-1),
        ]);
        assert_eq!(units[0].id.as_str(), "b");
    }
}
