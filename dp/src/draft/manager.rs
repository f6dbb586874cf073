//! DraftManager - owns the draft lifecycle
//!
//! generate → (modify)* → commit | discard. Drafts live only in the
//! [`SessionStore`]; the lesson sink is touched exclusively by a confirmed
//! commit.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::edit::Edit;
use super::session::{DraftSession, SessionState};
use super::store::{SessionEntry, SessionSlot, SessionStore};
use crate::calendar::WindowCalculator;
use crate::config::PlanningConfig;
use crate::curriculum::CurriculumReader;
use crate::domain::{
    ConfirmationToken, DateRange, ExistingContext, RecordId, RequesterContext, Scope, SessionToken,
};
use crate::error::{PlanError, PlanResult};
use crate::pacing::RiskDetector;
use crate::source::{LessonRecordRequest, LessonStatus, PlanningSources};

/// What `generate` and `modify` hand back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct DraftProposal {
    pub session_token: SessionToken,
    /// Authorizes committing exactly this revision
    pub confirmation_token: ConfirmationToken,
    pub session: DraftSession,
}

/// Coordinates calendar, curriculum, pacing and persistence for drafts
pub struct DraftManager {
    sources: PlanningSources,
    calendar: WindowCalculator,
    curriculum: CurriculumReader,
    detector: RiskDetector,
    store: Arc<SessionStore>,
}

impl DraftManager {
    /// Create a manager applying `config` to every session it creates
    pub fn new(sources: PlanningSources, config: &PlanningConfig, store: Arc<SessionStore>) -> Self {
        debug!(?config, "DraftManager::new: called");
        Self {
            calendar: WindowCalculator::new(sources.calendar.clone(), config.days_per_week),
            curriculum: CurriculumReader::new(sources.curriculum.clone()),
            detector: RiskDetector::new(config.overload_threshold),
            sources,
            store,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Build a new draft for `scope` over `start..=end`
    pub async fn generate(
        &self,
        requester: RequesterContext,
        scope: Scope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PlanResult<DraftProposal> {
        debug!(teacher = %requester.teacher_id, class = %requester.class_id, %scope, %start, %end, "DraftManager::generate: called");
        let range = DateRange::new(start, end)?;

        let window = self.calendar.compute_range(&scope, range).await?;
        let hierarchy = self.curriculum.get_hierarchy(&scope).await?;
        let existing = self.load_context(&scope, &requester, &range).await?;

        let mut session = DraftSession::new(requester, scope, window, hierarchy.ordered_topics(), existing);
        session.replan(&self.detector);
        let confirmation_token = session.mint_confirmation();
        let snapshot = session.clone();

        let session_token = self.store.insert(session).await;
        info!(
            token = %session_token,
            topics = snapshot.topics.len(),
            available_weeks = snapshot.window.available_weeks,
            max_week = snapshot.schedule.max_week(),
            risks = snapshot.risks.len(),
            "Draft generated"
        );

        Ok(DraftProposal {
            session_token,
            confirmation_token,
            session: snapshot,
        })
    }

    /// Apply one edit, re-plan, and mint a new confirmation
    ///
    /// A rejected edit or a failed calendar read leaves the session unchanged.
    pub async fn modify(&self, token: &SessionToken, edit: Edit) -> PlanResult<DraftProposal> {
        debug!(%token, edit = edit.name(), "DraftManager::modify: called");
        let slot = self.slot(token).await?;
        let mut entry = slot.lock().await;
        let session = active_mut(&mut entry, token)?;

        let mut updated = session.clone();
        match &edit {
            Edit::ShiftWindow { range } => {
                let range = DateRange::new(range.start, range.end)?;
                updated.window = self.calendar.compute_range(&updated.scope, range).await?;
                updated.existing = self.load_context(&updated.scope, &updated.requester, &range).await?;
            }
            other => {
                updated.topics = other.apply(&session.topics)?;
            }
        }

        updated.replan(&self.detector);
        updated.touch();
        let confirmation_token = updated.mint_confirmation();
        *session = updated;

        debug!(%token, max_week = session.schedule.max_week(), "DraftManager::modify: applied");
        Ok(DraftProposal {
            session_token: token.clone(),
            confirmation_token,
            session: session.clone(),
        })
    }

    /// Mint a fresh confirmation for the current revision, expiring the previous one
    pub async fn issue_confirmation(&self, token: &SessionToken) -> PlanResult<ConfirmationToken> {
        debug!(%token, "DraftManager::issue_confirmation: called");
        let slot = self.slot(token).await?;
        let mut entry = slot.lock().await;
        let session = active_mut(&mut entry, token)?;
        Ok(session.mint_confirmation())
    }

    /// Snapshot of an active session
    pub async fn get(&self, token: &SessionToken) -> PlanResult<DraftSession> {
        debug!(%token, "DraftManager::get: called");
        let slot = self.slot(token).await?;
        let entry = slot.lock().await;
        match &*entry {
            SessionEntry::Active(session) => Ok((**session).clone()),
            SessionEntry::Closed { state, .. } => Err(PlanError::InvalidSessionState {
                token: token.to_string(),
                state: *state,
            }),
        }
    }

    /// Active sessions owned by `teacher_id`, oldest first
    pub async fn list_for_teacher(&self, teacher_id: &str) -> Vec<DraftSession> {
        debug!(%teacher_id, "DraftManager::list_for_teacher: called");
        self.store
            .active_sessions(|s| s.requester.teacher_id == teacher_id)
            .await
    }

    /// Throw a draft away without persisting anything
    pub async fn discard(&self, token: &SessionToken) -> PlanResult<()> {
        debug!(%token, "DraftManager::discard: called");
        let slot = self.slot(token).await?;
        let mut entry = slot.lock().await;
        active_mut(&mut entry, token)?;

        entry.close(SessionState::Discarded);
        info!(%token, "Draft discarded");
        Ok(())
    }

    /// Persist the draft as not-finalized lesson records
    ///
    /// On a partial failure the session stays active, the records created so
    /// far are remembered, and a later commit (with a fresh confirmation)
    /// creates only the remaining ones.
    pub async fn commit(&self, token: &SessionToken, confirmation: &ConfirmationToken) -> PlanResult<Vec<RecordId>> {
        debug!(%token, "DraftManager::commit: called");
        let slot = self.slot(token).await?;
        let mut entry = slot.lock().await;
        let session = active_mut(&mut entry, token)?;

        if !session.confirmation_matches(confirmation) {
            debug!(%token, "DraftManager::commit: confirmation mismatch");
            return Err(PlanError::InvalidConfirmation(token.to_string()));
        }
        session.confirmation = None;

        let mut created = Vec::with_capacity(session.schedule.topic_count());
        let mut failure = None;
        for (week_slot, topic) in session.schedule.iter_topics() {
            if let Some(id) = session.persisted_records().get(&topic.topic_id) {
                created.push(id.clone());
                continue;
            }

            let request = LessonRecordRequest {
                requester: session.requester.clone(),
                subject: session.scope.subject.clone(),
                topic_id: topic.topic_id.clone(),
                topic_label: topic.topic_name.clone(),
                span: session.window.week_span(week_slot.week, week_slot.span_weeks),
                status: LessonStatus::NotFinalized,
            };
            match self.sources.lessons.create(request).await {
                Ok(id) => created.push(id),
                Err(source) => {
                    failure = Some((topic.topic_id.clone(), source));
                    break;
                }
            }
        }

        // Remember what was persisted so a retry does not duplicate it
        let persisted: Vec<_> = session
            .schedule
            .iter_topics()
            .map(|(_, t)| t.topic_id.clone())
            .zip(created.iter().cloned())
            .collect();
        session.committed.extend(persisted);

        if let Some((failed_topic, source)) = failure {
            warn!(%token, created = created.len(), %failed_topic, error = %source, "Commit stopped on lesson store failure");
            return Err(PlanError::Persistence {
                created,
                failed_topic,
                source,
            });
        }

        entry.close(SessionState::Committed);
        info!(%token, records = created.len(), "Draft committed");
        Ok(created)
    }

    async fn slot(&self, token: &SessionToken) -> PlanResult<SessionSlot> {
        self.store
            .slot(token)
            .await
            .ok_or_else(|| PlanError::SessionNotFound(token.to_string()))
    }

    async fn load_context(
        &self,
        scope: &Scope,
        requester: &RequesterContext,
        range: &DateRange,
    ) -> PlanResult<ExistingContext> {
        let scheduled_items = self.sources.context.scheduled_items(scope, requester, range).await?;
        let assessment_items = self.sources.context.assessment_items(scope, requester, range).await?;
        Ok(ExistingContext {
            scheduled_items,
            assessment_items,
        })
    }
}

/// Borrow the live session, or report why there is none
fn active_mut<'a>(entry: &'a mut SessionEntry, token: &SessionToken) -> PlanResult<&'a mut DraftSession> {
    match entry {
        SessionEntry::Active(session) => Ok(&mut **session),
        SessionEntry::Closed { state, .. } => Err(PlanError::InvalidSessionState {
            token: token.to_string(),
            state: *state,
        }),
    }
}
