//! In-memory registry of draft sessions
//!
//! Each session sits behind its own `tokio::sync::Mutex`. The registry lock
//! is only held long enough to look up or insert a slot, so operations on
//! different tokens never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use super::session::{DraftSession, SessionState};
use crate::domain::SessionToken;

/// What the store keeps for one token
#[derive(Debug)]
pub enum SessionEntry {
    /// A live, editable draft
    Active(Box<DraftSession>),
    /// Tombstone of a committed or discarded draft; the draft itself is gone
    Closed {
        state: SessionState,
        closed_at: DateTime<Utc>,
    },
}

impl SessionEntry {
    pub fn state(&self) -> SessionState {
        match self {
            Self::Active(_) => SessionState::Active,
            Self::Closed { state, .. } => *state,
        }
    }

    pub fn as_active(&self) -> Option<&DraftSession> {
        match self {
            Self::Active(session) => Some(&**session),
            Self::Closed { .. } => None,
        }
    }

    /// Drop the draft, keeping only its final state
    pub fn close(&mut self, state: SessionState) {
        *self = Self::Closed {
            state,
            closed_at: Utc::now(),
        };
    }
}

/// Shared handle to one session slot
pub type SessionSlot = Arc<Mutex<SessionEntry>>;

/// Registry of draft sessions keyed by token
///
/// Owned by the service layer and shared with managers through `Arc`.
#[derive(Debug, Default)]
pub struct SessionStore {
    slots: Mutex<HashMap<SessionToken, SessionSlot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new active session under its own token
    pub async fn insert(&self, session: DraftSession) -> SessionToken {
        let token = session.token.clone();
        debug!(%token, "SessionStore::insert: called");
        let slot = Arc::new(Mutex::new(SessionEntry::Active(Box::new(session))));
        self.slots.lock().await.insert(token.clone(), slot);
        token
    }

    /// Look up the slot for a token
    pub async fn slot(&self, token: &SessionToken) -> Option<SessionSlot> {
        self.slots.lock().await.get(token).cloned()
    }

    /// Number of entries, tombstones included
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    /// Snapshot of every slot; the registry lock is released before returning
    async fn all_slots(&self) -> Vec<(SessionToken, SessionSlot)> {
        self.slots
            .lock()
            .await
            .iter()
            .map(|(token, slot)| (token.clone(), slot.clone()))
            .collect()
    }

    /// Tokens of sessions that are still active
    pub async fn active_tokens(&self) -> Vec<SessionToken> {
        let mut tokens = Vec::new();
        for (token, slot) in self.all_slots().await {
            if slot.lock().await.state() == SessionState::Active {
                tokens.push(token);
            }
        }
        tokens.sort();
        tokens
    }

    /// Active sessions not modified since `cutoff`, for an external reaper
    pub async fn idle_since(&self, cutoff: DateTime<Utc>) -> Vec<SessionToken> {
        debug!(%cutoff, "SessionStore::idle_since: called");
        let mut tokens = Vec::new();
        for (token, slot) in self.all_slots().await {
            if let Some(session) = slot.lock().await.as_active()
                && session.modified_at < cutoff
            {
                tokens.push(token);
            }
        }
        tokens.sort();
        tokens
    }

    /// Snapshots of active sessions matching `filter`
    pub async fn active_sessions<F>(&self, filter: F) -> Vec<DraftSession>
    where
        F: Fn(&DraftSession) -> bool,
    {
        let mut sessions = Vec::new();
        for (_, slot) in self.all_slots().await {
            if let Some(session) = slot.lock().await.as_active()
                && filter(session)
            {
                sessions.push(session.clone());
            }
        }
        sessions.sort_by_key(|s| s.created_at);
        sessions
    }

    /// Drop tombstones of committed and discarded sessions
    ///
    /// Afterwards those tokens report "not found" instead of their final state.
    pub async fn purge_terminated(&self) -> usize {
        debug!("SessionStore::purge_terminated: called");
        let mut closed = Vec::new();
        for (token, slot) in self.all_slots().await {
            if slot.lock().await.state().is_terminal() {
                closed.push(token);
            }
        }

        let mut slots = self.slots.lock().await;
        for token in &closed {
            slots.remove(token);
        }
        debug!(purged = closed.len(), "SessionStore::purge_terminated: done");
        closed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::build_window;
    use crate::domain::{DateRange, ExistingContext, RequesterContext, Scope};
    use chrono::{Duration, NaiveDate};

    fn session(teacher: &str) -> DraftSession {
        let day = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        DraftSession::new(
            RequesterContext::new(teacher, "c1"),
            Scope::new("s", "g", "math"),
            build_window(DateRange::single(day), &[day], &[], 5),
            Vec::new(),
            ExistingContext::default(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = SessionStore::new();
        assert!(store.is_empty().await);

        let token = store.insert(session("t1")).await;
        let slot = store.slot(&token).await.unwrap();
        assert_eq!(slot.lock().await.state(), SessionState::Active);
        assert!(store.slot(&SessionToken::from("missing")).await.is_none());
        assert_eq!(store.active_tokens().await, vec![token]);
    }

    #[tokio::test]
    async fn test_tombstones_and_purge() {
        let store = SessionStore::new();
        let kept = store.insert(session("t1")).await;
        let closed = store.insert(session("t1")).await;

        store.slot(&closed).await.unwrap().lock().await.close(SessionState::Discarded);

        assert_eq!(store.len().await, 2);
        assert_eq!(store.active_tokens().await, vec![kept.clone()]);
        let state = store.slot(&closed).await.unwrap().lock().await.state();
        assert_eq!(state, SessionState::Discarded);

        assert_eq!(store.purge_terminated().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.slot(&closed).await.is_none());
        assert!(store.slot(&kept).await.is_some());
    }

    #[tokio::test]
    async fn test_idle_since() {
        let store = SessionStore::new();
        let mut old = session("t1");
        old.modified_at = Utc::now() - Duration::hours(2);
        let old_token = store.insert(old).await;
        store.insert(session("t1")).await;

        let idle = store.idle_since(Utc::now() - Duration::hours(1)).await;
        assert_eq!(idle, vec![old_token]);
    }

    #[tokio::test]
    async fn test_active_sessions_filter() {
        let store = SessionStore::new();
        store.insert(session("alice")).await;
        store.insert(session("bob")).await;
        store.insert(session("alice")).await;

        let alice = store.active_sessions(|s| s.requester.teacher_id == "alice").await;
        assert_eq!(alice.len(), 2);
        assert!(alice[0].created_at <= alice[1].created_at);
    }

    #[tokio::test]
    async fn test_busy_slot_does_not_block_others() {
        let store = Arc::new(SessionStore::new());
        let a = store.insert(session("t1")).await;
        let b = store.insert(session("t1")).await;

        let slot_a = store.slot(&a).await.unwrap();
        let _held = slot_a.lock().await;

        let slot_b = store.slot(&b).await.unwrap();
        let guard = tokio::time::timeout(std::time::Duration::from_millis(100), slot_b.lock()).await;
        assert!(guard.is_ok());
        assert!(slot_a.try_lock().is_err());
    }
}
