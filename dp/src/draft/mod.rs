//! Draft sessions: editable pacing proposals with confirm-to-commit
//!
//! A draft is never persisted. Only `DraftManager::commit`, given the
//! confirmation token minted for the current revision, writes lesson records.

mod edit;
mod manager;
mod session;
mod store;

pub use edit::Edit;
pub use manager::{DraftManager, DraftProposal};
pub use session::{DraftSession, SessionState, SessionTopic};
pub use store::{SessionEntry, SessionSlot, SessionStore};
