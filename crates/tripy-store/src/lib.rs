//! Durable, session-keyed conversation history.
//!
//! A [`ConversationStore`] is an append-only log of [`Turn`]s partitioned by
//! [`SessionId`]. [`SqliteStore`] is the production backend; a
//! [`SessionLog`] binds one session to a store so callers never pass the
//! identifier around by hand.

mod session_log;
mod sqlite;

pub use session_log::SessionLog;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use tripy_common::{Role, SessionId, StoreError, Turn};

/// Listing entry for a stored session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub turn_count: usize,
    pub last_active: DateTime<Utc>,
    /// First human message, shortened for display.
    pub title: Option<String>,
}

/// Persistence contract for conversation turns.
///
/// Sessions are independent partitions; there are no cross-session
/// invariants. Implementations assume a single writer per process.
pub trait ConversationStore: Send + Sync {
    /// Append one turn. Each call creates a new turn.
    fn append(&self, session: &SessionId, role: Role, content: &str) -> Result<(), StoreError>;

    /// Append a human message and its assistant reply as one unit: either
    /// both turns are stored or neither is.
    fn append_exchange(
        &self,
        session: &SessionId,
        human: &str,
        assistant: &str,
    ) -> Result<(), StoreError>;

    /// All turns of `session` in insertion order; empty for an unknown session.
    fn read(&self, session: &SessionId) -> Result<Vec<Turn>, StoreError>;

    /// Sessions that have at least one turn, most recently active first.
    fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError>;

    /// Remove every turn of `session`. Unknown sessions are a no-op.
    fn clear(&self, session: &SessionId) -> Result<(), StoreError>;

    /// Per-session summaries in the same order as [`Self::list_sessions`].
    fn summaries(&self) -> Result<Vec<SessionSummary>, StoreError>;
}
