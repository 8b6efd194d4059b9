//! Session lifecycle: create, switch, delete, list.

use std::sync::Arc;

use tracing::{debug, info};
use tripy_common::{SessionId, StoreError, TripyError, Turn};
use tripy_store::{ConversationStore, SessionLog, SessionSummary};

use super::context::SessionContext;

/// Tracks the current session over a conversation store.
pub struct SessionManager {
    store: Arc<dyn ConversationStore>,
    current: SessionContext,
}

impl SessionManager {
    /// Start on a brand-new session.
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self::with_session(store, SessionId::new())
    }

    /// Start on an existing (or new) session id.
    pub fn with_session(store: Arc<dyn ConversationStore>, id: SessionId) -> Self {
        let current = SessionContext::new(SessionLog::new(store.clone(), id));
        Self { store, current }
    }

    pub fn current(&self) -> &SessionContext {
        &self.current
    }

    pub fn current_id(&self) -> &SessionId {
        self.current.id()
    }

    /// A fresh identifier. Nothing is stored until its first turn.
    pub fn create(&self) -> SessionId {
        SessionId::new()
    }

    /// Create a session and make it current.
    pub fn start_new(&mut self) -> SessionId {
        let id = self.create();
        self.switch(id.clone());
        id
    }

    /// Make `id` current with a brand-new context.
    pub fn switch(&mut self, id: SessionId) {
        debug!(from = %self.current.id().short(), to = %id.short(), "switching session");
        self.current = SessionContext::new(SessionLog::new(self.store.clone(), id));
    }

    /// Remove every turn of `id`. Deleting the current session moves to a
    /// new one. Returns the current id afterwards.
    pub fn delete(&mut self, id: &SessionId) -> Result<SessionId, StoreError> {
        self.store.clear(id)?;
        info!(session = %id.short(), "deleted session");
        if id == self.current.id() {
            self.start_new();
        }
        Ok(self.current.id().clone())
    }

    pub fn list(&self) -> Result<Vec<SessionId>, StoreError> {
        self.store.list_sessions()
    }

    pub fn summaries(&self) -> Result<Vec<SessionSummary>, StoreError> {
        self.store.summaries()
    }

    /// Turns of the current session.
    pub fn history(&self) -> Result<Vec<Turn>, StoreError> {
        self.current.log().read()
    }

    /// Find a stored session (or the current one) by id prefix.
    ///
    /// An exact match wins; otherwise the prefix must be unique.
    pub fn resolve(&self, prefix: &str) -> Result<Option<SessionId>, TripyError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(None);
        }

        let mut candidates = self.list()?;
        if !candidates.contains(self.current.id()) {
            candidates.push(self.current.id().clone());
        }

        if let Some(exact) = candidates.iter().find(|id| id.as_str() == prefix) {
            return Ok(Some(exact.clone()));
        }

        let matches: Vec<SessionId> = candidates
            .into_iter()
            .filter(|id| id.as_str().starts_with(prefix))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.into_iter().next()),
            n => Err(TripyError::Session(format!(
                "'{prefix}' matches {n} sessions; use a longer prefix"
            ))),
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("current", &self.current)
            .finish()
    }
}
