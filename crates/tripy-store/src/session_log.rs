//! Session-bound view of a conversation store.

use std::sync::Arc;

use tripy_common::{Role, SessionId, StoreError, Turn};

use crate::ConversationStore;

/// One session's partition of a [`ConversationStore`].
#[derive(Clone)]
pub struct SessionLog {
    store: Arc<dyn ConversationStore>,
    session_id: SessionId,
}

impl SessionLog {
    pub fn new(store: Arc<dyn ConversationStore>, session_id: SessionId) -> Self {
        Self { store, session_id }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn append(&self, role: Role, content: &str) -> Result<(), StoreError> {
        self.store.append(&self.session_id, role, content)
    }

    /// Store a human message together with its reply.
    pub fn append_exchange(&self, human: &str, assistant: &str) -> Result<(), StoreError> {
        self.store.append_exchange(&self.session_id, human, assistant)
    }

    pub fn read(&self) -> Result<Vec<Turn>, StoreError> {
        self.store.read(&self.session_id)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.clear(&self.session_id)
    }
}

impl std::fmt::Debug for SessionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLog")
            .field("session_id", &self.session_id)
            .finish()
    }
}
