//! Per-session state handed to every orchestrator call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tripy_common::SessionId;
use tripy_store::SessionLog;

use crate::token_tracker::TokenTracker;

use super::types::BusyGuard;

/// State scoped to one session. Never shared across sessions: switching
/// builds a new context.
pub struct SessionContext {
    log: SessionLog,
    usage: Mutex<TokenTracker>,
    busy: AtomicBool,
}

impl SessionContext {
    pub fn new(log: SessionLog) -> Self {
        Self {
            log,
            usage: Mutex::new(TokenTracker::new()),
            busy: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &SessionId {
        self.log.session_id()
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Snapshot of this session's usage counters.
    pub fn usage(&self) -> TokenTracker {
        self.usage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub(crate) fn update_usage(&self, update: impl FnOnce(&mut TokenTracker)) {
        let mut tracker = self
            .usage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        update(&mut tracker);
    }

    pub(crate) fn try_begin_turn(&self) -> Option<BusyGuard<'_>> {
        BusyGuard::acquire(&self.busy)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("session_id", self.id())
            .field("busy", &self.is_busy())
            .finish()
    }
}
