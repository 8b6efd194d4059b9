//! Conversation session management.
//!
//! A [`SessionContext`] is everything one session's turns need: its store
//! partition, usage counters and the busy flag that keeps turns from
//! overlapping. The [`SessionManager`] owns the current context and builds a
//! fresh one on every switch.

mod context;
mod manager;
mod types;

pub use context::SessionContext;
pub use manager::SessionManager;
