//! Per-turn orchestration.
//!
//! The [`Orchestrator`] holds no session state: every call receives the
//! [`crate::SessionContext`] it acts on. A turn assembles the context,
//! calls the model, runs requested tools (bounded by `max_tool_rounds`),
//! and persists the human/assistant pair once a final text exists.

mod context;
mod orchestrator;
mod types;

pub use context::{build_context, window_history};
pub use orchestrator::Orchestrator;
pub use types::{AgentSettings, TurnError, TurnPhase, TurnReply, TurnStatus};

#[cfg(test)]
mod tests;
