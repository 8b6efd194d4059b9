//! Turn settings, phases and results.

use tripy_common::StoreError;
use tripy_config::TripyConfig;

use crate::AiError;

/// Reply used when the tool budget runs out before the model produced text.
pub const TOOL_LIMIT_FALLBACK: &str =
    "I wasn't able to finish looking that up. Could you try rephrasing or narrowing the request?";

/// Reply used when the model finishes without any text.
pub const EMPTY_REPLY_FALLBACK: &str =
    "I'm sorry, I don't have an answer for that. Could you rephrase your question?";

/// Orchestrator knobs taken from the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    /// Model invocations allowed per turn.
    pub max_tool_rounds: u32,
    /// Most recent turns sent as history; 0 sends all.
    pub history_window: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_tool_rounds: 5,
            history_window: 40,
        }
    }
}

impl AgentSettings {
    pub fn from_config(config: &TripyConfig) -> Self {
        Self {
            max_tool_rounds: config.model.max_tool_rounds.max(1),
            history_window: config.history.window,
        }
    }
}

/// Where a turn is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    ContextBuilt,
    ModelInvoked,
    ToolInvoked,
    ResponseReady,
    Persisted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Completed,
    ToolLimitReached,
    Failed,
}

/// Outcome of one turn. `text` is always displayable.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub text: String,
    pub status: TurnStatus,
    /// Whether the human/assistant pair reached the store.
    pub persisted: bool,
    /// Phases passed through, in order.
    pub phases: Vec<TurnPhase>,
}

impl TurnReply {
    pub fn is_failed(&self) -> bool {
        self.status == TurnStatus::Failed
    }
}

/// Why a turn failed before producing a reply.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error("failed to load conversation history: {0}")]
    History(#[from] StoreError),
    #[error("this session is already handling a message")]
    Busy,
}

/// The text shown for a failed turn.
pub(crate) fn apology(error: &TurnError) -> String {
    format!("Sorry, I encountered an error: {error}. Please try again!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apology_wraps_error() {
        let text = apology(&TurnError::Ai(AiError::RateLimited));
        assert_eq!(text, "Sorry, I encountered an error: Rate limited. Please try again!");
    }

    #[test]
    fn settings_follow_config() {
        let mut config = TripyConfig::default();
        config.model.max_tool_rounds = 3;
        config.history.window = 0;
        let settings = AgentSettings::from_config(&config);
        assert_eq!(settings.max_tool_rounds, 3);
        assert_eq!(settings.history_window, 0);
    }
}
