//! Token usage tracking for one session.

use crate::TokenUsage;

/// Cumulative usage counters, one tracker per session context.
#[derive(Debug, Clone, Default)]
pub struct TokenTracker {
    total: TokenUsage,
    model_calls: u64,
    tool_calls: u64,
    turns: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record token usage from one model call.
    pub fn record(&mut self, usage: &TokenUsage) {
        self.total.input_tokens = self.total.input_tokens.saturating_add(usage.input_tokens);
        self.total.output_tokens = self.total.output_tokens.saturating_add(usage.output_tokens);
        self.model_calls += 1;
    }

    pub fn record_tool_call(&mut self) {
        self.tool_calls += 1;
    }

    pub fn record_turn(&mut self) {
        self.turns += 1;
    }

    pub fn total(&self) -> &TokenUsage {
        &self.total
    }

    pub fn total_tokens(&self) -> u64 {
        self.total.total_tokens()
    }

    pub fn model_calls(&self) -> u64 {
        self.model_calls
    }

    pub fn tool_calls(&self) -> u64 {
        self.tool_calls
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }
}
