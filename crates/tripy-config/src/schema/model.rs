//! Hosted model endpoint configuration.

use serde::{Deserialize, Serialize};

/// Chat-completion endpoint and generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// OpenAI-compatible API root; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    /// Valid range: 0.0-2.0.
    pub temperature: f64,
    /// Maximum output tokens per model call (valid range: 1-32000).
    pub max_tokens: u32,
    /// Optional presence penalty (valid range: -2.0-2.0).
    pub presence_penalty: Option<f64>,
    /// Cap on model invocations per turn while tools are in play (1-20).
    pub max_tool_rounds: u32,
    /// Whole-request timeout in seconds (5-600).
    pub request_timeout_secs: u32,
    /// Render replies incrementally as they are generated.
    pub stream: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4.1-nano".to_string(),
            temperature: 0.7,
            max_tokens: 200,
            presence_penalty: None,
            max_tool_rounds: 5,
            request_timeout_secs: 120,
            stream: true,
        }
    }
}
