//! OpenAI-compatible client configuration.

use std::fmt;
use std::time::Duration;

use tripy_config::ModelConfig;

/// Connection and generation settings for one chat-completion endpoint.
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub presence_penalty: Option<f64>,
    pub request_timeout: Duration,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("presence_penalty", &self.presence_penalty)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_model_config(api_key, &ModelConfig::default())
    }

    /// Build from the `[model]` config section.
    pub fn from_model_config(api_key: impl Into<String>, model: &ModelConfig) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: model.base_url.clone(),
            model: model.model.clone(),
            max_tokens: model.max_tokens,
            temperature: model.temperature,
            presence_penalty: model.presence_penalty,
            request_timeout: Duration::from_secs(u64::from(model.request_timeout_secs)),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full URL of the chat-completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
