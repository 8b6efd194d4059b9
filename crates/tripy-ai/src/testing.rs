//! In-process fakes shared by the crate's tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::{AiClient, AiError, AiResponse, Message, TokenUsage, ToolCall, ToolDefinition};

pub(crate) fn text(content: &str) -> AiResponse {
    AiResponse {
        content: content.to_string(),
        tool_calls: Vec::new(),
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

pub(crate) fn weather_call(id: &str, city: &str) -> AiResponse {
    AiResponse {
        content: String::new(),
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: "get_weather".to_string(),
            arguments: json!({ "city": city }),
        }],
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 2,
        },
    }
}

/// Replays a fixed script of responses and records every request.
///
/// Once the script runs out, `fallback` (if any) is returned forever.
pub(crate) struct ScriptedClient {
    script: Mutex<VecDeque<Result<AiResponse, AiError>>>,
    fallback: Option<AiResponse>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedClient {
    pub(crate) fn new(script: Vec<Result<AiResponse, AiError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client that answers every request with `response`.
    pub(crate) fn always(response: AiResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::new(Vec::new())
        }
    }

    pub(crate) fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next(&self, messages: &[Message]) -> Result<AiResponse, AiError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| AiError::ApiError("script exhausted".into())),
        }
    }
}

#[async_trait]
impl AiClient for ScriptedClient {
    async fn send_message(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<AiResponse, AiError> {
        self.next(messages)
    }

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
        on_chunk: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<AiResponse, AiError> {
        let response = self.next(messages)?;
        for word in response.content.split_inclusive(' ') {
            on_chunk(word.to_string());
        }
        Ok(response)
    }
}
