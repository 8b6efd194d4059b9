//! AiClient trait implementation for OpenAiClient (send_message + streaming).

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::streaming::{parse_sse_stream, SseEvent};
use crate::{AiClient, AiError, AiResponse, Message, ToolDefinition};

use super::client::OpenAiClient;
use super::stream::StreamAccumulator;

impl OpenAiClient {
    /// POST the body and reject non-success statuses.
    async fn post(&self, body: &serde_json::Value) -> Result<reqwest::Response, AiError> {
        let response = self
            .http
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }
        Ok(response)
    }
}

fn map_transport_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else {
        AiError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl AiClient for OpenAiClient {
    async fn send_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AiResponse, AiError> {
        let body = self.build_request_body(messages, tools, false);

        debug!(model = %self.config.model, messages = messages.len(), "chat completion request");

        let response = self.post(&body).await?;
        let json: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AiError::Timeout
            } else {
                AiError::ParseError(e.to_string())
            }
        })?;

        self.parse_response(json)
    }

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_chunk: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<AiResponse, AiError> {
        let body = self.build_request_body(messages, tools, true);

        debug!(model = %self.config.model, messages = messages.len(), "chat completion streaming request");

        let response = self.post(&body).await?;

        let mut accumulator = StreamAccumulator::new();
        parse_sse_stream(response, |event: SseEvent| {
            if event.event.as_deref() == Some("error") {
                return Err(AiError::ApiError(event.data));
            }
            if let Some(fragment) = accumulator.push(&event.data)? {
                on_chunk(fragment);
            }
            Ok(())
        })
        .await?;

        if !accumulator.is_done() {
            warn!("stream ended without a [DONE] marker");
        }

        let response = accumulator.finish();
        if response.usage.total_tokens() == 0 {
            warn!("No usage data received in streaming response");
        }
        Ok(response)
    }
}
