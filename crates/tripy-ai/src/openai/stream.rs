//! Incremental assembly of a streamed chat completion.

use serde::Deserialize;
use tracing::debug;

use crate::{AiError, AiResponse, TokenUsage, ToolCall};

use super::client::{error_message, parse_arguments};

const DONE_SENTINEL: &str = "[DONE]";

/// How far past the last known slot a tool-call `index` may point.
const MAX_INDEX_GAP: usize = 16;

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<StreamUsage>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    index: usize,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize, Default)]
struct FunctionDelta {
    name: Option<String>,
    arguments: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct StreamUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Builds an [`AiResponse`] from the `data:` payloads of an SSE stream.
///
/// Tool-call fragments are keyed by their `index`; ids and names arrive once,
/// argument text arrives in pieces and is concatenated.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    tool_calls: Vec<PartialToolCall>,
    usage: TokenUsage,
    done: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event payload. Returns the text fragment it carried, if any.
    pub fn push(&mut self, data: &str) -> Result<Option<String>, AiError> {
        let data = data.trim();
        if data == DONE_SENTINEL {
            self.done = true;
            return Ok(None);
        }

        let chunk: StreamChunk = match serde_json::from_str(data) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!(error = %e, "skipping malformed stream chunk");
                return Ok(None);
            }
        };

        if let Some(err) = chunk.error {
            return Err(AiError::ApiError(error_message(&err)));
        }

        if let Some(u) = chunk.usage {
            self.usage.input_tokens = u.prompt_tokens.unwrap_or(0);
            self.usage.output_tokens = u.completion_tokens.unwrap_or(0);
        }

        let mut fragment = String::new();
        for choice in chunk.choices {
            if let Some(text) = choice.delta.content {
                fragment.push_str(&text);
            }

            for call in choice.delta.tool_calls.unwrap_or_default() {
                if call.index > self.tool_calls.len() + MAX_INDEX_GAP {
                    return Err(AiError::ParseError(format!(
                        "tool call index {} out of range ({} calls so far)",
                        call.index,
                        self.tool_calls.len()
                    )));
                }
                while self.tool_calls.len() <= call.index {
                    self.tool_calls.push(PartialToolCall::default());
                }
                let slot = &mut self.tool_calls[call.index];
                if let Some(id) = call.id {
                    slot.id = id;
                }
                if let Some(func) = call.function {
                    if let Some(name) = func.name {
                        slot.name = name;
                    }
                    if let Some(args) = func.arguments {
                        slot.arguments.push_str(&args);
                    }
                }
            }
        }

        if fragment.is_empty() {
            return Ok(None);
        }
        self.content.push_str(&fragment);
        Ok(Some(fragment))
    }

    /// Whether the `[DONE]` sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn finish(self) -> AiResponse {
        let tool_calls = self
            .tool_calls
            .into_iter()
            .enumerate()
            .filter(|(_, call)| !call.name.is_empty())
            .map(|(index, call)| ToolCall {
                id: if call.id.is_empty() {
                    format!("call_{index}")
                } else {
                    call.id
                },
                name: call.name,
                arguments: parse_arguments(&call.arguments),
            })
            .collect();

        AiResponse {
            content: self.content,
            tool_calls,
            usage: self.usage,
        }
    }
}
