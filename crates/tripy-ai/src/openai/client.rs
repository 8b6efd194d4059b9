//! Client struct, request building, and response parsing.

use serde_json::{json, Value};
use tripy_common::Role;

use crate::tools::to_openai_tool;
use crate::{AiError, AiResponse, Message, TokenUsage, ToolCall, ToolDefinition};

use super::config::OpenAiConfig;

/// Chat-completion client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    pub(crate) config: OpenAiConfig,
    pub(crate) http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Build the JSON request body for `/chat/completions`.
    pub(crate) fn build_request_body(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        stream: bool,
    ) -> Value {
        let msgs: Vec<Value> = messages.iter().map(to_openai_message).collect();

        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": msgs,
        });

        if let Some(penalty) = self.config.presence_penalty {
            body["presence_penalty"] = json!(penalty);
        }

        if !tools.is_empty() {
            let tool_defs: Vec<_> = tools.iter().map(to_openai_tool).collect();
            body["tools"] = json!(tool_defs);
            body["tool_choice"] = json!("auto");
        }

        if stream {
            body["stream"] = json!(true);
            body["stream_options"] = json!({ "include_usage": true });
        }

        body
    }

    /// Parse a non-streaming response.
    pub(crate) fn parse_response(&self, json: Value) -> Result<AiResponse, AiError> {
        if let Some(err) = json.get("error") {
            return Err(AiError::ApiError(error_message(err)));
        }

        let message = json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .map(|choice| &choice["message"])
            .ok_or_else(|| AiError::ParseError("response contained no choices".into()))?;

        let content = message["content"].as_str().unwrap_or_default().to_string();

        let tool_calls = message["tool_calls"]
            .as_array()
            .map(|calls| {
                calls
                    .iter()
                    .map(|c| ToolCall {
                        id: c["id"].as_str().unwrap_or("").to_string(),
                        name: c["function"]["name"].as_str().unwrap_or("").to_string(),
                        arguments: parse_arguments(
                            c["function"]["arguments"].as_str().unwrap_or(""),
                        ),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let usage = TokenUsage {
            input_tokens: json["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
            output_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0),
        };

        Ok(AiResponse {
            content,
            tool_calls,
            usage,
        })
    }
}

/// Map one context message onto the wire format.
pub(crate) fn to_openai_message(msg: &Message) -> Value {
    match msg.role {
        Role::System => json!({ "role": "system", "content": msg.content }),
        Role::Human => json!({ "role": "user", "content": msg.content }),
        Role::Assistant if !msg.tool_calls.is_empty() => {
            let calls: Vec<Value> = msg
                .tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments.to_string(),
                        },
                    })
                })
                .collect();
            let content = if msg.content.is_empty() {
                Value::Null
            } else {
                json!(msg.content)
            };
            json!({ "role": "assistant", "content": content, "tool_calls": calls })
        }
        Role::Assistant => json!({ "role": "assistant", "content": msg.content }),
        Role::Tool => json!({
            "role": "tool",
            "tool_call_id": msg.tool_call_id.as_deref().unwrap_or_default(),
            "content": msg.content,
        }),
    }
}

/// Tool arguments arrive as a JSON-encoded string. Unparseable text is kept
/// verbatim so the tool can report it.
pub(crate) fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Extract a readable message from an API `error` object.
pub(crate) fn error_message(err: &Value) -> String {
    match err.get("message").and_then(Value::as_str) {
        Some(message) => match err.get("code") {
            Some(code) if !code.is_null() => format!("{message} (code {code})"),
            _ => message.to_string(),
        },
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new(OpenAiConfig::new("test-key")).unwrap()
    }

    fn weather_tool() -> ToolDefinition {
        ToolDefinition {
            name: "get_weather".into(),
            description: "Weather".into(),
            parameters: json!({ "type": "object", "properties": {} }),
        }
    }

    #[test]
    fn request_body_maps_roles() {
        let messages = vec![
            Message::system("You are Tripy"),
            Message::human("Weather in Rome?"),
            Message::assistant_tool_calls(
                "",
                vec![ToolCall {
                    id: "call_1".into(),
                    name: "get_weather".into(),
                    arguments: json!({ "city": "Rome" }),
                }],
            ),
            Message::tool_result("call_1", "Temperature: 21°C"),
            Message::assistant("Pack light."),
        ];

        let body = client().build_request_body(&messages, &[weather_tool()], false);
        let msgs = body["messages"].as_array().unwrap();

        assert_eq!(msgs[0]["role"], "system");
        assert_eq!(msgs[1]["role"], "user");
        assert_eq!(msgs[2]["role"], "assistant");
        assert!(msgs[2]["content"].is_null());
        assert_eq!(msgs[2]["tool_calls"][0]["type"], "function");
        assert_eq!(
            msgs[2]["tool_calls"][0]["function"]["arguments"],
            "{\"city\":\"Rome\"}"
        );
        assert_eq!(msgs[3]["role"], "tool");
        assert_eq!(msgs[3]["tool_call_id"], "call_1");
        assert_eq!(msgs[4]["content"], "Pack light.");

        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "get_weather");
        assert_eq!(body["max_tokens"], 200);
        assert!(body.get("stream").is_none());
        assert!(body.get("presence_penalty").is_none());
    }

    #[test]
    fn streaming_body_requests_usage() {
        let body = client().build_request_body(&[Message::human("hi")], &[], true);
        assert_eq!(body["stream"], true);
        assert_eq!(body["stream_options"]["include_usage"], true);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn presence_penalty_is_sent_when_set() {
        let mut config = OpenAiConfig::new("k");
        config.presence_penalty = Some(0.5);
        let client = OpenAiClient::new(config).unwrap();
        let body = client.build_request_body(&[Message::human("hi")], &[], false);
        assert_eq!(body["presence_penalty"], 0.5);
    }

    #[test]
    fn parses_text_response() {
        let json = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Day 1: Colosseum" } }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 30 }
        });
        let response = client().parse_response(json).unwrap();
        assert_eq!(response.content, "Day 1: Colosseum");
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.usage.input_tokens, 120);
        assert_eq!(response.usage.output_tokens, 30);
    }

    #[test]
    fn parses_tool_call_response() {
        let json = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": { "name": "get_weather", "arguments": "{\"city\":\"Oslo\",\"country_code\":\"no\"}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let response = client().parse_response(json).unwrap();
        assert_eq!(response.content, "");
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].id, "call_abc");
        assert_eq!(response.tool_calls[0].arguments["city"], "Oslo");
    }

    #[test]
    fn error_object_is_api_error() {
        let json = json!({ "error": { "message": "No auth credentials found", "code": 401 } });
        let err = client().parse_response(json).unwrap_err();
        match err {
            AiError::ApiError(msg) => assert!(msg.contains("No auth credentials found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_choices_is_parse_error() {
        let err = client().parse_response(json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, AiError::ParseError(_)));
    }

    #[test]
    fn arguments_fall_back_to_raw_text() {
        assert_eq!(parse_arguments(""), json!({}));
        assert_eq!(parse_arguments("{\"city\":\"Rome\"}")["city"], "Rome");
        assert_eq!(parse_arguments("{broken"), Value::String("{broken".into()));
    }
}
