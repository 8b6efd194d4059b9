//! OpenAI-compatible chat-completion client.
//!
//! Implements the `AiClient` trait against any endpoint that speaks the
//! OpenAI `/chat/completions` protocol. OpenRouter is the default target.

mod api;
mod client;
mod config;
mod stream;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
pub use stream::StreamAccumulator;
