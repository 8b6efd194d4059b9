//! The turn loop: model call, tool execution, persistence.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};
use tripy_common::new_correlation_id;

use crate::prompts::system_prompt_for_today;
use crate::session::SessionContext;
use crate::tools::ToolSet;
use crate::{AiClient, AiResponse, Message, ToolDefinition};

use super::context::build_context;
use super::types::{
    apology, AgentSettings, TurnError, TurnPhase, TurnReply, TurnStatus, EMPTY_REPLY_FALLBACK,
    TOOL_LIMIT_FALLBACK,
};

/// Chunk callback shared across every model call of a streamed turn.
type ChunkSink = Arc<dyn Fn(String) + Send + Sync>;

/// Forwards fragments to the caller and keeps the text of the current round.
struct StreamCapture {
    sink: ChunkSink,
    round_text: Arc<Mutex<String>>,
}

impl StreamCapture {
    fn new(cb: ChunkSink) -> Self {
        let round_text = Arc::new(Mutex::new(String::new()));
        let captured = round_text.clone();
        let sink: ChunkSink = Arc::new(move |chunk: String| {
            if let Ok(mut text) = captured.lock() {
                text.push_str(&chunk);
            }
            cb(chunk);
        });
        Self { sink, round_text }
    }

    /// Forget text streamed alongside a tool-call request.
    fn reset(&self) {
        if let Ok(mut text) = self.round_text.lock() {
            text.clear();
        }
    }

    fn text(&self) -> String {
        self.round_text
            .lock()
            .map(|text| text.clone())
            .unwrap_or_default()
    }
}

struct Outcome {
    text: String,
    status: TurnStatus,
}

/// Phase bookkeeping for one turn.
struct TurnTrace {
    turn_id: String,
    phases: Vec<TurnPhase>,
}

impl TurnTrace {
    fn new() -> Self {
        Self {
            turn_id: new_correlation_id(),
            phases: Vec::new(),
        }
    }

    fn enter(&mut self, phase: TurnPhase) {
        debug!(turn = %self.turn_id, ?phase, "turn phase");
        self.phases.push(phase);
    }
}

/// Runs turns against whichever session context it is handed.
pub struct Orchestrator {
    client: Arc<dyn AiClient>,
    tools: ToolSet,
    settings: AgentSettings,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn AiClient>, tools: ToolSet, settings: AgentSettings) -> Self {
        Self {
            client,
            tools,
            settings,
        }
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Answer `input` in `ctx`, returning once the full reply is known.
    pub async fn respond(&self, ctx: &SessionContext, input: &str) -> TurnReply {
        self.run_turn(ctx, input, None).await
    }

    /// Answer `input` in `ctx`, delivering text fragments to `on_chunk` as
    /// the model generates them. The fragments of the final model round are
    /// what gets persisted.
    pub async fn respond_streaming(
        &self,
        ctx: &SessionContext,
        input: &str,
        on_chunk: impl Fn(String) + Send + Sync + 'static,
    ) -> TurnReply {
        self.run_turn(ctx, input, Some(Arc::new(on_chunk))).await
    }

    async fn run_turn(&self, ctx: &SessionContext, input: &str, sink: Option<ChunkSink>) -> TurnReply {
        let mut trace = TurnTrace::new();
        trace.enter(TurnPhase::Idle);

        let Some(_guard) = ctx.try_begin_turn() else {
            warn!(session = %ctx.id().short(), "turn rejected: session busy");
            return failed(&TurnError::Busy, trace);
        };

        info!(turn = %trace.turn_id, session = %ctx.id().short(), "turn started");

        let capture = sink.map(StreamCapture::new);

        let outcome = match self.converse(ctx, input, capture.as_ref(), &mut trace).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(turn = %trace.turn_id, error = %e, "turn failed");
                return failed(&e, trace);
            }
        };

        // A streamed reply is stored exactly as the user saw its final round.
        let text = match capture.map(|c| c.text()) {
            Some(streamed) if !streamed.is_empty() => streamed,
            _ if !outcome.text.is_empty() => outcome.text,
            _ if outcome.status == TurnStatus::ToolLimitReached => TOOL_LIMIT_FALLBACK.to_string(),
            _ => EMPTY_REPLY_FALLBACK.to_string(),
        };

        let persisted = match ctx.log().append_exchange(input, &text) {
            Ok(()) => {
                trace.enter(TurnPhase::Persisted);
                true
            }
            Err(e) => {
                warn!(turn = %trace.turn_id, error = %e, "failed to persist turn");
                false
            }
        };
        ctx.update_usage(|t| t.record_turn());
        trace.enter(TurnPhase::Idle);

        info!(turn = %trace.turn_id, status = ?outcome.status, persisted, "turn finished");
        TurnReply {
            text,
            status: outcome.status,
            persisted,
            phases: trace.phases,
        }
    }

    /// Context assembly and the bounded model/tool loop.
    async fn converse(
        &self,
        ctx: &SessionContext,
        input: &str,
        capture: Option<&StreamCapture>,
        trace: &mut TurnTrace,
    ) -> Result<Outcome, TurnError> {
        let history = ctx.log().read()?;
        let mut messages = build_context(
            &system_prompt_for_today(),
            &history,
            self.settings.history_window,
            input,
        );
        trace.enter(TurnPhase::ContextBuilt);
        debug!(turn = %trace.turn_id, history = history.len(), sent = messages.len() - 2, "context built");

        let tools = self.tools.definitions();
        let max_rounds = self.settings.max_tool_rounds.max(1);

        let mut round = 0;
        loop {
            round += 1;
            trace.enter(TurnPhase::ModelInvoked);
            let response = self
                .invoke(&messages, &tools, capture.map(|c| &c.sink))
                .await?;
            ctx.update_usage(|t| t.record(&response.usage));

            if response.tool_calls.is_empty() {
                trace.enter(TurnPhase::ResponseReady);
                return Ok(Outcome {
                    text: response.content,
                    status: TurnStatus::Completed,
                });
            }

            if round >= max_rounds {
                warn!(turn = %trace.turn_id, max_rounds, "tool loop limit reached");
                trace.enter(TurnPhase::ResponseReady);
                return Ok(Outcome {
                    text: response.content,
                    status: TurnStatus::ToolLimitReached,
                });
            }

            debug!(turn = %trace.turn_id, round, calls = response.tool_calls.len(), "model requested tools");
            if let Some(capture) = capture {
                capture.reset();
            }
            messages.push(Message::assistant_tool_calls(
                response.content,
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                trace.enter(TurnPhase::ToolInvoked);
                let result = self.tools.execute(call).await;
                ctx.update_usage(|t| t.record_tool_call());
                messages.push(Message::tool_result(call.id.clone(), result));
            }
        }
    }

    async fn invoke(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        sink: Option<&ChunkSink>,
    ) -> Result<AiResponse, TurnError> {
        let response = match sink {
            Some(sink) => {
                let sink = sink.clone();
                self.client
                    .send_message_streaming(messages, tools, Box::new(move |chunk| sink(chunk)))
                    .await?
            }
            None => self.client.send_message(messages, tools).await?,
        };
        Ok(response)
    }
}


fn failed(error: &TurnError, trace: TurnTrace) -> TurnReply {
    TurnReply {
        text: apology(error),
        status: TurnStatus::Failed,
        persisted: false,
        phases: trace.phases,
    }
}
