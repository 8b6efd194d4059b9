use std::sync::{Arc, Mutex};

use tripy_common::{Role, SessionId, StoreError, Turn};
use tripy_store::{ConversationStore, SessionSummary, SqliteStore};

use super::types::{EMPTY_REPLY_FALLBACK, TOOL_LIMIT_FALLBACK};
use super::*;
use crate::testing::{text, weather_call, ScriptedClient};
use crate::tools::{ToolSet, WeatherTool};
use crate::{AiClient, AiError, Message, SessionManager};

const ROME_PROMPT: &str = "Plan a 3-day trip to Rome in October";

fn setup(client: Arc<ScriptedClient>, settings: AgentSettings) -> (Orchestrator, SessionManager) {
    let store: Arc<dyn ConversationStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    setup_with_store(client, settings, store)
}

fn setup_with_store(
    client: Arc<ScriptedClient>,
    settings: AgentSettings,
    store: Arc<dyn ConversationStore>,
) -> (Orchestrator, SessionManager) {
    let tools = ToolSet::new().with(Arc::new(WeatherTool::new(None)));
    let client: Arc<dyn AiClient> = client;
    (
        Orchestrator::new(client, tools, settings),
        SessionManager::new(store),
    )
}

#[tokio::test]
async fn new_session_turn_persists_human_and_assistant() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(text(
        "Day 1: Colosseum and Forum. Day 2: Vatican. Day 3: Trastevere.",
    ))]));
    let (agent, sessions) = setup(client.clone(), AgentSettings::default());

    let reply = agent.respond(sessions.current(), ROME_PROMPT).await;

    assert_eq!(reply.status, TurnStatus::Completed);
    assert!(reply.persisted);
    assert!(!reply.text.is_empty());
    assert!(!reply.text.starts_with("Sorry, I encountered an error"));

    let history = sessions.history().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::Human);
    assert_eq!(history[0].content, ROME_PROMPT);
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, reply.text);

    let usage = sessions.current().usage();
    assert_eq!(usage.model_calls(), 1);
    assert_eq!(usage.turns(), 1);
}

#[tokio::test]
async fn first_request_is_system_then_input() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(text("Sure!"))]));
    let (agent, sessions) = setup(client.clone(), AgentSettings::default());

    agent.respond(sessions.current(), "Hi").await;

    let requests = client.requests();
    assert_eq!(requests[0].len(), 2);
    assert_eq!(requests[0][0].role, Role::System);
    assert!(requests[0][0].content.contains("Tripy"));
    assert_eq!(requests[0][1], Message::human("Hi"));
}

#[tokio::test]
async fn tool_round_trip_feeds_result_back_to_model() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok(weather_call("call_1", "Rome")),
        Ok(text("I couldn't check the weather, but October in Rome is mild.")),
    ]));
    let (agent, sessions) = setup(client.clone(), AgentSettings::default());

    let reply = agent.respond(sessions.current(), "Weather in Rome?").await;

    assert_eq!(reply.status, TurnStatus::Completed);
    assert_eq!(
        reply.phases,
        vec![
            TurnPhase::Idle,
            TurnPhase::ContextBuilt,
            TurnPhase::ModelInvoked,
            TurnPhase::ToolInvoked,
            TurnPhase::ModelInvoked,
            TurnPhase::ResponseReady,
            TurnPhase::Persisted,
            TurnPhase::Idle,
        ]
    );

    let requests = client.requests();
    let second = &requests[1];
    let call_msg = &second[second.len() - 2];
    assert_eq!(call_msg.role, Role::Assistant);
    assert_eq!(call_msg.tool_calls[0].id, "call_1");
    let result_msg = &second[second.len() - 1];
    assert_eq!(result_msg.role, Role::Tool);
    assert_eq!(result_msg.tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(
        result_msg.content,
        "Weather service unavailable - weather API key not configured."
    );

    // Only the human/assistant pair is stored; tool traffic is not.
    let history = sessions.history().unwrap();
    assert_eq!(history.len(), 2);

    let usage = sessions.current().usage();
    assert_eq!(usage.model_calls(), 2);
    assert_eq!(usage.tool_calls(), 1);
}

#[tokio::test]
async fn endless_tool_requests_stop_at_the_cap() {
    let client = Arc::new(ScriptedClient::always(weather_call("call_x", "Paris")));
    let (agent, sessions) = setup(client.clone(), AgentSettings::default());

    let reply = agent.respond(sessions.current(), "Weather in Paris?").await;

    assert_eq!(client.call_count(), 5);
    assert_eq!(reply.status, TurnStatus::ToolLimitReached);
    assert_eq!(reply.text, TOOL_LIMIT_FALLBACK);
    assert!(reply.persisted);
    assert_eq!(sessions.current().usage().tool_calls(), 4);
}

#[tokio::test]
async fn tool_cap_follows_settings() {
    let client = Arc::new(ScriptedClient::always(weather_call("call_x", "Paris")));
    let settings = AgentSettings {
        max_tool_rounds: 2,
        ..AgentSettings::default()
    };
    let (agent, sessions) = setup(client.clone(), settings);

    let reply = agent.respond(sessions.current(), "Weather?").await;
    assert_eq!(client.call_count(), 2);
    assert_eq!(reply.status, TurnStatus::ToolLimitReached);
}

#[tokio::test]
async fn model_failure_is_apologized_and_not_persisted() {
    let client = Arc::new(ScriptedClient::new(vec![Err(AiError::NetworkError(
        "connection refused".into(),
    ))]));
    let (agent, sessions) = setup(client, AgentSettings::default());

    let reply = agent.respond(sessions.current(), ROME_PROMPT).await;

    assert!(reply.is_failed());
    assert!(!reply.persisted);
    assert_eq!(
        reply.text,
        "Sorry, I encountered an error: Network error: connection refused. Please try again!"
    );
    assert!(sessions.history().unwrap().is_empty());
    assert!(sessions.list().unwrap().is_empty());
}

#[tokio::test]
async fn failure_after_tool_call_persists_nothing() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok(weather_call("call_1", "Rome")),
        Err(AiError::RateLimited),
    ]));
    let (agent, sessions) = setup(client, AgentSettings::default());

    let reply = agent.respond(sessions.current(), "Weather in Rome?").await;

    assert_eq!(reply.status, TurnStatus::Failed);
    assert!(sessions.history().unwrap().is_empty());
}

#[tokio::test]
async fn previous_turns_are_sent_as_history() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok(text("How many days?")),
        Ok(text("Great, here is a 3-day plan.")),
    ]));
    let (agent, sessions) = setup(client.clone(), AgentSettings::default());

    agent.respond(sessions.current(), "Plan Rome").await;
    agent.respond(sessions.current(), "Three days").await;

    let requests = client.requests();
    let second = &requests[1];
    let contents: Vec<&str> = second.iter().skip(1).map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["Plan Rome", "How many days?", "Three days"]);
    assert_eq!(sessions.history().unwrap().len(), 4);
}

#[tokio::test]
async fn history_is_windowed() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(text("ok"))]));
    let settings = AgentSettings {
        history_window: 4,
        ..AgentSettings::default()
    };
    let (agent, sessions) = setup(client.clone(), settings);
    for i in 0..10 {
        let log = sessions.current().log();
        log.append(Role::Human, &format!("q{i}")).unwrap();
        log.append(Role::Assistant, &format!("a{i}")).unwrap();
    }

    agent.respond(sessions.current(), "next").await;

    let requests = client.requests();
    let request = &requests[0];
    assert_eq!(request.len(), 6);
    assert_eq!(request[1].content, "q8");
}

#[tokio::test]
async fn streaming_delivers_and_persists_fragments() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(text("Day one in Rome"))]));
    let (agent, sessions) = setup(client, AgentSettings::default());

    let chunks = Arc::new(Mutex::new(Vec::new()));
    let sink = chunks.clone();
    let reply = agent
        .respond_streaming(sessions.current(), "Plan Rome", move |chunk| {
            sink.lock().unwrap().push(chunk);
        })
        .await;

    let chunks = chunks.lock().unwrap().clone();
    assert_eq!(chunks, ["Day ", "one ", "in ", "Rome"]);
    assert_eq!(reply.text, "Day one in Rome");
    assert_eq!(reply.status, TurnStatus::Completed);

    let history = sessions.history().unwrap();
    assert_eq!(history[1].content, chunks.concat());
}

#[tokio::test]
async fn busy_session_fails_fast() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(text("unused"))]));
    let (agent, sessions) = setup(client.clone(), AgentSettings::default());

    let _guard = sessions.current().try_begin_turn().unwrap();
    let reply = agent.respond(sessions.current(), "Hello?").await;

    assert_eq!(reply.status, TurnStatus::Failed);
    assert!(reply.text.contains("already handling a message"));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn switching_sessions_keeps_histories_apart() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok(text("Rome plan")),
        Ok(text("Kyoto plan")),
        Ok(text("Rome day 4")),
    ]));
    let (agent, mut sessions) = setup(client.clone(), AgentSettings::default());
    let rome = sessions.current_id().clone();

    agent.respond(sessions.current(), "Plan Rome").await;
    sessions.start_new();
    agent.respond(sessions.current(), "Plan Kyoto").await;
    sessions.switch(rome);
    agent.respond(sessions.current(), "Add a day").await;

    let requests = client.requests();
    let third = &requests[2];
    let contents: Vec<&str> = third.iter().skip(1).map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["Plan Rome", "Rome plan", "Add a day"]);

    let rome_history: Vec<String> = sessions
        .history()
        .unwrap()
        .into_iter()
        .map(|t| t.content)
        .collect();
    assert_eq!(rome_history, ["Plan Rome", "Rome plan", "Add a day", "Rome day 4"]);
}

/// Reads work, but no exchange can be written.
struct ReadOnlyStore {
    inner: SqliteStore,
}

impl ConversationStore for ReadOnlyStore {
    fn append(&self, _: &SessionId, _: Role, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Query("database is read-only".into()))
    }

    fn append_exchange(&self, _: &SessionId, _: &str, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Query("database is read-only".into()))
    }

    fn read(&self, session: &SessionId) -> Result<Vec<Turn>, StoreError> {
        self.inner.read(session)
    }

    fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        self.inner.list_sessions()
    }

    fn clear(&self, session: &SessionId) -> Result<(), StoreError> {
        self.inner.clear(session)
    }

    fn summaries(&self) -> Result<Vec<SessionSummary>, StoreError> {
        self.inner.summaries()
    }
}

fn weather_call_with_preamble() -> crate::AiResponse {
    let mut response = weather_call("call_1", "Rome");
    response.content = "Let me check. ".into();
    response
}

#[tokio::test]
async fn text_sent_with_a_tool_request_is_not_persisted() {
    let script = || {
        vec![
            Ok(weather_call_with_preamble()),
            Ok(text("Rome is mild.")),
        ]
    };

    let (plain_agent, plain_sessions) =
        setup(Arc::new(ScriptedClient::new(script())), AgentSettings::default());
    let plain = plain_agent.respond(plain_sessions.current(), "Weather in Rome?").await;

    let (agent, sessions) = setup(Arc::new(ScriptedClient::new(script())), AgentSettings::default());
    let chunks = Arc::new(Mutex::new(Vec::new()));
    let sink = chunks.clone();
    let streamed = agent
        .respond_streaming(sessions.current(), "Weather in Rome?", move |chunk| {
            sink.lock().unwrap().push(chunk);
        })
        .await;

    assert_eq!(plain.text, "Rome is mild.");
    assert_eq!(streamed.text, plain.text);
    assert_eq!(chunks.lock().unwrap().concat(), "Let me check. Rome is mild.");

    let history = sessions.history().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, "Rome is mild.");
    assert_eq!(plain_sessions.history().unwrap()[1].content, "Rome is mild.");
}

#[tokio::test]
async fn unsaved_reply_is_still_returned_and_leaves_no_orphan() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(text("Day 1: Colosseum"))]));
    let store: Arc<dyn ConversationStore> = Arc::new(ReadOnlyStore {
        inner: SqliteStore::open_in_memory().unwrap(),
    });
    let (agent, sessions) = setup_with_store(client, AgentSettings::default(), store);

    let reply = agent.respond(sessions.current(), "Plan Rome").await;

    assert_eq!(reply.status, TurnStatus::Completed);
    assert_eq!(reply.text, "Day 1: Colosseum");
    assert!(!reply.persisted);
    assert!(!reply.phases.contains(&TurnPhase::Persisted));
    assert!(sessions.history().unwrap().is_empty());
    assert_eq!(sessions.current().usage().turns(), 1);
}

#[tokio::test]
async fn empty_completion_gets_a_fallback_reply() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(text(""))]));
    let (agent, sessions) = setup(client, AgentSettings::default());

    let reply = agent.respond(sessions.current(), "Hmm?").await;

    assert_eq!(reply.status, TurnStatus::Completed);
    assert_eq!(reply.text, EMPTY_REPLY_FALLBACK);
    let history = sessions.history().unwrap();
    assert_eq!(history[1].content, EMPTY_REPLY_FALLBACK);
}
