//! Startup wiring: store, credentials, model client, tools and sessions.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tripy_ai::tools::WeatherTool;
use tripy_ai::{AgentSettings, OpenAiClient, OpenAiConfig, Orchestrator, SessionManager, ToolSet};
use tripy_common::TripyError;
use tripy_config::{paths, Credentials, TripyConfig};
use tripy_store::{ConversationStore, SqliteStore};

use crate::cli::Args;

/// Everything the chat surface needs, ready to run.
pub struct Tripy {
    pub agent: Orchestrator,
    pub sessions: SessionManager,
    pub stream: bool,
}

/// Where conversations live for this run.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl StoreLocation {
    /// `--ephemeral`, then `--database`, then `[history] database`, then the
    /// platform data directory.
    pub fn resolve(args: &Args, config: &TripyConfig) -> Result<Self, TripyError> {
        if args.ephemeral {
            return Ok(Self::Memory);
        }
        let path = match (&args.database, &config.history.database) {
            (Some(path), _) | (None, Some(path)) => path.clone(),
            (None, None) => paths::database_file()?,
        };
        Ok(Self::File(path))
    }

    pub fn open(&self) -> Result<Arc<dyn ConversationStore>, TripyError> {
        let store = match self {
            Self::Memory => {
                info!("using in-memory conversation store");
                SqliteStore::open_in_memory()?
            }
            Self::File(path) => SqliteStore::open(path)?,
        };
        Ok(Arc::new(store))
    }
}

/// Build the application. A missing model key is fatal; a missing weather
/// key only disables the weather lookup.
pub fn build(args: &Args, config: &TripyConfig, credentials: &Credentials) -> Result<Tripy, TripyError> {
    let api_key = credentials.require_model_key()?;

    let store = StoreLocation::resolve(args, config)?.open()?;

    let client = OpenAiClient::new(OpenAiConfig::from_model_config(api_key, &config.model))
        .map_err(|e| TripyError::Ai(e.to_string()))?;
    info!(model = %config.model.model, "model client ready");

    let weather = WeatherTool::from_config(credentials.weather_api_key.as_deref(), &config.weather);
    if !weather.is_available() {
        warn!("no weather API key configured; weather lookups will report the service as unavailable");
    }
    let tools = ToolSet::new().with(Arc::new(weather));

    let agent = Orchestrator::new(Arc::new(client), tools, AgentSettings::from_config(config));
    let sessions = open_sessions(store, args.session.as_deref())?;

    Ok(Tripy {
        agent,
        sessions,
        stream: config.model.stream && !args.no_stream,
    })
}

/// A session manager on a fresh session, or on the stored one `resume`
/// names by id prefix.
pub fn open_sessions(
    store: Arc<dyn ConversationStore>,
    resume: Option<&str>,
) -> Result<SessionManager, TripyError> {
    let mut sessions = SessionManager::new(store);
    let Some(prefix) = resume else {
        return Ok(sessions);
    };

    let stored = sessions.list()?;
    let id = match sessions.resolve(prefix)? {
        Some(id) if stored.contains(&id) => id,
        _ => {
            return Err(TripyError::Session(format!(
                "no stored session matches '{prefix}'"
            )))
        }
    };
    info!(session = %id.short(), "resuming session");
    sessions.switch(id);
    Ok(sessions)
}
