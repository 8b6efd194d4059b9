//! Environment-only credentials and overrides.
//!
//! Resolution order for each key is the first non-empty variable listed:
//! - model: `API_KEY`, `OPENROUTER_API_KEY`
//! - weather: `OPENWEATHERMAP_API_KEY`, `WEATHER_API_KEY`

use std::fmt;
use std::path::Path;

use tracing::debug;
use tripy_common::ConfigError;

use crate::schema::TripyConfig;

const MODEL_KEY_VARS: &[&str] = &["API_KEY", "OPENROUTER_API_KEY"];
const WEATHER_KEY_VARS: &[&str] = &["OPENWEATHERMAP_API_KEY", "WEATHER_API_KEY"];

/// Env files checked at startup, in order. Variables already present in the
/// process environment are never overwritten.
const ENV_FILES: &[&str] = &["config/.env", ".env"];

/// Load `KEY=VALUE` pairs from the project env files, if present.
pub fn load_env_files() {
    for file in ENV_FILES {
        let path = Path::new(file);
        if !path.exists() {
            continue;
        }
        match dotenvy::from_path(path) {
            Ok(()) => debug!("loaded environment from {}", path.display()),
            Err(e) => tracing::warn!("failed to load {}: {e}", path.display()),
        }
    }
}

/// API keys for the hosted model and the weather provider.
#[derive(Clone, Default)]
pub struct Credentials {
    pub model_api_key: Option<String>,
    pub weather_api_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| if v.is_some() { "[REDACTED]" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("model_api_key", &redact(&self.model_api_key))
            .field("weather_api_key", &redact(&self.weather_api_key))
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            model_api_key: first_set(&lookup, MODEL_KEY_VARS),
            weather_api_key: first_set(&lookup, WEATHER_KEY_VARS),
        }
    }

    /// The model key is mandatory: without it no turn can succeed.
    pub fn require_model_key(&self) -> Result<&str, ConfigError> {
        self.model_api_key.as_deref().ok_or_else(|| {
            ConfigError::MissingCredential(format!(
                "set {} in the environment or in config/.env",
                MODEL_KEY_VARS.join(" or ")
            ))
        })
    }
}

/// Apply `TRIPY_MODEL` / `TRIPY_BASE_URL` from the process environment.
pub(crate) fn apply_env_overrides(config: &mut TripyConfig) {
    apply_overrides_from(config, |name| std::env::var(name).ok());
}

fn apply_overrides_from(config: &mut TripyConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(model) = first_set(&lookup, &["TRIPY_MODEL"]) {
        debug!(%model, "model overridden from environment");
        config.model.model = model;
    }
    if let Some(url) = first_set(&lookup, &["TRIPY_BASE_URL"]) {
        debug!(%url, "base URL overridden from environment");
        config.model.base_url = url;
    }
}

fn first_set(lookup: &impl Fn(&str) -> Option<String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn primary_variables_win() {
        let creds = Credentials::from_lookup(lookup(&[
            ("API_KEY", "sk-primary"),
            ("OPENROUTER_API_KEY", "sk-fallback"),
            ("OPENWEATHERMAP_API_KEY", "owm"),
        ]));
        assert_eq!(creds.model_api_key.as_deref(), Some("sk-primary"));
        assert_eq!(creds.weather_api_key.as_deref(), Some("owm"));
    }

    #[test]
    fn fallback_variables_are_used() {
        let creds = Credentials::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-fallback"),
            ("WEATHER_API_KEY", "legacy"),
        ]));
        assert_eq!(creds.model_api_key.as_deref(), Some("sk-fallback"));
        assert_eq!(creds.weather_api_key.as_deref(), Some("legacy"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let creds = Credentials::from_lookup(lookup(&[("API_KEY", "   ")]));
        assert!(creds.model_api_key.is_none());
        let err = creds.require_model_key().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(_)));
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn debug_output_redacts_keys() {
        let creds = Credentials::from_lookup(lookup(&[("API_KEY", "sk-secret")]));
        let debug = format!("{creds:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("<unset>"));
    }

    #[test]
    fn overrides_replace_model_and_url() {
        let mut config = TripyConfig::default();
        apply_overrides_from(
            &mut config,
            lookup(&[
                ("TRIPY_MODEL", "openai/gpt-4o"),
                ("TRIPY_BASE_URL", "http://localhost:8080/v1"),
            ]),
        );
        assert_eq!(config.model.model, "openai/gpt-4o");
        assert_eq!(config.model.base_url, "http://localhost:8080/v1");
    }
}
