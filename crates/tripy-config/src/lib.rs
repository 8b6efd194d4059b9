//! Tripy configuration system.
//!
//! TOML-based settings for the model endpoint, the weather tool, the
//! conversation history and logging, plus environment-only credentials.
//! All config sections use sensible defaults so partial configs work out
//! of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tripy_config::{load_config, Credentials};
//!
//! tripy_config::load_env_files();
//! let config = load_config(None).expect("failed to load config");
//! let credentials = Credentials::from_env();
//! println!("model: {}", config.model.model);
//! # let _ = credentials;
//! ```

pub mod credentials;
pub mod paths;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use credentials::{load_env_files, Credentials};
pub use schema::{HistoryConfig, LoggingConfig, ModelConfig, TripyConfig, WeatherConfig};

use std::path::Path;

use tripy_common::ConfigError;

/// Load and validate the config.
///
/// With `path = None` the platform default file is used (and created with
/// commented defaults if missing). Environment overrides are applied before
/// validation.
pub fn load_config(path: Option<&Path>) -> Result<TripyConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::FileNotFound(p.to_path_buf()));
            }
            toml_loader::load_from_path(p)?
        }
        None => toml_loader::load_default()?,
    };

    credentials::apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to TOML, used by `tripy --print-config`.
pub fn config_to_toml(config: &TripyConfig) -> String {
    toml::to_string_pretty(config)
        .unwrap_or_else(|e| format!("# failed to serialize config: {e}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_toml_contains_all_sections() {
        let config = TripyConfig::default();
        let text = config_to_toml(&config);
        assert!(text.contains("[model]"));
        assert!(text.contains("[weather]"));
        assert!(text.contains("[history]"));
        assert!(text.contains("[logging]"));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = TripyConfig::default();
        let text = config_to_toml(&config);
        let parsed: TripyConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.model.model, config.model.model);
        assert_eq!(parsed.model.max_tool_rounds, 5);
        assert_eq!(parsed.weather.forecast_days, 5);
        assert_eq!(parsed.history.window, 40);
    }

    #[test]
    fn load_config_missing_explicit_path_is_file_not_found() {
        let err = load_config(Some(Path::new("/tmp/definitely_missing_tripy.toml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\ntemperature = 9.5\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("model.temperature"));
    }
}
