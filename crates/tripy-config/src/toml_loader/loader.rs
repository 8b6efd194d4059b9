//! Core TOML config loading: read from path or platform default.

use std::path::Path;

use tracing::{info, warn};
use tripy_common::ConfigError;

use super::template::default_config_toml;
use crate::paths::config_file;
use crate::schema::TripyConfig;
use crate::validation;

/// Load config from a specific TOML file path.
///
/// Deserializes the file using serde defaults for any missing fields.
/// Validation problems are only logged here; [`crate::load_config`] is the
/// place that rejects them.
pub fn load_from_path(path: &Path) -> Result<TripyConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: TripyConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On macOS: `~/Library/Application Support/tripy/config.toml`
/// On Linux: `~/.config/tripy/config.toml`
///
/// If the file does not exist, creates a default config file and returns defaults.
pub fn load_default() -> Result<TripyConfig, ConfigError> {
    let path = config_file()?;

    if !path.exists() {
        info!("no config found at {}, creating default", path.display());
        if let Err(e) = create_default_config(&path) {
            // A read-only home directory should not stop the assistant.
            warn!("could not write default config: {e}");
        }
        return Ok(TripyConfig::default());
    }

    load_from_path(&path)
}

/// Create a default TOML config file with documentation comments.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(path, default_config_toml()).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write default config to {}: {e}",
            path.display()
        ))
    })?;

    info!("created default config at {}", path.display());
    Ok(())
}
