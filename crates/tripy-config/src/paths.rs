//! Platform directory resolution.

use std::path::PathBuf;

use tripy_common::ConfigError;

const APP_NAME: &str = "tripy";

/// Returns the platform-specific configuration directory for Tripy.
///
/// - macOS: `~/Library/Application Support/tripy`
/// - Linux: `$XDG_CONFIG_HOME/tripy` (defaults to `~/.config/tripy`)
/// - Windows: `%APPDATA%\tripy`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    Ok(dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?
        .join(APP_NAME))
}

/// Returns the platform-specific data directory for Tripy.
///
/// - macOS: `~/Library/Application Support/tripy`
/// - Linux: `$XDG_DATA_HOME/tripy` (defaults to `~/.local/share/tripy`)
/// - Windows: `%APPDATA%\tripy`
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    Ok(dirs::data_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine data directory".into()))?
        .join(APP_NAME))
}

/// Returns the path to the main configuration file.
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Returns the default conversation database path.
pub fn database_file() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("conversations.db"))
}
