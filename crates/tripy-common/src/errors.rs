use std::path::PathBuf;

use crate::types::Role;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("missing credential: {0}")]
    MissingCredential(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open conversation store: {0}")]
    Open(String),

    #[error("conversation store query failed: {0}")]
    Query(String),

    #[error("corrupt conversation record: {0}")]
    Corrupt(String),

    #[error("role '{0}' cannot be stored as a turn")]
    InvalidRole(Role),
}

#[derive(Debug, thiserror::Error)]
pub enum TripyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("ai error: {0}")]
    Ai(String),

    #[error("session error: {0}")]
    Session(String),
}
