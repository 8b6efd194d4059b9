//! Conversation history configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of most recent turns sent to the model each turn; 0 sends all.
    pub window: usize,
    /// SQLite database path. Defaults to `<data dir>/tripy/conversations.db`.
    pub database: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window: 40,
            database: None,
        }
    }
}
