//! Configuration schema types for Tripy.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the assistant ships with.

mod history;
mod logging;
mod model;
mod weather;

pub use history::*;
pub use logging::*;
pub use model::*;
pub use weather::*;

use serde::{Deserialize, Serialize};

/// Root configuration for Tripy.
///
/// Credentials are deliberately absent: they are read from the
/// environment only (see [`crate::Credentials`]).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TripyConfig {
    pub model: ModelConfig,
    pub weather: WeatherConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}
