//! Weather tool configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap 2.5 API root.
    pub base_url: String,
    /// Also fetch the multi-day forecast alongside current conditions.
    pub include_forecast: bool,
    /// Number of distinct forecast dates to report (1-5).
    pub forecast_days: u32,
    /// Per-request timeout in seconds (1-120).
    pub timeout_secs: u32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            include_forecast: true,
            forecast_days: 5,
            timeout_secs: 15,
        }
    }
}
