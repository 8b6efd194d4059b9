//! The `get_weather` tool.
//!
//! Composition: a [`WeatherProvider`] fetches raw conditions and
//! [`format_report`] renders them. [`WeatherTool`] only normalizes the
//! query and turns every failure into text the model can relay.

mod format;
mod openweathermap;
mod provider;

pub use format::{aggregate_forecast, format_report, DailyForecast};
pub use openweathermap::OpenWeatherMap;
pub use provider::{CurrentConditions, ForecastEntry, WeatherError, WeatherProvider, WeatherQuery};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use tripy_config::WeatherConfig;

use crate::tools::Tool;
use crate::ToolDefinition;

pub const TOOL_NAME: &str = "get_weather";

const UNAVAILABLE: &str = "Weather service unavailable - weather API key not configured.";

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    city: String,
    #[serde(default)]
    country_code: Option<String>,
}

/// Weather lookup exposed to the model.
pub struct WeatherTool {
    provider: Option<Arc<dyn WeatherProvider>>,
    include_forecast: bool,
    forecast_days: usize,
}

impl WeatherTool {
    /// A tool over `provider`; `None` makes every lookup report the
    /// service as unavailable.
    pub fn new(provider: Option<Arc<dyn WeatherProvider>>) -> Self {
        Self {
            provider,
            include_forecast: true,
            forecast_days: 5,
        }
    }

    /// Build the OpenWeatherMap-backed tool from the `[weather]` section.
    pub fn from_config(api_key: Option<&str>, config: &WeatherConfig) -> Self {
        let provider: Option<Arc<dyn WeatherProvider>> = match api_key {
            Some(key) => match OpenWeatherMap::new(key, config) {
                Ok(owm) => Some(Arc::new(owm)),
                Err(e) => {
                    warn!(error = %e, "weather provider unavailable");
                    None
                }
            },
            None => {
                warn!("no weather API key configured; get_weather will report unavailable");
                None
            }
        };
        Self::new(provider).with_forecast(config.include_forecast, config.forecast_days as usize)
    }

    pub fn with_forecast(mut self, include: bool, days: usize) -> Self {
        self.include_forecast = include;
        self.forecast_days = days.clamp(1, 5);
        self
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Look up a location and render the report. Never fails.
    pub async fn lookup(&self, city: &str, country_code: Option<&str>) -> String {
        let Some(provider) = &self.provider else {
            return UNAVAILABLE.to_string();
        };

        let query = match WeatherQuery::new(city, country_code) {
            Ok(query) => query,
            Err(e) => return format!("Invalid arguments for {TOOL_NAME}: {e}"),
        };

        let current = match provider.fetch_current(&query).await {
            Ok(current) => current,
            Err(WeatherError::NotFound(_)) => {
                return format!(
                    "Could not get weather for {}. Please check the city name again.",
                    query.city
                );
            }
            Err(e) => {
                warn!(location = %query.location(), error = %e, "weather lookup failed");
                return format!("Failed to fetch weather: {e}. Please check your API key and city name.");
            }
        };

        let forecast = if self.include_forecast {
            match provider.fetch_forecast(&query).await {
                Ok(entries) => aggregate_forecast(&entries, self.forecast_days),
                Err(e) => {
                    warn!(location = %query.location(), error = %e, "forecast unavailable, reporting current conditions only");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        debug!(location = %query.location(), days = forecast.len(), "weather report ready");
        format_report(&current, &forecast)
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: TOOL_NAME.to_string(),
            description: "Get current weather and 5-day forecast for a city, with travel tips."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City name to get the weather for"
                    },
                    "country_code": {
                        "type": "string",
                        "description": "2-letter country code (optional)"
                    }
                },
                "required": ["city"]
            }),
        }
    }

    async fn call(&self, arguments: &Value) -> String {
        if self.provider.is_none() {
            return UNAVAILABLE.to_string();
        }
        match serde_json::from_value::<WeatherArgs>(arguments.clone()) {
            Ok(args) => self.lookup(&args.city, args.country_code.as_deref()).await,
            Err(e) => format!("Invalid arguments for {TOOL_NAME}: {e}"),
        }
    }
}
