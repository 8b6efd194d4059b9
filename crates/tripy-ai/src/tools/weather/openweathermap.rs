//! OpenWeatherMap 2.5 provider (`/weather` and `/forecast`, metric units).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use tripy_config::WeatherConfig;

use super::provider::{CurrentConditions, ForecastEntry, WeatherError, WeatherProvider, WeatherQuery};

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    name: String,
    #[serde(default)]
    sys: OwmSys,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize, Default)]
struct OwmSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: u32,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt_txt: String,
    main: OwmRange,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmRange {
    temp_min: f64,
    temp_max: f64,
}

/// OpenWeatherMap client; the API key is injected, never read here.
pub struct OpenWeatherMap {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for OpenWeatherMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherMap")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenWeatherMap {
    pub fn new(api_key: impl Into<String>, config: &WeatherConfig) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()
            .map_err(|e| WeatherError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get(&self, endpoint: &str, query: &WeatherQuery) -> Result<String, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%endpoint, location = %query.location(), "weather request");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query.location().as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Network(e.without_url().to_string()))?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(WeatherError::NotFound(query.city.clone()));
        }
        if !status.is_success() {
            return Err(WeatherError::Http(format!("HTTP {status}: {}", error_message(&body))));
        }
        Ok(body)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMap {
    async fn fetch_current(&self, query: &WeatherQuery) -> Result<CurrentConditions, WeatherError> {
        let body = self.get("weather", query).await?;
        parse_current(&body)
    }

    async fn fetch_forecast(&self, query: &WeatherQuery) -> Result<Vec<ForecastEntry>, WeatherError> {
        let body = self.get("forecast", query).await?;
        parse_forecast(&body)
    }
}

/// The `message` field of an error body, or a snippet of the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

pub(crate) fn parse_current(body: &str) -> Result<CurrentConditions, WeatherError> {
    let raw: OwmCurrent =
        serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;
    Ok(CurrentConditions {
        city: raw.name,
        country: raw.sys.country,
        temp: raw.main.temp,
        feels_like: raw.main.feels_like,
        description: first_description(&raw.weather),
        humidity: raw.main.humidity,
    })
}

pub(crate) fn parse_forecast(body: &str) -> Result<Vec<ForecastEntry>, WeatherError> {
    let raw: OwmForecast =
        serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;
    Ok(raw
        .list
        .into_iter()
        .map(|item| ForecastEntry {
            date: item
                .dt_txt
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            temp_min: item.main.temp_min,
            temp_max: item.main.temp_max,
            description: first_description(&item.weather),
        })
        .collect())
}

fn first_description(conditions: &[OwmCondition]) -> String {
    conditions
        .first()
        .map(|c| c.description.clone())
        .unwrap_or_default()
}
