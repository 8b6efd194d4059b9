//! Weather provider contract and the data it returns.

use async_trait::async_trait;
use tracing::debug;

/// A normalized location query: `"{city}"` or `"{city},{CC}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: String,
    pub country_code: Option<String>,
}

impl WeatherQuery {
    /// Trim the city and keep the country code only if it is two ASCII letters.
    pub fn new(city: &str, country_code: Option<&str>) -> Result<Self, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::InvalidQuery("city must not be empty".into()));
        }

        let country_code = country_code.and_then(normalize_country_code);

        Ok(Self {
            city: city.to_string(),
            country_code,
        })
    }

    /// The `q` parameter sent to the provider.
    pub fn location(&self) -> String {
        match &self.country_code {
            Some(cc) => format!("{},{}", self.city, cc),
            None => self.city.clone(),
        }
    }
}

fn normalize_country_code(raw: &str) -> Option<String> {
    let cc = raw.trim();
    if cc.is_empty() {
        return None;
    }
    if cc.len() == 2 && cc.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(cc.to_ascii_uppercase())
    } else {
        debug!(country_code = %cc, "ignoring country code that is not two letters");
        None
    }
}

/// Current conditions for a resolved location, in metric units.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Location name as resolved by the provider.
    pub city: String,
    /// ISO country code; empty when the provider omits it.
    pub country: String,
    pub temp: f64,
    pub feels_like: f64,
    pub description: String,
    pub humidity: u32,
}

/// One raw forecast sample (the provider reports every three hours).
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("invalid weather query: {0}")]
    InvalidQuery(String),
    #[error("location not found: {0}")]
    NotFound(String),
    #[error("weather service error: {0}")]
    Http(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected weather response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_current(&self, query: &WeatherQuery) -> Result<CurrentConditions, WeatherError>;

    async fn fetch_forecast(&self, query: &WeatherQuery) -> Result<Vec<ForecastEntry>, WeatherError>;
}
