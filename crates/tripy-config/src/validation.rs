//! Full configuration validation.
//!
//! Validates numeric ranges, URLs and the logging level, collecting every
//! problem into a single error.

use tripy_common::ConfigError;

use crate::schema::TripyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &TripyConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    // Model
    validate_url(&mut errors, "model.base_url", &config.model.base_url);
    if config.model.model.trim().is_empty() {
        errors.push("model.model must not be empty".into());
    }
    validate_range_f64(&mut errors, "model.temperature", config.model.temperature, 0.0, 2.0);
    validate_range(&mut errors, "model.max_tokens", config.model.max_tokens, 1, 32_000);
    if let Some(penalty) = config.model.presence_penalty {
        validate_range_f64(&mut errors, "model.presence_penalty", penalty, -2.0, 2.0);
    }
    validate_range(&mut errors, "model.max_tool_rounds", config.model.max_tool_rounds, 1, 20);
    validate_range(
        &mut errors,
        "model.request_timeout_secs",
        config.model.request_timeout_secs,
        5,
        600,
    );

    // Weather
    validate_url(&mut errors, "weather.base_url", &config.weather.base_url);
    validate_range(&mut errors, "weather.forecast_days", config.weather.forecast_days, 1, 5);
    validate_range(&mut errors, "weather.timeout_secs", config.weather.timeout_secs, 1, 120);

    // Logging
    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(format!(
            "logging.level = '{}' must be one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_url(errors: &mut Vec<String>, name: &str, value: &str) {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        errors.push(format!("{name} = '{value}' must be an http(s) URL"));
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

fn validate_range_f64(errors: &mut Vec<String>, name: &str, value: f64, min: f64, max: f64) {
    if value.is_nan() || value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
