//! Report formatting for weather lookups.

use std::fmt::Write;

use super::provider::{CurrentConditions, ForecastEntry};

const COLD_BELOW: i64 = 10;
const HOT_ABOVE: i64 = 25;
const HUMID_ABOVE: u32 = 70;

/// Forecast aggregated to one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub description: String,
}

/// Group samples by date in order of first appearance, keeping the first
/// `days` dates. Each day takes the lowest minimum, the highest maximum and
/// the first description seen.
pub fn aggregate_forecast(entries: &[ForecastEntry], days: usize) -> Vec<DailyForecast> {
    let mut daily: Vec<DailyForecast> = Vec::new();
    for entry in entries {
        match daily.iter_mut().find(|d| d.date == entry.date) {
            Some(day) => {
                day.temp_min = day.temp_min.min(entry.temp_min);
                day.temp_max = day.temp_max.max(entry.temp_max);
            }
            None => daily.push(DailyForecast {
                date: entry.date.clone(),
                temp_min: entry.temp_min,
                temp_max: entry.temp_max,
                description: entry.description.clone(),
            }),
        }
    }
    daily.truncate(days);
    daily
}

/// Render the report handed back to the model.
pub fn format_report(current: &CurrentConditions, forecast: &[DailyForecast]) -> String {
    let temperature = round_temp(current.temp);
    let mut out = String::new();

    if current.country.is_empty() {
        let _ = writeln!(out, "Current weather in {}:\n", current.city);
    } else {
        let _ = writeln!(out, "Current weather in {}, {}:\n", current.city, current.country);
    }
    let _ = writeln!(
        out,
        "Temperature: {temperature}°C (Feels like: {}°C)",
        round_temp(current.feels_like)
    );
    let _ = writeln!(out, "Condition: {}", title_case(&current.description));
    let _ = writeln!(out, "Humidity: {}%", current.humidity);

    if !forecast.is_empty() {
        let _ = writeln!(out, "\n{}-day Forecast:", forecast.len());
        for day in forecast {
            let _ = writeln!(
                out,
                "{}: {}°C - {}°C, {}",
                day.date,
                round_temp(day.temp_min),
                round_temp(day.temp_max),
                title_case(&day.description)
            );
        }
    }

    let _ = writeln!(out, "\nTravel Tips:");
    let _ = writeln!(out, " * {}", temperature_advice(temperature));
    if current.humidity > HUMID_ABOVE {
        let _ = writeln!(out, " * High humidity, dress comfortably.");
    }

    out
}

fn temperature_advice(temperature: i64) -> &'static str {
    if temperature < COLD_BELOW {
        "Pack warm clothes and enjoy indoor activities."
    } else if temperature > HOT_ABOVE {
        "Pack light clothes, stay hydrated, and use sunscreen."
    } else {
        "Comfortable weather, pack layers for changes."
    }
}

/// Whole degrees, halves to even.
fn round_temp(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Upper-case the first letter of every word, lower-case the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}
