use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    model::{WeatherCondition, WeatherData},
    provider::WeatherQuery,
};

use super::WeatherProvider;

const CURRENT_URL: &str = "https://api.weatherapi.com/v1/current.json";

/// Current conditions from WeatherAPI.com.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, http: Client::new() }
    }

    async fn fetch_current(&self, query: &WeatherQuery) -> Result<WeatherData> {
        let q = query.as_query_param();

        let res = self
            .http
            .get(CURRENT_URL)
            .query(&[("key", self.api_key.as_str()), ("q", q.as_str()), ("aqi", "no")])
            .send()
            .await
            .with_context(|| format!("Failed to send request to WeatherAPI.com for '{query}'"))?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI current response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        parse_current(&body, Utc::now())
    }
}

/// Turn a `current.json` body into a reading. `now` is used when the body
/// carries no observation time.
pub(crate) fn parse_current(body: &str, now: DateTime<Utc>) -> Result<WeatherData> {
    let parsed: WaResponse =
        serde_json::from_str(body).context("Failed to parse WeatherAPI current JSON")?;

    let timestamp = parsed
        .current
        .last_updated_epoch
        .or(parsed.location.localtime_epoch)
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .unwrap_or(now);

    Ok(WeatherData {
        temperature: parsed.current.temp_c,
        condition: WeatherCondition::from_description(&parsed.current.condition.text),
        location: parsed.location.name,
        timestamp,
        feels_like: Some(parsed.current.feelslike_c),
        humidity: Some(parsed.current.humidity),
        wind_speed: Some(parsed.current.wind_kph),
    })
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    localtime_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    wind_kph: f64,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherData> {
        tracing::debug!(%query, "fetching current weather");
        self.fetch_current(query).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "location": {
            "name": "Oslo",
            "region": "Oslo",
            "country": "Norway",
            "localtime_epoch": 1700000100
        },
        "current": {
            "last_updated_epoch": 1700000000,
            "temp_c": -3.5,
            "feelslike_c": -8.0,
            "condition": { "text": "Light snow", "code": 1213 },
            "humidity": 86,
            "wind_kph": 14.4
        }
    }"#;

    #[test]
    fn parses_current_conditions() {
        let weather = parse_current(BODY, Utc::now()).unwrap();

        assert_eq!(weather.location, "Oslo");
        assert_eq!(weather.temperature, -3.5);
        assert_eq!(weather.condition, WeatherCondition::Snowy);
        assert_eq!(weather.feels_like, Some(-8.0));
        assert_eq!(weather.humidity, Some(86));
        assert_eq!(weather.wind_speed, Some(14.4));
        assert_eq!(weather.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn falls_back_to_now_without_epochs() {
        let body = BODY
            .replace(r#""localtime_epoch": 1700000100"#, r#""tz_id": "Europe/Oslo""#)
            .replace(r#""last_updated_epoch": 1700000000,"#, "");
        let now = DateTime::<Utc>::from_timestamp(1_234_567_890, 0).unwrap();

        let weather = parse_current(&body, now).unwrap();
        assert_eq!(weather.timestamp, now);
    }

    #[test]
    fn malformed_body_is_an_error() {
        let err = parse_current("{\"error\": {}}", Utc::now()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse WeatherAPI current JSON"));
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(250);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }
}
