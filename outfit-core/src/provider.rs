use crate::{Config, WeatherData, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use std::fmt::{self, Debug};

pub mod weatherapi;

/// Where to look up the weather.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    /// A city, region or any free-text place name.
    Location(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl WeatherQuery {
    /// Key under which a reading for this query is cached. Coordinates are
    /// rounded to two decimals so nearby lookups share an entry.
    pub fn cache_key(&self) -> String {
        match self {
            WeatherQuery::Location(name) => name
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_"),
            WeatherQuery::Coordinates { latitude, longitude } => {
                format!("{latitude:.2}_{longitude:.2}")
            }
        }
    }

    /// Value of the provider's `q` parameter.
    pub fn as_query_param(&self) -> String {
        match self {
            WeatherQuery::Location(name) => name.clone(),
            WeatherQuery::Coordinates { latitude, longitude } => format!("{latitude},{longitude}"),
        }
    }
}

impl fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherQuery::Location(name) => f.write_str(name),
            WeatherQuery::Coordinates { latitude, longitude } => write!(f, "{latitude}, {longitude}"),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &WeatherQuery) -> anyhow::Result<WeatherData>;
}

/// Construct the WeatherAPI.com provider from the configured API key.
pub fn provider_from_config(config: &Config) -> anyhow::Result<WeatherApiProvider> {
    let api_key = config.weather_api_key()?;
    Ok(WeatherApiProvider::new(api_key.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_cache_key_is_normalized() {
        let query = WeatherQuery::Location("  New   York City ".into());
        assert_eq!(query.cache_key(), "new_york_city");
    }

    #[test]
    fn coordinate_cache_key_rounds_to_two_decimals() {
        let query = WeatherQuery::Coordinates { latitude: 51.50735, longitude: -0.12776 };
        assert_eq!(query.cache_key(), "51.51_-0.13");
        assert_eq!(query.as_query_param(), "51.50735,-0.12776");
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No weather API key configured"));
        assert!(msg.contains("Hint: run `outfit configure`"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let cfg = Config {
            weather_api_key: Some("KEY".into()),
            ..Default::default()
        };

        assert!(provider_from_config(&cfg).is_ok());
    }
}
