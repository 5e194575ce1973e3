//! Current weather from the Open-Meteo forecast API (no API key needed).

use async_trait::async_trait;
use serde::Deserialize;
use smartdine_model::{Coordinates, WeatherCondition, WeatherReading};
use std::time::Duration;

use crate::{check_status, http_client, BackendError, TtlCache, WeatherProvider};

#[derive(Debug, Clone)]
pub struct OpenMeteoConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// How long a reading is reused for the same rounded location
    pub cache_ttl: Duration,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1".to_string(),
            timeout_secs: 10,
            cache_ttl: Duration::from_secs(30 * 60),
        }
    }
}

pub struct OpenMeteoWeather {
    config: OpenMeteoConfig,
    client: reqwest::Client,
    cache: TtlCache<WeatherReading>,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    current: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature_2m: f64,
    #[serde(default)]
    relative_humidity_2m: f64,
    weather_code: i64,
}

/// Map a WMO weather interpretation code to a condition and description.
pub fn wmo_condition(code: i64) -> (WeatherCondition, &'static str) {
    match code {
        0 => (WeatherCondition::Clear, "clear sky"),
        1..=3 => (WeatherCondition::Clouds, "partly cloudy"),
        45..=48 => (WeatherCondition::Fog, "foggy"),
        51..=57 => (WeatherCondition::Drizzle, "light drizzle"),
        61..=67 => (WeatherCondition::Rain, "rainy"),
        80..=82 => (WeatherCondition::Rain, "rain showers"),
        71..=77 => (WeatherCondition::Snow, "snowy"),
        85..=86 => (WeatherCondition::Snow, "snow showers"),
        95..=99 => (WeatherCondition::Thunderstorm, "thunderstorm"),
        _ => (WeatherCondition::Clear, "clear sky"),
    }
}

/// Cache key: coordinates rounded to two decimals (about 1 km).
pub fn cache_key(location: Coordinates) -> String {
    format!("{:.2},{:.2}", location.lat, location.lon)
}

fn reading_from(current: &CurrentWeather) -> WeatherReading {
    let (condition, description) = wmo_condition(current.weather_code);
    let temperature = current.temperature_2m.round();
    WeatherReading {
        condition,
        description: description.to_string(),
        temperature,
        // the free tier has no apparent temperature
        feels_like: temperature,
        humidity: current.relative_humidity_2m,
    }
}

impl OpenMeteoWeather {
    pub fn new(config: OpenMeteoConfig) -> Result<Self, BackendError> {
        let client = http_client(config.timeout_secs)?;
        let cache = TtlCache::new(config.cache_ttl);
        Ok(Self {
            config,
            client,
            cache,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoWeather {
    async fn current(&self, location: Coordinates) -> Result<WeatherReading, BackendError> {
        let key = cache_key(location);
        if let Some(reading) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Using cached weather");
            return Ok(reading);
        }

        let response = self
            .client
            .get(format!("{}/forecast", self.config.base_url))
            .query(&[
                ("latitude", location.lat.to_string()),
                ("longitude", location.lon.to_string()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,weather_code".to_string(),
                ),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        let forecast: Forecast = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        let reading = reading_from(&forecast.current);
        tracing::info!(
            condition = %reading.condition,
            temperature = reading.temperature,
            "Fetched weather"
        );
        self.cache.insert(key, reading.clone());
        Ok(reading)
    }

    fn clear_cache(&self) {
        let entries = self.cache.len();
        self.cache.clear();
        tracing::info!(entries, "Cleared weather cache");
    }

    fn name(&self) -> &'static str {
        "open-meteo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmo_mapping() {
        assert_eq!(wmo_condition(0).0, WeatherCondition::Clear);
        assert_eq!(wmo_condition(2), (WeatherCondition::Clouds, "partly cloudy"));
        assert_eq!(wmo_condition(53).0, WeatherCondition::Drizzle);
        assert_eq!(wmo_condition(61), (WeatherCondition::Rain, "rainy"));
        assert_eq!(wmo_condition(81), (WeatherCondition::Rain, "rain showers"));
        assert_eq!(wmo_condition(86).0, WeatherCondition::Snow);
        assert_eq!(wmo_condition(95).0, WeatherCondition::Thunderstorm);
        assert_eq!(wmo_condition(42), (WeatherCondition::Clear, "clear sky"));
    }

    #[test]
    fn test_forecast_parsing_rounds_temperature() {
        let json = r#"{
            "latitude": 11.0,
            "current": { "time": "2024-07-01T14:00", "temperature_2m": 27.6, "relative_humidity_2m": 78, "weather_code": 63 }
        }"#;
        let forecast: Forecast = serde_json::from_str(json).unwrap();
        let reading = reading_from(&forecast.current);
        assert_eq!(reading.condition, WeatherCondition::Rain);
        assert_eq!(reading.temperature, 28.0);
        assert_eq!(reading.feels_like, 28.0);
        assert_eq!(reading.humidity, 78.0);
    }

    #[test]
    fn test_cache_key_rounds_coordinates() {
        assert_eq!(cache_key(Coordinates::new(11.01684, 76.95583)), "11.02,76.96");
    }

    #[tokio::test]
    async fn test_cached_reading_skips_network() {
        let weather = OpenMeteoWeather::new(OpenMeteoConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();
        let location = Coordinates::new(11.0168, 76.9558);
        let cached = WeatherReading::new(WeatherCondition::Clouds, 24.0);
        weather.cache.insert(cache_key(location), cached.clone());

        assert_eq!(weather.current(location).await.unwrap(), cached);

        weather.clear_cache();
        assert!(weather.cache.is_empty());
        assert!(weather.current(location).await.is_err());
    }
}
