//! Weather API client for fetching current conditions
//!
//! Integrates with the OpenWeatherMap current weather endpoint

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::describe_failure;
use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// Current conditions at a location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentWeather {
    pub humidity_percent: Decimal,
    pub temperature_celsius: Decimal,
}

/// Source of current weather conditions
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, latitude: Decimal, longitude: Decimal) -> AppResult<CurrentWeather>;
}

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    main: OWMMain,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: f64,
}

impl WeatherClient {
    /// Create a client from configuration. Fails when no API key is set.
    pub fn new(config: &WeatherConfig, client: Client) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("Weather API key is not set".to_string()))?;

        Ok(Self::with_base_url(client, api_key, config.api_endpoint.clone()))
    }

    /// Create a new WeatherClient with custom base URL (for testing)
    pub fn with_base_url(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn convert_current_response(data: OWMCurrentResponse) -> AppResult<CurrentWeather> {
        let humidity_percent = Decimal::from_f64(data.main.humidity)
            .ok_or_else(|| AppError::WeatherApi("Humidity is not a finite number".to_string()))?;
        let temperature_celsius = Decimal::from_f64(data.main.temp).ok_or_else(|| {
            AppError::WeatherApi("Temperature is not a finite number".to_string())
        })?;

        Ok(CurrentWeather {
            humidity_percent,
            temperature_celsius,
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    /// Fetch current weather conditions by GPS coordinates
    async fn current(&self, latitude: Decimal, longitude: Decimal) -> AppResult<CurrentWeather> {
        let url = format!("{}/weather", self.base_url);
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| AppError::WeatherApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::WeatherApi(describe_failure(response).await));
        }

        let data: OWMCurrentResponse = response
            .json()
            .await
            .map_err(|e| AppError::WeatherApi(format!("Failed to parse weather response: {}", e)))?;

        Self::convert_current_response(data)
    }
}
