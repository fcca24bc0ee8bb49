//! OpenWeatherMap adapter - Current conditions by US zip code.
//!
//! Calls `GET {base_url}/weather?zip={zip},us&units=imperial` and normalizes
//! the response into [`CurrentWeather`].

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::domain::weather::{CurrentWeather, WeatherError, ZipCode};
use crate::ports::WeatherProvider;

/// Configuration for the OpenWeatherMap adapter.
#[derive(Debug, Clone)]
pub struct OpenWeatherConfig {
    /// Missing keys surface as `WeatherError::Configuration` per call.
    api_key: Option<Secret<String>>,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenWeatherConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()).map(Secret::new),
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// OpenWeatherMap current-weather client.
pub struct OpenWeatherProvider {
    config: OpenWeatherConfig,
    client: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: OpenWeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WeatherError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn current_url(&self) -> String {
        format!("{}/weather", self.config.base_url.trim_end_matches('/'))
    }

    async fn check_status(response: Response, zip: &ZipCode) -> Result<Response, WeatherError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                WeatherError::Configuration("Weather API key was rejected".to_string())
            }
            StatusCode::NOT_FOUND => WeatherError::NotFound(zip.to_string()),
            StatusCode::TOO_MANY_REQUESTS => WeatherError::RateLimited,
            StatusCode::BAD_REQUEST => WeatherError::Validation(body),
            s if s.is_server_error() => {
                WeatherError::ServiceUnavailable(format!("Weather API returned {}", s))
            }
            s => WeatherError::Network(format!("Unexpected status {}: {}", s, body)),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, zip: &ZipCode) -> Result<CurrentWeather, WeatherError> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            WeatherError::Configuration("Weather API key is not configured".to_string())
        })?;

        let response = self
            .client
            .get(self.current_url())
            .query(&[
                ("zip", format!("{},us", zip.base())),
                ("appid", api_key.expose_secret().clone()),
                ("units", "imperial".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WeatherError::Network(format!(
                        "Weather request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else {
                    WeatherError::Network(e.to_string())
                }
            })?;

        let body: OpenWeatherResponse = Self::check_status(response, zip)
            .await?
            .json()
            .await
            .map_err(|e| {
                WeatherError::ServiceUnavailable(format!("Malformed weather response: {}", e))
            })?;

        Ok(body.into_current(zip))
    }
}

// ----- OpenWeatherMap API Types -----

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    #[serde(default)]
    name: Option<String>,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<ConditionEntry>,
    #[serde(default)]
    wind: Option<WindReading>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct WindReading {
    speed: f64,
}

impl OpenWeatherResponse {
    fn into_current(self, zip: &ZipCode) -> CurrentWeather {
        let (condition, description) = self
            .weather
            .into_iter()
            .next()
            .map(|w| (w.main, w.description))
            .unwrap_or_else(|| ("Unknown".to_string(), "unknown".to_string()));

        CurrentWeather {
            location: self.name.unwrap_or_else(|| zip.to_string()),
            temperature_f: self.main.temp,
            feels_like_f: self.main.feels_like.unwrap_or(self.main.temp),
            condition,
            description,
            wind_speed_mph: self.wind.map(|w| w.speed).unwrap_or(0.0),
            humidity: self.main.humidity.unwrap_or(0.0).clamp(0.0, 100.0) as u8,
            observed_at: Timestamp::now(),
        }
    }
}
