//! Weather service configuration
//!
//! The API key is optional: without one, weather lookups fail with a
//! configuration error and generation proceeds without weather.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// OpenWeatherMap configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub api_key: Option<Secret<String>>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Lifetime of cached observations in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Returns the API key when one is set and not blank.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().trim().to_string())
            .filter(|k| !k.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidUrl("weather.base_url"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout("weather"));
        }
        Ok(())
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_cache_ttl() -> u64 {
    300
}
