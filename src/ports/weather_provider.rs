//! Weather provider port.
//!
//! Implementations fetch current conditions for a validated postal code.
//! Caching is a decorator concern, not part of this contract.

use async_trait::async_trait;

use crate::domain::weather::{CurrentWeather, WeatherError, ZipCode};

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions at `zip`.
    ///
    /// # Errors
    ///
    /// - `Configuration` when no API key is configured or it is rejected
    /// - `NotFound` when the provider has no data for the location
    /// - `RateLimited`, `Network`, `ServiceUnavailable` for transport failures
    async fn current_weather(&self, zip: &ZipCode) -> Result<CurrentWeather, WeatherError>;
}
