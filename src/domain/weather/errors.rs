//! Weather integration errors.

use thiserror::Error;

use crate::domain::foundation::ErrorCode;

/// Failure modes of the weather integration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// API key missing or rejected.
    #[error("weather configuration error: {0}")]
    Configuration(String),

    /// Location could not be used for a lookup.
    #[error("invalid location: {0}")]
    Validation(String),

    #[error("no weather data for location '{0}'")]
    NotFound(String),

    #[error("weather API rate limit exceeded")]
    RateLimited,

    #[error("weather network error: {0}")]
    Network(String),

    #[error("weather service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl WeatherError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WeatherError::Configuration(_) => ErrorCode::ConfigurationError,
            WeatherError::Validation(_) => ErrorCode::InvalidFormat,
            WeatherError::NotFound(_) => ErrorCode::EntityNotFound,
            WeatherError::RateLimited => ErrorCode::RateLimited,
            WeatherError::Network(_) => ErrorCode::NetworkError,
            WeatherError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }
}
