//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid timeout for {0}")]
    InvalidTimeout(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid URL for {0}: must use http or https")]
    InvalidUrl(&'static str),

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid recommended time: {0}")]
    InvalidRecommendedTime(String),

    #[error("Task history window must be between 1 and 365 days")]
    InvalidHistoryWindow,

    #[error("Batch concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("Batch concurrency {concurrency} exceeds database pool size {pool}")]
    ConcurrencyExceedsPool { concurrency: usize, pool: u32 },
}
