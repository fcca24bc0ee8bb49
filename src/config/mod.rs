//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `LIFEQUEST` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use lifequest::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("History window: {} days", config.generation.task_history_days);
//! ```

mod ai;
mod database;
mod error;
mod generation;
mod runtime;
mod weather;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;
pub use runtime::{Environment, RuntimeConfig};
pub use weather::WeatherConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Environment and logging
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Completion service (OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Weather service (OpenWeatherMap)
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Daily task generation
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `LIFEQUEST` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LIFEQUEST__DATABASE__URL=...` -> `database.url = ...`
    /// - `LIFEQUEST__GENERATION__BATCH_CONCURRENCY=4` -> `generation.batch_concurrency = 4`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LIFEQUEST")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_without_ai()?;
        self.ai.validate()
    }

    /// Validates every section except the completion service, which dry
    /// runs replace with the mock provider.
    pub fn validate_without_ai(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.weather.validate()?;
        self.generation.validate()?;

        let pool = self.database.max_connections;
        if self.generation.batch_concurrency > pool as usize {
            return Err(ValidationError::ConcurrencyExceedsPool {
                concurrency: self.generation.batch_concurrency,
                pool,
            });
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}
