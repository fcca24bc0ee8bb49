//! PostgreSQL pool configuration

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound on `max_connections`.
const MAX_POOL_SIZE: u32 = 100;

/// Pool settings for the batch run.
///
/// One connection is held per user while a generated pair is written, so
/// `max_connections` bounds useful batch concurrency.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` connection URL
    pub url: String,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a free connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Seconds before an idle connection is closed
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Apply `migrations/` before the batch runs
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Pool options; connect with `.connect(&config.url)`.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout())
            .idle_timeout(self.idle_timeout())
    }

    /// Validate database configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("database"));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_run_migrations() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_suit_a_sequential_batch() {
        let config = DatabaseConfig::default();
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
        assert!(config.run_migrations);
    }

    #[test]
    fn url_is_required_and_must_be_postgres() {
        assert!(matches!(
            DatabaseConfig::default().validate(),
            Err(ValidationError::MissingRequired("DATABASE__URL"))
        ));
        assert!(matches!(
            with_url("mysql://localhost/lifequest").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
        assert!(with_url("postgres://localhost/lifequest").validate().is_ok());
    }

    #[test]
    fn pool_bounds_are_checked() {
        let inverted = DatabaseConfig {
            min_connections: 10,
            max_connections: 5,
            ..with_url("postgresql://localhost/lifequest")
        };
        assert!(matches!(inverted.validate(), Err(ValidationError::InvalidPoolSize)));

        let empty = DatabaseConfig {
            min_connections: 0,
            max_connections: 0,
            ..with_url("postgresql://localhost/lifequest")
        };
        assert!(matches!(empty.validate(), Err(ValidationError::InvalidPoolSize)));

        let huge = DatabaseConfig {
            max_connections: 150,
            ..with_url("postgresql://localhost/lifequest")
        };
        assert!(matches!(huge.validate(), Err(ValidationError::PoolSizeTooLarge)));
    }

    #[test]
    fn zero_acquire_timeout_is_rejected() {
        let config = DatabaseConfig {
            acquire_timeout_secs: 0,
            ..with_url("postgresql://localhost/lifequest")
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTimeout("database"))
        ));
    }
}
