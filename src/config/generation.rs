//! Task generation configuration

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::generation::SchedulingInfo;

/// Task generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Days of task history fed into the prompt
    #[serde(default = "default_task_history_days")]
    pub task_history_days: u32,

    /// IANA timezone for users without one
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    /// Local time the batch is expected to run (HH:MM)
    #[serde(default = "default_recommended_time")]
    pub recommended_time: String,

    /// Users processed at once by the batch runner
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

impl GenerationConfig {
    /// Parsed default timezone, falling back to UTC when unparseable.
    pub fn timezone(&self) -> Tz {
        self.default_timezone.parse().unwrap_or(Tz::UTC)
    }

    pub fn scheduling_info(&self) -> SchedulingInfo {
        SchedulingInfo {
            recommended_time: self.recommended_time.clone(),
            frequency: "daily".to_string(),
            timezone: self.default_timezone.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.task_history_days == 0 || self.task_history_days > 365 {
            return Err(ValidationError::InvalidHistoryWindow);
        }
        if self.default_timezone.parse::<Tz>().is_err() {
            return Err(ValidationError::InvalidTimezone(self.default_timezone.clone()));
        }
        if NaiveTime::parse_from_str(&self.recommended_time, "%H:%M").is_err() {
            return Err(ValidationError::InvalidRecommendedTime(
                self.recommended_time.clone(),
            ));
        }
        if self.batch_concurrency == 0 {
            return Err(ValidationError::InvalidConcurrency);
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            task_history_days: default_task_history_days(),
            default_timezone: default_timezone(),
            recommended_time: default_recommended_time(),
            batch_concurrency: default_batch_concurrency(),
        }
    }
}

fn default_task_history_days() -> u32 {
    14
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_recommended_time() -> String {
    "06:00".to_string()
}

fn default_batch_concurrency() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.task_history_days, 14);
        assert_eq!(config.batch_concurrency, 1);
        assert_eq!(config.timezone(), Tz::UTC);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scheduling_info() {
        let info = GenerationConfig::default().scheduling_info();
        assert_eq!(info.recommended_time, "06:00");
        assert_eq!(info.frequency, "daily");
        assert_eq!(info.timezone, "UTC");
    }

    #[test]
    fn test_validation_rejects_unknown_timezone() {
        let config = GenerationConfig {
            default_timezone: "Mars/Olympus_Mons".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let config = GenerationConfig {
            batch_concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_time() {
        let config = GenerationConfig {
            recommended_time: "6am".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
