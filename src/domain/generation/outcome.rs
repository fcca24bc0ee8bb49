//! Results of single-user and batch generation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::task::Task;
use crate::domain::weather::WeatherContext;

/// One generation attempt for a user's local calendar day.
///
/// Storage allows at most one non-forced run per `(user_id, local_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRun {
    pub user_id: UserId,
    pub local_date: NaiveDate,
    pub forced: bool,
    pub created_at: Timestamp,
}

/// A successful daily generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTasks {
    pub adventure_task: Task,
    pub family_task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherContext>,
}

/// One user's failure inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchError {
    pub user_id: UserId,
    pub message: String,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_users_processed: usize,
    pub successful_generations: usize,
    /// Users whose tasks already existed for the day.
    pub skipped_users: usize,
    pub errors: Vec<BatchError>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl BatchSummary {
    pub fn started(at: Timestamp) -> Self {
        Self {
            total_users_processed: 0,
            successful_generations: 0,
            skipped_users: 0,
            errors: Vec::new(),
            started_at: at,
            finished_at: at,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Static description of how the batch should be triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInfo {
    /// Local wall-clock time, `HH:MM`.
    pub recommended_time: String,
    pub frequency: String,
    pub timezone: String,
}
