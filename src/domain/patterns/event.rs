//! Completion events and the contextual attributes derived from them.

use chrono::{Datelike, Timelike, Weekday};
use std::collections::HashSet;
use chrono_tz::Tz;

use crate::domain::foundation::{TaskId, Timestamp, UserId};
use crate::domain::task::TaskSource;

use super::record::{PatternKey, PatternType};

/// Coarse local time-of-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    /// 05:00 - 11:59
    Morning,
    /// 12:00 - 16:59
    Afternoon,
    /// 17:00 - 20:59
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

/// How the actual duration compared with the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationAccuracy {
    Faster,
    OnEstimate,
    Slower,
}

impl DurationAccuracy {
    /// More than 20% off the estimate in either direction counts as a miss.
    pub fn classify(estimated_minutes: u32, actual_minutes: u32) -> Self {
        let estimated = f64::from(estimated_minutes.max(1));
        let ratio = f64::from(actual_minutes) / estimated;
        if ratio < 0.8 {
            DurationAccuracy::Faster
        } else if ratio > 1.2 {
            DurationAccuracy::Slower
        } else {
            DurationAccuracy::OnEstimate
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            DurationAccuracy::Faster => "faster_than_estimated",
            DurationAccuracy::OnEstimate => "on_estimate",
            DurationAccuracy::Slower => "slower_than_estimated",
        }
    }
}

/// A task completion as seen by the pattern analyzer.
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    pub user_id: UserId,
    pub task_id: TaskId,
    pub task_title: String,
    pub task_source: TaskSource,
    pub target_stats: Vec<String>,
    pub actual_xp: i64,
    pub feedback: Option<String>,
    pub completed_at: Timestamp,
    /// Timezone used to bucket `completed_at` into local time.
    pub timezone: Tz,
    pub estimated_minutes: Option<u32>,
    pub actual_minutes: Option<u32>,
    pub weather_condition: Option<String>,
}

impl CompletionEvent {
    pub fn new(
        user_id: UserId,
        task_id: TaskId,
        task_title: impl Into<String>,
        task_source: TaskSource,
        actual_xp: i64,
        completed_at: Timestamp,
    ) -> Self {
        Self {
            user_id,
            task_id,
            task_title: task_title.into(),
            task_source,
            target_stats: Vec::new(),
            actual_xp,
            feedback: None,
            completed_at,
            timezone: chrono_tz::UTC,
            estimated_minutes: None,
            actual_minutes: None,
            weather_condition: None,
        }
    }

    pub fn with_target_stats(mut self, stats: Vec<String>) -> Self {
        self.target_stats = stats;
        self
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    pub fn with_durations(mut self, estimated_minutes: u32, actual_minutes: u32) -> Self {
        self.estimated_minutes = Some(estimated_minutes);
        self.actual_minutes = Some(actual_minutes);
        self
    }

    pub fn with_weather_condition(mut self, condition: impl Into<String>) -> Self {
        self.weather_condition = Some(condition.into());
        self
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        let local = self.completed_at.as_datetime().with_timezone(&self.timezone);
        TimeOfDay::from_hour(local.hour())
    }

    pub fn weekday(&self) -> Weekday {
        self.completed_at
            .as_datetime()
            .with_timezone(&self.timezone)
            .weekday()
    }

    pub fn duration_accuracy(&self) -> Option<DurationAccuracy> {
        match (self.estimated_minutes, self.actual_minutes) {
            (Some(estimated), Some(actual)) => Some(DurationAccuracy::classify(estimated, actual)),
            _ => None,
        }
    }

    /// Every pattern key this completion contributes to.
    pub fn pattern_keys(&self) -> Vec<PatternKey> {
        let mut keys = vec![
            PatternKey::new(
                PatternType::Timing,
                format!("{}_tasks", self.time_of_day().as_str()),
            ),
            PatternKey::new(
                PatternType::DayOfWeek,
                format!("{}_tasks", weekday_name(self.weekday())),
            ),
            PatternKey::new(
                PatternType::TaskSource,
                format!("{}_tasks", slugify(self.task_source.as_str())),
            ),
        ];

        for stat in &self.target_stats {
            let slug = slugify(stat);
            if !slug.is_empty() {
                keys.push(PatternKey::new(
                    PatternType::StatPreference,
                    format!("{}_tasks", slug),
                ));
            }
        }

        if let Some(accuracy) = self.duration_accuracy() {
            keys.push(PatternKey::new(PatternType::Duration, accuracy.as_key()));
        }

        if let Some(condition) = self.weather_condition.as_deref().map(slugify) {
            if !condition.is_empty() {
                keys.push(PatternKey::new(
                    PatternType::Weather,
                    format!("{}_weather", condition),
                ));
            }
        }

        let mut seen = HashSet::new();
        keys.retain(|key| seen.insert(key.clone()));
        keys
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Lowercases and joins alphanumeric runs with underscores.
fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
