//! Pattern records - running aggregates per `(pattern type, key)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{PatternId, Timestamp, UserId, ValidationError};

use super::sentiment::SentimentAnalysis;

/// Dimension a pattern is tracked along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Timing,
    DayOfWeek,
    StatPreference,
    TaskSource,
    Duration,
    Weather,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Timing => "timing",
            PatternType::DayOfWeek => "day_of_week",
            PatternType::StatPreference => "stat_preference",
            PatternType::TaskSource => "task_source",
            PatternType::Duration => "duration",
            PatternType::Weather => "weather",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timing" => Ok(PatternType::Timing),
            "day_of_week" => Ok(PatternType::DayOfWeek),
            "stat_preference" => Ok(PatternType::StatPreference),
            "task_source" => Ok(PatternType::TaskSource),
            "duration" => Ok(PatternType::Duration),
            "weather" => Ok(PatternType::Weather),
            other => Err(ValidationError::invalid_format(
                "pattern_type",
                format!("unknown pattern type '{}'", other),
            )),
        }
    }
}

/// Identity of a pattern within one user's records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternKey {
    pub pattern_type: PatternType,
    pub key: String,
}

impl PatternKey {
    pub fn new(pattern_type: PatternType, key: impl Into<String>) -> Self {
        Self {
            pattern_type,
            key: key.into(),
        }
    }

    /// Human-readable description, e.g. "morning tasks".
    pub fn describe(&self) -> String {
        let label = self.key.replace('_', " ");
        match self.pattern_type {
            PatternType::Duration => format!("tasks finished {}", label),
            PatternType::Weather => format!("tasks done in {}", label),
            PatternType::TaskSource => format!("{} (by source)", label),
            _ => label,
        }
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pattern_type, self.key)
    }
}

/// Evidence strength, driven by occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternStrength {
    Weak,
    Moderate,
    Strong,
}

impl PatternStrength {
    pub fn for_occurrences(occurrences: u32) -> Self {
        if occurrences < 5 {
            PatternStrength::Weak
        } else if occurrences < 15 {
            PatternStrength::Moderate
        } else {
            PatternStrength::Strong
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternStrength::Weak => "weak",
            PatternStrength::Moderate => "moderate",
            PatternStrength::Strong => "strong",
        }
    }
}

impl FromStr for PatternStrength {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weak" => Ok(PatternStrength::Weak),
            "moderate" => Ok(PatternStrength::Moderate),
            "strong" => Ok(PatternStrength::Strong),
            other => Err(ValidationError::invalid_format(
                "strength",
                format!("unknown strength '{}'", other),
            )),
        }
    }
}

/// Confidence ceiling for any pattern.
const MAX_PATTERN_CONFIDENCE: f64 = 0.9;

/// Aggregate describing how a user responds to one category of task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub id: PatternId,
    pub user_id: UserId,
    pub pattern_type: PatternType,
    pub pattern_key: String,
    pub total_occurrences: u32,
    pub successful_completions: u32,
    pub failed_completions: u32,
    pub average_xp_awarded: f64,
    pub average_feedback_sentiment: f64,
    pub confidence: f64,
    pub strength: PatternStrength,
    pub recommendation: String,
    pub is_active: bool,
    pub first_observed_at: Timestamp,
    pub last_observed_at: Timestamp,
}

impl PatternRecord {
    /// Creates an empty record for a first observation.
    pub fn new(user_id: UserId, key: &PatternKey, now: Timestamp) -> Self {
        Self {
            id: PatternId::new(),
            user_id,
            pattern_type: key.pattern_type,
            pattern_key: key.key.clone(),
            total_occurrences: 0,
            successful_completions: 0,
            failed_completions: 0,
            average_xp_awarded: 0.0,
            average_feedback_sentiment: 0.0,
            confidence: 0.0,
            strength: PatternStrength::Weak,
            recommendation: String::new(),
            is_active: true,
            first_observed_at: now,
            last_observed_at: now,
        }
    }

    pub fn key(&self) -> PatternKey {
        PatternKey::new(self.pattern_type, self.pattern_key.clone())
    }

    /// Folds one completion into the aggregates.
    pub fn observe(&mut self, xp_awarded: i64, sentiment: &SentimentAnalysis, at: Timestamp) {
        let previous = f64::from(self.total_occurrences);
        self.total_occurrences += 1;
        let count = f64::from(self.total_occurrences);

        if sentiment.sentiment.is_non_negative() {
            self.successful_completions += 1;
        } else {
            self.failed_completions += 1;
        }

        self.average_xp_awarded =
            (self.average_xp_awarded * previous + xp_awarded as f64) / count;
        self.average_feedback_sentiment =
            (self.average_feedback_sentiment * previous + sentiment.polarity_score()) / count;

        self.confidence = Self::confidence_for(self.total_occurrences);
        self.strength = PatternStrength::for_occurrences(self.total_occurrences);
        self.last_observed_at = at;
        self.recommendation = self.build_recommendation();
    }

    /// Monotonic in occurrences, capped at 0.9.
    pub fn confidence_for(occurrences: u32) -> f64 {
        (f64::from(occurrences) / 10.0).min(MAX_PATTERN_CONFIDENCE)
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_occurrences == 0 {
            return 0.0;
        }
        f64::from(self.successful_completions) / f64::from(self.total_occurrences)
    }

    /// The user responds well to this pattern.
    pub fn is_positive(&self) -> bool {
        self.average_feedback_sentiment > 0.0 && self.success_rate() >= 0.5
    }

    /// The user consistently responds badly to this pattern.
    pub fn should_avoid(&self) -> bool {
        self.average_feedback_sentiment < 0.0
            && self.failed_completions > self.successful_completions
    }

    fn build_recommendation(&self) -> String {
        let subject = self.key().describe();
        let rate = (self.success_rate() * 100.0).round() as u32;
        let n = self.total_occurrences;

        if self.should_avoid() {
            format!(
                "Avoid {}: only {}% of {} completions were received well.",
                subject, rate, n
            )
        } else if self.is_positive() {
            format!(
                "Favor {}: {}% of {} completions were positive, averaging {:.0} XP.",
                subject, rate, n, self.average_xp_awarded
            )
        } else {
            format!(
                "Keep observing {}: mixed feedback across {} completions.",
                subject, n
            )
        }
    }
}
