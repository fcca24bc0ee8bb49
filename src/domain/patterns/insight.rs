//! Insights - durable recommendations promoted from pattern records.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{InsightId, PatternId, Timestamp, UserId, ValidationError};

use super::record::{PatternRecord, PatternStrength};

/// Days an insight stays current after being derived.
pub const INSIGHT_TTL_DAYS: i64 = 30;

/// Minimum record confidence for promotion to an insight.
const MIN_INSIGHT_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    Low,
    Medium,
    High,
}

impl InsightPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightPriority::Low => "low",
            InsightPriority::Medium => "medium",
            InsightPriority::High => "high",
        }
    }
}

impl FromStr for InsightPriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(InsightPriority::Low),
            "medium" => Ok(InsightPriority::Medium),
            "high" => Ok(InsightPriority::High),
            other => Err(ValidationError::invalid_format(
                "priority",
                format!("unknown insight priority '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: InsightId,
    pub user_id: UserId,
    pub pattern_id: PatternId,
    pub title: String,
    pub description: String,
    pub priority: InsightPriority,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Insight {
    /// Promotes a record to an insight once it carries enough evidence.
    ///
    /// Returns `None` for weak or low-confidence records.
    pub fn from_pattern(record: &PatternRecord, now: Timestamp) -> Option<Self> {
        if record.strength < PatternStrength::Moderate || record.confidence < MIN_INSIGHT_CONFIDENCE
        {
            return None;
        }

        let subject = record.key().describe();
        let (title, priority) = if record.should_avoid() {
            (format!("Struggles with {}", subject), InsightPriority::High)
        } else if record.is_positive() {
            let priority = if record.strength == PatternStrength::Strong {
                InsightPriority::High
            } else {
                InsightPriority::Medium
            };
            (format!("Thrives on {}", subject), priority)
        } else {
            (format!("Mixed results with {}", subject), InsightPriority::Low)
        };

        Some(Self {
            id: InsightId::new(),
            user_id: record.user_id.clone(),
            pattern_id: record.id,
            title,
            description: record.recommendation.clone(),
            priority,
            is_active: true,
            created_at: now,
            expires_at: now.plus_days(INSIGHT_TTL_DAYS),
        })
    }

    /// Active and not yet expired at `now`.
    pub fn is_current(&self, now: &Timestamp) -> bool {
        self.is_active && self.expires_at.is_after(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patterns::{PatternKey, PatternType, Sentiment, SentimentAnalysis};

    fn observed(times: usize, sentiment: Sentiment) -> PatternRecord {
        let mut record = PatternRecord::new(
            UserId::new("u").unwrap(),
            &PatternKey::new(PatternType::Timing, "evening_tasks"),
            Timestamp::now(),
        );
        let analysis = SentimentAnalysis {
            sentiment,
            confidence: 0.8,
            keywords: Vec::new(),
        };
        for _ in 0..times {
            record.observe(25, &analysis, Timestamp::now());
        }
        record
    }

    #[test]
    fn weak_records_are_not_promoted() {
        assert!(Insight::from_pattern(&observed(4, Sentiment::Positive), Timestamp::now()).is_none());
    }

    #[test]
    fn moderate_positive_record_becomes_medium_insight() {
        let now = Timestamp::now();
        let insight = Insight::from_pattern(&observed(6, Sentiment::Positive), now).unwrap();

        assert_eq!(insight.priority, InsightPriority::Medium);
        assert!(insight.title.starts_with("Thrives on"));
        assert_eq!(insight.expires_at, now.plus_days(INSIGHT_TTL_DAYS));
        assert!(insight.is_current(&now));
    }

    #[test]
    fn avoided_pattern_is_high_priority() {
        let insight = Insight::from_pattern(&observed(8, Sentiment::Negative), Timestamp::now()).unwrap();
        assert_eq!(insight.priority, InsightPriority::High);
    }

    #[test]
    fn expired_insight_is_not_current() {
        let now = Timestamp::now();
        let insight = Insight::from_pattern(&observed(6, Sentiment::Positive), now).unwrap();
        assert!(!insight.is_current(&now.plus_days(INSIGHT_TTL_DAYS + 1)));
    }
}
