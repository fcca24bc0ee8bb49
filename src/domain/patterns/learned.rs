//! Learned context - the preference/avoidance view used to bias generation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::insight::Insight;
use super::record::{PatternRecord, PatternType};

/// Records at or above this confidence are considered established.
pub const HIGH_CONFIDENCE: f64 = 0.6;

/// One established pattern, flattened for prompt use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSignal {
    pub pattern_type: PatternType,
    pub pattern_key: String,
    pub description: String,
    pub confidence: f64,
    pub recommendation: String,
}

impl From<&PatternRecord> for PatternSignal {
    fn from(record: &PatternRecord) -> Self {
        Self {
            pattern_type: record.pattern_type,
            pattern_key: record.pattern_key.clone(),
            description: record.key().describe(),
            confidence: record.confidence,
            recommendation: record.recommendation.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedContext {
    pub preferences: Vec<PatternSignal>,
    pub avoidances: Vec<PatternSignal>,
    /// Titles and descriptions of current insights, highest priority first.
    pub insights: Vec<String>,
}

impl LearnedContext {
    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty() && self.avoidances.is_empty() && self.insights.is_empty()
    }
}

/// Partitions active, high-confidence records into preferences and avoidances.
///
/// Records that are neither clearly positive nor flagged for avoidance are
/// left out. Both lists are ordered by descending confidence.
pub fn build_ai_context(
    patterns: &[PatternRecord],
    insights: &[Insight],
    now: Timestamp,
) -> LearnedContext {
    let established = patterns
        .iter()
        .filter(|p| p.is_active && p.confidence >= HIGH_CONFIDENCE);

    let mut preferences = Vec::new();
    let mut avoidances = Vec::new();
    for record in established {
        if record.should_avoid() {
            avoidances.push(PatternSignal::from(record));
        } else if record.is_positive() {
            preferences.push(PatternSignal::from(record));
        }
    }
    preferences.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    avoidances.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut current: Vec<&Insight> = insights.iter().filter(|i| i.is_current(&now)).collect();
    current.sort_by(|a, b| b.priority.cmp(&a.priority));

    LearnedContext {
        preferences,
        avoidances,
        insights: current
            .into_iter()
            .map(|i| format!("{}: {}", i.title, i.description))
            .collect(),
    }
}
