//! RecordCompletionHandler - Command handler feeding completions into pattern learning.
//!
//! Each completion updates one pattern record per inferred dimension and
//! refreshes the derived insight once a record carries enough evidence.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::patterns::{
    CompletionEvent, Insight, PatternRecord, SentimentAnalysis, SentimentAnalyzer,
};
use crate::ports::PatternRepository;

/// Result of recording a completion.
#[derive(Debug, Clone)]
pub struct RecordCompletionResult {
    pub sentiment: SentimentAnalysis,
    /// Records after this observation, one per pattern key.
    pub patterns: Vec<PatternRecord>,
    /// Insights created or refreshed by this observation.
    pub insights: Vec<Insight>,
}

/// Handler for recording task completion events.
pub struct RecordCompletionHandler {
    patterns: Arc<dyn PatternRepository>,
    analyzer: Arc<dyn SentimentAnalyzer>,
}

impl RecordCompletionHandler {
    pub fn new(
        patterns: Arc<dyn PatternRepository>,
        analyzer: Arc<dyn SentimentAnalyzer>,
    ) -> Self {
        Self { patterns, analyzer }
    }

    /// Classifies the text without recording anything.
    pub fn analyze_sentiment(&self, text: &str) -> SentimentAnalysis {
        self.analyzer.analyze(text)
    }

    pub async fn handle(
        &self,
        event: &CompletionEvent,
    ) -> Result<RecordCompletionResult, DomainError> {
        self.handle_at(event, Timestamp::now()).await
    }

    /// Records `event`, stamping insights with `now`.
    pub async fn handle_at(
        &self,
        event: &CompletionEvent,
        now: Timestamp,
    ) -> Result<RecordCompletionResult, DomainError> {
        let sentiment = event
            .feedback
            .as_deref()
            .map(|text| self.analyzer.analyze(text))
            .unwrap_or_else(SentimentAnalysis::neutral);

        let mut patterns = Vec::new();
        let mut insights = Vec::new();

        for key in event.pattern_keys() {
            let mut record = self
                .patterns
                .find_pattern(&event.user_id, &key)
                .await?
                .unwrap_or_else(|| {
                    PatternRecord::new(event.user_id.clone(), &key, event.completed_at)
                });

            record.observe(event.actual_xp, &sentiment, event.completed_at);
            self.patterns.upsert_pattern(&record).await?;

            if let Some(insight) = Insight::from_pattern(&record, now) {
                self.patterns.upsert_insight(&insight).await?;
                insights.push(insight);
            }
            patterns.push(record);
        }

        tracing::debug!(
            user_id = %event.user_id,
            task_id = %event.task_id,
            sentiment = sentiment.sentiment.as_str(),
            patterns = patterns.len(),
            insights = insights.len(),
            "Recorded completion event"
        );

        Ok(RecordCompletionResult {
            sentiment,
            patterns,
            insights,
        })
    }
}
