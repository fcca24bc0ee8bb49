//! Patterns - Learning how a user responds to different kinds of tasks.
//!
//! # Module Organization
//!
//! - `sentiment` - Pluggable text sentiment classification
//! - `event` - Completion events and the contextual attributes derived from them
//! - `record` - Persistent per-key aggregates and their update rule
//! - `insight` - Higher-level recommendations derived from records
//! - `learned` - Preference/avoidance view handed to task generation

mod event;
mod insight;
mod learned;
mod record;
mod sentiment;

pub use event::{CompletionEvent, DurationAccuracy, TimeOfDay};
pub use insight::{Insight, InsightPriority, INSIGHT_TTL_DAYS};
pub use learned::{build_ai_context, LearnedContext, PatternSignal, HIGH_CONFIDENCE};
pub use record::{PatternKey, PatternRecord, PatternStrength, PatternType};
pub use sentiment::{KeywordSentimentAnalyzer, Sentiment, SentimentAnalysis, SentimentAnalyzer};
