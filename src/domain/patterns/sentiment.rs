//! Sentiment classification of free-text feedback.
//!
//! The default [`KeywordSentimentAnalyzer`] is a lexicon heuristic. Callers
//! depend on the [`SentimentAnalyzer`] trait so a model-backed classifier can
//! replace it without touching pattern aggregation.

use serde::{Deserialize, Serialize};

/// Polarity of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    /// Non-negative sentiment counts as a successful completion.
    pub fn is_non_negative(&self) -> bool {
        !matches!(self, Sentiment::Negative)
    }
}

/// Result of classifying a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    /// Between 0.5 and 0.9.
    pub confidence: f64,
    /// Tokens that matched any lexicon.
    pub keywords: Vec<String>,
}

impl SentimentAnalysis {
    /// The fallback result for empty or unmatched text.
    pub fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            confidence: MIN_CONFIDENCE,
            keywords: Vec::new(),
        }
    }

    /// Signed score used for running averages: `+confidence`, `0`, or `-confidence`.
    pub fn polarity_score(&self) -> f64 {
        match self.sentiment {
            Sentiment::Positive => self.confidence,
            Sentiment::Neutral => 0.0,
            Sentiment::Negative => -self.confidence,
        }
    }
}

/// Strategy interface for sentiment classification.
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> SentimentAnalysis;
}

const MIN_CONFIDENCE: f64 = 0.5;
const MAX_CONFIDENCE: f64 = 0.9;

const POSITIVE_KEYWORDS: &[&str] = &[
    "love", "amazing", "great", "awesome", "enjoy", "happy", "excellent", "wonderful",
    "fantastic", "good", "nice", "proud", "accomplish", "satisf", "energiz", "excited",
    "glad", "best", "perfect", "fun", "relax", "rewarding", "grateful",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "hate", "boring", "bored", "difficult", "hard", "tired", "frustrat", "annoy", "terrible",
    "awful", "bad", "stress", "exhaust", "overwhelm", "disappoint", "worst", "pain",
    "struggl", "sad", "angry", "waste", "skip",
];

const NEUTRAL_KEYWORDS: &[&str] = &[
    "okay", "fine", "alright", "normal", "average", "decent", "meh", "so-so", "moderate",
    "usual",
];

/// Substring lexicon classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSentimentAnalyzer;

impl KeywordSentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn normalize(token: &str) -> String {
        token
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '-')
            .to_lowercase()
    }

    fn matches_any(token: &str, lexicon: &[&str]) -> bool {
        lexicon.iter().any(|keyword| token.contains(keyword))
    }
}

impl SentimentAnalyzer for KeywordSentimentAnalyzer {
    fn analyze(&self, text: &str) -> SentimentAnalysis {
        let mut positive = 0usize;
        let mut negative = 0usize;
        let mut neutral = 0usize;
        let mut keywords = Vec::new();

        for raw in text.split_whitespace() {
            let token = Self::normalize(raw);
            if token.is_empty() {
                continue;
            }

            let mut matched = false;
            if Self::matches_any(&token, POSITIVE_KEYWORDS) {
                positive += 1;
                matched = true;
            }
            if Self::matches_any(&token, NEGATIVE_KEYWORDS) {
                negative += 1;
                matched = true;
            }
            if Self::matches_any(&token, NEUTRAL_KEYWORDS) {
                neutral += 1;
                matched = true;
            }
            if matched {
                keywords.push(token);
            }
        }

        let total = positive + negative + neutral;
        if total == 0 {
            return SentimentAnalysis::neutral();
        }

        // Neutral wins every tie it takes part in, and any positive/negative tie.
        let (sentiment, score) = if positive > negative && positive > neutral {
            (Sentiment::Positive, positive)
        } else if negative > positive && negative > neutral {
            (Sentiment::Negative, negative)
        } else {
            (Sentiment::Neutral, neutral)
        };

        let share = score as f64 / total as f64;
        let confidence = (MIN_CONFIDENCE + (MAX_CONFIDENCE - MIN_CONFIDENCE) * share)
            .clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);

        SentimentAnalysis {
            sentiment,
            confidence,
            keywords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> SentimentAnalysis {
        KeywordSentimentAnalyzer::new().analyze(text)
    }

    #[test]
    fn detects_positive_feedback() {
        let result = analyze("I love this, it was amazing");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert!(result.keywords.contains(&"love".to_string()));
        assert!(result.keywords.contains(&"amazing".to_string()));
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn detects_negative_feedback() {
        let result = analyze("This was boring and I felt exhausted");
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert_eq!(result.keywords, vec!["boring", "exhausted"]);
    }

    #[test]
    fn empty_text_is_neutral() {
        assert_eq!(analyze(""), SentimentAnalysis::neutral());
        assert_eq!(analyze("   "), SentimentAnalysis::neutral());
    }

    #[test]
    fn unmatched_text_is_neutral() {
        let result = analyze("went to the store");
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.confidence, 0.5);
        assert!(result.keywords.is_empty());
    }

    #[test]
    fn positive_negative_tie_is_neutral() {
        let result = analyze("great but frustrating");
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn confidence_scales_with_share() {
        // two positive, one neutral
        let result = analyze("good fun, fine");
        assert_eq!(result.sentiment, Sentiment::Positive);
        let expected = 0.5 + 0.4 * (2.0 / 3.0);
        assert!((result.confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn polarity_score_is_signed() {
        assert!(analyze("awful day").polarity_score() < 0.0);
        assert!(analyze("awesome day").polarity_score() > 0.0);
        assert_eq!(analyze("a day").polarity_score(), 0.0);
    }
}
