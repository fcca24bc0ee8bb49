//! Pattern repository port.
//!
//! Pattern records are unique per `(user, pattern type, pattern key)`;
//! insights are unique per source pattern record.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::patterns::{Insight, PatternKey, PatternRecord};

#[async_trait]
pub trait PatternRepository: Send + Sync {
    async fn find_pattern(
        &self,
        user_id: &UserId,
        key: &PatternKey,
    ) -> Result<Option<PatternRecord>, DomainError>;

    /// Inserts or replaces the record for its `(user, type, key)`.
    async fn upsert_pattern(&self, record: &PatternRecord) -> Result<(), DomainError>;

    /// All pattern records of a user, active or not.
    async fn list_patterns(&self, user_id: &UserId) -> Result<Vec<PatternRecord>, DomainError>;

    /// Inserts or replaces the insight derived from `insight.pattern_id`.
    async fn upsert_insight(&self, insight: &Insight) -> Result<(), DomainError>;

    /// Active insights not yet expired at `now`.
    async fn list_active_insights(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Vec<Insight>, DomainError>;
}
