//! PostgreSQL implementation of PatternRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::rows::{column, parsed, timestamp, user_id_column};
use crate::domain::foundation::{DomainError, InsightId, PatternId, Timestamp, UserId};
use crate::domain::patterns::{Insight, PatternKey, PatternRecord};
use crate::ports::PatternRepository;

/// PostgreSQL implementation of PatternRepository.
#[derive(Clone)]
pub struct PostgresPatternRepository {
    pool: PgPool,
}

impl PostgresPatternRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PATTERN_COLUMNS: &str = r#"
    id, user_id, pattern_type, pattern_key, total_occurrences, successful_completions,
    failed_completions, average_xp_awarded, average_feedback_sentiment, confidence,
    strength, recommendation, is_active, first_observed_at, last_observed_at
"#;

#[async_trait]
impl PatternRepository for PostgresPatternRepository {
    async fn find_pattern(
        &self,
        user_id: &UserId,
        key: &PatternKey,
    ) -> Result<Option<PatternRecord>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM pattern_records WHERE user_id = $1 AND pattern_type = $2 AND pattern_key = $3",
            PATTERN_COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(key.pattern_type.as_str())
        .bind(&key.key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch pattern", e))?;

        row.as_ref().map(row_to_pattern).transpose()
    }

    async fn upsert_pattern(&self, record: &PatternRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO pattern_records (
                id, user_id, pattern_type, pattern_key, total_occurrences,
                successful_completions, failed_completions, average_xp_awarded,
                average_feedback_sentiment, confidence, strength, recommendation,
                is_active, first_observed_at, last_observed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (user_id, pattern_type, pattern_key) DO UPDATE SET
                total_occurrences = EXCLUDED.total_occurrences,
                successful_completions = EXCLUDED.successful_completions,
                failed_completions = EXCLUDED.failed_completions,
                average_xp_awarded = EXCLUDED.average_xp_awarded,
                average_feedback_sentiment = EXCLUDED.average_feedback_sentiment,
                confidence = EXCLUDED.confidence,
                strength = EXCLUDED.strength,
                recommendation = EXCLUDED.recommendation,
                is_active = EXCLUDED.is_active,
                last_observed_at = EXCLUDED.last_observed_at
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_str())
        .bind(record.pattern_type.as_str())
        .bind(&record.pattern_key)
        .bind(count_to_i32(record.total_occurrences))
        .bind(count_to_i32(record.successful_completions))
        .bind(count_to_i32(record.failed_completions))
        .bind(record.average_xp_awarded)
        .bind(record.average_feedback_sentiment)
        .bind(record.confidence)
        .bind(record.strength.as_str())
        .bind(&record.recommendation)
        .bind(record.is_active)
        .bind(record.first_observed_at.as_datetime())
        .bind(record.last_observed_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("upsert pattern", e))?;

        Ok(())
    }

    async fn list_patterns(&self, user_id: &UserId) -> Result<Vec<PatternRecord>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pattern_records WHERE user_id = $1 ORDER BY pattern_type, pattern_key",
            PATTERN_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch patterns", e))?;

        rows.iter().map(row_to_pattern).collect()
    }

    async fn upsert_insight(&self, insight: &Insight) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO insights (
                id, user_id, pattern_id, title, description, priority,
                is_active, created_at, expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (pattern_id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                priority = EXCLUDED.priority,
                is_active = EXCLUDED.is_active,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(insight.id.as_uuid())
        .bind(insight.user_id.as_str())
        .bind(insight.pattern_id.as_uuid())
        .bind(&insight.title)
        .bind(&insight.description)
        .bind(insight.priority.as_str())
        .bind(insight.is_active)
        .bind(insight.created_at.as_datetime())
        .bind(insight.expires_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("upsert insight", e))?;

        Ok(())
    }

    async fn list_active_insights(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Vec<Insight>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, pattern_id, title, description, priority,
                   is_active, created_at, expires_at
            FROM insights
            WHERE user_id = $1 AND is_active AND expires_at > $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_str())
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch insights", e))?;

        rows.iter()
            .map(|row| {
                Ok(Insight {
                    id: InsightId::from_uuid(column(row, "id")?),
                    user_id: user_id_column(row)?,
                    pattern_id: PatternId::from_uuid(column(row, "pattern_id")?),
                    title: column(row, "title")?,
                    description: column(row, "description")?,
                    priority: parsed(row, "priority")?,
                    is_active: column(row, "is_active")?,
                    created_at: timestamp(row, "created_at")?,
                    expires_at: timestamp(row, "expires_at")?,
                })
            })
            .collect()
    }
}

fn count_to_i32(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn count_from_row(row: &PgRow, name: &str) -> Result<u32, DomainError> {
    let value: i32 = column(row, name)?;
    Ok(u32::try_from(value).unwrap_or(0))
}

fn row_to_pattern(row: &PgRow) -> Result<PatternRecord, DomainError> {
    Ok(PatternRecord {
        id: PatternId::from_uuid(column(row, "id")?),
        user_id: user_id_column(row)?,
        pattern_type: parsed(row, "pattern_type")?,
        pattern_key: column(row, "pattern_key")?,
        total_occurrences: count_from_row(row, "total_occurrences")?,
        successful_completions: count_from_row(row, "successful_completions")?,
        failed_completions: count_from_row(row, "failed_completions")?,
        average_xp_awarded: column(row, "average_xp_awarded")?,
        average_feedback_sentiment: column(row, "average_feedback_sentiment")?,
        confidence: column(row, "confidence")?,
        strength: parsed(row, "strength")?,
        recommendation: column(row, "recommendation")?,
        is_active: column(row, "is_active")?,
        first_observed_at: timestamp(row, "first_observed_at")?,
        last_observed_at: timestamp(row, "last_observed_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_saturate_instead_of_wrapping() {
        assert_eq!(count_to_i32(7), 7);
        assert_eq!(count_to_i32(u32::MAX), i32::MAX);
    }
}
