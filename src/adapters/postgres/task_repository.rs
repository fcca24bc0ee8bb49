//! PostgreSQL implementation of TaskRepository.
//!
//! The generated pair and its run marker are written in one transaction.
//! A partial unique index on `task_generation_runs` rejects a second
//! non-forced run for the same user and local date, which closes the race
//! between the pre-check and the insert.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::BTreeMap;

use super::rows::{column, is_unique_violation, parsed, timestamp, user_id_column};
use crate::domain::foundation::{DomainError, ErrorCode, TaskId, Timestamp, UserId};
use crate::domain::generation::GenerationRun;
use crate::domain::task::{Task, TaskCompletion, TaskSource};
use crate::ports::{TaskRepository, TaskWithCompletion};

/// PostgreSQL implementation of TaskRepository.
#[derive(Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn has_ai_task_between(
        &self,
        user_id: &UserId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<bool, DomainError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM tasks
                WHERE user_id = $1 AND source = $2
                  AND created_at >= $3 AND created_at < $4
            )
            "#,
        )
        .bind(user_id.as_str())
        .bind(TaskSource::Ai.as_str())
        .bind(start.as_datetime())
        .bind(end.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("check existing AI tasks", e))?;

        Ok(result.0)
    }

    async fn save_generated_pair(
        &self,
        run: &GenerationRun,
        adventure_task: &Task,
        family_task: &Task,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("begin transaction", e))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO task_generation_runs (user_id, local_date, forced, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(run.user_id.as_str())
        .bind(run.local_date)
        .bind(run.forced)
        .bind(run.created_at.as_datetime())
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if is_unique_violation(&e) {
                return Err(DomainError::new(
                    ErrorCode::AlreadyGenerated,
                    "Daily tasks have already been generated for today",
                )
                .with_detail("local_date", run.local_date.to_string()));
            }
            return Err(DomainError::database("record generation run", e));
        }

        insert_task(&mut tx, adventure_task).await?;
        insert_task(&mut tx, family_task).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("commit transaction", e))?;

        Ok(())
    }

    async fn list_since_with_completions(
        &self,
        user_id: &UserId,
        since: Timestamp,
    ) -> Result<Vec<TaskWithCompletion>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.user_id, t.title, t.description, t.source, t.source_id,
                   t.target_stats, t.estimated_xp, t.status, t.reasoning,
                   t.target_family_member, t.created_at,
                   c.task_id AS completion_task_id, c.feedback, c.actual_xp,
                   c.stat_awards, c.completed_at
            FROM tasks t
            LEFT JOIN task_completions c ON c.task_id = t.id
            WHERE t.user_id = $1 AND t.created_at >= $2
            ORDER BY t.created_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(since.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch task history", e))?;

        rows.iter()
            .map(|row| {
                Ok(TaskWithCompletion {
                    task: row_to_task(row)?,
                    completion: row_to_completion(row)?,
                })
            })
            .collect()
    }
}

async fn insert_task(tx: &mut Transaction<'_, Postgres>, task: &Task) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO tasks (
            id, user_id, title, description, source, source_id, target_stats,
            estimated_xp, status, reasoning, target_family_member, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(task.id.as_uuid())
    .bind(task.user_id.as_str())
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.source.as_str())
    .bind(&task.source_id)
    .bind(&task.target_stats)
    .bind(i32::try_from(task.estimated_xp).unwrap_or(i32::MAX))
    .bind(task.status.as_str())
    .bind(&task.reasoning)
    .bind(&task.target_family_member)
    .bind(task.created_at.as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(|e| DomainError::database("insert task", e))?;

    Ok(())
}

fn row_to_task(row: &PgRow) -> Result<Task, DomainError> {
    let estimated_xp: i32 = column(row, "estimated_xp")?;
    Ok(Task {
        id: TaskId::from_uuid(column(row, "id")?),
        user_id: user_id_column(row)?,
        title: column(row, "title")?,
        description: column(row, "description")?,
        source: parsed(row, "source")?,
        source_id: column(row, "source_id")?,
        target_stats: column(row, "target_stats")?,
        estimated_xp: u32::try_from(estimated_xp).unwrap_or(0),
        status: parsed(row, "status")?,
        reasoning: column(row, "reasoning")?,
        target_family_member: column(row, "target_family_member")?,
        created_at: timestamp(row, "created_at")?,
    })
}

fn row_to_completion(row: &PgRow) -> Result<Option<TaskCompletion>, DomainError> {
    let task_id: Option<uuid::Uuid> = column(row, "completion_task_id")?;
    let Some(task_id) = task_id else {
        return Ok(None);
    };

    let awards: String = column(row, "stat_awards")?;
    let stat_awards: BTreeMap<String, i64> = serde_json::from_str(&awards).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid stat_awards: {}", e),
        )
    })?;

    Ok(Some(TaskCompletion {
        task_id: TaskId::from_uuid(task_id),
        feedback: column(row, "feedback")?,
        actual_xp: column(row, "actual_xp")?,
        stat_awards,
        completed_at: timestamp(row, "completed_at")?,
    }))
}
