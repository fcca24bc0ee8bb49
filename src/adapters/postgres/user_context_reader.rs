//! PostgreSQL implementation of UserContextReader.
//!
//! Every query is scoped to a single user. Stat rows are returned as
//! stored; validation happens in the context aggregator.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::rows::{column, parsed, timestamp, user_id_column};
use crate::domain::character::{Character, CharacterStat, User};
use crate::domain::family::FamilyMember;
use crate::domain::foundation::{
    CharacterId, DailyFocusId, DomainError, FamilyMemberId, GoalId, ProjectId, StatId, UserId,
};
use crate::domain::planning::{DailyFocus, Goal, Project};
use crate::ports::UserContextReader;

/// PostgreSQL implementation of UserContextReader.
#[derive(Clone)]
pub struct PostgresUserContextReader {
    pool: PgPool,
}

impl PostgresUserContextReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserContextReader for PostgresUserContextReader {
    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT id, display_name, zip_code, timezone FROM users WHERE id = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch user", e))?;

        row.map(|row| {
            Ok(User {
                id: user_id.clone(),
                display_name: column(&row, "display_name")?,
                zip_code: column(&row, "zip_code")?,
                timezone: column(&row, "timezone")?,
            })
        })
        .transpose()
    }

    async fn find_active_character(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Character>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, name, class, backstory, is_active, created_at
            FROM characters
            WHERE user_id = $1 AND is_active
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch active character", e))?;

        row.as_ref().map(row_to_character).transpose()
    }

    async fn list_stats(
        &self,
        character_id: &CharacterId,
    ) -> Result<Vec<CharacterStat>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, character_id, category, current_xp, current_level, total_xp
            FROM character_stats
            WHERE character_id = $1
            ORDER BY category
            "#,
        )
        .bind(character_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch character stats", e))?;

        rows.iter().map(row_to_stat).collect()
    }

    async fn list_family_members(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FamilyMember>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, name, relationship, age, interests,
                   interaction_frequency, last_interaction_date
            FROM family_members
            WHERE user_id = $1
            ORDER BY name
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch family members", e))?;

        rows.iter().map(row_to_family_member).collect()
    }

    async fn list_active_goals(&self, user_id: &UserId) -> Result<Vec<Goal>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, description, priority, status, related_stats, created_at
            FROM goals
            WHERE user_id = $1 AND status = 'active'
            ORDER BY created_at
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch goals", e))?;

        rows.iter()
            .map(|row| {
                Ok(Goal {
                    id: GoalId::from_uuid(column(row, "id")?),
                    user_id: user_id_column(row)?,
                    title: column(row, "title")?,
                    description: column(row, "description")?,
                    priority: parsed(row, "priority")?,
                    status: parsed(row, "status")?,
                    related_stats: column(row, "related_stats")?,
                    created_at: timestamp(row, "created_at")?,
                })
            })
            .collect()
    }

    async fn list_active_projects(&self, user_id: &UserId) -> Result<Vec<Project>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, description, priority, status, related_stats, created_at
            FROM projects
            WHERE user_id = $1 AND status = 'active'
            ORDER BY created_at
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch projects", e))?;

        rows.iter()
            .map(|row| {
                Ok(Project {
                    id: ProjectId::from_uuid(column(row, "id")?),
                    user_id: user_id_column(row)?,
                    title: column(row, "title")?,
                    description: column(row, "description")?,
                    priority: parsed(row, "priority")?,
                    status: parsed(row, "status")?,
                    related_stats: column(row, "related_stats")?,
                    created_at: timestamp(row, "created_at")?,
                })
            })
            .collect()
    }

    async fn find_daily_focus(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<DailyFocus>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, focus_date, focus, description, is_active
            FROM daily_focuses
            WHERE user_id = $1 AND focus_date = $2 AND is_active
            LIMIT 1
            "#,
        )
        .bind(user_id.as_str())
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch daily focus", e))?;

        row.map(|row| {
            Ok(DailyFocus {
                id: DailyFocusId::from_uuid(column(&row, "id")?),
                user_id: user_id_column(&row)?,
                focus_date: column(&row, "focus_date")?,
                focus: column(&row, "focus")?,
                description: column(&row, "description")?,
                is_active: column(&row, "is_active")?,
            })
        })
        .transpose()
    }

    async fn list_eligible_user_ids(&self) -> Result<Vec<UserId>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT u.id AS user_id
            FROM users u
            JOIN characters c ON c.user_id = u.id AND c.is_active
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("list eligible users", e))?;

        rows.iter().map(user_id_column).collect()
    }
}

fn row_to_character(row: &PgRow) -> Result<Character, DomainError> {
    Ok(Character {
        id: CharacterId::from_uuid(column(row, "id")?),
        user_id: user_id_column(row)?,
        name: column(row, "name")?,
        class: column(row, "class")?,
        backstory: column(row, "backstory")?,
        is_active: column(row, "is_active")?,
        created_at: timestamp(row, "created_at")?,
    })
}

fn row_to_stat(row: &PgRow) -> Result<CharacterStat, DomainError> {
    Ok(CharacterStat {
        id: StatId::from_uuid(column(row, "id")?),
        character_id: CharacterId::from_uuid(column(row, "character_id")?),
        category: column(row, "category")?,
        current_xp: column(row, "current_xp")?,
        current_level: column(row, "current_level")?,
        total_xp: column(row, "total_xp")?,
    })
}

fn row_to_family_member(row: &PgRow) -> Result<FamilyMember, DomainError> {
    let age: Option<i32> = column(row, "age")?;
    Ok(FamilyMember {
        id: FamilyMemberId::from_uuid(column(row, "id")?),
        user_id: user_id_column(row)?,
        name: column(row, "name")?,
        relationship: column(row, "relationship")?,
        age: age.and_then(|a| u32::try_from(a).ok()),
        interests: column(row, "interests")?,
        interaction_frequency: parsed(row, "interaction_frequency")?,
        last_interaction_date: column(row, "last_interaction_date")?,
    })
}
