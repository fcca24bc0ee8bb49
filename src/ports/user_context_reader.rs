//! User context reader port (read side).
//!
//! Every read the context aggregator performs goes through this port.
//! Implementations return rows already scoped to the given user.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::character::{Character, CharacterStat, User};
use crate::domain::family::FamilyMember;
use crate::domain::foundation::{CharacterId, DomainError, UserId};
use crate::domain::planning::{DailyFocus, Goal, Project};

#[async_trait]
pub trait UserContextReader: Send + Sync {
    /// Returns `None` if the user does not exist.
    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, DomainError>;

    /// The user's single active character, if any.
    async fn find_active_character(&self, user_id: &UserId)
        -> Result<Option<Character>, DomainError>;

    /// All stats of a character.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on query failure or a malformed row
    async fn list_stats(&self, character_id: &CharacterId)
        -> Result<Vec<CharacterStat>, DomainError>;

    async fn list_family_members(&self, user_id: &UserId)
        -> Result<Vec<FamilyMember>, DomainError>;

    async fn list_active_goals(&self, user_id: &UserId) -> Result<Vec<Goal>, DomainError>;

    async fn list_active_projects(&self, user_id: &UserId) -> Result<Vec<Project>, DomainError>;

    /// The active daily focus for exactly `date`, if one was set.
    async fn find_daily_focus(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<DailyFocus>, DomainError>;

    /// Users with at least one active character, ordered by id.
    async fn list_eligible_user_ids(&self) -> Result<Vec<UserId>, DomainError>;
}
