//! The active player character.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CharacterId, Timestamp, UserId};

/// A user's character. Exactly one is active per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub user_id: UserId,
    pub name: String,
    /// Class label chosen at onboarding (e.g. "Ranger").
    pub class: String,
    pub backstory: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl Character {
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        class: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            id: CharacterId::new(),
            user_id,
            name: name.into(),
            class: class.into(),
            backstory: backstory.into(),
            is_active: true,
            created_at: Timestamp::now(),
        }
    }
}
