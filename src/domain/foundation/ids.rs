//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a UUID-backed identifier with the usual constructors and conversions.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a player character.
    CharacterId
);
uuid_id!(
    /// Unique identifier for a stat row on a character.
    StatId
);
uuid_id!(
    /// Unique identifier for a family member.
    FamilyMemberId
);
uuid_id!(
    /// Unique identifier for a goal.
    GoalId
);
uuid_id!(
    /// Unique identifier for a project.
    ProjectId
);
uuid_id!(
    /// Unique identifier for a daily focus record.
    DailyFocusId
);
uuid_id!(
    /// Unique identifier for a task.
    TaskId
);
uuid_id!(
    /// Unique identifier for a learned pattern record.
    PatternId
);
uuid_id!(
    /// Unique identifier for an insight.
    InsightId
);

/// User identifier (supplied by the identity layer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_ids_are_unique() {
        assert_ne!(TaskId::new(), TaskId::new());
    }

    #[test]
    fn uuid_ids_parse_from_string() {
        let id = CharacterId::new();
        let parsed: CharacterId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn uuid_ids_reject_garbage() {
        assert!("not-a-uuid".parse::<PatternId>().is_err());
    }

    #[test]
    fn user_id_rejects_blank() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
        assert_eq!(UserId::new("user-1").unwrap().as_str(), "user-1");
    }

    #[test]
    fn user_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&UserId::new("u-42").unwrap()).unwrap();
        assert_eq!(json, "\"u-42\"");
    }
}
