//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the LifeQuest domain.

mod errors;
mod ids;
mod percentage;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    CharacterId, DailyFocusId, FamilyMemberId, GoalId, InsightId, PatternId, ProjectId, StatId,
    TaskId, UserId,
};
pub use percentage::Percentage;
pub use timestamp::Timestamp;
