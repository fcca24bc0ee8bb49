//! Family - Relationship tracking and overdue-interaction detection.

mod member;

pub use member::{
    prioritize_overdue, FamilyMember, FamilyMemberStatus, InteractionFrequency,
};
