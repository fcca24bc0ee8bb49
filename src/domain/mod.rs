//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `leveling` - Pure XP and level arithmetic
//! - `character` - Users, characters and their stats
//! - `family` - Family members and overdue-interaction rules
//! - `planning` - Goals, projects and the daily focus
//! - `task` - Tasks and completions
//! - `patterns` - Sentiment analysis and learned behavior patterns
//! - `weather` - Current conditions and outdoor-activity advice
//! - `generation` - Context views, prompts and completion handling for daily tasks

pub mod character;
pub mod family;
pub mod foundation;
pub mod generation;
pub mod leveling;
pub mod patterns;
pub mod planning;
pub mod task;
pub mod weather;
