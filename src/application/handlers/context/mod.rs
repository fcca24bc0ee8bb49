//! Context handlers.
//!
//! Assemble the per-user context consumed by task generation.

mod gather_user_context;

pub use gather_user_context::{ContextAggregator, DAILY_TASK_HISTORY_DAYS};
