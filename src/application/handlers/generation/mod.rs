//! Generation handlers.
//!
//! - `GenerateDailyTasksHandler` - One user's adventure and family tasks
//! - `BatchRunner` - All eligible users, with per-user outcome tracking
//! - `UserLocks` - Serializes generation per user within the process

mod batch_runner;
mod generate_daily_tasks;
mod user_locks;

pub use batch_runner::BatchRunner;
pub use generate_daily_tasks::{GenerateDailyTasksCommand, GenerateDailyTasksHandler};
pub use user_locks::UserLocks;
