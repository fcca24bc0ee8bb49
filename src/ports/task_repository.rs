//! Task repository port.
//!
//! Supports the once-per-day generation guard and the task history read.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::generation::GenerationRun;
use crate::domain::task::{Task, TaskCompletion};

/// A task joined with its completion, if it was completed.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskWithCompletion {
    pub task: Task,
    pub completion: Option<TaskCompletion>,
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// True if any `source = ai` task for the user was created in `[start, end)`.
    async fn has_ai_task_between(
        &self,
        user_id: &UserId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<bool, DomainError>;

    /// Atomically records a generation run and its two tasks.
    ///
    /// # Errors
    ///
    /// - `AlreadyGenerated` if a non-forced run already exists for the
    ///   user's local date
    /// - `DatabaseError` on persistence failure
    async fn save_generated_pair(
        &self,
        run: &GenerationRun,
        adventure_task: &Task,
        family_task: &Task,
    ) -> Result<(), DomainError>;

    /// Tasks created at or after `since`, oldest first, with completions.
    async fn list_since_with_completions(
        &self,
        user_id: &UserId,
        since: Timestamp,
    ) -> Result<Vec<TaskWithCompletion>, DomainError>;
}
