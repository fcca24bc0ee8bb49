//! Task completions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{TaskId, Timestamp};

/// Recorded when a task is completed. One per task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub task_id: TaskId,
    pub feedback: Option<String>,
    pub actual_xp: i64,
    /// XP awarded per stat category.
    pub stat_awards: BTreeMap<String, i64>,
    pub completed_at: Timestamp,
}

impl TaskCompletion {
    pub fn new(task_id: TaskId, actual_xp: i64, completed_at: Timestamp) -> Self {
        Self {
            task_id,
            feedback: None,
            actual_xp,
            stat_awards: BTreeMap::new(),
            completed_at,
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}
