//! Task records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{TaskId, Timestamp, UserId, ValidationError};

/// Where a task came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskSource {
    Ai,
    Quest,
    Experiment,
    AdHoc,
    Journal,
}

impl TaskSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskSource::Ai => "ai",
            TaskSource::Quest => "quest",
            TaskSource::Experiment => "experiment",
            TaskSource::AdHoc => "ad-hoc",
            TaskSource::Journal => "journal",
        }
    }
}

impl fmt::Display for TaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskSource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai" => Ok(TaskSource::Ai),
            "quest" => Ok(TaskSource::Quest),
            "experiment" => Ok(TaskSource::Experiment),
            "ad-hoc" => Ok(TaskSource::AdHoc),
            "journal" => Ok(TaskSource::Journal),
            other => Err(ValidationError::invalid_format(
                "source",
                format!("unknown task source '{}'", other),
            )),
        }
    }
}

/// Completion state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown task status '{}'", other),
            )),
        }
    }
}

/// A unit of work that earns XP for its target stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub source: TaskSource,
    pub source_id: Option<String>,
    pub target_stats: Vec<String>,
    pub estimated_xp: u32,
    pub status: TaskStatus,
    /// Why the generator proposed this task.
    pub reasoning: Option<String>,
    pub target_family_member: Option<String>,
    pub created_at: Timestamp,
}

impl Task {
    /// Creates a pending AI-generated task stamped with `created_at`.
    pub fn new_ai(
        user_id: UserId,
        title: impl Into<String>,
        description: impl Into<String>,
        target_stats: Vec<String>,
        estimated_xp: u32,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: TaskId::new(),
            user_id,
            title: title.into(),
            description: description.into(),
            source: TaskSource::Ai,
            source_id: None,
            target_stats,
            estimated_xp,
            status: TaskStatus::Pending,
            reasoning: None,
            target_family_member: None,
            created_at,
        }
    }

    pub fn with_reasoning(mut self, reasoning: Option<String>) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn with_target_family_member(mut self, member: Option<String>) -> Self {
        self.target_family_member = member;
        self
    }

    pub fn is_ai_generated(&self) -> bool {
        self.source == TaskSource::Ai
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}
