//! Goals and projects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{GoalId, ProjectId, Timestamp, UserId, ValidationError};

/// Relative importance of a goal or project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ValidationError::invalid_format(
                "priority",
                format!("unknown priority '{}'", other),
            )),
        }
    }
}

/// Lifecycle status shared by goals and projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Active,
    Paused,
    Completed,
    Abandoned,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "active",
            PlanStatus::Paused => "paused",
            PlanStatus::Completed => "completed",
            PlanStatus::Abandoned => "abandoned",
        }
    }
}

impl FromStr for PlanStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(PlanStatus::Active),
            "paused" => Ok(PlanStatus::Paused),
            "completed" => Ok(PlanStatus::Completed),
            "abandoned" => Ok(PlanStatus::Abandoned),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

/// A long-running personal goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: PlanStatus,
    /// Stat categories this goal trains.
    pub related_stats: Vec<String>,
    pub created_at: Timestamp,
}

impl Goal {
    pub fn new(user_id: UserId, title: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: GoalId::new(),
            user_id,
            title: title.into(),
            description: None,
            priority,
            status: PlanStatus::Active,
            related_stats: Vec::new(),
            created_at: Timestamp::now(),
        }
    }

    pub fn with_related_stats<I, S>(mut self, stats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_stats = stats.into_iter().map(Into::into).collect();
        self
    }
}

/// A concrete project with a bounded scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: PlanStatus,
    pub related_stats: Vec<String>,
    pub created_at: Timestamp,
}

impl Project {
    pub fn new(user_id: UserId, title: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: ProjectId::new(),
            user_id,
            title: title.into(),
            description: None,
            priority,
            status: PlanStatus::Active,
            related_stats: Vec::new(),
            created_at: Timestamp::now(),
        }
    }
}
