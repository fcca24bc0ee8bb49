//! Family members and interaction cadence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{FamilyMemberId, UserId, ValidationError};

/// How often the user wants to connect with a family member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl InteractionFrequency {
    /// Days that may pass before the member counts as overdue.
    pub fn threshold_days(&self) -> i64 {
        match self {
            InteractionFrequency::Daily => 1,
            InteractionFrequency::Weekly => 7,
            InteractionFrequency::Monthly => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionFrequency::Daily => "daily",
            InteractionFrequency::Weekly => "weekly",
            InteractionFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for InteractionFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionFrequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(InteractionFrequency::Daily),
            "weekly" => Ok(InteractionFrequency::Weekly),
            "monthly" => Ok(InteractionFrequency::Monthly),
            other => Err(ValidationError::invalid_format(
                "interaction_frequency",
                format!("unknown frequency '{}'", other),
            )),
        }
    }
}

/// A family member the user wants to stay connected with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: FamilyMemberId,
    pub user_id: UserId,
    pub name: String,
    pub relationship: Option<String>,
    pub age: Option<u32>,
    pub interests: Vec<String>,
    pub interaction_frequency: InteractionFrequency,
    pub last_interaction_date: Option<NaiveDate>,
}

impl FamilyMember {
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        interaction_frequency: InteractionFrequency,
    ) -> Self {
        Self {
            id: FamilyMemberId::new(),
            user_id,
            name: name.into(),
            relationship: None,
            age: None,
            interests: Vec::new(),
            interaction_frequency,
            last_interaction_date: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_last_interaction(mut self, date: NaiveDate) -> Self {
        self.last_interaction_date = Some(date);
        self
    }

    /// Evaluates the interaction state as of `today`.
    ///
    /// A member never interacted with is always overdue.
    pub fn status_on(&self, today: NaiveDate) -> FamilyMemberStatus {
        let days_since = self
            .last_interaction_date
            .map(|last| (today - last).num_days());
        let threshold = self.interaction_frequency.threshold_days();
        let is_overdue = days_since.map_or(true, |days| days > threshold);
        let overdue_by_days = match days_since {
            Some(days) if is_overdue => Some(days - threshold),
            _ => None,
        };

        FamilyMemberStatus {
            member: self.clone(),
            days_since_last_interaction: days_since,
            is_overdue,
            overdue_by_days,
        }
    }
}

/// A family member plus the derived overdue flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMemberStatus {
    pub member: FamilyMember,
    pub days_since_last_interaction: Option<i64>,
    pub is_overdue: bool,
    /// Days beyond the frequency threshold; `None` when not overdue or never seen.
    pub overdue_by_days: Option<i64>,
}

impl FamilyMemberStatus {
    /// Sort key: never-interacted members rank above everyone else.
    fn urgency(&self) -> i64 {
        match (self.is_overdue, self.days_since_last_interaction) {
            (true, None) => i64::MAX,
            (true, Some(_)) => self.overdue_by_days.unwrap_or(0),
            (false, _) => i64::MIN,
        }
    }
}

/// Returns only overdue members, most overdue first.
///
/// Ties keep their input order.
pub fn prioritize_overdue(statuses: &[FamilyMemberStatus]) -> Vec<FamilyMemberStatus> {
    let mut overdue: Vec<FamilyMemberStatus> =
        statuses.iter().filter(|s| s.is_overdue).cloned().collect();
    overdue.sort_by_key(|s| Reverse(s.urgency()));
    overdue
}
