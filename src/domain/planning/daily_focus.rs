//! Daily focus - an optional theme the user picks for one calendar day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DailyFocusId, UserId};

/// At most one active record exists per user per date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFocus {
    pub id: DailyFocusId,
    pub user_id: UserId,
    pub focus_date: NaiveDate,
    pub focus: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl DailyFocus {
    pub fn new(user_id: UserId, focus_date: NaiveDate, focus: impl Into<String>) -> Self {
        Self {
            id: DailyFocusId::new(),
            user_id,
            focus_date,
            focus: focus.into(),
            description: None,
            is_active: true,
        }
    }

    /// True when this record applies to `date`.
    pub fn applies_to(&self, date: NaiveDate) -> bool {
        self.is_active && self.focus_date == date
    }
}
