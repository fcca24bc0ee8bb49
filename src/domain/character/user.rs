//! User profile fields the generation engine reads.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: Option<String>,
    /// Postal code used for weather lookups.
    pub zip_code: Option<String>,
    /// IANA timezone name, e.g. `America/Chicago`.
    pub timezone: Option<String>,
}

impl User {
    /// Creates a user with no optional profile data.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            display_name: None,
            zip_code: None,
            timezone: None,
        }
    }

    pub fn with_zip_code(mut self, zip: impl Into<String>) -> Self {
        self.zip_code = Some(zip.into());
        self
    }

    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = Some(tz.into());
        self
    }

    /// Resolves the user's timezone, falling back to `default` when unset or unknown.
    pub fn timezone_or(&self, default: Tz) -> Tz {
        self.timezone
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(default)
    }
}
