//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Creates a new timestamp by subtracting the specified number of days.
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    /// Creates a new timestamp by adding the specified number of days.
    pub fn plus_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0 + Duration::seconds(secs as i64))
    }

    /// Returns the calendar date of this instant as observed in `tz`.
    pub fn local_date(&self, tz: Tz) -> NaiveDate {
        self.0.with_timezone(&tz).date_naive()
    }

    /// Returns the first instant of `date` in `tz`.
    ///
    /// When local midnight does not exist (DST gap) the earliest valid
    /// instant after it is used.
    pub fn start_of_day(date: NaiveDate, tz: Tz) -> Self {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        let local = match tz.from_local_datetime(&midnight) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => {
                let shifted = midnight + Duration::hours(1);
                match tz.from_local_datetime(&shifted) {
                    LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
                    LocalResult::None => return Self(midnight.and_utc()),
                }
            }
        };
        Self(local.with_timezone(&Utc))
    }

    /// Returns the half-open `[start, end)` window covering `date` in `tz`.
    pub fn day_bounds(date: NaiveDate, tz: Tz) -> (Self, Self) {
        let start = Self::start_of_day(date, tz);
        let end = date
            .succ_opt()
            .map(|next| Self::start_of_day(next, tz))
            .unwrap_or_else(|| start.plus_days(1));
        (start, end)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}
