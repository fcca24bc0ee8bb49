//! Percentage value object (0-100 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A whole-number value between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self(0);

    /// One hundred percent.
    pub const HUNDRED: Self = Self(100);

    /// Creates a new Percentage, clamping to valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Creates a Percentage from `part / whole`, rounded to the nearest integer.
    ///
    /// A non-positive `whole` yields 100% (nothing left to make progress on).
    /// Results outside 0-100 are clamped.
    pub fn from_ratio(part: i64, whole: i64) -> Self {
        if whole <= 0 {
            return Self::HUNDRED;
        }
        let pct = (part as f64 / whole as f64 * 100.0).round();
        Self(pct.clamp(0.0, 100.0) as u8)
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns the value as a fraction (0.0 to 1.0).
    pub fn as_fraction(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
