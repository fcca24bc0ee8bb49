//! Normalized current-conditions snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

use super::WeatherError;

/// A US postal code: five digits, optionally followed by `-` and four digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZipCode(String);

impl ZipCode {
    pub fn parse(raw: &str) -> Result<Self, WeatherError> {
        let trimmed = raw.trim();
        let (base, plus_four) = match trimmed.split_once('-') {
            Some((base, ext)) => (base, Some(ext)),
            None => (trimmed, None),
        };

        let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(base, 5) || plus_four.is_some_and(|ext| !all_digits(ext, 4)) {
            return Err(WeatherError::Validation(format!(
                "'{}' is not a valid US zip code",
                raw
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The five-digit prefix, which is what lookup APIs accept.
    pub fn base(&self) -> &str {
        &self.0[..5]
    }
}

impl TryFrom<String> for ZipCode {
    type Error = WeatherError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ZipCode> for String {
    fn from(zip: ZipCode) -> Self {
        zip.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current conditions, normalized to imperial units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub location: String,
    pub temperature_f: f64,
    pub feels_like_f: f64,
    /// Short condition group, e.g. "Clear", "Rain".
    pub condition: String,
    pub description: String,
    pub wind_speed_mph: f64,
    /// Relative humidity, 0-100.
    pub humidity: u8,
    pub observed_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_five_digit_and_plus_four() {
        assert_eq!(ZipCode::parse("94110").unwrap().base(), "94110");
        assert_eq!(ZipCode::parse(" 10001-1234 ").unwrap().base(), "10001");
    }

    #[test]
    fn rejects_malformed_zip() {
        for bad in ["", "1234", "123456", "abcde", "12345-12", "12345-abcd"] {
            assert!(
                matches!(ZipCode::parse(bad), Err(WeatherError::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }
}
