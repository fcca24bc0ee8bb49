//! Character stats - skill categories that accumulate XP.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CharacterId, StatId, ValidationError};
use crate::domain::leveling::{LevelProgress, LevelingCalculator, MAX_LEVEL};

/// Name of the stat every family task must train.
pub const FAMILY_BONDING_STAT: &str = "Family Bonding";

/// A named skill on a character.
///
/// `current_level` is always `level_from_total_xp(total_xp)`; the engine only
/// reads stats, XP awards happen elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStat {
    pub id: StatId,
    pub character_id: CharacterId,
    pub category: String,
    pub current_xp: i64,
    pub current_level: i32,
    pub total_xp: i64,
}

impl CharacterStat {
    /// Builds a stat whose level is derived from its cumulative XP.
    pub fn from_total_xp(
        character_id: CharacterId,
        category: impl Into<String>,
        total_xp: i64,
    ) -> Result<Self, ValidationError> {
        let current_level = LevelingCalculator::level_from_total_xp(total_xp)?;
        Ok(Self {
            id: StatId::new(),
            character_id,
            category: category.into(),
            current_xp: total_xp,
            current_level,
            total_xp,
        })
    }

    /// Checks the row is usable: named, non-negative XP, and a level in
    /// `1..=MAX_LEVEL` that matches its cumulative XP.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.category.trim().is_empty() {
            return Err(ValidationError::empty_field("category"));
        }
        if self.total_xp < 0 {
            return Err(ValidationError::out_of_range("total_xp", 0, i64::MAX, self.total_xp));
        }
        if !(1..=MAX_LEVEL).contains(&self.current_level) {
            return Err(ValidationError::out_of_range(
                "current_level",
                1,
                i64::from(MAX_LEVEL),
                i64::from(self.current_level),
            ));
        }
        let expected = LevelingCalculator::level_from_total_xp(self.total_xp)?;
        if self.current_level != expected {
            return Err(ValidationError::invalid_format(
                "current_level",
                format!(
                    "level {} does not match {} total XP (expected {})",
                    self.current_level, self.total_xp, expected
                ),
            ));
        }
        Ok(())
    }

    /// Progress through the current level.
    pub fn progress(&self) -> Result<LevelProgress, ValidationError> {
        LevelingCalculator::progress(self.total_xp, self.current_level)
    }

    pub fn is_family_bonding(&self) -> bool {
        self.category.eq_ignore_ascii_case(FAMILY_BONDING_STAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_total_xp_derives_level() {
        let stat = CharacterStat::from_total_xp(CharacterId::new(), "Strength", 650).unwrap();
        assert_eq!(stat.current_level, 3);
        assert!(stat.validate().is_ok());
    }

    #[test]
    fn validate_rejects_malformed_rows() {
        let mut stat = CharacterStat::from_total_xp(CharacterId::new(), "Wisdom", 0).unwrap();
        stat.current_level = 0;
        assert!(stat.validate().is_err());

        stat.current_level = 1;
        stat.category = " ".to_string();
        assert!(stat.validate().is_err());
    }

    #[test]
    fn validate_rejects_level_above_cap() {
        let mut stat =
            CharacterStat::from_total_xp(CharacterId::new(), "Wisdom", 10_000_000).unwrap();
        assert!(stat.validate().is_ok());

        stat.current_level = MAX_LEVEL + 1;
        assert!(matches!(
            stat.validate(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn validate_rejects_level_inconsistent_with_xp() {
        let mut stat = CharacterStat::from_total_xp(CharacterId::new(), "Wisdom", 650).unwrap();
        stat.current_level = 5;
        assert!(matches!(
            stat.validate(),
            Err(ValidationError::InvalidFormat { .. })
        ));

        stat.current_level = 3;
        assert!(stat.validate().is_ok());
    }

    #[test]
    fn family_bonding_is_matched_case_insensitively() {
        let stat = CharacterStat::from_total_xp(CharacterId::new(), "family bonding", 0).unwrap();
        assert!(stat.is_family_bonding());
    }
}
