//! Leveling Calculator - XP and level arithmetic.
//!
//! Levels follow a triangular curve: reaching level `n` requires a
//! cumulative `100 * n * (n + 1) / 2` XP, so each level costs 100 XP more
//! than the previous one. Every player starts at level 1 and the curve is
//! capped at [`MAX_LEVEL`].

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Percentage, ValidationError};

/// Highest reachable level.
pub const MAX_LEVEL: i32 = 20;

/// XP multiplier of the triangular curve.
pub const XP_PER_LEVEL_STEP: i64 = 100;

/// Largest level whose cumulative threshold fits in an `i64`.
pub const MAX_THRESHOLD_LEVEL: i32 = 429_496_729;

/// Progress through the current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    /// XP earned since the current level was reached.
    pub current_level_xp: i64,
    /// XP span between the current level and the next.
    pub xp_in_current_level: i64,
    /// `current_level_xp / xp_in_current_level`, rounded.
    pub progress_percent: Percentage,
}

/// One level gained during level-up resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStep {
    pub level: i32,
    pub xp_required: i64,
    pub xp_gained: i64,
}

/// Outcome of resolving pending level-ups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUpResult {
    pub new_level: i32,
    pub levels_gained: i32,
    pub level_progression: Vec<LevelStep>,
}

impl LevelUpResult {
    /// True if at least one level was gained.
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Pure XP/level conversions.
pub struct LevelingCalculator;

impl LevelingCalculator {
    /// Cumulative XP needed to reach `level`.
    ///
    /// Defined past [`MAX_LEVEL`] as long as the result fits in an `i64`.
    ///
    /// # Errors
    /// `OutOfRange` for negative levels and levels whose threshold overflows.
    pub fn total_xp_for_level(level: i32) -> Result<i64, ValidationError> {
        if level < 0 {
            return Err(ValidationError::out_of_range(
                "level",
                0,
                i64::from(i32::MAX),
                i64::from(level),
            ));
        }
        Self::checked_threshold(level).ok_or_else(|| {
            ValidationError::out_of_range("level", 0, i64::from(MAX_THRESHOLD_LEVEL), i64::from(level))
        })
    }

    /// Largest level whose threshold does not exceed `total_xp`.
    ///
    /// Zero XP is level 1; the result never exceeds [`MAX_LEVEL`].
    pub fn level_from_total_xp(total_xp: i64) -> Result<i32, ValidationError> {
        if total_xp < 0 {
            return Err(ValidationError::out_of_range("total_xp", 0, i64::MAX, total_xp));
        }

        let mut level = 1;
        while level < MAX_LEVEL && Self::threshold(level + 1) <= total_xp {
            level += 1;
        }
        Ok(level)
    }

    /// XP still missing before `current_level + 1` is reached.
    pub fn xp_to_next_level(current_xp: i64, current_level: i32) -> Result<i64, ValidationError> {
        if current_xp < 0 {
            return Err(ValidationError::out_of_range("current_xp", 0, i64::MAX, current_xp));
        }
        Self::check_level(current_level)?;
        Ok(Self::threshold(current_level + 1) - current_xp)
    }

    /// Progress through `current_level` given cumulative XP.
    ///
    /// Level 1 starts at zero XP; every later level starts at its threshold.
    pub fn progress(total_xp: i64, current_level: i32) -> Result<LevelProgress, ValidationError> {
        if total_xp < 0 {
            return Err(ValidationError::out_of_range("total_xp", 0, i64::MAX, total_xp));
        }
        Self::check_level(current_level)?;

        let floor = Self::level_floor(current_level);
        let ceiling = Self::threshold(current_level + 1);
        let current_level_xp = (total_xp - floor).max(0);
        let xp_in_current_level = ceiling - floor;

        Ok(LevelProgress {
            current_level_xp,
            xp_in_current_level,
            progress_percent: Percentage::from_ratio(current_level_xp, xp_in_current_level),
        })
    }

    /// Advances `current_level` as far as `total_xp` allows, up to [`MAX_LEVEL`].
    pub fn resolve_level_ups(
        total_xp: i64,
        current_level: i32,
    ) -> Result<LevelUpResult, ValidationError> {
        if total_xp < 0 {
            return Err(ValidationError::out_of_range("total_xp", 0, i64::MAX, total_xp));
        }
        Self::check_level(current_level)?;

        let mut level = current_level;
        let mut progression = Vec::new();
        while level < MAX_LEVEL && total_xp >= Self::threshold(level + 1) {
            level += 1;
            progression.push(LevelStep {
                level,
                xp_required: Self::threshold(level),
                xp_gained: total_xp,
            });
        }

        Ok(LevelUpResult {
            new_level: level,
            levels_gained: level - current_level,
            level_progression: progression,
        })
    }

    /// Rejects levels outside `1..=MAX_LEVEL`.
    fn check_level(current_level: i32) -> Result<(), ValidationError> {
        if !(1..=MAX_LEVEL).contains(&current_level) {
            return Err(ValidationError::out_of_range(
                "current_level",
                1,
                i64::from(MAX_LEVEL),
                i64::from(current_level),
            ));
        }
        Ok(())
    }

    fn checked_threshold(level: i32) -> Option<i64> {
        if level <= 0 {
            return Some(0);
        }
        // n * (n + 1) is even, so halving first keeps the result exact.
        let n = i64::from(level);
        n.checked_mul(n + 1)
            .map(|product| product / 2)
            .and_then(|triangle| triangle.checked_mul(XP_PER_LEVEL_STEP))
    }

    /// Threshold for levels up to `MAX_LEVEL + 1`, which never overflow.
    fn threshold(level: i32) -> i64 {
        Self::checked_threshold(level).unwrap_or(i64::MAX)
    }

    fn level_floor(level: i32) -> i64 {
        if level <= 1 {
            0
        } else {
            Self::threshold(level)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn total_xp_for_level_follows_triangular_curve() {
        assert_eq!(LevelingCalculator::total_xp_for_level(0).unwrap(), 0);
        assert_eq!(LevelingCalculator::total_xp_for_level(1).unwrap(), 100);
        assert_eq!(LevelingCalculator::total_xp_for_level(2).unwrap(), 300);
        assert_eq!(LevelingCalculator::total_xp_for_level(3).unwrap(), 600);
        assert_eq!(LevelingCalculator::total_xp_for_level(10).unwrap(), 5500);
    }

    #[test]
    fn total_xp_for_level_rejects_negative_level() {
        assert!(matches!(
            LevelingCalculator::total_xp_for_level(-1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn level_from_total_xp_starts_at_one() {
        assert_eq!(LevelingCalculator::level_from_total_xp(0).unwrap(), 1);
        assert_eq!(LevelingCalculator::level_from_total_xp(299).unwrap(), 1);
    }

    #[test]
    fn level_from_total_xp_counts_exact_boundary_as_reached() {
        assert_eq!(LevelingCalculator::level_from_total_xp(300).unwrap(), 2);
        assert_eq!(LevelingCalculator::level_from_total_xp(599).unwrap(), 2);
        assert_eq!(LevelingCalculator::level_from_total_xp(600).unwrap(), 3);
    }

    #[test]
    fn level_from_total_xp_is_capped() {
        assert_eq!(
            LevelingCalculator::level_from_total_xp(10_000_000).unwrap(),
            MAX_LEVEL
        );
    }

    #[test]
    fn level_from_total_xp_rejects_negative_xp() {
        assert!(LevelingCalculator::level_from_total_xp(-5).is_err());
    }

    #[test]
    fn xp_to_next_level_subtracts_from_next_threshold() {
        assert_eq!(LevelingCalculator::xp_to_next_level(400, 2).unwrap(), 200);
        assert_eq!(LevelingCalculator::xp_to_next_level(0, 1).unwrap(), 300);
    }

    #[test]
    fn xp_to_next_level_validates_arguments() {
        assert!(LevelingCalculator::xp_to_next_level(-1, 2).is_err());
        assert!(LevelingCalculator::xp_to_next_level(10, 0).is_err());
    }

    #[test]
    fn total_xp_for_level_rejects_overflowing_levels() {
        assert_eq!(
            LevelingCalculator::total_xp_for_level(MAX_THRESHOLD_LEVEL).unwrap(),
            9_223_372_032_559_808_500
        );
        assert!(matches!(
            LevelingCalculator::total_xp_for_level(MAX_THRESHOLD_LEVEL + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(LevelingCalculator::total_xp_for_level(i32::MAX).is_err());
    }

    #[test]
    fn levels_above_the_cap_are_rejected() {
        assert!(LevelingCalculator::xp_to_next_level(0, i32::MAX).is_err());
        assert!(LevelingCalculator::xp_to_next_level(0, MAX_LEVEL + 1).is_err());
        assert!(LevelingCalculator::progress(0, i32::MAX).is_err());
        assert!(LevelingCalculator::resolve_level_ups(0, i32::MAX).is_err());

        assert_eq!(
            LevelingCalculator::xp_to_next_level(0, MAX_LEVEL).unwrap(),
            LevelingCalculator::total_xp_for_level(MAX_LEVEL + 1).unwrap()
        );
        assert!(LevelingCalculator::progress(i64::MAX, MAX_LEVEL).is_ok());
    }

    #[test]
    fn progress_within_level_two() {
        let progress = LevelingCalculator::progress(400, 2).unwrap();
        assert_eq!(progress.current_level_xp, 100);
        assert_eq!(progress.xp_in_current_level, 300);
        assert_eq!(progress.progress_percent.value(), 33);
    }

    #[test]
    fn progress_within_level_one_starts_from_zero() {
        let progress = LevelingCalculator::progress(150, 1).unwrap();
        assert_eq!(progress.current_level_xp, 150);
        assert_eq!(progress.xp_in_current_level, 300);
        assert_eq!(progress.progress_percent.value(), 50);
    }

    #[test]
    fn resolve_level_ups_handles_multiple_levels() {
        let result = LevelingCalculator::resolve_level_ups(700, 1).unwrap();

        assert_eq!(result.new_level, 3);
        assert_eq!(result.levels_gained, 2);
        assert_eq!(
            result.level_progression,
            vec![
                LevelStep { level: 2, xp_required: 300, xp_gained: 700 },
                LevelStep { level: 3, xp_required: 600, xp_gained: 700 },
            ]
        );
    }

    #[test]
    fn resolve_level_ups_without_enough_xp() {
        let result = LevelingCalculator::resolve_level_ups(299, 1).unwrap();
        assert_eq!(result.new_level, 1);
        assert!(!result.leveled_up());
        assert!(result.level_progression.is_empty());
    }

    #[test]
    fn resolve_level_ups_stops_at_cap() {
        let result = LevelingCalculator::resolve_level_ups(i64::from(u32::MAX), 19).unwrap();
        assert_eq!(result.new_level, MAX_LEVEL);
        assert_eq!(result.levels_gained, 1);
    }

    proptest! {
        #[test]
        fn each_level_costs_one_hundred_more(n in 1i32..10_000) {
            let delta = LevelingCalculator::total_xp_for_level(n).unwrap()
                - LevelingCalculator::total_xp_for_level(n - 1).unwrap();
            prop_assert_eq!(delta, i64::from(n) * 100);
        }

        #[test]
        fn level_threshold_maps_back_to_level(k in 1i32..=MAX_LEVEL) {
            let xp = LevelingCalculator::total_xp_for_level(k).unwrap();
            prop_assert_eq!(LevelingCalculator::level_from_total_xp(xp).unwrap(), k);
        }

        #[test]
        fn resolved_level_matches_level_from_xp(xp in 0i64..300_000) {
            let resolved = LevelingCalculator::resolve_level_ups(xp, 1).unwrap();
            prop_assert_eq!(resolved.new_level, LevelingCalculator::level_from_total_xp(xp).unwrap());
        }
    }
}
