//! Leveling - XP to level conversion and progress tracking.

mod calculator;

pub use calculator::{
    LevelProgress, LevelStep, LevelUpResult, LevelingCalculator, MAX_LEVEL, MAX_THRESHOLD_LEVEL,
    XP_PER_LEVEL_STEP,
};
