//! Generation - Context views, prompt, and completion handling for daily tasks.
//!
//! # Module Organization
//!
//! - `context` - Typed and flattened user context
//! - `prompt` - Two-task prompt construction
//! - `response` - Completion parsing, validation and repair
//! - `outcome` - Generation results, batch summary and scheduling info
//! - `errors` - Typed generation errors

mod context;
mod errors;
mod outcome;
mod prompt;
mod response;

pub use context::{
    AiContext, AiFamilyMember, AiGoal, AiStat, AiTaskHistory, ContextOptions, GatheredContext,
    StatSnapshot, TaskHistoryEntry, UserContext,
};
pub use errors::{GenerationError, CONTEXT_FAILURE_MESSAGE};
pub use outcome::{BatchError, BatchSummary, GeneratedTasks, GenerationRun, SchedulingInfo};
pub use prompt::{build_prompt, GenerationPrompt};
pub use response::{
    GeneratedTaskPair, RepairHints, TaskDraft, DEFAULT_ESTIMATED_XP, FALLBACK_ADVENTURE_STAT,
    MAX_ESTIMATED_XP, MIN_ESTIMATED_XP,
};

#[cfg(test)]
pub(crate) mod test_fixtures {
    use chrono::NaiveDate;

    use super::{StatSnapshot, TaskHistoryEntry, UserContext};
    use crate::domain::character::{Character, CharacterStat, User};
    use crate::domain::family::{FamilyMember, InteractionFrequency};
    use crate::domain::foundation::{TaskId, UserId};
    use crate::domain::patterns::{LearnedContext, Sentiment};
    use crate::domain::planning::{DailyFocus, Goal, Priority};

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    /// A ranger with two stats, three family members and a short history.
    pub fn context() -> UserContext {
        let user_id = UserId::new("user-1").unwrap();
        let character = Character::new(user_id.clone(), "Aria", "Ranger", "Wanders the hills.");
        let stats = [("Physical Health", 400), ("Family Bonding", 120)]
            .into_iter()
            .map(|(name, xp)| {
                let stat = CharacterStat::from_total_xp(character.id, name, xp).unwrap();
                StatSnapshot::new(&stat, stat.progress().unwrap())
            })
            .collect();
        let family = vec![
            FamilyMember::new(user_id.clone(), "Mia", InteractionFrequency::Daily)
                .with_relationship("daughter")
                .with_last_interaction(today() - chrono::Duration::days(3)),
            FamilyMember::new(user_id.clone(), "Grandma", InteractionFrequency::Monthly),
            FamilyMember::new(user_id.clone(), "Sam", InteractionFrequency::Weekly)
                .with_last_interaction(today() - chrono::Duration::days(1)),
        ]
        .into_iter()
        .map(|m| m.status_on(today()))
        .collect();

        UserContext {
            user: User::new(user_id.clone()).with_zip_code("94110"),
            character,
            stats,
            family,
            goals: vec![Goal::new(user_id.clone(), "Run a 5k", Priority::High)
                .with_related_stats(["Physical Health"])],
            projects: Vec::new(),
            daily_focus: Some(DailyFocus::new(user_id, today(), "Move more")),
            task_history: vec![
                TaskHistoryEntry {
                    task_id: TaskId::new(),
                    title: "Stretch".to_string(),
                    completed: true,
                    feedback: Some("Loved it".to_string()),
                    xp_awarded: Some(20),
                    sentiment: Some(Sentiment::Positive),
                },
                TaskHistoryEntry {
                    task_id: TaskId::new(),
                    title: "Bake bread".to_string(),
                    completed: false,
                    feedback: None,
                    xp_awarded: None,
                    sentiment: None,
                },
            ],
            patterns: Vec::new(),
            insights: Vec::new(),
            learned: LearnedContext::default(),
            today: today(),
            timezone: chrono_tz::UTC,
        }
    }
}
