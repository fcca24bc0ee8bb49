//! ContextAggregator - Query handler assembling everything generation needs.
//!
//! Loads the user, the active character and its stats, family interaction
//! state, active plans, today's focus, and optionally task history and
//! learned patterns. Produces the typed context plus its flattened AI view.

use chrono_tz::Tz;
use std::sync::Arc;

use crate::domain::family::{prioritize_overdue, FamilyMemberStatus};
use crate::domain::foundation::{ErrorCode, Timestamp, UserId};
use crate::domain::generation::{
    ContextOptions, GatheredContext, GenerationError, StatSnapshot, TaskHistoryEntry, UserContext,
};
use crate::domain::patterns::{build_ai_context, LearnedContext, SentimentAnalyzer};
use crate::ports::{PatternRepository, TaskRepository, TaskWithCompletion, UserContextReader};

/// Task history window used by daily generation.
pub const DAILY_TASK_HISTORY_DAYS: u32 = 14;

/// Handler for gathering a user's generation context.
///
/// # Dependencies
///
/// - `UserContextReader`: user, character, stats, family, plans, focus
/// - `TaskRepository`: recent tasks with completions
/// - `PatternRepository`: pattern records and active insights
/// - `SentimentAnalyzer`: classifies history feedback
pub struct ContextAggregator {
    reader: Arc<dyn UserContextReader>,
    tasks: Arc<dyn TaskRepository>,
    patterns: Arc<dyn PatternRepository>,
    analyzer: Arc<dyn SentimentAnalyzer>,
    default_timezone: Tz,
    history_days: u32,
}

impl ContextAggregator {
    pub fn new(
        reader: Arc<dyn UserContextReader>,
        tasks: Arc<dyn TaskRepository>,
        patterns: Arc<dyn PatternRepository>,
        analyzer: Arc<dyn SentimentAnalyzer>,
    ) -> Self {
        Self {
            reader,
            tasks,
            patterns,
            analyzer,
            default_timezone: Tz::UTC,
            history_days: DAILY_TASK_HISTORY_DAYS,
        }
    }

    /// Timezone used for users without one of their own.
    pub fn with_default_timezone(mut self, tz: Tz) -> Self {
        self.default_timezone = tz;
        self
    }

    /// Overrides the history window used by [`Self::daily_task_generation_context`].
    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    pub fn default_timezone(&self) -> Tz {
        self.default_timezone
    }

    /// Options used by daily generation: history window plus patterns.
    pub fn daily_options(&self) -> ContextOptions {
        ContextOptions::daily_generation(self.history_days)
    }

    pub async fn daily_task_generation_context(
        &self,
        user_id: &UserId,
    ) -> Result<GatheredContext, GenerationError> {
        self.gather_user_context(user_id, self.daily_options()).await
    }

    pub async fn gather_user_context(
        &self,
        user_id: &UserId,
        options: ContextOptions,
    ) -> Result<GatheredContext, GenerationError> {
        self.gather_at(user_id, options, Timestamp::now()).await
    }

    /// Gathers context as of `now`.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the user or its active character is missing
    /// - `Validation` when a stat row is malformed
    /// - any storage failure, converted from `DomainError`
    pub async fn gather_at(
        &self,
        user_id: &UserId,
        options: ContextOptions,
        now: Timestamp,
    ) -> Result<GatheredContext, GenerationError> {
        let user = self
            .reader
            .find_user(user_id)
            .await?
            .ok_or_else(|| GenerationError::not_found(ErrorCode::UserNotFound, "User not found"))?;

        let character = self
            .reader
            .find_active_character(user_id)
            .await?
            .ok_or_else(|| {
                GenerationError::not_found(
                    ErrorCode::CharacterNotFound,
                    "No active character found for user",
                )
            })?;

        let timezone = user.timezone_or(self.default_timezone);
        let today = now.local_date(timezone);

        let mut stats = Vec::new();
        for stat in self.reader.list_stats(&character.id).await? {
            stat.validate()?;
            let progress = stat.progress()?;
            stats.push(StatSnapshot::new(&stat, progress));
        }

        let family: Vec<FamilyMemberStatus> = self
            .reader
            .list_family_members(user_id)
            .await?
            .iter()
            .map(|member| member.status_on(today))
            .collect();

        let goals = self.reader.list_active_goals(user_id).await?;
        let projects = self.reader.list_active_projects(user_id).await?;
        let daily_focus = self.reader.find_daily_focus(user_id, today).await?;

        let task_history = match options.task_history_days {
            Some(days) => {
                let since = now.minus_days(i64::from(days));
                let rows = self.tasks.list_since_with_completions(user_id, since).await?;
                rows.iter().map(|row| self.history_entry(row)).collect()
            }
            None => Vec::new(),
        };

        let (patterns, insights, learned) = if options.include_patterns {
            let patterns = self.patterns.list_patterns(user_id).await?;
            let insights = self.patterns.list_active_insights(user_id, now).await?;
            let learned = build_ai_context(&patterns, &insights, now);
            (patterns, insights, learned)
        } else {
            (Vec::new(), Vec::new(), LearnedContext::default())
        };

        tracing::debug!(
            user_id = %user_id,
            stats = stats.len(),
            family = family.len(),
            history = task_history.len(),
            patterns = patterns.len(),
            "Gathered user context"
        );

        Ok(GatheredContext::from(UserContext {
            user,
            character,
            stats,
            family,
            goals,
            projects,
            daily_focus,
            task_history,
            patterns,
            insights,
            learned,
            today,
            timezone,
        }))
    }

    /// Overdue family members only, most overdue first.
    pub async fn family_interaction_priorities(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FamilyMemberStatus>, GenerationError> {
        let user = self
            .reader
            .find_user(user_id)
            .await?
            .ok_or_else(|| GenerationError::not_found(ErrorCode::UserNotFound, "User not found"))?;
        let today = Timestamp::now().local_date(user.timezone_or(self.default_timezone));

        let statuses: Vec<FamilyMemberStatus> = self
            .reader
            .list_family_members(user_id)
            .await?
            .iter()
            .map(|member| member.status_on(today))
            .collect();

        Ok(prioritize_overdue(&statuses))
    }

    fn history_entry(&self, row: &TaskWithCompletion) -> TaskHistoryEntry {
        let feedback = row
            .completion
            .as_ref()
            .and_then(|c| c.feedback.clone())
            .filter(|f| !f.trim().is_empty());
        let sentiment = feedback
            .as_deref()
            .map(|text| self.analyzer.analyze(text).sentiment);

        TaskHistoryEntry {
            task_id: row.task.id,
            title: row.task.title.clone(),
            completed: row.completion.is_some() || row.task.is_completed(),
            feedback,
            xp_awarded: row.completion.as_ref().map(|c| c.actual_xp),
            sentiment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::character::{Character, CharacterStat, User};
    use crate::domain::family::{FamilyMember, InteractionFrequency};
    use crate::domain::foundation::StatId;
    use crate::domain::patterns::{KeywordSentimentAnalyzer, Sentiment};
    use crate::domain::planning::{DailyFocus, Goal, PlanStatus, Priority};
    use crate::domain::task::{Task, TaskCompletion};

    fn user_id() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn aggregator(store: &InMemoryStore) -> ContextAggregator {
        let store = Arc::new(store.clone());
        ContextAggregator::new(
            store.clone(),
            store.clone(),
            store,
            Arc::new(KeywordSentimentAnalyzer::new()),
        )
    }

    async fn seeded() -> (InMemoryStore, Character) {
        let store = InMemoryStore::new();
        store.insert_user(User::new(user_id())).await;
        let character = Character::new(user_id(), "Aria", "Ranger", "Wanders the hills.");
        store.insert_character(character.clone()).await;
        store
            .insert_stat(CharacterStat::from_total_xp(character.id, "Physical Health", 400).unwrap())
            .await;
        (store, character)
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let store = InMemoryStore::new();
        let err = aggregator(&store)
            .gather_user_context(&user_id(), ContextOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::UserNotFound);
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn missing_character_is_not_found() {
        let store = InMemoryStore::new();
        store.insert_user(User::new(user_id())).await;

        let err = aggregator(&store)
            .gather_user_context(&user_id(), ContextOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::CharacterNotFound);
        assert_eq!(err.to_string(), "No active character found for user");
    }

    #[tokio::test]
    async fn stats_carry_level_progress() {
        let (store, _) = seeded().await;
        let gathered = aggregator(&store)
            .gather_user_context(&user_id(), ContextOptions::default())
            .await
            .unwrap();

        let stat = &gathered.context.stats[0];
        assert_eq!(stat.current_level, 2);
        assert_eq!(stat.progress.current_level_xp, 100);
        assert_eq!(stat.progress.progress_percent.value(), 33);
    }

    #[tokio::test]
    async fn malformed_stat_fails_hard() {
        let (store, character) = seeded().await;
        store
            .insert_stat(CharacterStat {
                id: StatId::new(),
                character_id: character.id,
                category: "Wisdom".to_string(),
                current_xp: 0,
                current_level: 0,
                total_xp: 0,
            })
            .await;

        let err = aggregator(&store)
            .gather_user_context(&user_id(), ContextOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Validation(_)));
    }

    #[tokio::test]
    async fn empty_stats_are_allowed() {
        let store = InMemoryStore::new();
        store.insert_user(User::new(user_id())).await;
        store
            .insert_character(Character::new(user_id(), "Aria", "Ranger", ""))
            .await;

        let gathered = aggregator(&store)
            .gather_user_context(&user_id(), ContextOptions::default())
            .await
            .unwrap();
        assert!(gathered.context.stats.is_empty());
    }

    #[tokio::test]
    async fn loads_focus_for_today_and_active_goals_only() {
        let (store, _) = seeded().await;
        let now = Timestamp::now();
        let today = now.local_date(Tz::UTC);
        store
            .insert_daily_focus(DailyFocus::new(user_id(), today, "Move more"))
            .await;
        store
            .insert_daily_focus(DailyFocus::new(user_id(), today.pred_opt().unwrap(), "Rest"))
            .await;
        store
            .insert_goal(Goal::new(user_id(), "Run a 5k", Priority::High))
            .await;
        let mut paused = Goal::new(user_id(), "Learn violin", Priority::Low);
        paused.status = PlanStatus::Paused;
        store.insert_goal(paused).await;

        let gathered = aggregator(&store)
            .gather_at(&user_id(), ContextOptions::default(), now)
            .await
            .unwrap();

        assert_eq!(gathered.context.daily_focus.unwrap().focus, "Move more");
        assert_eq!(gathered.context.goals.len(), 1);
        assert_eq!(gathered.ai_context.user_goals.len(), 1);
    }

    #[tokio::test]
    async fn history_only_when_requested() {
        let (store, _) = seeded().await;
        let now = Timestamp::now();
        let recent = Task::new_ai(user_id(), "Stretch", "Ten minutes", vec![], 20, now.minus_days(2));
        let old = Task::new_ai(user_id(), "Swim", "Laps", vec![], 20, now.minus_days(30));
        store
            .insert_completion(
                TaskCompletion::new(recent.id, 22, now.minus_days(1)).with_feedback("Loved it"),
            )
            .await;
        store.insert_task(recent).await;
        store.insert_task(old).await;

        let handler = aggregator(&store);
        let without = handler
            .gather_at(&user_id(), ContextOptions::default(), now)
            .await
            .unwrap();
        assert!(without.context.task_history.is_empty());

        let with = handler
            .gather_at(&user_id(), ContextOptions::daily_generation(14), now)
            .await
            .unwrap();
        let history = &with.context.task_history;
        assert_eq!(history.len(), 1);
        assert!(history[0].completed);
        assert_eq!(history[0].xp_awarded, Some(22));
        assert_eq!(history[0].sentiment, Some(Sentiment::Positive));
    }

    #[tokio::test]
    async fn family_priorities_lists_overdue_most_overdue_first() {
        let store = InMemoryStore::new();
        store.insert_user(User::new(user_id())).await;
        let today = Timestamp::now().local_date(Tz::UTC);
        store
            .insert_family_member(
                FamilyMember::new(user_id(), "Sam", InteractionFrequency::Weekly)
                    .with_last_interaction(today - chrono::Duration::days(9)),
            )
            .await;
        store
            .insert_family_member(
                FamilyMember::new(user_id(), "Mia", InteractionFrequency::Daily)
                    .with_last_interaction(today - chrono::Duration::days(5)),
            )
            .await;
        store
            .insert_family_member(
                FamilyMember::new(user_id(), "Leo", InteractionFrequency::Daily)
                    .with_last_interaction(today),
            )
            .await;

        let priorities = aggregator(&store)
            .family_interaction_priorities(&user_id())
            .await
            .unwrap();

        let names: Vec<&str> = priorities.iter().map(|s| s.member.name.as_str()).collect();
        assert_eq!(names, vec!["Mia", "Sam"]);
    }
}
