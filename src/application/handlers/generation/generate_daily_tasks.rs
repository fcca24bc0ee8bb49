//! GenerateDailyTasksHandler - Command handler producing one user's daily task pair.
//!
//! Flow per user and local calendar day:
//! 1. Idempotency check against AI tasks already created today
//! 2. Context gathering (history window plus learned patterns)
//! 3. Optional weather lookup, never fatal
//! 4. Prompt construction and a single completion call
//! 5. Parsing, validation and repair of the two task descriptors
//! 6. Atomic insert of both tasks with the day's run marker

use chrono_tz::Tz;
use std::sync::Arc;
use uuid::Uuid;

use super::user_locks::UserLocks;
use crate::application::handlers::context::ContextAggregator;
use crate::application::handlers::weather::WeatherService;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::generation::{
    build_prompt, GeneratedTaskPair, GeneratedTasks, GenerationError, GenerationRun,
    RepairHints, UserContext, CONTEXT_FAILURE_MESSAGE, FALLBACK_ADVENTURE_STAT,
};
use crate::domain::weather::WeatherContext;
use crate::ports::{
    AIProvider, CompletionRequest, MessageRole, RequestMetadata, TaskRepository,
    UserContextReader,
};

const MAX_COMPLETION_TOKENS: u32 = 1200;
const COMPLETION_TEMPERATURE: f32 = 0.8;

/// Command to generate today's adventure and family tasks.
#[derive(Debug, Clone)]
pub struct GenerateDailyTasksCommand {
    pub user_id: UserId,
    /// Overrides the ZIP code stored on the user.
    pub zip_code: Option<String>,
    /// Generate even when AI tasks already exist today. Adds, never replaces.
    pub force_regenerate: bool,
}

impl GenerateDailyTasksCommand {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            zip_code: None,
            force_regenerate: false,
        }
    }

    pub fn with_zip_code(mut self, zip: impl Into<String>) -> Self {
        self.zip_code = Some(zip.into());
        self
    }

    pub fn forced(mut self, force: bool) -> Self {
        self.force_regenerate = force;
        self
    }
}

/// Handler for daily task generation.
///
/// # Dependencies
///
/// - `UserContextReader`: resolves the user's timezone for the day window
/// - `ContextAggregator`: user context for the prompt
/// - `WeatherService` (optional): outdoor guidance
/// - `AIProvider`: completion service
/// - `TaskRepository`: idempotency query and inserts
pub struct GenerateDailyTasksHandler {
    reader: Arc<dyn UserContextReader>,
    context: Arc<ContextAggregator>,
    weather: Option<Arc<WeatherService>>,
    ai: Arc<dyn AIProvider>,
    tasks: Arc<dyn TaskRepository>,
    locks: UserLocks,
}

impl GenerateDailyTasksHandler {
    pub fn new(
        reader: Arc<dyn UserContextReader>,
        context: Arc<ContextAggregator>,
        ai: Arc<dyn AIProvider>,
        tasks: Arc<dyn TaskRepository>,
    ) -> Self {
        Self {
            reader,
            context,
            weather: None,
            ai,
            tasks,
            locks: UserLocks::new(),
        }
    }

    pub fn with_weather(mut self, weather: Arc<WeatherService>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub async fn handle(
        &self,
        cmd: GenerateDailyTasksCommand,
    ) -> Result<GeneratedTasks, GenerationError> {
        self.handle_at(cmd, Timestamp::now()).await
    }

    /// Runs generation as of `now`.
    ///
    /// # Errors
    ///
    /// - `AlreadyGenerated` when AI tasks exist today and the run is not forced
    /// - `NotFound` for a missing user or active character
    /// - `GenerationFailed` for other context failures or an unusable completion
    /// - `Upstream` when the completion service fails
    pub async fn handle_at(
        &self,
        cmd: GenerateDailyTasksCommand,
        now: Timestamp,
    ) -> Result<GeneratedTasks, GenerationError> {
        let user_id = &cmd.user_id;
        let _guard = self.locks.acquire(user_id).await;

        // 1. Idempotency check on the user's local calendar day
        let timezone = self.user_timezone(user_id).await?;
        let local_date = now.local_date(timezone);
        let (start, end) = Timestamp::day_bounds(local_date, timezone);
        if !cmd.force_regenerate && self.tasks.has_ai_task_between(user_id, start, end).await? {
            tracing::info!(user_id = %user_id, date = %local_date, "Daily tasks already generated");
            return Err(GenerationError::AlreadyGenerated);
        }

        // 2. Gather context
        let gathered = self
            .context
            .gather_at(user_id, self.context.daily_options(), now)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    e
                } else {
                    tracing::error!(user_id = %user_id, error = %e, "Context gathering failed");
                    GenerationError::generation_failed(CONTEXT_FAILURE_MESSAGE)
                }
            })?;
        let ctx = gathered.context;

        // 3. Weather is advisory only
        let weather = self.fetch_weather(&cmd, &ctx).await;

        // 4. Completion
        let prompt = build_prompt(&ctx, weather.as_ref());
        let request = CompletionRequest::new(RequestMetadata::new(
            user_id.clone(),
            Uuid::new_v4().to_string(),
        ))
        .with_system_prompt(prompt.system)
        .with_message(MessageRole::User, prompt.user)
        .with_max_tokens(MAX_COMPLETION_TOKENS)
        .with_temperature(COMPLETION_TEMPERATURE)
        .with_json_response();

        let response = self.ai.complete(request).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Completion call failed");
            GenerationError::from(e)
        })?;

        // 5. Parse and repair
        let hints = repair_hints(&ctx);
        let pair = GeneratedTaskPair::parse(&response.content, &hints).map_err(|e| {
            tracing::warn!(user_id = %user_id, error = %e, "Unusable completion");
            e
        })?;

        // 6. Persist
        let adventure_task = pair.adventure_task.into_task(user_id.clone(), now);
        let family_task = pair.family_task.into_task(user_id.clone(), now);
        let run = GenerationRun {
            user_id: user_id.clone(),
            local_date,
            forced: cmd.force_regenerate,
            created_at: now,
        };
        self.tasks
            .save_generated_pair(&run, &adventure_task, &family_task)
            .await?;

        tracing::info!(
            user_id = %user_id,
            date = %local_date,
            forced = cmd.force_regenerate,
            adventure_task_id = %adventure_task.id,
            family_task_id = %family_task.id,
            with_weather = weather.is_some(),
            "Generated daily tasks"
        );

        Ok(GeneratedTasks {
            adventure_task,
            family_task,
            weather,
        })
    }

    async fn user_timezone(&self, user_id: &UserId) -> Result<Tz, GenerationError> {
        let default = self.context.default_timezone();
        let user = self.reader.find_user(user_id).await?;
        Ok(user.map_or(default, |u| u.timezone_or(default)))
    }

    async fn fetch_weather(
        &self,
        cmd: &GenerateDailyTasksCommand,
        ctx: &UserContext,
    ) -> Option<WeatherContext> {
        let service = self.weather.as_ref()?;
        let zip = cmd
            .zip_code
            .clone()
            .or_else(|| ctx.user.zip_code.clone())
            .filter(|z| !z.trim().is_empty())?;

        match service.weather_context(&zip).await {
            Ok(weather) => Some(weather),
            Err(e) => {
                tracing::warn!(
                    user_id = %cmd.user_id,
                    error = %e,
                    code = %e.code(),
                    "Weather unavailable, generating without it"
                );
                None
            }
        }
    }
}

fn repair_hints(ctx: &UserContext) -> RepairHints {
    RepairHints {
        adventure_stat: ctx
            .primary_adventure_stat()
            .unwrap_or(FALLBACK_ADVENTURE_STAT)
            .to_string(),
        overdue_member: ctx
            .overdue_family()
            .first()
            .map(|status| status.member.name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::character::{Character, CharacterStat, User, FAMILY_BONDING_STAT};
    use crate::domain::family::{FamilyMember, InteractionFrequency};
    use crate::domain::foundation::{ErrorCode, StatId};
    use crate::domain::generation::test_fixtures;
    use crate::domain::patterns::KeywordSentimentAnalyzer;

    fn user_id() -> UserId {
        UserId::new("user-1").unwrap()
    }

    async fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert_user(User::new(user_id())).await;
        let character = Character::new(user_id(), "Aria", "Ranger", "");
        store.insert_character(character.clone()).await;
        store
            .insert_stat(CharacterStat::from_total_xp(character.id, "Wisdom", 150).unwrap())
            .await;
        store
            .insert_family_member(FamilyMember::new(user_id(), "Grandma", InteractionFrequency::Monthly))
            .await;
        store
    }

    fn handler(store: &InMemoryStore, ai: MockAIProvider) -> GenerateDailyTasksHandler {
        let store = Arc::new(store.clone());
        let context = ContextAggregator::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(KeywordSentimentAnalyzer::new()),
        );
        GenerateDailyTasksHandler::new(store.clone(), Arc::new(context), Arc::new(ai), store)
    }

    #[tokio::test]
    async fn generates_and_persists_two_ai_tasks() {
        let store = seeded_store().await;
        let ai = MockAIProvider::new();
        let result = handler(&store, ai.clone())
            .handle(GenerateDailyTasksCommand::new(user_id()))
            .await
            .unwrap();

        assert!(result.family_task.target_stats.iter().any(|s| s == FAMILY_BONDING_STAT));
        assert_eq!(result.family_task.target_family_member.as_deref(), Some("Grandma"));
        assert!(result.weather.is_none());
        assert_eq!(store.tasks_for(&user_id()).await.len(), 2);

        let call = &ai.get_calls()[0];
        assert!(call.json_response);
        assert!(call.messages[0].content.contains("Grandma"));
    }

    #[tokio::test]
    async fn second_run_same_day_is_already_generated() {
        let store = seeded_store().await;
        let ai = MockAIProvider::new();
        let handler = handler(&store, ai.clone());

        handler.handle(GenerateDailyTasksCommand::new(user_id())).await.unwrap();
        let err = handler
            .handle(GenerateDailyTasksCommand::new(user_id()))
            .await
            .unwrap_err();

        assert_eq!(err, GenerationError::AlreadyGenerated);
        assert_eq!(ai.call_count(), 1);
        assert_eq!(store.tasks_for(&user_id()).await.len(), 2);
    }

    #[tokio::test]
    async fn context_failure_other_than_not_found_is_generic() {
        let store = seeded_store().await;
        let character = store.find_active_character(&user_id()).await.unwrap().unwrap();
        store
            .insert_stat(CharacterStat {
                id: StatId::new(),
                character_id: character.id,
                category: String::new(),
                current_xp: 0,
                current_level: 1,
                total_xp: 0,
            })
            .await;

        let err = handler(&store, MockAIProvider::new())
            .handle(GenerateDailyTasksCommand::new(user_id()))
            .await
            .unwrap_err();

        assert_eq!(err, GenerationError::generation_failed(CONTEXT_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn missing_character_propagates_not_found() {
        let store = InMemoryStore::new();
        store.insert_user(User::new(user_id())).await;

        let err = handler(&store, MockAIProvider::new())
            .handle(GenerateDailyTasksCommand::new(user_id()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::CharacterNotFound);
    }

    #[tokio::test]
    async fn completion_failure_writes_nothing() {
        let store = seeded_store().await;
        let ai = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "completion service down".to_string(),
        });

        let err = handler(&store, ai)
            .handle(GenerateDailyTasksCommand::new(user_id()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert!(store.tasks_for(&user_id()).await.is_empty());
    }

    #[tokio::test]
    async fn unparseable_completion_is_generation_failed() {
        let store = seeded_store().await;
        let ai = MockAIProvider::new().with_response("Sorry, I cannot help with that.");

        let err = handler(&store, ai)
            .handle(GenerateDailyTasksCommand::new(user_id()))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::GenerationFailed(_)));
        assert!(store.tasks_for(&user_id()).await.is_empty());
    }

    #[test]
    fn repair_hints_prefer_first_non_family_stat_and_most_overdue_member() {
        let hints = repair_hints(&test_fixtures::context());
        assert_eq!(hints.adventure_stat, "Physical Health");
        assert_eq!(hints.overdue_member.as_deref(), Some("Grandma"));
    }
}
