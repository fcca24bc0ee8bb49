//! BatchRunner - Generates daily tasks for every eligible user.
//!
//! Users are independent: one failure is recorded and the batch moves on.
//! `already_generated` outcomes count as skips, not errors.

use futures::stream::{self, StreamExt};
use std::sync::Arc;

use super::generate_daily_tasks::{GenerateDailyTasksCommand, GenerateDailyTasksHandler};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::generation::{
    BatchError, BatchSummary, GeneratedTasks, GenerationError, SchedulingInfo,
};
use crate::ports::UserContextReader;

/// Runs daily generation across all users with an active character.
pub struct BatchRunner {
    reader: Arc<dyn UserContextReader>,
    generator: Arc<GenerateDailyTasksHandler>,
    concurrency: usize,
    scheduling: SchedulingInfo,
}

impl BatchRunner {
    pub fn new(
        reader: Arc<dyn UserContextReader>,
        generator: Arc<GenerateDailyTasksHandler>,
        scheduling: SchedulingInfo,
    ) -> Self {
        Self {
            reader,
            generator,
            concurrency: 1,
            scheduling,
        }
    }

    /// Users processed at once; 1 keeps the run sequential.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// When and how often the batch should be triggered.
    pub fn scheduling_info(&self) -> SchedulingInfo {
        self.scheduling.clone()
    }

    /// Users eligible for generation.
    pub async fn eligible_users(&self) -> Result<Vec<UserId>, GenerationError> {
        Ok(self.reader.list_eligible_user_ids().await?)
    }

    /// Runs one batch.
    ///
    /// # Errors
    ///
    /// Only when the eligible users cannot be listed. Per-user failures are
    /// reported in [`BatchSummary::errors`].
    pub async fn generate_for_all_users(
        &self,
        force_regenerate: bool,
    ) -> Result<BatchSummary, GenerationError> {
        let mut summary = BatchSummary::started(Timestamp::now());
        let user_ids = self.eligible_users().await?;

        tracing::info!(
            users = user_ids.len(),
            concurrency = self.concurrency,
            force_regenerate,
            "Starting daily task batch"
        );

        let outcomes: Vec<(UserId, Result<GeneratedTasks, GenerationError>)> =
            if self.concurrency <= 1 {
                let mut outcomes = Vec::with_capacity(user_ids.len());
                for user_id in user_ids {
                    let outcome = self.generate_one(&user_id, force_regenerate).await;
                    outcomes.push((user_id, outcome));
                }
                outcomes
            } else {
                stream::iter(user_ids)
                    .map(|user_id| async move {
                        let outcome = self.generate_one(&user_id, force_regenerate).await;
                        (user_id, outcome)
                    })
                    .buffer_unordered(self.concurrency)
                    .collect()
                    .await
            };

        for (user_id, outcome) in outcomes {
            summary.total_users_processed += 1;
            match outcome {
                Ok(_) => summary.successful_generations += 1,
                Err(GenerationError::AlreadyGenerated) => summary.skipped_users += 1,
                Err(e) => {
                    tracing::warn!(user_id = %user_id, error = %e, "Daily generation failed for user");
                    summary.errors.push(BatchError {
                        user_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        summary.finished_at = Timestamp::now();
        tracing::info!(
            processed = summary.total_users_processed,
            generated = summary.successful_generations,
            skipped = summary.skipped_users,
            failed = summary.errors.len(),
            "Finished daily task batch"
        );

        Ok(summary)
    }

    async fn generate_one(
        &self,
        user_id: &UserId,
        force_regenerate: bool,
    ) -> Result<GeneratedTasks, GenerationError> {
        let cmd = GenerateDailyTasksCommand::new(user_id.clone()).forced(force_regenerate);
        self.generator.handle(cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::context::ContextAggregator;
    use crate::domain::character::{Character, User};
    use crate::domain::patterns::KeywordSentimentAnalyzer;

    fn scheduling() -> SchedulingInfo {
        SchedulingInfo {
            recommended_time: "06:00".to_string(),
            frequency: "daily".to_string(),
            timezone: "UTC".to_string(),
        }
    }

    fn runner(store: &InMemoryStore, ai: MockAIProvider) -> BatchRunner {
        let store = Arc::new(store.clone());
        let context = Arc::new(ContextAggregator::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(KeywordSentimentAnalyzer::new()),
        ));
        let generator = GenerateDailyTasksHandler::new(store.clone(), context, Arc::new(ai), store.clone());
        BatchRunner::new(store, Arc::new(generator), scheduling())
    }

    async fn add_player(store: &InMemoryStore, id: &str) -> UserId {
        let user_id = UserId::new(id).unwrap();
        store.insert_user(User::new(user_id.clone())).await;
        store
            .insert_character(Character::new(user_id.clone(), id, "Ranger", ""))
            .await;
        user_id
    }

    #[tokio::test]
    async fn counts_successes_and_skips() {
        let store = InMemoryStore::new();
        add_player(&store, "a").await;
        add_player(&store, "b").await;
        let runner = runner(&store, MockAIProvider::new());

        let first = runner.generate_for_all_users(false).await.unwrap();
        assert_eq!(first.total_users_processed, 2);
        assert_eq!(first.successful_generations, 2);

        let second = runner.generate_for_all_users(false).await.unwrap();
        assert_eq!(second.skipped_users, 2);
        assert!(!second.has_errors());
        assert!(!second.finished_at.is_before(&second.started_at));
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_batch() {
        let store = InMemoryStore::new();
        add_player(&store, "a").await;
        add_player(&store, "b").await;
        let ai = MockAIProvider::new().with_error(MockError::RateLimited { retry_after_secs: 30 });

        let summary = runner(&store, ai).generate_for_all_users(false).await.unwrap();

        assert_eq!(summary.total_users_processed, 2);
        assert_eq!(summary.successful_generations, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].user_id.as_str(), "a");
    }

    #[tokio::test]
    async fn concurrent_batch_matches_sequential_counts() {
        let store = InMemoryStore::new();
        for id in ["a", "b", "c", "d"] {
            add_player(&store, id).await;
        }

        let summary = runner(&store, MockAIProvider::new())
            .with_concurrency(3)
            .generate_for_all_users(false)
            .await
            .unwrap();

        assert_eq!(summary.successful_generations, 4);
        for id in ["a", "b", "c", "d"] {
            assert_eq!(store.tasks_for(&UserId::new(id).unwrap()).await.len(), 2);
        }
    }

    #[tokio::test]
    async fn enumeration_failure_fails_the_batch() {
        let store = InMemoryStore::new();
        store.fail_user_enumeration(true);

        let result = runner(&store, MockAIProvider::new())
            .generate_for_all_users(false)
            .await;

        assert!(result.is_err());
    }

    #[test]
    fn scheduling_info_is_passed_through() {
        let store = InMemoryStore::new();
        let info = runner(&store, MockAIProvider::new()).scheduling_info();
        assert_eq!(info.recommended_time, "06:00");
        assert_eq!(info.frequency, "daily");
    }
}
