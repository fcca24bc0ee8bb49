//! Integration tests for pattern learning.
//!
//! Completions are recorded through `RecordCompletionHandler`; the learned
//! preferences then surface in the context used for the next generation.

use std::sync::Arc;

use lifequest::adapters::ai::MockAIProvider;
use lifequest::adapters::memory::InMemoryStore;
use lifequest::application::handlers::{
    ContextAggregator, GenerateDailyTasksCommand, GenerateDailyTasksHandler,
    RecordCompletionHandler,
};
use lifequest::domain::character::{Character, CharacterStat, User};
use lifequest::domain::foundation::{TaskId, Timestamp, UserId};
use lifequest::domain::patterns::{
    CompletionEvent, InsightPriority, KeywordSentimentAnalyzer, PatternType,
};
use lifequest::domain::task::TaskSource;

fn alice() -> UserId {
    UserId::new("alice").unwrap()
}

async fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.insert_user(User::new(alice())).await;
    let character = Character::new(alice(), "Aria", "Ranger", "");
    store.insert_character(character.clone()).await;
    store
        .insert_stat(CharacterStat::from_total_xp(character.id, "Physical Health", 120).unwrap())
        .await;
    store
}

fn aggregator(store: &InMemoryStore) -> ContextAggregator {
    let storage = Arc::new(store.clone());
    ContextAggregator::new(
        storage.clone(),
        storage.clone(),
        storage,
        Arc::new(KeywordSentimentAnalyzer::new()),
    )
}

fn recorder(store: &InMemoryStore) -> RecordCompletionHandler {
    RecordCompletionHandler::new(
        Arc::new(store.clone()),
        Arc::new(KeywordSentimentAnalyzer::new()),
    )
}

fn run_completion(feedback: &str) -> CompletionEvent {
    CompletionEvent::new(
        alice(),
        TaskId::new(),
        "Trail run",
        TaskSource::Ai,
        30,
        Timestamp::now(),
    )
    .with_target_stats(vec!["Physical Health".to_string()])
    .with_feedback(feedback)
}

#[tokio::test]
async fn repeated_positive_completions_become_a_preference() {
    let store = seeded_store().await;
    let recorder = recorder(&store);

    for _ in 0..6 {
        recorder
            .handle(&run_completion("Loved it, felt energized"))
            .await
            .unwrap();
    }

    let gathered = aggregator(&store)
        .daily_task_generation_context(&alice())
        .await
        .unwrap();
    let learned = &gathered.context.learned;

    assert!(learned
        .preferences
        .iter()
        .any(|p| p.pattern_type == PatternType::StatPreference
            && p.pattern_key == "physical_health_tasks"));
    assert!(learned.avoidances.is_empty());
    assert!(!learned.insights.is_empty());
}

#[tokio::test]
async fn repeated_negative_completions_become_an_avoidance() {
    let store = seeded_store().await;
    let recorder = recorder(&store);

    let mut last = None;
    for _ in 0..6 {
        last = Some(
            recorder
                .handle(&run_completion("Boring and exhausting"))
                .await
                .unwrap(),
        );
    }

    let result = last.unwrap();
    assert!(result
        .insights
        .iter()
        .all(|i| i.priority == InsightPriority::High && i.title.starts_with("Struggles with")));

    let gathered = aggregator(&store)
        .daily_task_generation_context(&alice())
        .await
        .unwrap();
    assert!(gathered
        .context
        .learned
        .avoidances
        .iter()
        .any(|p| p.pattern_key == "physical_health_tasks"));
    assert!(gathered.context.learned.preferences.is_empty());
}

#[tokio::test]
async fn insights_are_refreshed_not_duplicated() {
    let store = seeded_store().await;
    let recorder = recorder(&store);

    for _ in 0..8 {
        recorder.handle(&run_completion("Great session")).await.unwrap();
    }

    let insights = store.insights_for(&alice()).await;
    let stat_insights = insights
        .iter()
        .filter(|i| i.title.contains("physical health"))
        .count();
    assert_eq!(stat_insights, 1);
}

#[tokio::test]
async fn learned_preferences_reach_the_completion_prompt() {
    let store = seeded_store().await;
    let recorder = recorder(&store);
    for _ in 0..6 {
        recorder.handle(&run_completion("Awesome run")).await.unwrap();
    }

    let storage = Arc::new(store.clone());
    let ai = MockAIProvider::new();
    let handler = GenerateDailyTasksHandler::new(
        storage.clone(),
        Arc::new(aggregator(&store)),
        Arc::new(ai.clone()),
        storage,
    );
    handler
        .handle(GenerateDailyTasksCommand::new(alice()))
        .await
        .unwrap();

    let prompt = &ai.get_calls()[0].messages[0].content;
    assert!(prompt.contains("## What we have learned about this player"));
    assert!(prompt.contains("physical health"));
}
