//! In-memory implementation of the storage ports.
//!
//! Backs tests and local dry runs. Mirrors the PostgreSQL adapter's
//! semantics, including the one-non-forced-run-per-day guard.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::character::{Character, CharacterStat, User};
use crate::domain::family::FamilyMember;
use crate::domain::foundation::{CharacterId, DomainError, ErrorCode, TaskId, Timestamp, UserId};
use crate::domain::generation::GenerationRun;
use crate::domain::patterns::{Insight, PatternKey, PatternRecord};
use crate::domain::planning::{DailyFocus, Goal, PlanStatus, Project};
use crate::domain::task::{Task, TaskCompletion, TaskSource};
use crate::ports::{PatternRepository, TaskRepository, TaskWithCompletion, UserContextReader};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    characters: Vec<Character>,
    stats: Vec<CharacterStat>,
    family: Vec<FamilyMember>,
    goals: Vec<Goal>,
    projects: Vec<Project>,
    focuses: Vec<DailyFocus>,
    tasks: Vec<Task>,
    completions: HashMap<TaskId, TaskCompletion>,
    runs: Vec<GenerationRun>,
    patterns: HashMap<(UserId, PatternKey), PatternRecord>,
    insights: Vec<Insight>,
}

/// In-process store for every storage port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
    fail_enumeration: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id.clone(), user);
    }

    pub async fn insert_character(&self, character: Character) {
        self.state.write().await.characters.push(character);
    }

    pub async fn insert_stat(&self, stat: CharacterStat) {
        self.state.write().await.stats.push(stat);
    }

    pub async fn insert_family_member(&self, member: FamilyMember) {
        self.state.write().await.family.push(member);
    }

    pub async fn insert_goal(&self, goal: Goal) {
        self.state.write().await.goals.push(goal);
    }

    pub async fn insert_project(&self, project: Project) {
        self.state.write().await.projects.push(project);
    }

    pub async fn insert_daily_focus(&self, focus: DailyFocus) {
        self.state.write().await.focuses.push(focus);
    }

    pub async fn insert_task(&self, task: Task) {
        self.state.write().await.tasks.push(task);
    }

    pub async fn insert_completion(&self, completion: TaskCompletion) {
        self.state
            .write()
            .await
            .completions
            .insert(completion.task_id, completion);
    }

    /// All tasks of a user, in insertion order.
    pub async fn tasks_for(&self, user_id: &UserId) -> Vec<Task> {
        self.state
            .read()
            .await
            .tasks
            .iter()
            .filter(|t| &t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn runs_for(&self, user_id: &UserId) -> Vec<GenerationRun> {
        self.state
            .read()
            .await
            .runs
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn insights_for(&self, user_id: &UserId) -> Vec<Insight> {
        self.state
            .read()
            .await
            .insights
            .iter()
            .filter(|i| &i.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Makes `list_eligible_user_ids` fail, for exercising batch failure paths.
    pub fn fail_user_enumeration(&self, fail: bool) {
        self.fail_enumeration.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserContextReader for InMemoryStore {
    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn find_active_character(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Character>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .characters
            .iter()
            .find(|c| &c.user_id == user_id && c.is_active)
            .cloned())
    }

    async fn list_stats(
        &self,
        character_id: &CharacterId,
    ) -> Result<Vec<CharacterStat>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .stats
            .iter()
            .filter(|s| &s.character_id == character_id)
            .cloned()
            .collect())
    }

    async fn list_family_members(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FamilyMember>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .family
            .iter()
            .filter(|m| &m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_active_goals(&self, user_id: &UserId) -> Result<Vec<Goal>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .goals
            .iter()
            .filter(|g| &g.user_id == user_id && g.status == PlanStatus::Active)
            .cloned()
            .collect())
    }

    async fn list_active_projects(&self, user_id: &UserId) -> Result<Vec<Project>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .projects
            .iter()
            .filter(|p| &p.user_id == user_id && p.status == PlanStatus::Active)
            .cloned()
            .collect())
    }

    async fn find_daily_focus(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<DailyFocus>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .focuses
            .iter()
            .find(|f| &f.user_id == user_id && f.applies_to(date))
            .cloned())
    }

    async fn list_eligible_user_ids(&self) -> Result<Vec<UserId>, DomainError> {
        if self.fail_enumeration.load(Ordering::SeqCst) {
            return Err(DomainError::database("list eligible users", "store unavailable"));
        }
        let state = self.state.read().await;
        let mut ids: Vec<UserId> = state
            .users
            .keys()
            .filter(|id| state.characters.iter().any(|c| &c.user_id == *id && c.is_active))
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn has_ai_task_between(
        &self,
        user_id: &UserId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<bool, DomainError> {
        Ok(self.state.read().await.tasks.iter().any(|t| {
            &t.user_id == user_id
                && t.source == TaskSource::Ai
                && !t.created_at.is_before(&start)
                && t.created_at.is_before(&end)
        }))
    }

    async fn save_generated_pair(
        &self,
        run: &GenerationRun,
        adventure_task: &Task,
        family_task: &Task,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let duplicate = !run.forced
            && state
                .runs
                .iter()
                .any(|r| !r.forced && r.user_id == run.user_id && r.local_date == run.local_date);
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::AlreadyGenerated,
                "Daily tasks have already been generated for today",
            ));
        }

        state.runs.push(run.clone());
        state.tasks.push(adventure_task.clone());
        state.tasks.push(family_task.clone());
        Ok(())
    }

    async fn list_since_with_completions(
        &self,
        user_id: &UserId,
        since: Timestamp,
    ) -> Result<Vec<TaskWithCompletion>, DomainError> {
        let state = self.state.read().await;
        let mut rows: Vec<TaskWithCompletion> = state
            .tasks
            .iter()
            .filter(|t| &t.user_id == user_id && !t.created_at.is_before(&since))
            .map(|t| TaskWithCompletion {
                task: t.clone(),
                completion: state.completions.get(&t.id).cloned(),
            })
            .collect();
        rows.sort_by_key(|r| r.task.created_at);
        Ok(rows)
    }
}

#[async_trait]
impl PatternRepository for InMemoryStore {
    async fn find_pattern(
        &self,
        user_id: &UserId,
        key: &PatternKey,
    ) -> Result<Option<PatternRecord>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .patterns
            .get(&(user_id.clone(), key.clone()))
            .cloned())
    }

    async fn upsert_pattern(&self, record: &PatternRecord) -> Result<(), DomainError> {
        self.state
            .write()
            .await
            .patterns
            .insert((record.user_id.clone(), record.key()), record.clone());
        Ok(())
    }

    async fn list_patterns(&self, user_id: &UserId) -> Result<Vec<PatternRecord>, DomainError> {
        let state = self.state.read().await;
        let mut records: Vec<PatternRecord> = state
            .patterns
            .values()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(records)
    }

    async fn upsert_insight(&self, insight: &Insight) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state
            .insights
            .iter_mut()
            .find(|i| i.pattern_id == insight.pattern_id)
        {
            Some(existing) => {
                let id = existing.id;
                let created_at = existing.created_at;
                *existing = Insight {
                    id,
                    created_at,
                    ..insight.clone()
                };
            }
            None => state.insights.push(insight.clone()),
        }
        Ok(())
    }

    async fn list_active_insights(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Vec<Insight>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .insights
            .iter()
            .filter(|i| &i.user_id == user_id && i.is_current(&now))
            .cloned()
            .collect())
    }
}
