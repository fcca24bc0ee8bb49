//! User context views assembled for task generation.
//!
//! [`UserContext`] is the typed aggregate consumed inside the crate;
//! [`AiContext`] flattens it to primitives for prompt interpolation.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::character::{Character, CharacterStat, User, FAMILY_BONDING_STAT};
use crate::domain::family::{prioritize_overdue, FamilyMemberStatus};
use crate::domain::foundation::{StatId, TaskId};
use crate::domain::leveling::LevelProgress;
use crate::domain::patterns::{Insight, LearnedContext, PatternRecord, Sentiment};
use crate::domain::planning::{DailyFocus, Goal, Project};

/// Which optional sections to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextOptions {
    /// Load tasks created in the trailing window of this many days.
    pub task_history_days: Option<u32>,
    pub include_patterns: bool,
}

impl ContextOptions {
    /// Profile used by daily generation: a history window plus learned patterns.
    pub fn daily_generation(task_history_days: u32) -> Self {
        Self {
            task_history_days: Some(task_history_days),
            include_patterns: true,
        }
    }
}

/// A stat with its derived level progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSnapshot {
    pub id: StatId,
    pub category: String,
    pub current_level: i32,
    pub total_xp: i64,
    pub progress: LevelProgress,
}

impl StatSnapshot {
    pub fn new(stat: &CharacterStat, progress: LevelProgress) -> Self {
        Self {
            id: stat.id,
            category: stat.category.clone(),
            current_level: stat.current_level,
            total_xp: stat.total_xp,
            progress,
        }
    }
}

/// A recent task joined with its completion, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHistoryEntry {
    pub task_id: TaskId,
    pub title: String,
    pub completed: bool,
    pub feedback: Option<String>,
    pub xp_awarded: Option<i64>,
    /// Classified feedback polarity, when feedback exists.
    pub sentiment: Option<Sentiment>,
}

/// Everything known about a user that may shape generation.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user: User,
    pub character: Character,
    pub stats: Vec<StatSnapshot>,
    pub family: Vec<FamilyMemberStatus>,
    pub goals: Vec<Goal>,
    pub projects: Vec<Project>,
    pub daily_focus: Option<DailyFocus>,
    pub task_history: Vec<TaskHistoryEntry>,
    pub patterns: Vec<PatternRecord>,
    pub insights: Vec<Insight>,
    pub learned: LearnedContext,
    /// The user's local calendar date the context was built for.
    pub today: NaiveDate,
    pub timezone: Tz,
}

impl UserContext {
    /// Overdue family members, most overdue first.
    pub fn overdue_family(&self) -> Vec<FamilyMemberStatus> {
        prioritize_overdue(&self.family)
    }

    /// First stat that is not "Family Bonding", in load order.
    pub fn primary_adventure_stat(&self) -> Option<&str> {
        self.stats
            .iter()
            .map(|s| s.category.as_str())
            .find(|c| !c.eq_ignore_ascii_case(FAMILY_BONDING_STAT))
    }

    pub fn ai_context(&self) -> AiContext {
        AiContext::from(self)
    }
}

/// Prompt-ready stat row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiStat {
    pub category: String,
    pub level: i32,
    pub total_xp: i64,
    pub progress_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiFamilyMember {
    pub name: String,
    pub relationship: Option<String>,
    pub age: Option<u32>,
    pub interests: Vec<String>,
    pub interaction_frequency: String,
    pub days_since_last_interaction: Option<i64>,
    pub is_overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiGoal {
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub related_stats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiTaskHistory {
    pub title: String,
    pub completed: bool,
    pub feedback: Option<String>,
    pub xp_awarded: Option<i64>,
}

/// Flattened, primitives-only view for prompt interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiContext {
    pub character_name: String,
    pub character_class: String,
    pub character_backstory: String,
    pub stats: Vec<AiStat>,
    pub family_members: Vec<AiFamilyMember>,
    pub user_goals: Vec<AiGoal>,
    pub user_projects: Vec<AiGoal>,
    pub daily_focus: Option<String>,
    pub task_history: Vec<AiTaskHistory>,
    pub preferences: Vec<String>,
    pub avoidances: Vec<String>,
    pub insights: Vec<String>,
}

impl From<&UserContext> for AiContext {
    fn from(ctx: &UserContext) -> Self {
        let plan = |title: &str, description: &Option<String>, priority: &str, stats: &[String]| AiGoal {
            title: title.to_string(),
            description: description.clone(),
            priority: priority.to_string(),
            related_stats: stats.to_vec(),
        };

        Self {
            character_name: ctx.character.name.clone(),
            character_class: ctx.character.class.clone(),
            character_backstory: ctx.character.backstory.clone(),
            stats: ctx
                .stats
                .iter()
                .map(|s| AiStat {
                    category: s.category.clone(),
                    level: s.current_level,
                    total_xp: s.total_xp,
                    progress_percent: s.progress.progress_percent.value(),
                })
                .collect(),
            family_members: ctx
                .family
                .iter()
                .map(|f| AiFamilyMember {
                    name: f.member.name.clone(),
                    relationship: f.member.relationship.clone(),
                    age: f.member.age,
                    interests: f.member.interests.clone(),
                    interaction_frequency: f.member.interaction_frequency.as_str().to_string(),
                    days_since_last_interaction: f.days_since_last_interaction,
                    is_overdue: f.is_overdue,
                })
                .collect(),
            user_goals: ctx
                .goals
                .iter()
                .map(|g| plan(&g.title, &g.description, g.priority.as_str(), &g.related_stats))
                .collect(),
            user_projects: ctx
                .projects
                .iter()
                .map(|p| plan(&p.title, &p.description, p.priority.as_str(), &p.related_stats))
                .collect(),
            daily_focus: ctx.daily_focus.as_ref().map(|f| match &f.description {
                Some(description) => format!("{}: {}", f.focus, description),
                None => f.focus.clone(),
            }),
            task_history: ctx
                .task_history
                .iter()
                .map(|t| AiTaskHistory {
                    title: t.title.clone(),
                    completed: t.completed,
                    feedback: t.feedback.clone(),
                    xp_awarded: t.xp_awarded,
                })
                .collect(),
            preferences: ctx
                .learned
                .preferences
                .iter()
                .map(|p| p.recommendation.clone())
                .collect(),
            avoidances: ctx
                .learned
                .avoidances
                .iter()
                .map(|p| p.recommendation.clone())
                .collect(),
            insights: ctx.learned.insights.clone(),
        }
    }
}

/// Both views produced by context gathering.
#[derive(Debug, Clone)]
pub struct GatheredContext {
    pub context: UserContext,
    pub ai_context: AiContext,
}

impl From<UserContext> for GatheredContext {
    fn from(context: UserContext) -> Self {
        let ai_context = AiContext::from(&context);
        Self {
            context,
            ai_context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generation::test_fixtures::context;

    #[test]
    fn primary_adventure_stat_skips_family_bonding() {
        let mut ctx = context();
        assert_eq!(ctx.primary_adventure_stat(), Some("Physical Health"));

        ctx.stats.retain(|s| s.category == FAMILY_BONDING_STAT);
        assert_eq!(ctx.primary_adventure_stat(), None);
    }

    #[test]
    fn ai_context_flattens_to_primitives() {
        let ai = context().ai_context();

        assert_eq!(ai.character_class, "Ranger");
        assert_eq!(ai.stats[0].level, 2);
        assert_eq!(ai.stats[0].progress_percent, 33);
        assert_eq!(ai.user_goals[0].priority, "high");
        assert_eq!(ai.daily_focus.as_deref(), Some("Move more"));
        assert_eq!(ai.task_history.len(), 2);

        let mia = ai.family_members.iter().find(|f| f.name == "Mia").unwrap();
        assert!(mia.is_overdue);
        assert_eq!(mia.days_since_last_interaction, Some(3));
        assert_eq!(mia.interaction_frequency, "daily");
    }

    #[test]
    fn ai_context_serializes_camel_case() {
        let json = serde_json::to_value(context().ai_context()).unwrap();
        assert_eq!(json["characterClass"], "Ranger");
        assert!(json["familyMembers"].is_array());
        assert!(json["userGoals"].is_array());
    }
}
