//! Parsing and repair of the completion service's two-task response.

use serde::Deserialize;

use crate::domain::character::FAMILY_BONDING_STAT;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::task::Task;

use super::GenerationError;

pub const MIN_ESTIMATED_XP: u32 = 15;
pub const MAX_ESTIMATED_XP: u32 = 35;
/// Used when the completion omits `estimatedXp`.
pub const DEFAULT_ESTIMATED_XP: u32 = 25;
/// Adventure stat used when the character has no non-family stat.
pub const FALLBACK_ADVENTURE_STAT: &str = "Adventure Spirit";

/// Values used to fill gaps the completion left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairHints {
    pub adventure_stat: String,
    pub overdue_member: Option<String>,
}

impl Default for RepairHints {
    fn default() -> Self {
        Self {
            adventure_stat: FALLBACK_ADVENTURE_STAT.to_string(),
            overdue_member: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTaskPair {
    #[serde(alias = "adventure_task")]
    adventure_task: RawTask,
    #[serde(alias = "family_task")]
    family_task: RawTask,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawTask {
    title: Option<String>,
    description: Option<String>,
    #[serde(alias = "target_stats")]
    target_stats: Option<Vec<String>>,
    #[serde(alias = "estimated_xp")]
    estimated_xp: Option<f64>,
    reasoning: Option<String>,
    #[serde(alias = "target_family_member")]
    target_family_member: Option<String>,
}

/// A validated task descriptor, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub target_stats: Vec<String>,
    pub estimated_xp: u32,
    pub reasoning: Option<String>,
    pub target_family_member: Option<String>,
}

impl TaskDraft {
    pub fn into_task(self, user_id: UserId, created_at: Timestamp) -> Task {
        Task::new_ai(
            user_id,
            self.title,
            self.description,
            self.target_stats,
            self.estimated_xp,
            created_at,
        )
        .with_reasoning(self.reasoning)
        .with_target_family_member(self.target_family_member)
    }

    fn has_stat(&self, name: &str) -> bool {
        self.target_stats.iter().any(|s| s.eq_ignore_ascii_case(name))
    }
}

/// The adventure and family tasks from one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTaskPair {
    pub adventure_task: TaskDraft,
    pub family_task: TaskDraft,
}

impl GeneratedTaskPair {
    /// Parses, validates and repairs a raw completion.
    ///
    /// Out-of-range XP is clamped; missing stats and family member are
    /// injected. Unparseable JSON or empty titles/descriptions fail.
    pub fn parse(raw: &str, hints: &RepairHints) -> Result<Self, GenerationError> {
        let json = extract_json(raw).ok_or_else(|| {
            GenerationError::generation_failed("Task generation response contained no JSON object")
        })?;
        let pair: RawTaskPair = serde_json::from_str(json).map_err(|e| {
            GenerationError::generation_failed(format!(
                "Failed to parse task generation response: {}",
                e
            ))
        })?;

        let mut adventure_task = validate("adventure", pair.adventure_task)?;
        let mut family_task = validate("family", pair.family_task)?;

        if adventure_task
            .target_stats
            .iter()
            .all(|s| s.eq_ignore_ascii_case(FAMILY_BONDING_STAT))
        {
            adventure_task.target_stats.insert(0, hints.adventure_stat.clone());
        }

        if !family_task.has_stat(FAMILY_BONDING_STAT) {
            family_task.target_stats.push(FAMILY_BONDING_STAT.to_string());
        }
        if family_task.target_family_member.is_none() {
            family_task.target_family_member = hints.overdue_member.clone();
        }

        Ok(Self {
            adventure_task,
            family_task,
        })
    }
}

fn validate(kind: &str, raw: RawTask) -> Result<TaskDraft, GenerationError> {
    let required = |value: Option<String>, field: &str| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                GenerationError::generation_failed(format!(
                    "Generated {} task is missing a {}",
                    kind, field
                ))
            })
    };
    let title = required(raw.title, "title")?;
    let description = required(raw.description, "description")?;

    let mut target_stats: Vec<String> = Vec::new();
    for stat in raw.target_stats.unwrap_or_default() {
        let stat = stat.trim();
        if !stat.is_empty() && !target_stats.iter().any(|s| s.eq_ignore_ascii_case(stat)) {
            target_stats.push(stat.to_string());
        }
    }

    Ok(TaskDraft {
        title,
        description,
        target_stats,
        estimated_xp: clamp_xp(raw.estimated_xp),
        reasoning: non_blank(raw.reasoning),
        target_family_member: non_blank(raw.target_family_member),
    })
}

fn clamp_xp(value: Option<f64>) -> u32 {
    match value {
        Some(xp) if xp.is_finite() => {
            xp.round().clamp(f64::from(MIN_ESTIMATED_XP), f64::from(MAX_ESTIMATED_XP)) as u32
        }
        _ => DEFAULT_ESTIMATED_XP,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Returns the outermost `{...}` span, ignoring code fences or prose around it.
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints() -> RepairHints {
        RepairHints {
            adventure_stat: "Physical Health".to_string(),
            overdue_member: Some("Grandma".to_string()),
        }
    }

    const VALID: &str = r#"{
        "adventureTask": {"title": "Trail run", "description": "Run 3 miles.", "targetStats": ["Physical Health"], "estimatedXp": 30, "reasoning": "Training for the 5k"},
        "familyTask": {"title": "Call Grandma", "description": "Ask about her garden.", "targetStats": ["Family Bonding"], "estimatedXp": 20, "reasoning": "Overdue", "targetFamilyMember": "Grandma"}
    }"#;

    #[test]
    fn parses_well_formed_response() {
        let pair = GeneratedTaskPair::parse(VALID, &hints()).unwrap();
        assert_eq!(pair.adventure_task.title, "Trail run");
        assert_eq!(pair.adventure_task.estimated_xp, 30);
        assert_eq!(pair.family_task.target_family_member.as_deref(), Some("Grandma"));
    }

    #[test]
    fn tolerates_code_fences() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert!(GeneratedTaskPair::parse(&fenced, &hints()).is_ok());
    }

    #[test]
    fn clamps_out_of_range_xp_and_defaults_missing() {
        let raw = r#"{
            "adventureTask": {"title": "A", "description": "a", "targetStats": ["Wisdom"], "estimatedXp": 500},
            "family_task": {"title": "F", "description": "f", "target_stats": ["Family Bonding"], "estimated_xp": 2}
        }"#;
        let pair = GeneratedTaskPair::parse(raw, &hints()).unwrap();
        assert_eq!(pair.adventure_task.estimated_xp, MAX_ESTIMATED_XP);
        assert_eq!(pair.family_task.estimated_xp, MIN_ESTIMATED_XP);

        let raw = r#"{
            "adventureTask": {"title": "A", "description": "a", "targetStats": ["Wisdom"]},
            "familyTask": {"title": "F", "description": "f", "targetStats": []}
        }"#;
        let pair = GeneratedTaskPair::parse(raw, &hints()).unwrap();
        assert_eq!(pair.adventure_task.estimated_xp, DEFAULT_ESTIMATED_XP);
    }

    #[test]
    fn injects_family_bonding_and_member() {
        let raw = r#"{
            "adventureTask": {"title": "A", "description": "a", "targetStats": ["Wisdom"]},
            "familyTask": {"title": "F", "description": "f", "targetStats": ["Empathy"]}
        }"#;
        let pair = GeneratedTaskPair::parse(raw, &hints()).unwrap();
        assert_eq!(pair.family_task.target_stats, vec!["Empathy", FAMILY_BONDING_STAT]);
        assert_eq!(pair.family_task.target_family_member.as_deref(), Some("Grandma"));
    }

    #[test]
    fn adventure_task_never_only_family_bonding() {
        let raw = r#"{
            "adventureTask": {"title": "A", "description": "a", "targetStats": ["Family Bonding"]},
            "familyTask": {"title": "F", "description": "f", "targetStats": ["Family Bonding"]}
        }"#;
        let pair = GeneratedTaskPair::parse(raw, &hints()).unwrap();
        assert_eq!(
            pair.adventure_task.target_stats,
            vec!["Physical Health", FAMILY_BONDING_STAT]
        );

        let raw = r#"{
            "adventureTask": {"title": "A", "description": "a"},
            "familyTask": {"title": "F", "description": "f"}
        }"#;
        let pair = GeneratedTaskPair::parse(raw, &RepairHints::default()).unwrap();
        assert_eq!(pair.adventure_task.target_stats, vec![FALLBACK_ADVENTURE_STAT]);
    }

    #[test]
    fn rejects_missing_title_or_garbage() {
        let raw = r#"{
            "adventureTask": {"title": "  ", "description": "a"},
            "familyTask": {"title": "F", "description": "f"}
        }"#;
        assert!(matches!(
            GeneratedTaskPair::parse(raw, &hints()),
            Err(GenerationError::GenerationFailed(msg)) if msg.contains("adventure task is missing a title")
        ));
        assert!(matches!(
            GeneratedTaskPair::parse("Sorry, I cannot help with that.", &hints()),
            Err(GenerationError::GenerationFailed(_))
        ));
        assert!(matches!(
            GeneratedTaskPair::parse(r#"{"adventureTask": {}}"#, &hints()),
            Err(GenerationError::GenerationFailed(_))
        ));
    }
}
