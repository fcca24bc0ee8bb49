//! Prompt construction for daily task generation.

use crate::domain::character::FAMILY_BONDING_STAT;
use crate::domain::patterns::Sentiment;
use crate::domain::weather::WeatherContext;

use super::context::UserContext;
use super::response::{MAX_ESTIMATED_XP, MIN_ESTIMATED_XP};

/// Most recent history entries quoted verbatim in the prompt.
const HISTORY_LINES: usize = 10;

const SYSTEM_PROMPT: &str = "You are the quest master of LifeQuest, a game that turns personal \
growth into an adventure. You design small, concrete, achievable real-world tasks that fit the \
player's character, goals and family. Respond with a single JSON object and no other text.";

/// System and user messages for one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    pub system: String,
    pub user: String,
}

/// Builds the two-task generation prompt.
///
/// Overdue family members are listed most-overdue first; weather is only
/// included when available.
pub fn build_prompt(ctx: &UserContext, weather: Option<&WeatherContext>) -> GenerationPrompt {
    let ai = ctx.ai_context();
    let mut out = String::new();

    out.push_str("## Character\n");
    out.push_str(&format!("Name: {}\n", ai.character_name));
    out.push_str(&format!("Class: {}\n", ai.character_class));
    if !ai.character_backstory.trim().is_empty() {
        out.push_str(&format!("Backstory: {}\n", ai.character_backstory));
    }

    if !ai.stats.is_empty() {
        out.push_str("\n## Stats\n");
        for stat in &ai.stats {
            out.push_str(&format!(
                "- {}: level {} ({}% toward next level)\n",
                stat.category, stat.level, stat.progress_percent
            ));
        }
    }

    if !ai.user_goals.is_empty() {
        out.push_str("\n## Active goals\n");
        for goal in &ai.user_goals {
            out.push_str(&format!("- [{}] {}", goal.priority, goal.title));
            if !goal.related_stats.is_empty() {
                out.push_str(&format!(" (stats: {})", goal.related_stats.join(", ")));
            }
            out.push('\n');
        }
    }

    if !ai.user_projects.is_empty() {
        out.push_str("\n## Active projects\n");
        for project in &ai.user_projects {
            out.push_str(&format!("- [{}] {}\n", project.priority, project.title));
        }
    }

    let overdue = ctx.overdue_family();
    if !overdue.is_empty() {
        out.push_str("\n## Family members who need attention (most overdue first)\n");
        for status in &overdue {
            let member = &status.member;
            out.push_str(&format!("- {}", member.name));
            if let Some(relationship) = &member.relationship {
                out.push_str(&format!(" ({})", relationship));
            }
            if let Some(age) = member.age {
                out.push_str(&format!(", age {}", age));
            }
            match status.days_since_last_interaction {
                Some(days) => out.push_str(&format!(": {} days since last interaction", days)),
                None => out.push_str(": no recorded interaction yet"),
            }
            if !member.interests.is_empty() {
                out.push_str(&format!("; interests: {}", member.interests.join(", ")));
            }
            out.push('\n');
        }
    }

    let up_to_date: Vec<&str> = ai
        .family_members
        .iter()
        .filter(|f| !f.is_overdue)
        .map(|f| f.name.as_str())
        .collect();
    if !up_to_date.is_empty() {
        out.push_str(&format!("\n## Other family members\n{}\n", up_to_date.join(", ")));
    }

    if let Some(focus) = &ai.daily_focus {
        out.push_str(&format!("\n## Today's focus\n{}\n", focus));
    }

    if !ctx.task_history.is_empty() {
        out.push_str("\n## Recent tasks\n");
        out.push_str(&history_summary(ctx));
        out.push('\n');
        // History is oldest first; quote the tail.
        let skip = ai.task_history.len().saturating_sub(HISTORY_LINES);
        for entry in ai.task_history.iter().skip(skip) {
            let state = if entry.completed { "completed" } else { "not completed" };
            out.push_str(&format!("- {} ({})", entry.title, state));
            if let Some(feedback) = entry.feedback.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
                out.push_str(&format!(": \"{}\"", feedback));
            }
            out.push('\n');
        }
    }

    if !ai.preferences.is_empty() || !ai.avoidances.is_empty() || !ai.insights.is_empty() {
        out.push_str("\n## What we have learned about this player\n");
        for line in ai.preferences.iter().chain(&ai.avoidances).chain(&ai.insights) {
            out.push_str(&format!("- {}\n", line));
        }
    }

    if let Some(weather) = weather {
        out.push_str(&format!("\n## Weather today\n{}\n", weather.summary()));
        for suggestion in &weather.ai_task_suggestions {
            out.push_str(&format!("- {}\n", suggestion));
        }
        if !weather.avoid_activities.is_empty() {
            out.push_str(&format!("Avoid: {}\n", weather.avoid_activities.join(", ")));
        }
    }

    out.push_str("\n## Instructions\nCreate exactly two tasks for today.\n");
    out.push_str(&format!(
        "1. adventureTask: advances the player's goals or class. Its targetStats must include \
         at least one stat other than \"{}\".\n",
        FAMILY_BONDING_STAT
    ));
    out.push_str(&format!(
        "2. familyTask: strengthens a family relationship. Its targetStats must include \"{}\".",
        FAMILY_BONDING_STAT
    ));
    if let Some(status) = overdue.first() {
        out.push_str(&format!(
            " Set targetFamilyMember to an overdue family member, preferably {}.",
            status.member.name
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "Each task needs a short title, a one or two sentence description, targetStats, \
         estimatedXp between {} and {}, and a one sentence reasoning.\n",
        MIN_ESTIMATED_XP, MAX_ESTIMATED_XP
    ));
    out.push_str(&format!(
        "\nRespond with JSON of the form:\n\
         {{\"adventureTask\": {{\"title\": \"\", \"description\": \"\", \"targetStats\": [], \
         \"estimatedXp\": 25, \"reasoning\": \"\"}}, \
         \"familyTask\": {{\"title\": \"\", \"description\": \"\", \"targetStats\": [\"{}\"], \
         \"estimatedXp\": 25, \"reasoning\": \"\", \"targetFamilyMember\": \"\"}}}}\n",
        FAMILY_BONDING_STAT
    ));

    GenerationPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user: out,
    }
}

/// Completion rate and feedback polarity over the loaded history.
fn history_summary(ctx: &UserContext) -> String {
    let total = ctx.task_history.len();
    let completed = ctx.task_history.iter().filter(|t| t.completed).count();
    let count = |wanted: Sentiment| {
        ctx.task_history
            .iter()
            .filter(|t| t.sentiment == Some(wanted))
            .count()
    };
    format!(
        "{} of {} recent tasks completed. Feedback: {} positive, {} neutral, {} negative.",
        completed,
        total,
        count(Sentiment::Positive),
        count(Sentiment::Neutral),
        count(Sentiment::Negative)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generation::test_fixtures::context;
    use crate::domain::weather::{CurrentWeather, WeatherContext};
    use crate::domain::foundation::{TaskId, Timestamp};
    use crate::domain::generation::TaskHistoryEntry;

    #[test]
    fn prompt_lists_overdue_family_most_overdue_first() {
        let prompt = build_prompt(&context(), None);

        let grandma = prompt.user.find("- Grandma").unwrap();
        let mia = prompt.user.find("- Mia").unwrap();
        assert!(grandma < mia, "never-contacted member should come first");
        assert!(prompt.user.contains("preferably Grandma"));
    }

    #[test]
    fn prompt_carries_character_goals_and_focus() {
        let prompt = build_prompt(&context(), None);

        assert!(prompt.user.contains("Class: Ranger"));
        assert!(prompt.user.contains("- [high] Run a 5k (stats: Physical Health)"));
        assert!(prompt.user.contains("## Today's focus\nMove more"));
        assert!(prompt.user.contains("1 of 2 recent tasks completed"));
        assert!(!prompt.user.contains("## Weather today"));
    }

    #[test]
    fn prompt_requires_family_bonding_on_family_task() {
        let prompt = build_prompt(&context(), None);
        assert!(prompt
            .user
            .contains("familyTask: strengthens a family relationship. Its targetStats must include \"Family Bonding\""));
        assert!(prompt.user.contains("between 15 and 35"));
    }

    #[test]
    fn prompt_includes_weather_when_available() {
        let weather = WeatherContext::interpret(CurrentWeather {
            location: "94110".to_string(),
            temperature_f: 70.0,
            feels_like_f: 70.0,
            condition: "Clear".to_string(),
            description: "clear sky".to_string(),
            wind_speed_mph: 3.0,
            humidity: 40,
            observed_at: Timestamp::now(),
        });

        let prompt = build_prompt(&context(), Some(&weather));
        assert!(prompt.user.contains("## Weather today\n70°F, Clear"));
        assert!(prompt.user.contains("picnic"));
    }

    #[test]
    fn prompt_quotes_the_most_recent_history() {
        let mut ctx = context();
        ctx.task_history = (0..12)
            .map(|i| TaskHistoryEntry {
                task_id: TaskId::new(),
                title: format!("Task-{:02}", i),
                completed: true,
                feedback: None,
                xp_awarded: Some(20),
                sentiment: None,
            })
            .collect();

        let prompt = build_prompt(&ctx, None);

        assert!(prompt.user.contains("- Task-11 (completed)"));
        assert!(prompt.user.contains("- Task-02 (completed)"));
        assert!(!prompt.user.contains("- Task-01 "));
        assert!(!prompt.user.contains("- Task-00 "));
        assert!(prompt.user.find("Task-02").unwrap() < prompt.user.find("Task-11").unwrap());
    }
}
