//! Outdoor-friendliness rules applied to current conditions.

use serde::{Deserialize, Serialize};

use super::CurrentWeather;

const FREEZING_F: f64 = 32.0;
const HOT_F: f64 = 95.0;
const COMFORT_RANGE_F: (f64, f64) = (60.0, 80.0);
const WINDY_MPH: f64 = 20.0;

const PRECIPITATION_KEYWORDS: &[&str] = &["rain", "storm", "thunder", "drizzle", "snow", "sleet"];
const LOW_VISIBILITY_KEYWORDS: &[&str] = &["fog", "mist", "haze", "smoke"];
const FAIR_KEYWORDS: &[&str] = &["clear", "sun"];

/// Current weather plus the activity advice derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherContext {
    pub current: CurrentWeather,
    pub is_outdoor_friendly: bool,
    pub recommended_activities: Vec<String>,
    pub avoid_activities: Vec<String>,
    pub ai_task_suggestions: Vec<String>,
}

impl WeatherContext {
    /// Scores conditions and derives advice.
    ///
    /// Extreme temperature, precipitation, poor visibility and strong wind
    /// lower the score; clear skies and a comfortable temperature raise it.
    /// Conditions are outdoor-friendly when the score is non-negative.
    pub fn interpret(current: CurrentWeather) -> Self {
        let condition = format!("{} {}", current.condition, current.description).to_lowercase();
        let has_any = |words: &[&str]| words.iter().any(|w| condition.contains(w));

        let too_cold = current.temperature_f < FREEZING_F;
        let too_hot = current.temperature_f > HOT_F;
        let wet = has_any(PRECIPITATION_KEYWORDS);
        let low_visibility = has_any(LOW_VISIBILITY_KEYWORDS);
        let windy = current.wind_speed_mph > WINDY_MPH;
        let fair = has_any(FAIR_KEYWORDS);
        let comfortable = (COMFORT_RANGE_F.0..=COMFORT_RANGE_F.1).contains(&current.temperature_f);

        let mut score: i32 = 0;
        if too_cold || too_hot {
            score -= 3;
        }
        if wet {
            score -= 2;
        }
        if low_visibility {
            score -= 1;
        }
        if windy {
            score -= 1;
        }
        if fair {
            score += 1;
        }
        if comfortable {
            score += 1;
        }
        let is_outdoor_friendly = score >= 0;

        let mut recommended = Vec::new();
        let mut avoid = Vec::new();
        let mut suggestions = Vec::new();

        if is_outdoor_friendly {
            recommended.extend(["walking", "hiking", "outdoor sports", "gardening"].map(String::from));
            suggestions.push("Plan an outdoor activity to make the most of the weather".to_string());
            if comfortable && fair {
                suggestions.push("Suggest a picnic or park visit with family".to_string());
            }
        } else {
            recommended.extend(["reading", "cooking", "board games", "indoor workout"].map(String::from));
            suggestions.push("Favor indoor tasks today".to_string());
        }

        if too_cold {
            avoid.push("long outdoor exposure".to_string());
            suggestions.push("Bundle up or keep outdoor time short; it is below freezing".to_string());
        }
        if too_hot {
            avoid.push("strenuous outdoor exercise".to_string());
            suggestions.push("Stay hydrated and avoid midday heat".to_string());
        }
        if wet {
            avoid.push("outdoor sports".to_string());
            suggestions.push("Try a cozy indoor project while it is wet outside".to_string());
        }
        if windy {
            avoid.push("cycling".to_string());
        }
        if low_visibility {
            avoid.push("driving long distances".to_string());
        }
        recommended.retain(|activity| !avoid.contains(activity));

        Self {
            current,
            is_outdoor_friendly,
            recommended_activities: recommended,
            avoid_activities: avoid,
            ai_task_suggestions: suggestions,
        }
    }

    /// One-line summary for prompts.
    pub fn summary(&self) -> String {
        format!(
            "{:.0}°F, {} ({}), wind {:.0} mph; {}",
            self.current.temperature_f,
            self.current.condition,
            self.current.description,
            self.current.wind_speed_mph,
            if self.is_outdoor_friendly {
                "good for outdoor activities"
            } else {
                "better suited to indoor activities"
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn weather(temperature_f: f64, condition: &str, wind_speed_mph: f64) -> CurrentWeather {
        CurrentWeather {
            location: "94110".to_string(),
            temperature_f,
            feels_like_f: temperature_f,
            condition: condition.to_string(),
            description: condition.to_lowercase(),
            wind_speed_mph,
            humidity: 50,
            observed_at: Timestamp::now(),
        }
    }

    #[test]
    fn clear_mild_day_is_outdoor_friendly() {
        let ctx = WeatherContext::interpret(weather(72.0, "Clear", 5.0));
        assert!(ctx.is_outdoor_friendly);
        assert!(ctx.recommended_activities.contains(&"hiking".to_string()));
        assert!(ctx.avoid_activities.is_empty());
        assert_eq!(ctx.ai_task_suggestions.len(), 2);
    }

    #[test]
    fn freezing_is_never_outdoor_friendly() {
        let ctx = WeatherContext::interpret(weather(20.0, "Clear", 0.0));
        assert!(!ctx.is_outdoor_friendly);
        assert!(ctx.avoid_activities.contains(&"long outdoor exposure".to_string()));
    }

    #[test]
    fn extreme_heat_is_not_outdoor_friendly() {
        assert!(!WeatherContext::interpret(weather(101.0, "Clear", 0.0)).is_outdoor_friendly);
    }

    #[test]
    fn rain_reduces_friendliness() {
        let ctx = WeatherContext::interpret(weather(55.0, "Rain", 5.0));
        assert!(!ctx.is_outdoor_friendly);
        assert!(ctx.avoid_activities.contains(&"outdoor sports".to_string()));
        assert!(!ctx.recommended_activities.contains(&"outdoor sports".to_string()));
    }

    #[test]
    fn wind_alone_on_cloudy_day_tips_the_balance() {
        assert!(WeatherContext::interpret(weather(50.0, "Clouds", 10.0)).is_outdoor_friendly);
        assert!(!WeatherContext::interpret(weather(50.0, "Clouds", 25.0)).is_outdoor_friendly);
    }
}
