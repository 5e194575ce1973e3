//! Explanation generation for personalized recommendations.
//!
//! Converts scoring signals (past interactions, favorite cuisines, time of
//! day, weather) into short human-readable insights that are appended to
//! the oracle's reason for each result.

use serde::{Deserialize, Serialize};
use smartdine_model::{TimeSlot, WeatherCondition, WeatherReading};
use std::fmt;

/// Reason attached to keyword fallback results.
pub const KEYWORD_MATCH_REASON: &str = "Keyword match";

/// Reason attached to similar-cuisine expansion results.
pub const SIMILAR_CUISINE_REASON: &str = "Similar cuisine to your top picks";

/// Analysis shown when the oracle could not be reached.
pub const ORACLE_UNAVAILABLE_ANALYSIS: &str = "⚠️ AI Busy (Rate Limit) - Showing keyword matches.";

/// Analysis shown when the oracle answered with no usable picks.
pub const NO_ORACLE_MATCHES_ANALYSIS: &str = "No AI matches found. Showing similar options.";

/// One personalized insight about a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    BadExperience,
    Posted,
    PostedTimes { count: u32 },
    Interacted,
    CommentedPositively,
    Liked,
    MatchesPreferences,
    LovesCuisines { cuisines: Vec<String> },
    EnjoyedDish { dish: String },
    FoodPreferences,
    Breakfast,
    Dinner,
    OpenLate,
    RainyDelivery,
    CoolTreats,
    WarmComfort,
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadExperience => f.write_str("⚠️ You had a bad experience here before"),
            Self::Posted => f.write_str("You posted about this place"),
            Self::PostedTimes { count } => write!(f, "You posted about this {} times", count),
            Self::Interacted => f.write_str("You've interacted with this place before"),
            Self::CommentedPositively => f.write_str("You commented positively about this place"),
            Self::Liked => f.write_str("You liked a post about this place"),
            Self::MatchesPreferences => f.write_str("This matches your preferences"),
            Self::LovesCuisines { cuisines } => write!(f, "You love {} cuisine", cuisines.join(", ")),
            Self::EnjoyedDish { dish } => write!(f, "You've enjoyed {} before", dish),
            Self::FoodPreferences => f.write_str("Based on your food preferences"),
            Self::Breakfast => f.write_str("Perfect for breakfast"),
            Self::Dinner => f.write_str("Great for dinner"),
            Self::OpenLate => f.write_str("Open late for you"),
            Self::RainyDelivery => f.write_str("Delivery available for rainy weather"),
            Self::CoolTreats => f.write_str("Cool treats for hot weather"),
            Self::WarmComfort => f.write_str("Warm comfort food"),
        }
    }
}

/// Describe how the user interacted with a restaurant, from its positive frequency weight.
///
/// Own posts weigh 2, positive comments 2, likes 1 and neutral comments 0.5,
/// so the weight hints at which interactions happened. Returns `None` for
/// weights of zero or below.
pub fn interaction_narrative(weight: f64) -> Option<Insight> {
    if weight <= 0.0 {
        return None;
    }
    let insight = if weight == 2.0 {
        Insight::Posted
    } else if weight > 2.0 && weight % 2.0 == 0.0 {
        Insight::PostedTimes {
            count: (weight / 2.0).floor() as u32,
        }
    } else if weight >= 2.0 {
        Insight::Interacted
    } else if weight >= 1.5 {
        Insight::CommentedPositively
    } else if weight == 1.0 {
        Insight::Liked
    } else {
        Insight::MatchesPreferences
    };
    Some(insight)
}

/// Time-of-day insight; afternoon never produces one.
pub fn time_insight(time_of_day: TimeSlot, time_score: i32) -> Option<Insight> {
    match time_of_day {
        TimeSlot::Morning if time_score > 10 => Some(Insight::Breakfast),
        TimeSlot::Evening if time_score > 10 => Some(Insight::Dinner),
        TimeSlot::Night if time_score > 15 => Some(Insight::OpenLate),
        _ => None,
    }
}

/// Weather insight for a strong weather boost.
pub fn weather_insight(weather: &WeatherReading, weather_score: i32) -> Option<Insight> {
    if weather_score <= 10 {
        return None;
    }
    if weather.condition == WeatherCondition::Rain {
        Some(Insight::RainyDelivery)
    } else if weather.temperature > 30.0 {
        Some(Insight::CoolTreats)
    } else if weather.temperature < 20.0 {
        Some(Insight::WarmComfort)
    } else {
        None
    }
}

/// Combine the oracle's reason with personalized insights: "Reason. A. B."
pub fn compose_short_reason(reason: &str, insights: &[String]) -> String {
    if insights.is_empty() {
        return reason.to_string();
    }
    format!("{}. {}.", reason, insights.join(". "))
}

/// Analysis text for a response that fell back to keyword matching.
pub fn fallback_analysis(oracle_failed: bool) -> &'static str {
    if oracle_failed {
        ORACLE_UNAVAILABLE_ANALYSIS
    } else {
        NO_ORACLE_MATCHES_ANALYSIS
    }
}

/// Reason for a restaurant found similar to a source restaurant.
pub fn similarity_reason(shared_cuisines: &[&str], shared_tags: &[String]) -> String {
    if let Some(cuisine) = shared_cuisines.first() {
        format!("Also serves {}", cuisine)
    } else if let Some(tag) = shared_tags.first() {
        format!("Matches '{}' tag", tag)
    } else {
        "Similar vibes".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_narratives() {
        let text = |w: f64| interaction_narrative(w).map(|i| i.to_string());
        assert_eq!(text(2.0).as_deref(), Some("You posted about this place"));
        assert_eq!(text(6.0).as_deref(), Some("You posted about this 3 times"));
        assert_eq!(text(3.0).as_deref(), Some("You've interacted with this place before"));
        assert_eq!(text(2.5).as_deref(), Some("You've interacted with this place before"));
        assert_eq!(text(1.5).as_deref(), Some("You commented positively about this place"));
        assert_eq!(text(1.0).as_deref(), Some("You liked a post about this place"));
        assert_eq!(text(0.5).as_deref(), Some("This matches your preferences"));
        assert_eq!(text(0.0), None);
        assert_eq!(text(-2.0), None);
    }

    #[test]
    fn test_time_insight_thresholds() {
        assert_eq!(time_insight(TimeSlot::Morning, 15), Some(Insight::Breakfast));
        assert_eq!(time_insight(TimeSlot::Morning, 10), None);
        assert_eq!(time_insight(TimeSlot::Evening, 11), Some(Insight::Dinner));
        assert_eq!(time_insight(TimeSlot::Night, 15), None);
        assert_eq!(time_insight(TimeSlot::Night, 20), Some(Insight::OpenLate));
        assert_eq!(time_insight(TimeSlot::Afternoon, 40), None);
    }

    #[test]
    fn test_weather_insight() {
        let rain = WeatherReading::new(WeatherCondition::Rain, 35.0);
        assert_eq!(weather_insight(&rain, 20), Some(Insight::RainyDelivery));
        assert_eq!(weather_insight(&rain, 10), None);

        // drizzle is wet for scoring but has no narrative of its own
        let drizzle = WeatherReading::new(WeatherCondition::Drizzle, 25.0);
        assert_eq!(weather_insight(&drizzle, 30), None);

        let hot = WeatherReading::new(WeatherCondition::Clear, 33.0);
        assert_eq!(weather_insight(&hot, 15), Some(Insight::CoolTreats));
        let cold = WeatherReading::new(WeatherCondition::Clouds, 14.0);
        assert_eq!(weather_insight(&cold, 15), Some(Insight::WarmComfort));
    }

    #[test]
    fn test_compose_short_reason() {
        assert_eq!(compose_short_reason("Cosy spot", &[]), "Cosy spot");
        let insights = vec![
            Insight::LovesCuisines {
                cuisines: vec!["South Indian".to_string(), "Cafe".to_string()],
            }
            .to_string(),
            Insight::Breakfast.to_string(),
        ];
        assert_eq!(
            compose_short_reason("Cosy spot", &insights),
            "Cosy spot. You love South Indian, Cafe cuisine. Perfect for breakfast."
        );
    }

    #[test]
    fn test_fallback_analysis() {
        assert!(fallback_analysis(true).contains("AI Busy"));
        assert_eq!(fallback_analysis(false), NO_ORACLE_MATCHES_ANALYSIS);
    }

    #[test]
    fn test_similarity_reason() {
        assert_eq!(similarity_reason(&["Chettinad"], &["spicy".to_string()]), "Also serves Chettinad");
        assert_eq!(similarity_reason(&[], &["rooftop".to_string()]), "Matches 'rooftop' tag");
        assert_eq!(similarity_reason(&[], &[]), "Similar vibes");
    }

    #[test]
    fn test_insight_serializes_with_kind() {
        let json = serde_json::to_value(Insight::PostedTimes { count: 2 }).unwrap();
        assert_eq!(json["kind"], "posted_times");
        assert_eq!(json["count"], 2);
    }
}
