//! Request and response records of the engine operations.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use smartdine_context::{Season, TimeContext};
use smartdine_model::{
    Coordinates, ScoredResult, SimilarRestaurant, TimeSlot, UserProfile, WeatherCondition,
    WeatherReading,
};

/// Number of favorites echoed back in the user summary.
const SUMMARY_FAVORITES: usize = 3;

/// A free-text recommendation request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryRequest {
    pub text: String,

    #[serde(default)]
    pub user_id: Option<String>,

    /// Where the user is; enables weather scoring and routes
    #[serde(default)]
    pub location: Option<Coordinates>,
}

impl QueryRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_location(mut self, location: Coordinates) -> Self {
        self.location = Some(location);
        self
    }

    /// User id, when present and non-blank.
    pub fn user(&self) -> Option<&str> {
        self.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSummary {
    pub current_time: String,
    pub time_of_day: TimeSlot,
    pub day_of_week: String,
    pub is_weekend: bool,
    pub season: Season,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub condition: WeatherCondition,
    /// e.g. "28°C"
    pub temperature: String,
    pub description: String,
    pub feels_like: String,
}

impl From<&WeatherReading> for WeatherSummary {
    fn from(w: &WeatherReading) -> Self {
        Self {
            condition: w.condition,
            temperature: format!("{}°C", w.temperature),
            description: w.description.clone(),
            feels_like: format!("{}°C", w.feels_like),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub favorite_cuisines: Vec<String>,
    pub favorite_restaurants: Vec<String>,
    pub total_posts: u32,
    pub total_likes: u32,
    pub total_comments: u32,
    pub most_active_time: TimeSlot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub profile_loaded: bool,

    #[serde(flatten)]
    pub stats: Option<UserStats>,
}

impl UserSummary {
    pub fn from_profile(profile: Option<&UserProfile>) -> Self {
        let stats = profile.map(|p| UserStats {
            favorite_cuisines: p.favorite_cuisines.iter().take(SUMMARY_FAVORITES).cloned().collect(),
            favorite_restaurants: p
                .favorite_restaurants
                .iter()
                .take(SUMMARY_FAVORITES)
                .cloned()
                .collect(),
            total_posts: p.total_posts,
            total_likes: p.total_likes,
            total_comments: p.total_comments,
            most_active_time: p.most_active_time,
        });
        Self {
            profile_loaded: stats.is_some(),
            stats,
        }
    }
}

/// What the engine knew about the request while scoring it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestContext {
    pub time: TimeSummary,
    pub weather: Option<WeatherSummary>,
    pub user: UserSummary,
}

impl RequestContext {
    pub fn new(
        now: DateTime<FixedOffset>,
        time: &TimeContext,
        weather: Option<&WeatherReading>,
        profile: Option<&UserProfile>,
    ) -> Self {
        Self {
            time: TimeSummary {
                current_time: now.format("%Y-%m-%d %H:%M:%S %:z").to_string(),
                time_of_day: time.time_of_day,
                day_of_week: time.day_of_week.clone(),
                is_weekend: time.is_weekend,
                season: time.season,
            },
            weather: weather.map(WeatherSummary::from),
            user: UserSummary::from_profile(profile),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub analysis: String,
    pub results: Vec<ScoredResult>,

    /// Absent when the results came from the keyword fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similar_results: Option<Vec<ScoredResult>>,

    pub context: RequestContext,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarResponse {
    /// Name of the restaurant the others are similar to
    pub source: String,
    pub similar_restaurants: Vec<SimilarRestaurant>,
}

/// Collaborator status, as reported by `Recommender::health`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub catalog: &'static str,
    pub restaurants: Option<usize>,
    pub catalog_error: Option<String>,
    pub oracle: &'static str,
    pub weather: Option<&'static str>,
    pub routing: Option<&'static str>,
    pub activity_store: Option<&'static str>,
    pub feedback_store: Option<&'static str>,
    pub cached_profiles: usize,
}

impl HealthReport {
    /// Healthy when the catalog loads; every other collaborator is optional.
    pub fn is_healthy(&self) -> bool {
        self.catalog_error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_blank_user_id_is_anonymous() {
        assert_eq!(QueryRequest::new("dosa").with_user("  ").user(), None);
        assert_eq!(QueryRequest::new("dosa").with_user("u1").user(), Some("u1"));
        assert_eq!(QueryRequest::new("dosa").user(), None);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: QueryRequest = serde_json::from_value(json!({ "text": "biryani" })).unwrap();
        assert_eq!(request, QueryRequest::new("biryani"));
    }

    #[test]
    fn test_user_summary_without_profile() {
        let summary = UserSummary::from_profile(None);
        assert_eq!(serde_json::to_value(&summary).unwrap(), json!({ "profile_loaded": false }));
    }

    #[test]
    fn test_user_summary_truncates_favorites() {
        let profile = UserProfile {
            favorite_cuisines: ["A", "B", "C", "D"].map(String::from).to_vec(),
            total_posts: 4,
            ..Default::default()
        };
        let value = serde_json::to_value(UserSummary::from_profile(Some(&profile))).unwrap();
        assert_eq!(value["profile_loaded"], json!(true));
        assert_eq!(value["favorite_cuisines"], json!(["A", "B", "C"]));
        assert_eq!(value["total_posts"], json!(4));
        assert_eq!(value["most_active_time"], json!("evening"));
    }

    #[test]
    fn test_weather_summary_formats_degrees() {
        let summary = WeatherSummary::from(&WeatherReading::new(WeatherCondition::Rain, 24.0));
        assert_eq!(summary.temperature, "24°C");
        assert_eq!(summary.feels_like, "24°C");
    }
}
