use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Coordinates, Restaurant};

/// Coarse weather condition, as reported by the weather provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
}

impl WeatherCondition {
    pub fn is_wet(self) -> bool {
        matches!(self, Self::Rain | Self::Drizzle)
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Current weather at a location. Temperatures in °C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub condition: WeatherCondition,
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
}

impl WeatherReading {
    pub fn new(condition: WeatherCondition, temperature: f64) -> Self {
        Self {
            condition,
            description: condition.to_string().to_lowercase(),
            temperature,
            feels_like: temperature,
            humidity: 0.0,
        }
    }
}

/// Travel distance and time from the user to a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// e.g. "3.4 km"
    pub distance: String,
    /// e.g. "12 mins"
    pub trip_duration: String,
}

/// A standalone route lookup between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDetails {
    pub distance_km: f64,
    pub duration_min: i64,
    /// GeoJSON `LineString` of the path, as the router returned it
    pub route_geojson: serde_json::Value,
    /// e.g. "3.4 km · 12 min drive"
    pub summary: String,
}

impl RouteDetails {
    /// Build from raw router units (meters, seconds).
    pub fn new(distance_m: f64, duration_s: f64, route_geojson: serde_json::Value) -> Self {
        let distance_km = (distance_m / 100.0).round() / 10.0;
        let duration_min = (duration_s / 60.0).round() as i64;
        Self {
            distance_km,
            duration_min,
            route_geojson,
            summary: format!("{:.1} km · {} min drive", distance_km, duration_min),
        }
    }
}

/// One candidate picked by the ranking oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRecommendation {
    pub id: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_item: Option<String>,
}

/// Models sometimes send `null` where a string belongs.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// What the ranking oracle returned for a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OracleResponse {
    /// Short read of the user's mood or craving
    #[serde(default)]
    pub analysis: String,

    #[serde(default)]
    pub recommendations: Vec<OracleRecommendation>,
}

/// A ranked recommendation with its score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub restaurant: Restaurant,

    pub short_reason: String,

    pub suggested_item: Option<String>,

    pub ai_score: f64,
    pub user_score: f64,
    pub time_score: i32,
    pub weather_score: i32,
    pub final_score: i64,

    /// Personal reasons, in the order they were generated
    pub personalized_insights: Vec<String>,

    #[serde(flatten)]
    pub route: Option<RouteSummary>,
}

impl ScoredResult {
    /// An unscored result carrying only a reason.
    pub fn unscored(restaurant: Restaurant, short_reason: impl Into<String>) -> Self {
        Self {
            restaurant,
            short_reason: short_reason.into(),
            suggested_item: None,
            ai_score: 0.0,
            user_score: 0.0,
            time_score: 0,
            weather_score: 0,
            final_score: 0,
            personalized_insights: Vec::new(),
            route: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.restaurant.id
    }
}

/// A restaurant found similar to a given source restaurant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarRestaurant {
    #[serde(flatten)]
    pub restaurant: Restaurant,

    /// `2 * shared cuisines + shared tags + 0.5 for same price level`
    pub score: f64,

    /// Shared tags, in the candidate's tag order
    pub match_reasons: Vec<String>,

    pub short_reason: String,

    pub suggested_item: Option<String>,

    #[serde(flatten)]
    pub route: Option<RouteSummary>,
}

/// Anything that can be enriched with a route from the user.
pub trait Routable {
    fn destination(&self) -> Option<Coordinates>;

    fn attach_route(&mut self, route: RouteSummary);
}

impl Routable for ScoredResult {
    fn destination(&self) -> Option<Coordinates> {
        self.restaurant.coordinates
    }

    fn attach_route(&mut self, route: RouteSummary) {
        self.route = Some(route);
    }
}

impl Routable for SimilarRestaurant {
    fn destination(&self) -> Option<Coordinates> {
        self.restaurant.coordinates
    }

    fn attach_route(&mut self, route: RouteSummary) {
        self.route = Some(route);
    }
}
