//! Core domain model for SmartDine restaurant recommendations.
//!
//! Records shared by every SmartDine crate:
//! - `Restaurant` / `Catalog`: the read-only restaurant snapshot
//! - `EntityMatch`, `DishMatch`, `SentimentResult`: text extraction output
//! - `UserActivity` / `UserProfile`: social activity and the taste profile built from it
//! - `ScoredResult`, `SimilarRestaurant`: ranked output records
//! - `WeatherReading`, `RouteSummary`, `RouteDetails`, `OracleResponse`: collaborator payloads
//! - `FeedbackEntry`: a recorded like or dislike of a recommendation

use serde::{Deserialize, Serialize};
use std::fmt;

mod activity;
mod entities;
mod feedback;
mod frequency;
mod results;

pub use activity::{Comment, Post, TimeSlot, TimeSlots, UserActivity, UserProfile};
pub use entities::{DishMatch, EntityMatch, ExtractedEntities, MatchType, Sentiment, SentimentResult};
pub use feedback::FeedbackEntry;
pub use frequency::FrequencyMap;
pub use results::{
    OracleRecommendation, OracleResponse, Routable, RouteDetails, RouteSummary, ScoredResult,
    SimilarRestaurant, WeatherCondition, WeatherReading,
};

/// Price band of a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceLevel {
    Budget,
    #[serde(alias = "mid-range", alias = "medium")]
    Moderate,
    Expensive,
    #[serde(other)]
    Unknown,
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self::Unknown
    }
}

impl From<&str> for PriceLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "budget" => Self::Budget,
            "moderate" | "mid-range" | "medium" => Self::Moderate,
            "expensive" => Self::Expensive,
            _ => Self::Unknown,
        }
    }
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// A highlighted dish on a restaurant's menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,

    #[serde(default)]
    pub price: f64,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// A restaurant record from the catalog.
///
/// `id` and `name` are required; everything else defaults when absent so a
/// sparse catalog entry still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Unique catalog identifier (e.g. "r010")
    pub id: String,

    pub name: String,

    /// Cuisine labels, in catalog order
    #[serde(default)]
    pub cuisines: Vec<String>,

    /// Free-form tags such as "delivery", "rooftop", "fine-dining"
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub price_level: PriceLevel,

    #[serde(default)]
    pub rating: f32,

    /// Human-readable opening hours (e.g. "07:00 - 23:00")
    #[serde(default)]
    pub opening_hours: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,

    #[serde(default)]
    pub menu_highlights: Vec<MenuItem>,

    #[serde(default)]
    pub description: String,
}

impl Restaurant {
    /// Create a minimal record for testing.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cuisines: Vec::new(),
            tags: Vec::new(),
            price_level: PriceLevel::Unknown,
            rating: 0.0,
            opening_hours: String::new(),
            coordinates: None,
            menu_highlights: Vec::new(),
            description: String::new(),
        }
    }

    pub fn with_cuisines(mut self, cuisines: &[&str]) -> Self {
        self.cuisines = cuisines.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_menu(mut self, dishes: &[&str]) -> Self {
        self.menu_highlights = dishes.iter().map(|d| MenuItem::new(*d, 0.0)).collect();
        self
    }

    pub fn with_price_level(mut self, price_level: PriceLevel) -> Self {
        self.price_level = price_level;
        self
    }

    pub fn with_opening_hours(mut self, hours: impl Into<String>) -> Self {
        self.opening_hours = hours.into();
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.coordinates = Some(Coordinates::new(lat, lon));
        self
    }

    /// Exact (case-sensitive) tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Exact (case-sensitive) cuisine membership.
    pub fn has_cuisine(&self, cuisine: &str) -> bool {
        self.cuisines.iter().any(|c| c == cuisine)
    }

    /// Name of the first highlighted dish, if any.
    pub fn first_highlight(&self) -> Option<&str> {
        self.menu_highlights.first().map(|m| m.name.as_str())
    }
}

/// An immutable, ordered snapshot of the restaurant catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    restaurants: Vec<Restaurant>,
}

impl Catalog {
    pub fn new(restaurants: Vec<Restaurant>) -> Self {
        Self { restaurants }
    }

    /// Look up a restaurant by id. The first entry wins on duplicate ids.
    pub fn get(&self, id: &str) -> Option<&Restaurant> {
        self.restaurants.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Restaurant> {
        self.restaurants.iter()
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    /// Distinct cuisine labels in first-seen order.
    pub fn cuisines(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for cuisine in self.restaurants.iter().flat_map(|r| r.cuisines.iter()) {
            if !seen.contains(&cuisine.as_str()) {
                seen.push(cuisine);
            }
        }
        seen
    }
}

impl From<Vec<Restaurant>> for Catalog {
    fn from(restaurants: Vec<Restaurant>) -> Self {
        Self::new(restaurants)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Restaurant;
    type IntoIter = std::slice::Iter<'a, Restaurant>;

    fn into_iter(self) -> Self::IntoIter {
        self.restaurants.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_level_from_str() {
        assert_eq!(PriceLevel::from("Budget"), PriceLevel::Budget);
        assert_eq!(PriceLevel::from("mid-range"), PriceLevel::Moderate);
        assert_eq!(PriceLevel::from("EXPENSIVE"), PriceLevel::Expensive);
        assert_eq!(PriceLevel::from("luxury"), PriceLevel::Unknown);
    }

    #[test]
    fn test_restaurant_deserialization_with_defaults() {
        let json = r#"{
            "id": "r001",
            "name": "Cream Centre (Coimbatore)",
            "cuisines": ["North Indian", "Desserts"],
            "price_level": "moderate",
            "rating": 4.3,
            "coordinates": { "lat": 11.0168, "lon": 76.9558 },
            "menu_highlights": [{ "name": "Sizzling Brownie", "price": 240 }]
        }"#;

        let restaurant: Restaurant = serde_json::from_str(json).unwrap();
        assert_eq!(restaurant.id, "r001");
        assert_eq!(restaurant.price_level, PriceLevel::Moderate);
        assert!(restaurant.tags.is_empty());
        assert_eq!(restaurant.first_highlight(), Some("Sizzling Brownie"));
        assert_eq!(restaurant.coordinates, Some(Coordinates::new(11.0168, 76.9558)));
    }

    #[test]
    fn test_restaurant_requires_id() {
        let json = r#"{ "name": "Nameless" }"#;
        assert!(serde_json::from_str::<Restaurant>(json).is_err());
    }

    #[test]
    fn test_unknown_price_level_deserializes() {
        let json = r#"{ "id": "r1", "name": "X", "price_level": "premium" }"#;
        let restaurant: Restaurant = serde_json::from_str(json).unwrap();
        assert_eq!(restaurant.price_level, PriceLevel::Unknown);
    }

    #[test]
    fn test_catalog_cuisines_are_distinct_in_order() {
        let catalog = Catalog::new(vec![
            Restaurant::new("r1", "A").with_cuisines(&["South Indian", "Cafe"]),
            Restaurant::new("r2", "B").with_cuisines(&["Cafe", "Desserts"]),
        ]);
        assert_eq!(catalog.cuisines(), vec!["South Indian", "Cafe", "Desserts"]);
        assert!(catalog.contains("r2"));
        assert!(catalog.get("r3").is_none());
    }
}
