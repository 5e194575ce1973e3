//! Re-ranking and scoring for restaurant recommendations.
//!
//! Takes the oracle's candidate picks and applies personal, time and
//! weather scoring to produce ranked results with explanations. Also
//! provides the non-oracle paths: keyword fallback, similar-cuisine
//! expansion, standalone "restaurants like this one" and catalog browsing.

use smartdine_context::{ContextScores, TimeContext};
use smartdine_explain::{
    compose_short_reason, interaction_narrative, similarity_reason, time_insight, weather_insight,
    Insight, KEYWORD_MATCH_REASON, SIMILAR_CUISINE_REASON,
};
use smartdine_model::{
    Catalog, OracleResponse, Restaurant, ScoredResult, SimilarRestaurant, UserProfile,
    WeatherReading,
};
use smartdine_query::DietaryIntent;
use std::cmp::Ordering;
use std::collections::HashSet;
use thiserror::Error;

pub mod discover;

pub use discover::{discover, interaction_status, DiscoverPage, DiscoverRequest, InteractionStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RerankError {
    #[error("Restaurant not found: {0}")]
    NotFound(String),
}

/// Configuration for the re-ranker.
#[derive(Debug, Clone)]
pub struct RerankConfig {
    /// Base score of every oracle pick
    pub ai_score: f64,
    pub ai_weight: f64,
    pub user_weight: f64,
    pub time_weight: f64,
    pub weather_weight: f64,
    /// User score for a restaurant the user felt negatively about
    pub negative_penalty: f64,
    /// Bonus for a restaurant the user interacted with positively
    pub interaction_bonus: f64,
    /// Bonus per favorite cuisine served
    pub cuisine_bonus: f64,
    /// Bonus per favorite dish in the suggested item
    pub dish_bonus: f64,
    /// Total activity from which a generic insight is added
    pub active_user_threshold: u32,
    pub fallback_limit: usize,
    pub similar_results_limit: usize,
    pub similar_restaurants_limit: usize,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            ai_score: 50.0,
            ai_weight: 0.4,
            user_weight: 0.3,
            time_weight: 0.15,
            weather_weight: 0.15,
            negative_penalty: -50.0,
            interaction_bonus: 40.0,
            cuisine_bonus: 15.0,
            dish_bonus: 10.0,
            active_user_threshold: 10,
            fallback_limit: 3,
            similar_results_limit: 6,
            similar_restaurants_limit: 5,
        }
    }
}

/// Everything known about the request besides the oracle's picks.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInputs<'a> {
    pub catalog: &'a Catalog,
    pub time: &'a TimeContext,
    pub weather: Option<&'a WeatherReading>,
    pub context_scores: &'a ContextScores,
    /// Present only when the request names a user
    pub profile: Option<&'a UserProfile>,
}

/// Score the oracle's picks and rank them, highest `final_score` first.
///
/// Picks whose id is not in the catalog are dropped. Equal scores keep the
/// oracle's order.
pub fn merge_recommendations(
    oracle: &OracleResponse,
    inputs: &ScoringInputs<'_>,
    config: &RerankConfig,
) -> Vec<ScoredResult> {
    let mut results: Vec<ScoredResult> = oracle
        .recommendations
        .iter()
        .filter_map(|rec| {
            let restaurant = inputs.catalog.get(&rec.id)?;

            let (user_score, mut insights) = match inputs.profile {
                Some(profile) => {
                    user_affinity(profile, restaurant, rec.suggested_item.as_deref(), config)
                }
                None => (0.0, Vec::new()),
            };

            let scores = inputs.context_scores.get(&restaurant.id);
            insights.extend(time_insight(inputs.time.time_of_day, scores.time));
            if let Some(weather) = inputs.weather {
                insights.extend(weather_insight(weather, scores.weather));
            }

            let personalized_insights: Vec<String> = insights.iter().map(Insight::to_string).collect();

            Some(ScoredResult {
                restaurant: restaurant.clone(),
                short_reason: compose_short_reason(&rec.reason, &personalized_insights),
                suggested_item: rec.suggested_item.clone(),
                ai_score: config.ai_score,
                user_score,
                time_score: scores.time,
                weather_score: scores.weather,
                final_score: final_score(config.ai_score, user_score, scores.time, scores.weather, config),
                personalized_insights,
                route: None,
            })
        })
        .collect();

    // Stable: equal scores keep oracle order
    results.sort_by(|a, b| b.final_score.cmp(&a.final_score));
    results
}

/// Weighted blend of the four component scores, rounded half up.
pub fn final_score(ai: f64, user: f64, time: i32, weather: i32, config: &RerankConfig) -> i64 {
    let blended = ai * config.ai_weight
        + user * config.user_weight
        + f64::from(time) * config.time_weight
        + f64::from(weather) * config.weather_weight;
    (blended + 0.5).floor() as i64
}

/// Personal score and insights for one restaurant.
///
/// A negative history pins the score to the penalty and skips every bonus.
pub fn user_affinity(
    profile: &UserProfile,
    restaurant: &Restaurant,
    suggested_item: Option<&str>,
    config: &RerankConfig,
) -> (f64, Vec<Insight>) {
    let weight = profile.restaurant_frequency.weight(&restaurant.id);
    if weight < 0.0 {
        return (config.negative_penalty, vec![Insight::BadExperience]);
    }

    let mut score = 0.0;
    let mut insights = Vec::new();

    if weight > 0.0 {
        score += config.interaction_bonus;
        insights.extend(interaction_narrative(weight));
    }

    let cuisines: Vec<String> = restaurant
        .cuisines
        .iter()
        .filter(|c| profile.favorite_cuisines.contains(c))
        .cloned()
        .collect();
    if !cuisines.is_empty() {
        score += cuisines.len() as f64 * config.cuisine_bonus;
        insights.push(Insight::LovesCuisines { cuisines });
    }

    let suggested = suggested_item.unwrap_or_default().to_lowercase();
    let dishes: Vec<&String> = profile
        .favorite_dishes
        .iter()
        .filter(|d| suggested.contains(&d.to_lowercase()))
        .collect();
    if let Some(first) = dishes.first() {
        score += dishes.len() as f64 * config.dish_bonus;
        insights.push(Insight::EnjoyedDish {
            dish: (*first).clone(),
        });
    }

    if profile.total_activity() >= config.active_user_threshold && insights.is_empty() {
        insights.push(Insight::FoodPreferences);
    }

    (score, insights)
}

/// Plain keyword search used when the oracle yields nothing.
pub fn keyword_fallback(catalog: &Catalog, query: &str, limit: usize) -> Vec<ScoredResult> {
    let query = query.to_lowercase();
    catalog
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&query)
                || r.cuisines.iter().any(|c| c.to_lowercase().contains(&query))
        })
        .take(limit)
        .map(|r| ScoredResult::unscored(r.clone(), KEYWORD_MATCH_REASON))
        .collect()
}

/// Restaurants sharing a cuisine with the ranked results, respecting dietary intent.
pub fn similar_results(
    catalog: &Catalog,
    results: &[ScoredResult],
    intent: DietaryIntent,
    limit: usize,
) -> Vec<ScoredResult> {
    let picked: HashSet<&str> = results.iter().map(ScoredResult::id).collect();
    let cuisines: HashSet<&str> = results
        .iter()
        .flat_map(|r| r.restaurant.cuisines.iter().map(String::as_str))
        .collect();

    catalog
        .iter()
        .filter(|r| !picked.contains(r.id.as_str()))
        .filter(|r| r.cuisines.iter().any(|c| cuisines.contains(c.as_str())))
        .filter(|r| intent.allows(r))
        .take(limit)
        .map(|r| {
            let mut result = ScoredResult::unscored(r.clone(), SIMILAR_CUISINE_REASON);
            result.suggested_item = r.first_highlight().map(str::to_string);
            result
        })
        .collect()
}

/// Restaurants most like `source_id` by shared cuisines, tags and price level.
pub fn similar_restaurants(
    catalog: &Catalog,
    source_id: &str,
    limit: usize,
) -> Result<Vec<SimilarRestaurant>, RerankError> {
    let source = catalog
        .get(source_id)
        .ok_or_else(|| RerankError::NotFound(source_id.to_string()))?;

    let mut similar: Vec<SimilarRestaurant> = catalog
        .iter()
        .filter(|r| r.id != source.id)
        .filter_map(|r| {
            let shared_cuisines: Vec<&str> = r
                .cuisines
                .iter()
                .filter(|c| source.has_cuisine(c))
                .map(String::as_str)
                .collect();
            let shared_tags: Vec<String> =
                r.tags.iter().filter(|t| source.has_tag(t)).cloned().collect();

            let mut score = 2.0 * shared_cuisines.len() as f64 + shared_tags.len() as f64;
            if r.price_level == source.price_level {
                score += 0.5;
            }
            if score <= 0.0 {
                return None;
            }

            Some(SimilarRestaurant {
                short_reason: similarity_reason(&shared_cuisines, &shared_tags),
                suggested_item: r.first_highlight().map(str::to_string),
                restaurant: r.clone(),
                score,
                match_reasons: shared_tags,
                route: None,
            })
        })
        .collect();

    similar.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    similar.truncate(limit);
    Ok(similar)
}
