//! Recommendation request pipeline.
//!
//! `Recommender` wires the collaborators (catalog, ranking oracle, weather,
//! routing, activity store) to the scoring crates:
//!
//! ```text
//! query ─► oracle picks ─┐
//! user  ─► profile ──────┼─► merge + rank ─► similar expansion ─► routes
//! time, weather ─────────┘        └─ empty ─► keyword fallback
//! ```
//!
//! Only the catalog is required. Every other collaborator failure is logged
//! and replaced by a neutral default, so a request still gets an answer.
//! The standalone route lookup and the feedback log are the exception: they
//! exist only to talk to their collaborator, so its failures are returned.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use smartdine_backend::{
    ActivityStore, BackendError, CatalogProvider, FeedbackStore, RankingOracle, RoutingProvider,
    TtlCache, WeatherProvider,
};
use smartdine_context::{score_catalog, TimeContext};
use smartdine_explain::fallback_analysis;
use smartdine_model::{
    Catalog, Coordinates, FeedbackEntry, OracleResponse, Routable, RouteDetails, UserProfile,
    WeatherReading,
};
use smartdine_profile::{offset_from_minutes, ProfileBuilder, ProfileConfig, DEFAULT_UTC_OFFSET_MINUTES};
use smartdine_query::{detect_dietary_intent, render_catalog_context, validate_query, QueryError};
use smartdine_rerank::{
    keyword_fallback, merge_recommendations, similar_restaurants, similar_results, DiscoverPage,
    DiscoverRequest, RerankConfig, RerankError, ScoringInputs,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

pub mod api;
mod enrich;

pub use api::{HealthReport, QueryRequest, QueryResponse, RequestContext, SimilarResponse};
pub use enrich::attach_routes;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Restaurant not found: {0}")]
    NotFound(String),

    #[error("Catalog unavailable: {0}")]
    Catalog(#[from] BackendError),

    #[error("No route found between these locations")]
    NoRoute,

    /// The operation needs a collaborator that was not configured.
    #[error("Not configured: {0}")]
    Unavailable(&'static str),

    #[error("{collaborator} failed: {source}")]
    Collaborator {
        collaborator: &'static str,
        source: BackendError,
    },
}

impl From<QueryError> for EngineError {
    fn from(e: QueryError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<RerankError> for EngineError {
    fn from(e: RerankError) -> Self {
        match e {
            RerankError::NotFound(id) => Self::NotFound(id),
        }
    }
}

/// Engine settings. Every field has a default, so a partial document deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a built profile is reused; 0 rebuilds on every request
    pub profile_ttl_secs: u64,
    /// Local clock offset in minutes east of UTC
    pub utc_offset_minutes: i32,
    pub fallback_limit: usize,
    pub similar_results_limit: usize,
    pub similar_restaurants_limit: usize,
    pub favorite_restaurants: usize,
    pub favorite_cuisines: usize,
    pub favorite_dishes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let rerank = RerankConfig::default();
        let profile = ProfileConfig::default();
        Self {
            profile_ttl_secs: 3600,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            fallback_limit: rerank.fallback_limit,
            similar_results_limit: rerank.similar_results_limit,
            similar_restaurants_limit: rerank.similar_restaurants_limit,
            favorite_restaurants: profile.favorite_restaurants,
            favorite_cuisines: profile.favorite_cuisines,
            favorite_dishes: profile.favorite_dishes,
        }
    }
}

impl EngineConfig {
    pub fn utc_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes)
    }

    pub fn rerank_config(&self) -> RerankConfig {
        RerankConfig {
            fallback_limit: self.fallback_limit,
            similar_results_limit: self.similar_results_limit,
            similar_restaurants_limit: self.similar_restaurants_limit,
            ..RerankConfig::default()
        }
    }

    pub fn profile_config(&self) -> ProfileConfig {
        ProfileConfig {
            favorite_restaurants: self.favorite_restaurants,
            favorite_cuisines: self.favorite_cuisines,
            favorite_dishes: self.favorite_dishes,
            utc_offset: self.utc_offset(),
        }
    }
}

/// The recommendation engine. Cheap to share behind an `Arc`.
pub struct Recommender {
    config: EngineConfig,
    catalog: Arc<dyn CatalogProvider>,
    oracle: Arc<dyn RankingOracle>,
    activity: Option<Arc<dyn ActivityStore>>,
    weather: Option<Arc<dyn WeatherProvider>>,
    router: Option<Arc<dyn RoutingProvider>>,
    feedback: Option<Arc<dyn FeedbackStore>>,
    profiles: TtlCache<UserProfile>,
}

impl Recommender {
    pub fn new(
        config: EngineConfig,
        catalog: Arc<dyn CatalogProvider>,
        oracle: Arc<dyn RankingOracle>,
    ) -> Self {
        let profiles = TtlCache::new(Duration::from_secs(config.profile_ttl_secs));
        Self {
            config,
            catalog,
            oracle,
            activity: None,
            weather: None,
            router: None,
            feedback: None,
            profiles,
        }
    }

    pub fn with_activity_store(mut self, store: Arc<dyn ActivityStore>) -> Self {
        self.activity = Some(store);
        self
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherProvider>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_router(mut self, router: Arc<dyn RoutingProvider>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn with_feedback_store(mut self, store: Arc<dyn FeedbackStore>) -> Self {
        self.feedback = Some(store);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Answer a query at the current local time.
    pub async fn recommend(&self, request: &QueryRequest) -> Result<QueryResponse, EngineError> {
        let now = Utc::now().with_timezone(&self.config.utc_offset());
        self.recommend_at(request, now).await
    }

    /// Answer a query as if it were asked at `now`.
    pub async fn recommend_at(
        &self,
        request: &QueryRequest,
        now: DateTime<FixedOffset>,
    ) -> Result<QueryResponse, EngineError> {
        let text = validate_query(&request.text)?;
        let catalog = self.catalog.load().await?;
        tracing::info!(
            query = %text,
            user_id = request.user().unwrap_or("anonymous"),
            restaurants = catalog.len(),
            "Processing query"
        );

        let profile = match request.user() {
            Some(user_id) => Some(self.profile_for(&catalog, user_id).await),
            None => None,
        };

        let time = TimeContext::at(now);
        let weather = match request.location {
            Some(location) => self.current_weather(location).await,
            None => None,
        };
        let context_scores = score_catalog(&catalog, &time, weather.as_ref());

        let (oracle, oracle_failed) = match self.oracle.rank(text, &render_catalog_context(&catalog)).await {
            Ok(response) => (response, false),
            Err(e) => {
                tracing::warn!(
                    oracle = self.oracle.name(),
                    error = %e,
                    "Ranking oracle failed, using keyword fallback"
                );
                (OracleResponse::default(), true)
            }
        };

        let rerank = self.config.rerank_config();
        let inputs = ScoringInputs {
            catalog: &catalog,
            time: &time,
            weather: weather.as_ref(),
            context_scores: &context_scores,
            profile: profile.as_ref(),
        };
        let mut results = merge_recommendations(&oracle, &inputs, &rerank);
        if results.len() < oracle.recommendations.len() {
            tracing::debug!(
                picked = oracle.recommendations.len(),
                kept = results.len(),
                "Dropped oracle picks missing from the catalog"
            );
        }

        let context = RequestContext::new(now, &time, weather.as_ref(), profile.as_ref());

        if results.is_empty() {
            let mut fallback = keyword_fallback(&catalog, text, rerank.fallback_limit);
            self.enrich(request.location, &mut fallback).await;
            tracing::info!(results = fallback.len(), oracle_failed, "Answered with keyword fallback");
            return Ok(QueryResponse {
                query: text.to_string(),
                analysis: fallback_analysis(oracle_failed).to_string(),
                results: fallback,
                similar_results: None,
                context,
            });
        }

        let mut similar = similar_results(
            &catalog,
            &results,
            detect_dietary_intent(text),
            rerank.similar_results_limit,
        );
        self.enrich(request.location, &mut results).await;
        self.enrich(request.location, &mut similar).await;

        tracing::info!(results = results.len(), similar = similar.len(), "Answered query");
        Ok(QueryResponse {
            query: text.to_string(),
            analysis: oracle.analysis,
            results,
            similar_results: Some(similar),
            context,
        })
    }

    /// Restaurants most like `restaurant_id`.
    pub async fn similar(
        &self,
        restaurant_id: &str,
        location: Option<Coordinates>,
    ) -> Result<SimilarResponse, EngineError> {
        let id = required(restaurant_id, "restaurant id")?;
        let catalog = self.catalog.load().await?;
        let source = catalog
            .get(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?
            .name
            .clone();

        let mut similar = similar_restaurants(&catalog, id, self.config.similar_restaurants_limit)?;
        self.enrich(location, &mut similar).await;

        Ok(SimilarResponse {
            source,
            similar_restaurants: similar,
        })
    }

    /// The user's taste profile, from cache when fresh.
    ///
    /// An unreachable activity store yields the default profile.
    pub async fn user_profile(&self, user_id: &str) -> Result<UserProfile, EngineError> {
        let user_id = required(user_id, "user id")?;
        let catalog = self.catalog.load().await?;
        Ok(self.profile_for(&catalog, user_id).await)
    }

    /// Browse the catalog, tagged with the user's interactions when a user is given.
    pub async fn discover(
        &self,
        request: &DiscoverRequest,
        user_id: Option<&str>,
    ) -> Result<DiscoverPage, EngineError> {
        let catalog = self.catalog.load().await?;
        let profile = match user_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(user_id) => Some(self.profile_for(&catalog, user_id).await),
            None => None,
        };
        Ok(smartdine_rerank::discover(&catalog, profile.as_ref(), request))
    }

    /// Forget one user's cached profile. Returns whether one was cached.
    pub fn clear_user_cache(&self, user_id: &str) -> Result<bool, EngineError> {
        let user_id = required(user_id, "user id")?;
        let removed = self.profiles.remove(user_id);
        tracing::info!(user_id, removed, "Cleared user profile cache");
        Ok(removed)
    }

    /// Forget every cached profile and any cached weather readings.
    pub fn clear_all_cache(&self) {
        let entries = self.profiles.len();
        self.profiles.clear();
        tracing::info!(entries, "Cleared all user profile caches");
        if let Some(weather) = self.weather.as_deref() {
            weather.clear_cache();
        }
    }

    /// Driving route between two points, with its path.
    pub async fn route(&self, from: Coordinates, to: Coordinates) -> Result<RouteDetails, EngineError> {
        valid_coordinates(from, "origin")?;
        valid_coordinates(to, "destination")?;
        let router = self.router.as_deref().ok_or(EngineError::Unavailable("routing"))?;

        tracing::info!(%from, %to, router = router.name(), "Looking up route");
        router
            .route_details(from, to)
            .await
            .map_err(|source| EngineError::Collaborator {
                collaborator: router.name(),
                source,
            })?
            .ok_or(EngineError::NoRoute)
    }

    /// Record a like or dislike of a restaurant.
    pub async fn record_feedback(&self, restaurant_id: &str, liked: bool) -> Result<FeedbackEntry, EngineError> {
        let restaurant_id = required(restaurant_id, "restaurant id")?;
        let store = self.feedback_store()?;

        let entry = FeedbackEntry {
            id: Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.to_string(),
            liked,
            timestamp: Utc::now(),
        };
        store.record(&entry).await.map_err(|source| EngineError::Collaborator {
            collaborator: store.name(),
            source,
        })?;
        Ok(entry)
    }

    /// Every recorded feedback entry, oldest first.
    pub async fn feedback(&self) -> Result<Vec<FeedbackEntry>, EngineError> {
        let store = self.feedback_store()?;
        store.entries().await.map_err(|source| EngineError::Collaborator {
            collaborator: store.name(),
            source,
        })
    }

    pub async fn health(&self) -> HealthReport {
        let (restaurants, catalog_error) = match self.catalog.load().await {
            Ok(catalog) => (Some(catalog.len()), None),
            Err(e) => (None, Some(e.to_string())),
        };
        HealthReport {
            catalog: self.catalog.name(),
            restaurants,
            catalog_error,
            oracle: self.oracle.name(),
            weather: self.weather.as_ref().map(|w| w.name()),
            routing: self.router.as_ref().map(|r| r.name()),
            activity_store: self.activity.as_ref().map(|a| a.name()),
            feedback_store: self.feedback.as_ref().map(|f| f.name()),
            cached_profiles: self.profiles.len(),
        }
    }

    async fn profile_for(&self, catalog: &Catalog, user_id: &str) -> UserProfile {
        if let Some(profile) = self.profiles.get(user_id) {
            tracing::debug!(user_id, "Using cached profile");
            return profile;
        }

        let Some(store) = self.activity.as_deref() else {
            tracing::debug!(user_id, "No activity store configured, using default profile");
            return UserProfile::default();
        };

        match store.fetch_activity(user_id).await {
            Ok(activity) => {
                let profile =
                    ProfileBuilder::with_config(catalog, self.config.profile_config()).build(&activity);
                tracing::info!(
                    user_id,
                    total_posts = profile.total_posts,
                    total_likes = profile.total_likes,
                    total_comments = profile.total_comments,
                    favorite_cuisines = ?profile.favorite_cuisines,
                    "Built user profile"
                );
                self.profiles.insert(user_id, profile.clone());
                profile
            }
            Err(e) => {
                tracing::warn!(
                    user_id,
                    store = store.name(),
                    error = %e,
                    "Activity store failed, using default profile"
                );
                UserProfile::default()
            }
        }
    }

    fn feedback_store(&self) -> Result<&dyn FeedbackStore, EngineError> {
        self.feedback.as_deref().ok_or(EngineError::Unavailable("feedback store"))
    }

    async fn current_weather(&self, location: Coordinates) -> Option<WeatherReading> {
        let provider = self.weather.as_deref()?;
        match provider.current(location).await {
            Ok(reading) => Some(reading),
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    error = %e,
                    "Weather unavailable, skipping weather scoring"
                );
                None
            }
        }
    }

    async fn enrich<T: Routable>(&self, origin: Option<Coordinates>, items: &mut [T]) {
        if let (Some(origin), Some(router)) = (origin, self.router.as_deref()) {
            attach_routes(router, origin, items).await;
        }
    }
}

fn required<'a>(value: &'a str, what: &str) -> Result<&'a str, EngineError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EngineError::InvalidInput(format!("{} is required", what)));
    }
    Ok(value)
}

fn valid_coordinates(point: Coordinates, what: &str) -> Result<(), EngineError> {
    let in_range = (-90.0..=90.0).contains(&point.lat) && (-180.0..=180.0).contains(&point.lon);
    if !in_range {
        return Err(EngineError::InvalidInput(format!("{} {} is not a valid location", what, point)));
    }
    Ok(())
}
