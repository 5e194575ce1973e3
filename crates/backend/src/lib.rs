//! External collaborators of the recommendation engine.
//!
//! Provides the collaborator traits and their HTTP/file implementations:
//! - `CatalogProvider`: the restaurant snapshot (`JsonCatalog`)
//! - `RankingOracle`: LLM candidate selection (`OpenRouterOracle`)
//! - `WeatherProvider`: current weather (`OpenMeteoWeather`)
//! - `RoutingProvider`: driving distance, time and path (`OsrmRouter`)
//! - `ActivityStore`: a user's posts, likes and comments (`SupabaseActivityStore`)
//! - `FeedbackStore`: likes and dislikes of recommendations (`JsonFeedbackStore`)
//!
//! The engine only sees the traits, so any collaborator can be swapped for
//! an in-memory fake.

use async_trait::async_trait;
use smartdine_model::{
    Catalog, Coordinates, FeedbackEntry, OracleResponse, RouteDetails, RouteSummary, UserActivity,
    WeatherReading,
};
use std::time::Duration;
use thiserror::Error;

pub mod activity;
pub mod cache;
pub mod catalog;
pub mod feedback;
pub mod oracle;
pub mod routing;
pub mod weather;

pub use activity::{SupabaseActivityStore, SupabaseConfig};
pub use cache::TtlCache;
pub use catalog::JsonCatalog;
pub use feedback::JsonFeedbackStore;
pub use oracle::{parse_oracle_output, OpenRouterConfig, OpenRouterOracle};
pub use routing::{OsrmConfig, OsrmRouter};
pub use weather::{OpenMeteoConfig, OpenMeteoWeather};

/// Errors from collaborator operations.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    Status(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend not available: {0}")]
    Unavailable(String),
}

/// Source of the restaurant catalog.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn load(&self) -> Result<Catalog, BackendError>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Picks and justifies candidate restaurants for a free-text query.
#[async_trait]
pub trait RankingOracle: Send + Sync {
    /// `catalog_context` is the rendered catalog listing the oracle chooses from.
    async fn rank(&self, query: &str, catalog_context: &str) -> Result<OracleResponse, BackendError>;

    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location: Coordinates) -> Result<WeatherReading, BackendError>;

    /// Drop cached readings, for providers that keep any.
    fn clear_cache(&self) {}

    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// `Ok(None)` when the router knows no route between the points.
    async fn route(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> Result<Option<RouteSummary>, BackendError>;

    /// Full route with its path geometry. `Ok(None)` when there is no route.
    async fn route_details(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> Result<Option<RouteDetails>, BackendError>;

    fn name(&self) -> &'static str;
}

/// Social activity of users.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn fetch_activity(&self, user_id: &str) -> Result<UserActivity, BackendError>;

    fn name(&self) -> &'static str;
}

/// Append-only record of recommendation feedback.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn record(&self, entry: &FeedbackEntry) -> Result<(), BackendError>;

    /// Every entry, oldest first.
    async fn entries(&self) -> Result<Vec<FeedbackEntry>, BackendError>;

    fn name(&self) -> &'static str;
}

/// Build an HTTP client with a request timeout.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| BackendError::Connection(e.to_string()))
}

/// Fail with the status and body when a response is not 2xx.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status(format!("HTTP {}: {}", status, body)))
}
