//! Driving distance, duration and path from an OSRM server.

use async_trait::async_trait;
use serde::Deserialize;
use smartdine_model::{Coordinates, RouteDetails, RouteSummary};

use crate::{check_status, http_client, BackendError, RoutingProvider};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://router.project-osrm.org".to_string(),
            timeout_secs: 10,
        }
    }
}

pub struct OsrmRouter {
    config: OsrmConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    /// meters
    distance: f64,
    /// seconds
    duration: f64,
    /// Present with `overview=full&geometries=geojson`
    #[serde(default)]
    geometry: serde_json::Value,
}

/// Format a route as "3.4 km" / "12 mins".
pub fn summarize(distance_m: f64, duration_s: f64) -> RouteSummary {
    RouteSummary {
        distance: format!("{:.1} km", distance_m / 1000.0),
        trip_duration: format!("{} mins", (duration_s / 60.0).round() as i64),
    }
}

impl OsrmRouter {
    pub fn new(config: OsrmConfig) -> Result<Self, BackendError> {
        let client = http_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    /// OSRM takes `lon,lat` pairs.
    fn route_url(&self, from: Coordinates, to: Coordinates, overview: &str) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview={}",
            self.config.base_url, from.lon, from.lat, to.lon, to.lat, overview
        )
    }

    /// First route of the response, if any.
    async fn first_route(&self, url: &str) -> Result<Option<Route>, BackendError> {
        tracing::debug!(url = %url, "Requesting route");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        let body: RouteResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        Ok(body.routes.into_iter().next())
    }
}

#[async_trait]
impl RoutingProvider for OsrmRouter {
    async fn route(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> Result<Option<RouteSummary>, BackendError> {
        let route = self.first_route(&self.route_url(from, to, "false")).await?;
        Ok(route.map(|r| summarize(r.distance, r.duration)))
    }

    async fn route_details(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> Result<Option<RouteDetails>, BackendError> {
        let url = self.route_url(from, to, "full&geometries=geojson");
        let details = self
            .first_route(&url)
            .await?
            .map(|r| RouteDetails::new(r.distance, r.duration, r.geometry));
        match &details {
            Some(d) => tracing::info!(summary = %d.summary, "Route found"),
            None => tracing::info!("No route found"),
        }
        Ok(details)
    }

    fn name(&self) -> &'static str {
        "osrm"
    }
}
