//! OSRM HTTP adapter for driving distances.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::RoutingError;
use crate::geo::GeoPoint;
use crate::traits::RoutingService;

const METERS_PER_KM: f64 = 1000.0;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OsrmConfig {
    /// Defaults overridden by `OSRM_BASE_URL`, `OSRM_PROFILE` and
    /// `OSRM_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = env::var("OSRM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(profile) = env::var("OSRM_PROFILE") {
            config.profile = profile;
        }
        if let Some(timeout) = env::var("OSRM_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
        {
            config.timeout_secs = timeout;
        }
        config
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn get<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, RoutingError> {
        debug!(%url, "osrm request");
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())?
            .json::<T>()?;
        Ok(body)
    }
}

impl RoutingService for OsrmClient {
    fn route_km(&self, from: &GeoPoint, to: &GeoPoint) -> Result<f64, RoutingError> {
        let url = format!(
            "{}/route/v1/{}/{}?overview=false",
            self.config.base_url,
            self.config.profile,
            coordinate_list([from, to])
        );

        let body: OsrmRouteResponse = self.get(url)?;
        if body.code != "Ok" {
            return Err(RoutingError::NoRoute(body.message.unwrap_or(body.code)));
        }

        let meters = body
            .routes
            .and_then(|routes| routes.first().map(|route| route.distance))
            .ok_or_else(|| RoutingError::NoRoute("response contained no routes".to_string()))?;
        meters_to_km(meters)
    }

    fn table_km(
        &self,
        sources: &[GeoPoint],
        destinations: &[GeoPoint],
    ) -> Result<Vec<Vec<Option<f64>>>, RoutingError> {
        let expected = (sources.len(), destinations.len());
        if sources.is_empty() || destinations.is_empty() {
            return Ok(vec![Vec::new(); sources.len()]);
        }

        let source_indices = index_list(0..sources.len());
        let destination_indices = index_list(sources.len()..sources.len() + destinations.len());
        let url = format!(
            "{}/table/v1/{}/{}?sources={}&destinations={}&annotations=distance",
            self.config.base_url,
            self.config.profile,
            coordinate_list(sources.iter().chain(destinations)),
            source_indices,
            destination_indices
        );

        let body: OsrmTableResponse = self.get(url)?;
        if body.code != "Ok" {
            return Err(RoutingError::NoRoute(body.message.unwrap_or(body.code)));
        }

        let distances = body
            .distances
            .ok_or_else(|| RoutingError::Malformed("table response without distances".to_string()))?;

        let actual = (
            distances.len(),
            distances.first().map_or(0, Vec::len),
        );
        if actual.0 != expected.0 || distances.iter().any(|row| row.len() != expected.1) {
            return Err(RoutingError::ShapeMismatch { expected, actual });
        }

        distances
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.map(meters_to_km).transpose())
                    .collect()
            })
            .collect()
    }
}

/// OSRM expects `lng,lat` pairs joined by `;`.
fn coordinate_list<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> String {
    points
        .into_iter()
        .map(|point| format!("{:.6},{:.6}", point.lng(), point.lat()))
        .collect::<Vec<_>>()
        .join(";")
}

fn index_list(range: std::ops::Range<usize>) -> String {
    range.map(|i| i.to_string()).collect::<Vec<_>>().join(";")
}

fn meters_to_km(meters: f64) -> Result<f64, RoutingError> {
    if meters.is_finite() && meters >= 0.0 {
        Ok(meters / METERS_PER_KM)
    } else {
        Err(RoutingError::Malformed(format!("invalid distance {}", meters)))
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    routes: Option<Vec<OsrmRoute>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    message: Option<String>,
    distances: Option<Vec<Vec<Option<f64>>>>,
}
