//! Geometric distance provider (fallback when OSRM unavailable).
//!
//! Two metrics: a planar approximation that scales coordinate degrees by a
//! fixed factor, and great-circle distance. Both ignore roads but are
//! always available.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cancel::{CancelToken, Cancelled};
use crate::geo::GeoPoint;
use crate::matrix::DistanceMatrix;
use crate::traits::DistanceProvider;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree used by the planar approximation.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Great-circle distance between two (lat, lng) points in kilometers.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Euclidean separation in degrees scaled to kilometers.
pub fn planar_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let d_lat = to.0 - from.0;
    let d_lng = to.1 - from.1;
    (d_lat * d_lat + d_lng * d_lng).sqrt() * KM_PER_DEGREE
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Quick previews and the default fallback for road distances.
    #[default]
    Planar,
    /// Delivery tours, where curvature matters over larger areas.
    Haversine,
}

/// Straight-line distance provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometricDistance {
    pub metric: Metric,
}

impl GeometricDistance {
    pub fn new(metric: Metric) -> Self {
        Self { metric }
    }

    pub fn planar() -> Self {
        Self::new(Metric::Planar)
    }

    pub fn haversine() -> Self {
        Self::new(Metric::Haversine)
    }

    pub fn km(&self, from: (f64, f64), to: (f64, f64)) -> f64 {
        match self.metric {
            Metric::Planar => planar_km(from, to),
            Metric::Haversine => haversine_km(from, to),
        }
    }
}

impl DistanceProvider for GeometricDistance {
    fn distance(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        self.km(from.coords(), to.coords())
    }

    fn matrix(
        &self,
        sources: &[GeoPoint],
        destinations: &[GeoPoint],
        cancel: &CancelToken,
    ) -> Result<DistanceMatrix, Cancelled> {
        cancel.check()?;
        let cols = destinations.len();
        let data = (0..sources.len() * cols)
            .into_par_iter()
            .map(|k| self.distance(&sources[k / cols], &destinations[k % cols]))
            .collect();
        Ok(DistanceMatrix::from_raw(sources.len(), cols, data))
    }
}
