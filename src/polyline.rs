//! Polyline representation for delivery paths.
//!
//! Coordinates are kept decoded; any compact encoding belongs to whoever
//! draws the path.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::haversine::haversine_km;

/// A path as a sequence of (latitude, longitude) points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn from_geo(points: &[GeoPoint]) -> Self {
        Self::new(points.iter().map(GeoPoint::coords).collect())
    }

    /// Appends `other`, dropping its first point when it repeats our last.
    pub fn extend(&mut self, other: &Polyline) {
        let skip = match (self.points.last(), other.points.first()) {
            (Some(last), Some(first)) if last == first => 1,
            _ => 0,
        };
        self.points.extend(other.points.iter().skip(skip));
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Great-circle length over consecutive points, in kilometers.
    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| haversine_km(pair[0], pair[1]))
            .sum()
    }
}
