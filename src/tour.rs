//! Single-vehicle delivery tour by nearest neighbour.
//!
//! Greedy construction: always drive to the closest stop not yet visited,
//! then return to the start. It is a heuristic; on random instances tours
//! typically come out 25-50% longer than optimal, which is accepted.

use serde::Serialize;

use crate::geo::GeoPoint;
use crate::haversine::GeometricDistance;
use crate::traits::DistanceProvider;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tour {
    /// Start, every stop in visiting order, then the start again.
    pub waypoints: Vec<GeoPoint>,
    /// Indices into the input stops, in visiting order.
    pub visit_order: Vec<usize>,
    /// Closed tour length in kilometers.
    pub total_km: f64,
}

impl Tour {
    /// Identifiers of the visited stops, in visiting order.
    pub fn visited_sequence(&self) -> Vec<Option<u32>> {
        self.stops().map(|stop| stop.id()).collect()
    }

    /// Human-readable labels such as `Order #4`; stops without an id are
    /// numbered by their input position.
    pub fn labels(&self) -> Vec<String> {
        self.stops()
            .zip(&self.visit_order)
            .map(|(stop, &index)| {
                let id = stop.id().map_or(index as u64 + 1, u64::from);
                format!("Order #{}", id)
            })
            .collect()
    }

    fn stops(&self) -> impl Iterator<Item = &GeoPoint> {
        let inner = self.waypoints.len().saturating_sub(2);
        self.waypoints.iter().skip(1).take(inner)
    }
}

/// Haversine nearest-neighbour tour from `start` through all `stops`.
pub fn sequence(start: &GeoPoint, stops: &[GeoPoint]) -> Tour {
    sequence_with(start, stops, &GeometricDistance::haversine())
}

/// Nearest-neighbour tour under any distance provider. Ties go to the stop
/// listed first.
pub fn sequence_with<D: DistanceProvider + ?Sized>(
    start: &GeoPoint,
    stops: &[GeoPoint],
    provider: &D,
) -> Tour {
    let mut visited = vec![false; stops.len()];
    let mut visit_order = Vec::with_capacity(stops.len());
    let mut waypoints = Vec::with_capacity(stops.len() + 2);
    let mut total_km = 0.0;

    waypoints.push(*start);
    let mut current = *start;

    while visit_order.len() < stops.len() {
        let mut nearest: Option<(usize, f64)> = None;
        for (i, stop) in stops.iter().enumerate() {
            if visited[i] {
                continue;
            }
            let d = provider.distance(&current, stop);
            if nearest.is_none_or(|(_, best)| d < best) {
                nearest = Some((i, d));
            }
        }
        let Some((i, d)) = nearest else { break };

        visited[i] = true;
        visit_order.push(i);
        waypoints.push(stops[i]);
        total_km += d;
        current = stops[i];
    }

    total_km += provider.distance(&current, start);
    waypoints.push(*start);

    Tour {
        waypoints,
        visit_order,
        total_km,
    }
}

/// Length of the closed tour `start -> stops[order] -> start`.
pub fn tour_length<D: DistanceProvider + ?Sized>(
    start: &GeoPoint,
    stops: &[GeoPoint],
    order: &[usize],
    provider: &D,
) -> f64 {
    let mut total = 0.0;
    let mut current = *start;
    for &i in order {
        total += provider.distance(&current, &stops[i]);
        current = stops[i];
    }
    total + provider.distance(&current, start)
}
