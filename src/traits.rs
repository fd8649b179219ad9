//! Capability interfaces for travel costs.
//!
//! The optimizer only sees [`DistanceProvider`]. Road-network support is a
//! [`RoutingService`] wrapped by a provider that absorbs its failures, so
//! tests can swap in a deterministic double.

use crate::cancel::{CancelToken, Cancelled};
use crate::error::RoutingError;
use crate::geo::GeoPoint;
use crate::matrix::{DistanceMatrix, PairCache};

/// Computes a non-negative travel cost in kilometers between two points.
///
/// Implementations must be safe to call from several threads and must not
/// fail: anything that can go wrong is resolved inside the provider.
pub trait DistanceProvider: Send + Sync {
    fn distance(&self, from: &GeoPoint, to: &GeoPoint) -> f64;

    /// Full `sources x destinations` matrix.
    ///
    /// The default issues one [`distance`](Self::distance) call per cell and
    /// checks `cancel` before each of them.
    fn matrix(
        &self,
        sources: &[GeoPoint],
        destinations: &[GeoPoint],
        cancel: &CancelToken,
    ) -> Result<DistanceMatrix, Cancelled> {
        let mut matrix = DistanceMatrix::new(sources.len(), destinations.len(), 0.0);
        for (i, from) in sources.iter().enumerate() {
            for (j, to) in destinations.iter().enumerate() {
                cancel.check()?;
                matrix.set(i, j, self.distance(from, to));
            }
        }
        Ok(matrix)
    }

    /// Costs between every unordered pair of `nodes`, keyed by position.
    ///
    /// Only pairs `i < j` are cached. The default reads them off a full
    /// [`matrix`](Self::matrix); providers paying per request should ask
    /// for each pair once.
    fn pair_cache(&self, nodes: &[GeoPoint], cancel: &CancelToken) -> Result<PairCache, Cancelled> {
        let matrix = self.matrix(nodes, nodes, cancel)?;
        Ok(PairCache::from_upper_triangle(&matrix))
    }
}

impl<D: DistanceProvider + ?Sized> DistanceProvider for &D {
    fn distance(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        (**self).distance(from, to)
    }

    fn matrix(
        &self,
        sources: &[GeoPoint],
        destinations: &[GeoPoint],
        cancel: &CancelToken,
    ) -> Result<DistanceMatrix, Cancelled> {
        (**self).matrix(sources, destinations, cancel)
    }

    fn pair_cache(&self, nodes: &[GeoPoint], cancel: &CancelToken) -> Result<PairCache, Cancelled> {
        (**self).pair_cache(nodes, cancel)
    }
}

impl<D: DistanceProvider + ?Sized> DistanceProvider for Box<D> {
    fn distance(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        (**self).distance(from, to)
    }

    fn matrix(
        &self,
        sources: &[GeoPoint],
        destinations: &[GeoPoint],
        cancel: &CancelToken,
    ) -> Result<DistanceMatrix, Cancelled> {
        (**self).matrix(sources, destinations, cancel)
    }

    fn pair_cache(&self, nodes: &[GeoPoint], cancel: &CancelToken) -> Result<PairCache, Cancelled> {
        (**self).pair_cache(nodes, cancel)
    }
}

/// Raw access to an external driving-distance service, in kilometers.
pub trait RoutingService: Send + Sync {
    /// Driving distance of the best route from `from` to `to`.
    fn route_km(&self, from: &GeoPoint, to: &GeoPoint) -> Result<f64, RoutingError>;

    /// Driving distances for every source/destination pair in one request.
    ///
    /// A `None` cell means the service found no route for that pair.
    fn table_km(
        &self,
        sources: &[GeoPoint],
        destinations: &[GeoPoint],
    ) -> Result<Vec<Vec<Option<f64>>>, RoutingError>;
}
