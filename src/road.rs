//! Road-network distances with graceful degradation.
//!
//! Order of attempts for a matrix: one table request, then one route request
//! per cell, then straight-line distance for any cell that still failed.
//! Nothing here returns an upstream error to the caller.

use std::thread;
use std::time::Duration;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::cancel::{CancelToken, Cancelled};
use crate::geo::GeoPoint;
use crate::haversine::GeometricDistance;
use crate::matrix::{DistanceMatrix, PairCache};
use crate::traits::{DistanceProvider, RoutingService};

#[derive(Debug, Clone)]
pub struct RoadNetworkOptions {
    /// Pause after each pairwise request, to stay under upstream rate limits.
    pub pairwise_delay: Duration,
    /// Pairwise requests in flight at once. `1` keeps them strictly serial.
    pub max_concurrency: usize,
}

impl Default for RoadNetworkOptions {
    fn default() -> Self {
        Self {
            pairwise_delay: Duration::from_millis(100),
            max_concurrency: 1,
        }
    }
}

/// [`DistanceProvider`] backed by a [`RoutingService`], falling back to a
/// [`GeometricDistance`] whenever the service cannot answer.
#[derive(Debug, Clone)]
pub struct RoadNetworkDistance<S> {
    service: S,
    fallback: GeometricDistance,
    options: RoadNetworkOptions,
}

impl<S: RoutingService> RoadNetworkDistance<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            fallback: GeometricDistance::planar(),
            options: RoadNetworkOptions::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: GeometricDistance) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_options(mut self, options: RoadNetworkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn fallback(&self) -> &GeometricDistance {
        &self.fallback
    }

    fn pairwise_matrix(
        &self,
        sources: &[GeoPoint],
        destinations: &[GeoPoint],
        cancel: &CancelToken,
    ) -> Result<DistanceMatrix, Cancelled> {
        let cols = destinations.len();
        let data = self.fan_out(
            sources.len() * cols,
            |k| self.distance(&sources[k / cols], &destinations[k % cols]),
            cancel,
        )?;
        Ok(DistanceMatrix::from_raw(sources.len(), cols, data))
    }

    /// Runs `query` for every index in `0..total`, one route request each,
    /// pausing after every request and checking `cancel` before it.
    fn fan_out<F>(&self, total: usize, query: F, cancel: &CancelToken) -> Result<Vec<f64>, Cancelled>
    where
        F: Fn(usize) -> f64 + Sync,
    {
        let cell = |k: usize| -> Result<f64, Cancelled> {
            cancel.check()?;
            let km = query(k);
            if !self.options.pairwise_delay.is_zero() {
                thread::sleep(self.options.pairwise_delay);
            }
            Ok(km)
        };

        if self.options.max_concurrency > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.max_concurrency)
                .build()
            {
                Ok(pool) => {
                    return pool.install(|| (0..total).into_par_iter().map(cell).collect());
                }
                Err(err) => {
                    warn!(error = %err, "could not start request pool, querying serially");
                }
            }
        }
        (0..total).map(cell).collect()
    }

    /// Table cells in kilometers; cells without a usable route fall back to
    /// straight line.
    fn table_matrix(
        &self,
        sources: &[GeoPoint],
        destinations: &[GeoPoint],
        table: Vec<Vec<Option<f64>>>,
    ) -> DistanceMatrix {
        debug!(rows = sources.len(), cols = destinations.len(), "table request succeeded");
        let mut matrix = DistanceMatrix::new(sources.len(), destinations.len(), 0.0);
        let mut degraded = 0usize;
        for (i, row) in table.into_iter().enumerate() {
            for (j, cell) in row.into_iter().enumerate() {
                let km = match cell {
                    Some(km) if km.is_finite() && km >= 0.0 => km,
                    _ => {
                        degraded += 1;
                        self.fallback.distance(&sources[i], &destinations[j])
                    }
                };
                matrix.set(i, j, km);
            }
        }
        if degraded > 0 {
            warn!(cells = degraded, "table had cells without a route, using straight line");
        }
        matrix
    }
}

impl<S: RoutingService> DistanceProvider for RoadNetworkDistance<S> {
    fn distance(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        match self.service.route_km(from, to) {
            Ok(km) if km.is_finite() && km >= 0.0 => km,
            Ok(km) => {
                warn!(km, "route service returned an invalid distance, using straight line");
                self.fallback.distance(from, to)
            }
            Err(err) => {
                warn!(error = %err, "route request failed, using straight line");
                self.fallback.distance(from, to)
            }
        }
    }

    fn matrix(
        &self,
        sources: &[GeoPoint],
        destinations: &[GeoPoint],
        cancel: &CancelToken,
    ) -> Result<DistanceMatrix, Cancelled> {
        cancel.check()?;
        if sources.is_empty() || destinations.is_empty() {
            return Ok(DistanceMatrix::new(sources.len(), destinations.len(), 0.0));
        }

        match self.service.table_km(sources, destinations) {
            Ok(table) => Ok(self.table_matrix(sources, destinations, table)),
            Err(err) => {
                warn!(error = %err, "table request failed, falling back to pairwise routes");
                self.pairwise_matrix(sources, destinations, cancel)
            }
        }
    }

    /// One table request over `nodes`; if it fails, one route request per
    /// unordered pair `i < j` and none for a node against itself.
    fn pair_cache(&self, nodes: &[GeoPoint], cancel: &CancelToken) -> Result<PairCache, Cancelled> {
        cancel.check()?;
        if nodes.len() < 2 {
            return Ok(PairCache::new());
        }

        match self.service.table_km(nodes, nodes) {
            Ok(table) => Ok(PairCache::from_upper_triangle(&self.table_matrix(nodes, nodes, table))),
            Err(err) => {
                warn!(error = %err, "table request failed, falling back to pairwise routes");
                let pairs: Vec<(usize, usize)> = (0..nodes.len())
                    .flat_map(|i| ((i + 1)..nodes.len()).map(move |j| (i, j)))
                    .collect();
                let costs = self.fan_out(
                    pairs.len(),
                    |k| self.distance(&nodes[pairs[k].0], &nodes[pairs[k].1]),
                    cancel,
                )?;

                let mut cache = PairCache::new();
                for (&(i, j), km) in pairs.iter().zip(costs) {
                    cache.insert(i, j, km);
                }
                Ok(cache)
            }
        }
    }
}
