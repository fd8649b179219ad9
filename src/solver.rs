//! Two-stage optimizer: hub network first, truck positioning second.
//!
//! The stages are solved one after the other, so the combined cost is not
//! a joint optimum. Every silo is an entry point into the network and each
//! truck is matched to exactly one silo.

use serde::Serialize;
use tracing::{info, warn};

use crate::assignment::{Assignment, AssignmentSolver, HungarianSolver, naive_baseline};
use crate::cancel::CancelToken;
use crate::error::OptimizeError;
use crate::geo::GeoPoint;
use crate::haversine::GeometricDistance;
use crate::matrix::DistanceMatrix;
use crate::network::{NetworkEdge, NetworkTree, build_network_cached};
use crate::osrm::{OsrmClient, OsrmConfig};
use crate::polyline::Polyline;
use crate::road::RoadNetworkDistance;
use crate::traits::DistanceProvider;

/// Phase 1: the network connecting every silo to the hub.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkPhase {
    pub tree: NetworkTree,
    pub cost: f64,
}

impl NetworkPhase {
    pub fn edges(&self) -> &[NetworkEdge] {
        self.tree.edges()
    }
}

/// One truck sent to one silo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssignmentPair {
    pub truck_index: usize,
    pub silo_index: usize,
    pub truck: GeoPoint,
    pub silo: GeoPoint,
    pub cost: f64,
}

/// Phase 2: the optimal truck to silo matching.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositioningPhase {
    pub pairs: Vec<AssignmentPair>,
    pub assignment: Assignment,
    pub cost: f64,
    /// Trucks by silos, in kilometers.
    pub cost_matrix: DistanceMatrix,
}

/// Greedy matching over the same matrix, kept for comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselinePhase {
    pub assignment: Assignment,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub network_cost: f64,
    pub positioning_cost: f64,
    pub optimized_total: f64,
    pub baseline_total: f64,
    pub savings: f64,
    /// Zero when the baseline total is zero.
    pub savings_percent: f64,
}

impl Metrics {
    pub fn new(network_cost: f64, positioning_cost: f64, baseline_positioning_cost: f64) -> Self {
        let optimized_total = network_cost + positioning_cost;
        let baseline_total = network_cost + baseline_positioning_cost;
        let savings = baseline_total - optimized_total;
        let savings_percent = if baseline_total == 0.0 {
            0.0
        } else {
            savings / baseline_total * 100.0
        };

        Self {
            network_cost,
            positioning_cost,
            optimized_total,
            baseline_total,
            savings,
            savings_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub network: NetworkPhase,
    pub positioning: PositioningPhase,
    pub baseline: BaselinePhase,
    pub metrics: Metrics,
}

impl Solution {
    /// Garage, assigned silo, then the network path from that silo to the hub.
    pub fn delivery_path(&self, truck_index: usize) -> Option<Polyline> {
        let pair = self.positioning.pairs.get(truck_index)?;
        let mut path = vec![pair.truck];
        path.extend(self.network.tree.points_to_root(pair.silo_index + 1)?);
        Some(Polyline::from_geo(&path))
    }

    /// Positioning cost plus network cost from the assigned silo to the hub.
    pub fn delivery_cost(&self, truck_index: usize) -> Option<f64> {
        let pair = self.positioning.pairs.get(truck_index)?;
        let to_hub = self.network.tree.cost_to_root(pair.silo_index + 1)?;
        Some(pair.cost + to_hub)
    }
}

pub struct TwoStageOptimizer<D, A = HungarianSolver> {
    distances: D,
    solver: A,
}

impl<D: DistanceProvider> TwoStageOptimizer<D> {
    pub fn new(distances: D) -> Self {
        Self {
            distances,
            solver: HungarianSolver,
        }
    }
}

impl<D: DistanceProvider, A: AssignmentSolver> TwoStageOptimizer<D, A> {
    pub fn with_solver<B: AssignmentSolver>(self, solver: B) -> TwoStageOptimizer<D, B> {
        TwoStageOptimizer {
            distances: self.distances,
            solver,
        }
    }

    pub fn distances(&self) -> &D {
        &self.distances
    }

    pub fn optimize(
        &self,
        hub: Option<&GeoPoint>,
        silos: &[GeoPoint],
        trucks: &[GeoPoint],
    ) -> Result<Solution, OptimizeError> {
        self.optimize_with_cancel(hub, silos, trucks, &CancelToken::new())
    }

    /// Runs both phases, checking `cancel` between distance requests.
    pub fn optimize_with_cancel(
        &self,
        hub: Option<&GeoPoint>,
        silos: &[GeoPoint],
        trucks: &[GeoPoint],
        cancel: &CancelToken,
    ) -> Result<Solution, OptimizeError> {
        let hub = validate(hub, silos, trucks)?;

        let network = self.build_network(hub, silos, cancel)?;
        info!(
            edges = network.tree.edges().len(),
            cost = network.cost,
            "hub network built"
        );

        let entry_points = &network.tree.nodes()[1..];
        let cost_matrix = self.distances.matrix(trucks, entry_points, cancel)?;
        cancel.check()?;

        let assignment = self.solver.solve(&cost_matrix)?;
        let cost = assignment.total_cost(&cost_matrix);
        let pairs = assignment
            .pairs()
            .map(|(truck_index, silo_index)| AssignmentPair {
                truck_index,
                silo_index,
                truck: trucks[truck_index],
                silo: entry_points[silo_index],
                cost: cost_matrix.get(truck_index, silo_index),
            })
            .collect();

        let baseline_assignment = naive_baseline(&cost_matrix)?;
        let baseline = BaselinePhase {
            cost: baseline_assignment.total_cost(&cost_matrix),
            assignment: baseline_assignment,
        };

        let metrics = Metrics::new(network.cost, cost, baseline.cost);
        info!(
            optimal = cost,
            baseline = baseline.cost,
            savings = metrics.savings,
            savings_percent = metrics.savings_percent,
            "trucks positioned"
        );

        Ok(Solution {
            network,
            positioning: PositioningPhase {
                pairs,
                assignment,
                cost,
                cost_matrix,
            },
            baseline,
            metrics,
        })
    }

    fn build_network(
        &self,
        hub: &GeoPoint,
        silos: &[GeoPoint],
        cancel: &CancelToken,
    ) -> Result<NetworkPhase, OptimizeError> {
        let nodes: Vec<GeoPoint> = std::iter::once(*hub).chain(silos.iter().copied()).collect();
        let cache = self.distances.pair_cache(&nodes, cancel)?;
        let tree = build_network_cached(hub, silos, &cache);

        if !tree.is_connected() {
            let silos = tree.unreachable().iter().map(|node| node - 1).collect();
            return Err(OptimizeError::UnreachableSilos(silos));
        }

        Ok(NetworkPhase {
            cost: tree.total_cost(),
            tree,
        })
    }
}

/// Runs the optimizer with road distances from the OSRM service configured
/// in the environment, or with planar distances.
///
/// If the HTTP client cannot be built the run continues with planar
/// distances.
pub fn optimize(
    hub: Option<&GeoPoint>,
    silos: &[GeoPoint],
    trucks: &[GeoPoint],
    use_road_network: bool,
) -> Result<Solution, OptimizeError> {
    validate(hub, silos, trucks)?;

    if use_road_network {
        match OsrmClient::new(OsrmConfig::from_env()) {
            Ok(client) => {
                return TwoStageOptimizer::new(RoadNetworkDistance::new(client))
                    .optimize(hub, silos, trucks);
            }
            Err(err) => warn!(error = %err, "could not build OSRM client, using planar distances"),
        }
    }

    TwoStageOptimizer::new(GeometricDistance::planar()).optimize(hub, silos, trucks)
}

fn validate<'a>(
    hub: Option<&'a GeoPoint>,
    silos: &[GeoPoint],
    trucks: &[GeoPoint],
) -> Result<&'a GeoPoint, OptimizeError> {
    let hub = hub.ok_or(OptimizeError::MissingHub)?;
    if silos.is_empty() {
        return Err(OptimizeError::EmptySilos);
    }
    if trucks.is_empty() {
        return Err(OptimizeError::EmptyTrucks);
    }
    if silos.len() != trucks.len() {
        return Err(OptimizeError::CountMismatch {
            silos: silos.len(),
            trucks: trucks.len(),
        });
    }
    Ok(hub)
}
