//! Minimum spanning network rooted at the hub (Prim's algorithm).
//!
//! Nodes live in one arena: index [`ROOT`] is the hub and index `i + 1` is
//! `points[i]`. The tree is kept as parent indices so the path from any node
//! back to the hub is a walk of its depth.

use serde::Serialize;

use crate::geo::GeoPoint;
use crate::matrix::PairCache;
use crate::traits::DistanceProvider;

/// Arena index of the hub.
pub const ROOT: usize = 0;

/// One link of the network, oriented from the hub outwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetworkEdge {
    pub parent: GeoPoint,
    pub child: GeoPoint,
    pub parent_index: usize,
    pub child_index: usize,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkTree {
    nodes: Vec<GeoPoint>,
    parent: Vec<Option<usize>>,
    /// Cost of the edge entering each node; zero for the hub.
    link_cost: Vec<f64>,
    edges: Vec<NetworkEdge>,
    total_cost: f64,
    unreachable: Vec<usize>,
}

impl NetworkTree {
    /// Hub followed by the points, in input order.
    pub fn nodes(&self) -> &[GeoPoint] {
        &self.nodes
    }

    /// Edges in the order Prim attached them.
    pub fn edges(&self) -> &[NetworkEdge] {
        &self.edges
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Arena indices that no finite-cost edge could attach.
    pub fn unreachable(&self) -> &[usize] {
        &self.unreachable
    }

    pub fn is_connected(&self) -> bool {
        self.unreachable.is_empty()
    }

    pub fn parent_of(&self, node: usize) -> Option<usize> {
        self.parent.get(node).copied().flatten()
    }

    /// Arena indices from `node` up to and including the hub.
    ///
    /// `None` when `node` is out of range or was never attached.
    pub fn path_to_root(&self, node: usize) -> Option<Vec<usize>> {
        if node >= self.nodes.len() || self.unreachable.contains(&node) {
            return None;
        }
        let mut path = vec![node];
        let mut current = node;
        while let Some(parent) = self.parent_of(current) {
            path.push(parent);
            current = parent;
        }
        Some(path)
    }

    /// Same as [`path_to_root`](Self::path_to_root), resolved to points.
    pub fn points_to_root(&self, node: usize) -> Option<Vec<GeoPoint>> {
        self.path_to_root(node)
            .map(|path| path.into_iter().map(|i| self.nodes[i]).collect())
    }

    /// Sum of edge costs along the path from `node` to the hub.
    pub fn cost_to_root(&self, node: usize) -> Option<f64> {
        let path = self.path_to_root(node)?;
        Some(path.iter().map(|&i| self.link_cost[i]).sum())
    }
}

/// Builds the network over `hub` + `points` with an arbitrary pairwise cost.
///
/// `cost` receives arena indices. NaN and infinite costs mean "no link";
/// nodes that end up with no link are reported in
/// [`NetworkTree::unreachable`]. Ties go to the lowest index.
pub fn build_network<F>(hub: &GeoPoint, points: &[GeoPoint], mut cost: F) -> NetworkTree
where
    F: FnMut(usize, usize) -> f64,
{
    let nodes: Vec<GeoPoint> = std::iter::once(*hub).chain(points.iter().copied()).collect();
    let n = nodes.len();

    let mut in_tree = vec![false; n];
    let mut key = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut edges = Vec::with_capacity(points.len());
    let mut total_cost = 0.0;

    key[ROOT] = 0.0;

    for _ in 0..n {
        let mut next: Option<usize> = None;
        for v in 0..n {
            if !in_tree[v] && key[v].is_finite() && next.is_none_or(|u| key[v] < key[u]) {
                next = Some(v);
            }
        }
        let Some(u) = next else { break };

        in_tree[u] = true;
        if let Some(p) = parent[u] {
            edges.push(NetworkEdge {
                parent: nodes[p],
                child: nodes[u],
                parent_index: p,
                child_index: u,
                cost: key[u],
            });
            total_cost += key[u];
        }

        for v in 0..n {
            if in_tree[v] {
                continue;
            }
            let d = cost(u, v);
            if !d.is_nan() && d < key[v] {
                key[v] = d;
                parent[v] = Some(u);
            }
        }
    }

    let unreachable: Vec<usize> = (0..n).filter(|&v| !in_tree[v]).collect();
    for &v in &unreachable {
        parent[v] = None;
        key[v] = f64::INFINITY;
    }

    NetworkTree {
        nodes,
        parent,
        link_cost: key,
        edges,
        total_cost,
        unreachable,
    }
}

/// Network with costs taken straight from a provider.
pub fn build_network_with<D: DistanceProvider + ?Sized>(
    hub: &GeoPoint,
    points: &[GeoPoint],
    provider: &D,
) -> NetworkTree {
    let nodes: Vec<GeoPoint> = std::iter::once(*hub).chain(points.iter().copied()).collect();
    build_network(hub, points, |a, b| provider.distance(&nodes[a], &nodes[b]))
}

/// Network over a precomputed cache keyed by arena index pairs.
pub fn build_network_cached(hub: &GeoPoint, points: &[GeoPoint], cache: &PairCache) -> NetworkTree {
    build_network(hub, points, |a, b| cache.cost(a, b))
}
