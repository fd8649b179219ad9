//! Property tests against brute-force ground truth on random instances.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use silo_planner::assignment::{naive_baseline, solve, solve_rectangular, total_cost};
use silo_planner::geo::GeoPoint;
use silo_planner::haversine::GeometricDistance;
use silo_planner::matrix::DistanceMatrix;
use silo_planner::network::{ROOT, build_network_with};
use silo_planner::tour::{sequence, tour_length};

// ============================================================================
// Helpers
// ============================================================================

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> DistanceMatrix {
    let mut matrix = DistanceMatrix::new(rows, cols, 0.0);
    for i in 0..rows {
        for j in 0..cols {
            matrix.set(i, j, rng.gen_range(0.0..100.0_f64).round());
        }
    }
    matrix
}

fn random_points(rng: &mut StdRng, n: usize, make: fn(u32, f64, f64) -> GeoPoint) -> Vec<GeoPoint> {
    (0..n)
        .map(|i| make(i as u32 + 1, rng.gen_range(-17.9..-17.7), rng.gen_range(-63.3..-63.1)))
        .collect()
}

/// Every permutation of `0..n` (Heap's algorithm).
fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn heap(k: usize, items: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if k <= 1 {
            out.push(items.clone());
            return;
        }
        heap(k - 1, items, out);
        for i in 0..k - 1 {
            if k % 2 == 0 {
                items.swap(i, k - 1);
            } else {
                items.swap(0, k - 1);
            }
            heap(k - 1, items, out);
        }
    }

    let mut items: Vec<usize> = (0..n).collect();
    let mut out = Vec::new();
    heap(n, &mut items, &mut out);
    out
}

fn brute_force_assignment(costs: &DistanceMatrix) -> f64 {
    permutations(costs.rows())
        .iter()
        .map(|perm| perm.iter().enumerate().map(|(i, &j)| costs.get(i, j)).sum::<f64>())
        .fold(f64::INFINITY, f64::min)
}

// ============================================================================
// Assignment
// ============================================================================

#[test]
fn test_random_points_span_the_whole_box() {
    let mut rng = StdRng::seed_from_u64(7);
    let points = random_points(&mut rng, 2000, GeoPoint::silo);
    assert!(points.iter().all(|p| (-17.9..-17.7).contains(&p.lat())));
    assert!(points.iter().all(|p| (-63.3..-63.1).contains(&p.lng())));
    // Both halves of each range get used.
    assert!(points.iter().any(|p| p.lat() > -17.75));
    assert!(points.iter().any(|p| p.lng() > -63.15));
}

#[test]
fn test_permutations_count() {
    assert_eq!(permutations(4).len(), 24);
    let distinct: HashSet<Vec<usize>> = permutations(5).into_iter().collect();
    assert_eq!(distinct.len(), 120);
}

#[test]
fn test_hungarian_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in 1..=6 {
        for _ in 0..25 {
            let costs = random_matrix(&mut rng, n, n);
            let assignment = solve(&costs).unwrap();

            let tasks: HashSet<usize> = assignment.as_slice().iter().copied().collect();
            assert_eq!(tasks.len(), n);
            assert!(tasks.iter().all(|&t| t < n));

            let best = brute_force_assignment(&costs);
            let got = total_cost(&assignment, &costs);
            assert!((got - best).abs() < 1e-9, "n={} got {} best {}", n, got, best);
        }
    }
}

#[test]
fn test_optimal_never_worse_than_greedy() {
    let mut rng = StdRng::seed_from_u64(42);
    for n in 1..=12 {
        for _ in 0..10 {
            let costs = random_matrix(&mut rng, n, n);
            let optimal = solve(&costs).unwrap().total_cost(&costs);
            let greedy = naive_baseline(&costs).unwrap().total_cost(&costs);
            assert!(optimal <= greedy + 1e-9);
        }
    }
}

#[test]
fn test_rectangular_matches_all_real_rows() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let costs = random_matrix(&mut rng, 3, 5);
        let padded = solve_rectangular(&costs, 9999.0).unwrap();
        let pairs: Vec<(usize, usize)> = padded.real_pairs().collect();
        assert_eq!(pairs.len(), 3);
        let tasks: HashSet<usize> = pairs.iter().map(|&(_, t)| t).collect();
        assert_eq!(tasks.len(), 3);
    }
}

// ============================================================================
// Network
// ============================================================================

#[test]
fn test_network_is_spanning_tree() {
    let mut rng = StdRng::seed_from_u64(11);
    let hub = GeoPoint::hub(-17.8, -63.2);
    for n in 0..15 {
        let points = random_points(&mut rng, n, GeoPoint::silo);
        let tree = build_network_with(&hub, &points, &GeometricDistance::planar());

        assert_eq!(tree.edges().len(), n);
        assert!(tree.is_connected());
        let sum: f64 = tree.edges().iter().map(|e| e.cost).sum();
        assert!((sum - tree.total_cost()).abs() < 1e-9);

        // Every node reaches the hub without revisiting anything.
        for node in 0..=n {
            let path = tree.path_to_root(node).unwrap();
            assert_eq!(path.last(), Some(&ROOT));
            let distinct: HashSet<usize> = path.iter().copied().collect();
            assert_eq!(distinct.len(), path.len());
        }
    }
}

#[test]
fn test_network_no_cheaper_than_any_star() {
    // The star from the hub is one spanning tree; the minimum can't exceed it.
    let mut rng = StdRng::seed_from_u64(19);
    let hub = GeoPoint::hub(-17.8, -63.2);
    let provider = GeometricDistance::planar();
    let points = random_points(&mut rng, 10, GeoPoint::silo);
    let tree = build_network_with(&hub, &points, &provider);
    let star: f64 = points.iter().map(|p| provider.km(hub.coords(), p.coords())).sum();
    assert!(tree.total_cost() <= star + 1e-9);
}

// ============================================================================
// Tour
// ============================================================================

#[test]
fn test_tour_feasible_and_not_below_optimal() {
    let mut rng = StdRng::seed_from_u64(23);
    let start = GeoPoint::depot(-17.783375, -63.182061);
    let haversine = GeometricDistance::haversine();

    for n in 1..=6 {
        let stops = random_points(&mut rng, n, GeoPoint::order);
        let tour = sequence(&start, &stops);

        let mut order = tour.visit_order.clone();
        order.sort_unstable();
        assert_eq!(order, (0..n).collect::<Vec<_>>());
        assert_eq!(tour.waypoints.len(), n + 2);
        assert_eq!(tour.waypoints.first(), Some(&start));
        assert_eq!(tour.waypoints.last(), Some(&start));

        let optimal = permutations(n)
            .iter()
            .map(|perm| tour_length(&start, &stops, perm, &haversine))
            .fold(f64::INFINITY, f64::min);
        assert!(tour.total_km + 1e-9 >= optimal);
    }
}
