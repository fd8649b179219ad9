//! silo-planner optimization engine
//!
//! Connects silos to a hub with a minimum spanning network, positions one
//! truck per silo with an optimal assignment, and sequences single-vehicle
//! delivery tours.

pub mod assignment;
pub mod cancel;
pub mod error;
pub mod geo;
pub mod haversine;
pub mod matrix;
pub mod network;
pub mod osrm;
pub mod polyline;
pub mod road;
pub mod solver;
pub mod tour;
pub mod traits;
