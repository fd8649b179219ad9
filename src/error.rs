//! Error types surfaced by the engine.

use std::fmt;

use crate::cancel::Cancelled;

/// Why an optimization request was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeError {
    MissingHub,
    EmptySilos,
    EmptyTrucks,
    /// The fleet must match the silo count one to one.
    CountMismatch { silos: usize, trucks: usize },
    /// Silo indices the network could not attach to the hub.
    UnreachableSilos(Vec<usize>),
    Assignment(AssignmentError),
    Cancelled,
}

impl fmt::Display for OptimizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizeError::MissingHub => f.write_str("a hub is required"),
            OptimizeError::EmptySilos => f.write_str("at least one silo is required"),
            OptimizeError::EmptyTrucks => f.write_str("at least one truck is required"),
            OptimizeError::CountMismatch { silos, trucks } => write!(
                f,
                "silo count ({}) must equal truck count ({})",
                silos, trucks
            ),
            OptimizeError::UnreachableSilos(indices) => {
                write!(f, "silos {:?} cannot be connected to the hub", indices)
            }
            OptimizeError::Assignment(err) => write!(f, "assignment failed: {}", err),
            OptimizeError::Cancelled => f.write_str("optimization was cancelled"),
        }
    }
}

impl std::error::Error for OptimizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OptimizeError::Assignment(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Cancelled> for OptimizeError {
    fn from(_: Cancelled) -> Self {
        OptimizeError::Cancelled
    }
}

impl From<AssignmentError> for OptimizeError {
    fn from(err: AssignmentError) -> Self {
        OptimizeError::Assignment(err)
    }
}

/// Cost matrix rejected by the assignment solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignmentError {
    NonSquare { rows: usize, cols: usize },
    NonFinite { row: usize, col: usize },
}

impl fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentError::NonSquare { rows, cols } => {
                write!(f, "cost matrix must be square, got {}x{}", rows, cols)
            }
            AssignmentError::NonFinite { row, col } => {
                write!(f, "cost at ({}, {}) is not a finite number", row, col)
            }
        }
    }
}

impl std::error::Error for AssignmentError {}

/// Failure talking to a routing service.
///
/// Never leaves the road-network provider: every variant is absorbed by a
/// geometric fallback.
#[derive(Debug)]
pub enum RoutingError {
    Transport(reqwest::Error),
    /// The service answered but had no route (`code` other than `Ok`).
    NoRoute(String),
    Malformed(String),
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::Transport(err) => write!(f, "transport error: {}", err),
            RoutingError::NoRoute(code) => write!(f, "no route: {}", code),
            RoutingError::Malformed(msg) => write!(f, "malformed response: {}", msg),
            RoutingError::ShapeMismatch { expected, actual } => write!(
                f,
                "expected {}x{} table, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
        }
    }
}

impl std::error::Error for RoutingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoutingError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RoutingError {
    fn from(err: reqwest::Error) -> Self {
        RoutingError::Transport(err)
    }
}
