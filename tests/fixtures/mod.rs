//! Test fixtures for silo-planner.
//!
//! Provides realistic test data:
//! - Demo scenarios around Santa Cruz de la Sierra, Bolivia

pub mod santa_cruz_scenarios;
