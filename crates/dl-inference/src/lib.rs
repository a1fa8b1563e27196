//! # dl-inference
//!
//! Simulation and estimation for DiDLab.
//!
//! This crate provides:
//! - the panel data-generating process (`simulate`)
//! - OLS with robust covariance and the 2×2 DiD / placebo estimators
//!   (`econometrics`)
//! - Monte Carlo studies of estimator bias, coverage and placebo size
//!   (`monte_carlo`)
//!
//! Every entry point is a pure function of its inputs (plus an explicit seed
//! for simulation); nothing is cached or shared between calls.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// OLS, robust covariance, DiD and placebo estimators.
pub mod econometrics;
/// Replicated simulate → estimate studies.
pub mod monte_carlo;
/// Synthetic panel data-generating process.
pub mod simulate;

pub use econometrics::{BiasReport, DidMeans, did_2x2, estimate_did, placebo_test};
pub use monte_carlo::{MonteCarloConfig, MonteCarloSummary, Replication, monte_carlo};
pub use simulate::{SimulationConfig, simulate, simulate_with_rng};
