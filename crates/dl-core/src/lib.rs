//! # dl-core
//!
//! Core types for DiDLab: the error taxonomy, the simulated panel table and
//! the fitted regression result shared by the simulator, the estimator and
//! the CLI.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fit;
pub mod types;

pub use error::{Error, Result};
pub use fit::{Coefficient, CovarianceType, DidWindow, FittedResult, INTERACTION};
pub use types::{GroupMean, GroupSizes, N_PERIODS, PERIODS, POST_PERIOD, Panel, PanelRow};
