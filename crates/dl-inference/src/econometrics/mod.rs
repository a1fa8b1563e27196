//! Econometrics for the 2-group panel DiD design.
//!
//! This module provides:
//! - **OLS** with classical and heteroskedasticity-consistent (HC0–HC3)
//!   covariance, leverages and confidence intervals.
//! - **Difference-in-Differences**: one parameterised 2×2 routine shared by
//!   the main ATT estimate and the pre-trend placebo test.
//! - **Diagnostics**: fitted cell means / counterfactual and bias reports.

pub mod diagnostics;
pub mod did;
pub mod ols;

pub use diagnostics::{BiasReport, DidMeans};
pub use did::{COEFFICIENT_NAMES, DID_WINDOW, PLACEBO_WINDOW, did_2x2, estimate_did, placebo_test};
pub use ols::{OlsFit, conf_int, critical_value, leverage, ols_fit, robust_covariance};
