//! Canonical 2×2 Difference-in-Differences estimator and placebo test.
//!
//! Both entry points collapse the panel to two periods and fit
//! `y = α + β₁·treat + β₂·post + δ·(treat×post) + ε` by OLS with robust
//! standard errors; δ is the DiD estimate. They differ only in which two
//! periods form the window:
//!
//! - [`estimate_did`]: periods `0 → 1` (the real treatment)
//! - [`placebo_test`]: periods `-1 → 0` (a pretend treatment, should be ≈ 0
//!   under parallel trends)
//!
//! # References
//!
//! - Angrist & Pischke, *Mostly Harmless Econometrics*, Ch. 5.

use dl_core::{CovarianceType, DidWindow, Error, FittedResult, INTERACTION, PERIODS, Panel, Result};
use nalgebra::{DMatrix, DVector};

use super::ols::ols_fit;

/// Design-column names, in order.
pub const COEFFICIENT_NAMES: [&str; 4] = ["intercept", "treat", "time_indicator", INTERACTION];

/// Window of the main estimate.
pub const DID_WINDOW: DidWindow = DidWindow { pre_period: 0, post_period: 1 };

/// Window of the pre-trend placebo test.
pub const PLACEBO_WINDOW: DidWindow = DidWindow { pre_period: -1, post_period: 0 };

/// Estimate the ATT from periods 0 and 1 with HC2 standard errors.
pub fn estimate_did(panel: &Panel) -> Result<FittedResult> {
    let mut fit = did_2x2(panel, DID_WINDOW, CovarianceType::Hc2)?;
    fit.title = "DiD estimate (ATT)".to_string();
    Ok(fit)
}

/// Placebo DiD on periods -1 and 0, treating period 0 as "post".
pub fn placebo_test(panel: &Panel) -> Result<FittedResult> {
    let mut fit = did_2x2(panel, PLACEBO_WINDOW, CovarianceType::Hc2)?;
    fit.title = "Placebo test (pre-trend)".to_string();
    Ok(fit)
}

/// 2×2 DiD regression on an arbitrary pair of periods.
///
/// Keeps rows with `time_period ∈ {pre, post}` and recodes
/// `time_indicator = 1{time_period == post}` before fitting.
pub fn did_2x2(panel: &Panel, window: DidWindow, cov_type: CovarianceType) -> Result<FittedResult> {
    let DidWindow { pre_period, post_period } = window;
    if pre_period == post_period {
        return Err(Error::Validation(format!(
            "window periods must differ, got {} and {}",
            pre_period, post_period
        )));
    }
    for p in [pre_period, post_period] {
        if !PERIODS.contains(&p) {
            return Err(Error::Validation(format!("period {} is not one of {:?}", p, PERIODS)));
        }
    }

    let mut x_data = Vec::new();
    let mut y = Vec::new();
    // cells[treat][post]
    let mut cells = [[0usize; 2]; 2];
    for row in panel.rows() {
        if row.time_period != pre_period && row.time_period != post_period {
            continue;
        }
        let post = usize::from(row.time_period == post_period);
        let d = row.treat as usize;
        cells[d][post] += 1;

        let (d, p) = (d as f64, post as f64);
        x_data.extend_from_slice(&[1.0, d, p, d * p]);
        y.push(row.outcome);
    }

    let n_control = cells[0][0] + cells[0][1];
    let n_treated = cells[1][0] + cells[1][1];
    if n_control == 0 || n_treated == 0 {
        return Err(Error::Estimation(format!(
            "window {} -> {} needs both groups (treated rows: {}, control rows: {})",
            pre_period, post_period, n_treated, n_control
        )));
    }
    for (d, label) in [(0, "control"), (1, "treated")] {
        for (p, period) in [(0, pre_period), (1, post_period)] {
            if cells[d][p] == 0 {
                return Err(Error::Estimation(format!(
                    "no {} observations in period {}; interaction is not identified",
                    label, period
                )));
            }
        }
    }

    let n = y.len();
    let k = COEFFICIENT_NAMES.len();
    let x = DMatrix::from_row_slice(n, k, &x_data);
    let y = DVector::from_vec(y);

    let ols = ols_fit(&x, &y, cov_type)?;
    let coefficients = ols.coefficient_table(&COEFFICIENT_NAMES)?;

    log::debug!(
        "did_2x2 {} -> {}: n={}, cells={:?}, delta={:.6}",
        pre_period,
        post_period,
        n,
        cells,
        ols.beta[3]
    );

    // nalgebra is column-major; store row-major.
    let cov = &ols.covariance;
    let covariance = (0..k).flat_map(|i| (0..k).map(move |j| cov[(i, j)])).collect();

    Ok(FittedResult {
        title: format!("2x2 DiD regression ({} -> {})", pre_period, post_period),
        window,
        coefficients,
        covariance,
        cov_type,
        n_obs: n,
        df_resid: ols.df_resid(),
        r_squared: ols.r_squared(),
        adj_r_squared: ols.adj_r_squared(),
        rss: ols.rss,
    })
}
