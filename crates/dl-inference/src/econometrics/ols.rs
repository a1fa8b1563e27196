//! Ordinary least squares with classical and heteroskedasticity-consistent covariance.
//!
//! Sandwich form `V = (X'X)⁻¹ X' Ω X (X'X)⁻¹` with `Ω = diag(ω_i)`:
//! - HC0: `ω_i = e_i²`
//! - HC1: HC0 · n / (n − k)
//! - HC2: `ω_i = e_i² / (1 − h_ii)`
//! - HC3: `ω_i = e_i² / (1 − h_ii)²`
//!
//! where `h_ii` is the leverage (diagonal of the hat matrix).
//!
//! # References
//!
//! - MacKinnon & White (1985), "Some heteroskedasticity-consistent covariance
//!   matrix estimators with improved finite sample properties."
//! - Long & Ervin (2000), "Using heteroscedasticity consistent standard errors
//!   in the linear regression model."

use dl_core::{Coefficient, CovarianceType, Error, FittedResult, Result};
use dl_prob::{normal, student_t};
use nalgebra::{DMatrix, DVector};

/// Leverages at or above this are treated as 1 (HC2/HC3 undefined).
const LEVERAGE_TOL: f64 = 1e-10;

/// Raw OLS fit: coefficients, covariance and goodness of fit.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Coefficient vector (length k).
    pub beta: DVector<f64>,
    /// Coefficient covariance (k × k) for the requested estimator.
    pub covariance: DMatrix<f64>,
    /// Residuals `y − Xβ`.
    pub residuals: DVector<f64>,
    /// Residual sum of squares.
    pub rss: f64,
    /// Centered total sum of squares.
    pub tss: f64,
    /// Observations.
    pub n: usize,
    /// Regressors (including intercept column).
    pub k: usize,
    /// Covariance estimator used.
    pub cov_type: CovarianceType,
}

impl OlsFit {
    /// Residual degrees of freedom `n − k`.
    pub fn df_resid(&self) -> usize {
        self.n - self.k
    }

    /// `1 − RSS/TSS`; 0 when the outcome is constant.
    pub fn r_squared(&self) -> f64 {
        if self.tss > 0.0 { 1.0 - self.rss / self.tss } else { 0.0 }
    }

    /// Adjusted R² `1 − (1 − R²)(n − 1)/(n − k)`.
    pub fn adj_r_squared(&self) -> f64 {
        1.0 - (1.0 - self.r_squared()) * (self.n as f64 - 1.0) / self.df_resid() as f64
    }

    /// Standard errors `sqrt(diag(V))`.
    pub fn std_errors(&self) -> Vec<f64> {
        (0..self.k).map(|j| self.covariance[(j, j)].max(0.0).sqrt()).collect()
    }

    /// Named coefficient table with test statistics, p-values and 95% CIs.
    pub fn coefficient_table(&self, names: &[&str]) -> Result<Vec<Coefficient>> {
        if names.len() != self.k {
            return Err(Error::Validation(format!(
                "expected {} coefficient names, got {}",
                self.k,
                names.len()
            )));
        }
        let df = self.df_resid() as f64;
        let crit = critical_value(self.cov_type, 0.05, df)?;
        let se = self.std_errors();

        names
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let estimate = self.beta[j];
                let statistic = if se[j] > 0.0 { estimate / se[j] } else { f64::NAN };
                let p_value = if self.cov_type.uses_t() {
                    student_t::two_sided_p_value(statistic, df)?
                } else {
                    normal::two_sided_p_value(statistic)
                };
                Ok(Coefficient {
                    name: (*name).to_string(),
                    estimate,
                    std_error: se[j],
                    statistic,
                    p_value,
                    ci_low: estimate - crit * se[j],
                    ci_high: estimate + crit * se[j],
                })
            })
            .collect()
    }
}

/// Two-sided critical value at level `alpha` for the estimator's reference distribution.
pub fn critical_value(cov_type: CovarianceType, alpha: f64, df: f64) -> Result<f64> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::Validation(format!("alpha must be in (0, 1), got {}", alpha)));
    }
    let p = 1.0 - alpha / 2.0;
    if cov_type.uses_t() { student_t::quantile(p, df) } else { normal::quantile(p) }
}

/// Confidence interval for a named coefficient at level `1 − alpha`.
///
/// Returns `Ok(None)` if the coefficient is absent.
pub fn conf_int(fit: &FittedResult, name: &str, alpha: f64) -> Result<Option<(f64, f64)>> {
    let Some(c) = fit.coefficient(name) else {
        return Ok(None);
    };
    let crit = critical_value(fit.cov_type, alpha, fit.df_resid as f64)?;
    Ok(Some((c.estimate - crit * c.std_error, c.estimate + crit * c.std_error)))
}

/// Fit `y = Xβ + e` by OLS.
///
/// `x` must include the intercept column if one is wanted. Fails with
/// [`Error::Estimation`] when `n ≤ k`, when X'X is singular, or when HC2/HC3
/// meet an observation with unit leverage.
pub fn ols_fit(x: &DMatrix<f64>, y: &DVector<f64>, cov_type: CovarianceType) -> Result<OlsFit> {
    let n = x.nrows();
    let k = x.ncols();
    if y.len() != n {
        return Err(Error::Validation(format!("y length ({}) != rows of X ({})", y.len(), n)));
    }
    if k == 0 {
        return Err(Error::Validation("X must have at least 1 column".into()));
    }
    if n <= k {
        return Err(Error::Estimation(format!(
            "need more observations than regressors (n={}, k={})",
            n, k
        )));
    }

    let xtx = x.transpose() * x;
    let xty = x.transpose() * y;
    let xtx_inv =
        xtx.try_inverse().ok_or_else(|| Error::Estimation("X'X is singular (collinear design)".into()))?;
    let beta = &xtx_inv * &xty;

    let y_hat = x * &beta;
    let residuals = y - &y_hat;
    let rss: f64 = residuals.iter().map(|r| r * r).sum();
    let y_mean = y.mean();
    let tss: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();

    let covariance = match cov_type {
        CovarianceType::Classical => {
            let sigma2 = rss / (n - k) as f64;
            &xtx_inv * sigma2
        }
        _ => robust_covariance(x, &residuals, &xtx_inv, cov_type)?,
    };

    Ok(OlsFit { beta, covariance, residuals, rss, tss, n, k, cov_type })
}

/// Leverages `h_ii = x_i' (X'X)⁻¹ x_i`.
pub fn leverage(x: &DMatrix<f64>, xtx_inv: &DMatrix<f64>) -> Vec<f64> {
    let xa = x * xtx_inv;
    (0..x.nrows()).map(|i| xa.row(i).dot(&x.row(i))).collect()
}

/// Heteroskedasticity-consistent sandwich covariance.
pub fn robust_covariance(
    x: &DMatrix<f64>,
    residuals: &DVector<f64>,
    xtx_inv: &DMatrix<f64>,
    cov_type: CovarianceType,
) -> Result<DMatrix<f64>> {
    let n = x.nrows();
    let k = x.ncols();

    let omega: Vec<f64> = match cov_type {
        CovarianceType::Classical => {
            return Err(Error::Validation("classical covariance is not a sandwich estimator".into()));
        }
        CovarianceType::Hc0 | CovarianceType::Hc1 => residuals.iter().map(|e| e * e).collect(),
        CovarianceType::Hc2 | CovarianceType::Hc3 => {
            let h = leverage(x, xtx_inv);
            let power = if cov_type == CovarianceType::Hc2 { 1 } else { 2 };
            let mut omega = Vec::with_capacity(n);
            for (i, (&h_i, &e_i)) in h.iter().zip(residuals.iter()).enumerate() {
                let one_minus_h = 1.0 - h_i;
                if one_minus_h <= LEVERAGE_TOL {
                    return Err(Error::Estimation(format!(
                        "observation {} has leverage 1; {} covariance is undefined",
                        i,
                        cov_type.label()
                    )));
                }
                omega.push(e_i * e_i / one_minus_h.powi(power));
            }
            omega
        }
    };

    // Meat: X' diag(ω) X
    let x_weighted = DMatrix::from_fn(n, k, |i, j| x[(i, j)] * omega[i]);
    let meat = x.transpose() * x_weighted;
    let mut v = xtx_inv * meat * xtx_inv;

    if cov_type == CovarianceType::Hc1 {
        v *= n as f64 / (n - k) as f64;
    }
    Ok(v)
}
