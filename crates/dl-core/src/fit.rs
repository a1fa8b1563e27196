//! Fitted regression result for the 2×2 DiD design.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the interaction coefficient carrying the DiD estimate.
pub const INTERACTION: &str = "treat:time_indicator";

/// Coefficient covariance estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceType {
    /// Homoskedastic `s² (X'X)⁻¹` with Student-t inference.
    Classical,
    /// White sandwich with squared residuals.
    Hc0,
    /// HC0 scaled by `n / (n - k)`.
    Hc1,
    /// Squared residuals scaled by `1 / (1 - h_ii)`.
    #[default]
    Hc2,
    /// Squared residuals scaled by `1 / (1 - h_ii)²`.
    Hc3,
}

impl CovarianceType {
    /// Short label used in summaries.
    pub fn label(self) -> &'static str {
        match self {
            CovarianceType::Classical => "nonrobust",
            CovarianceType::Hc0 => "HC0",
            CovarianceType::Hc1 => "HC1",
            CovarianceType::Hc2 => "HC2",
            CovarianceType::Hc3 => "HC3",
        }
    }

    /// Whether inference uses the Student-t reference distribution.
    ///
    /// Robust types use the normal (z) reference.
    pub fn uses_t(self) -> bool {
        matches!(self, CovarianceType::Classical)
    }
}

/// The two periods collapsed into the 2×2 design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidWindow {
    /// Period coded as `time_indicator = 0`.
    pub pre_period: i64,
    /// Period coded as `time_indicator = 1`.
    pub post_period: i64,
}

/// One named regression coefficient with its inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    /// Regressor name.
    pub name: String,
    /// Point estimate.
    pub estimate: f64,
    /// Standard error from the chosen covariance estimator.
    pub std_error: f64,
    /// z- or t-statistic (`estimate / std_error`).
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// 95% CI lower bound.
    pub ci_low: f64,
    /// 95% CI upper bound.
    pub ci_high: f64,
}

/// Result of a DiD regression. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedResult {
    /// Header line for the summary (e.g. "DiD estimate").
    pub title: String,
    /// Periods used for the 2×2 collapse.
    pub window: DidWindow,
    /// Coefficients in design-column order.
    pub coefficients: Vec<Coefficient>,
    /// Coefficient covariance, row-major `k × k`.
    pub covariance: Vec<f64>,
    /// Covariance estimator used.
    pub cov_type: CovarianceType,
    /// Number of observations in the window.
    pub n_obs: usize,
    /// Residual degrees of freedom (`n - k`).
    pub df_resid: usize,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Adjusted R².
    pub adj_r_squared: f64,
    /// Residual sum of squares.
    pub rss: f64,
}

impl FittedResult {
    /// Look up a coefficient by name.
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    /// Point estimate of a coefficient by name.
    pub fn estimate(&self, name: &str) -> Option<f64> {
        self.coefficient(name).map(|c| c.estimate)
    }

    /// The `treat:time_indicator` coefficient (the DiD / placebo effect).
    pub fn interaction(&self) -> Option<&Coefficient> {
        self.coefficient(INTERACTION)
    }

    /// Whether the named coefficient's p-value is below `alpha`.
    pub fn is_significant(&self, name: &str, alpha: f64) -> Option<bool> {
        self.coefficient(name).map(|c| c.p_value < alpha)
    }

    /// Covariance entry `(i, j)`.
    pub fn cov(&self, i: usize, j: usize) -> Option<f64> {
        let k = self.coefficients.len();
        if i >= k || j >= k {
            return None;
        }
        self.covariance.get(i * k + j).copied()
    }

    /// Human-readable regression table.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FittedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(86);
        let thin = "-".repeat(86);
        let (stat, p) = if self.cov_type.uses_t() { ("t", "P>|t|") } else { ("z", "P>|z|") };

        writeln!(f, "{:^86}", self.title)?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<18}{:>10} -> {:<10}{:<24}{:>20}",
            "Window:", self.window.pre_period, self.window.post_period, "No. Observations:", self.n_obs
        )?;
        writeln!(
            f,
            "{:<18}{:<24}{:<24}{:>20}",
            "Covariance Type:",
            self.cov_type.label(),
            "Df Residuals:",
            self.df_resid
        )?;
        writeln!(
            f,
            "{:<18}{:<24.4}{:<24}{:>20.4}",
            "R-squared:", self.r_squared, "Adj. R-squared:", self.adj_r_squared
        )?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<24}{:>10}{:>11}{:>11}{:>10}{:>10}{:>10}",
            "", "coef", "std err", stat, p, "[0.025", "0.975]"
        )?;
        writeln!(f, "{}", thin)?;
        for c in &self.coefficients {
            writeln!(
                f,
                "{:<24}{:>10.4}{:>11.4}{:>11.3}{:>10.3}{:>10.3}{:>10.3}",
                c.name, c.estimate, c.std_error, c.statistic, c.p_value, c.ci_low, c.ci_high
            )?;
        }
        write!(f, "{}", rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coef(name: &str, estimate: f64, p_value: f64) -> Coefficient {
        Coefficient {
            name: name.to_string(),
            estimate,
            std_error: 1.0,
            statistic: estimate,
            p_value,
            ci_low: estimate - 1.96,
            ci_high: estimate + 1.96,
        }
    }

    fn fit() -> FittedResult {
        FittedResult {
            title: "DiD estimate".to_string(),
            window: DidWindow { pre_period: 0, post_period: 1 },
            coefficients: vec![
                coef("intercept", 40.0, 0.0),
                coef("treat", -30.0, 0.0),
                coef("time_indicator", 4.0, 0.001),
                coef(INTERACTION, 8.0, 0.01),
            ],
            covariance: (0..16).map(|i| i as f64).collect(),
            cov_type: CovarianceType::Hc2,
            n_obs: 20,
            df_resid: 16,
            r_squared: 0.9,
            adj_r_squared: 0.88,
            rss: 12.0,
        }
    }

    #[test]
    fn test_lookup() {
        let f = fit();
        assert_eq!(f.estimate("treat"), Some(-30.0));
        assert_eq!(f.interaction().map(|c| c.estimate), Some(8.0));
        assert_eq!(f.is_significant(INTERACTION, 0.05), Some(true));
        assert_eq!(f.is_significant(INTERACTION, 0.005), Some(false));
        assert!(f.coefficient("missing").is_none());
        assert_eq!(f.cov(1, 2), Some(6.0));
        assert_eq!(f.cov(4, 0), None);
    }

    #[test]
    fn test_summary_contains_rows() {
        let s = fit().summary();
        assert!(s.contains("DiD estimate"));
        assert!(s.contains("HC2"));
        assert!(s.contains("P>|z|"));
        assert!(s.contains(INTERACTION));
        assert_eq!(s.lines().filter(|l| l.starts_with("intercept")).count(), 1);
    }

    #[test]
    fn test_classical_uses_t_label() {
        let mut f = fit();
        f.cov_type = CovarianceType::Classical;
        let s = f.summary();
        assert!(s.contains("P>|t|"));
        assert!(s.contains("nonrobust"));
    }
}
