//! Derived quantities for presenting a DiD fit.

use dl_core::{Error, FittedResult, Result};
use serde::{Deserialize, Serialize};

/// Fitted cell means of the 2×2 design and the treated counterfactual.
///
/// With coefficients `b0..b3` in design order:
/// control `b0 → b0+b2`, treated `b0+b1 → b0+b1+b2+b3`, counterfactual
/// `b0+b1+b2` (treated group following the control trend).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DidMeans {
    /// Control group, pre period.
    pub control_pre: f64,
    /// Control group, post period.
    pub control_post: f64,
    /// Treated group, pre period.
    pub treated_pre: f64,
    /// Treated group, post period.
    pub treated_post: f64,
    /// Treated group, post period, had it followed the control trend.
    pub treated_counterfactual: f64,
}

impl DidMeans {
    /// Read the four DiD coefficients off a fit.
    pub fn from_fit(fit: &FittedResult) -> Result<Self> {
        let get = |name: &str| {
            fit.estimate(name)
                .ok_or_else(|| Error::Validation(format!("fit has no '{}' coefficient", name)))
        };
        let b0 = get("intercept")?;
        let b1 = get("treat")?;
        let b2 = get("time_indicator")?;
        let b3 = get(dl_core::INTERACTION)?;
        Ok(Self {
            control_pre: b0,
            control_post: b0 + b2,
            treated_pre: b0 + b1,
            treated_post: b0 + b1 + b2 + b3,
            treated_counterfactual: b0 + b1 + b2,
        })
    }
}

/// Estimated vs. true effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasReport {
    /// Configured ground-truth effect.
    pub true_effect: f64,
    /// DiD point estimate.
    pub estimate: f64,
    /// `estimate - true_effect`.
    pub bias: f64,
    /// 95% CI lower bound.
    pub ci_low: f64,
    /// 95% CI upper bound.
    pub ci_high: f64,
    /// Whether the CI contains the true effect.
    pub ci_covers_truth: bool,
    /// Two-sided p-value of the estimate.
    pub p_value: f64,
    /// `p_value < alpha`.
    pub significant: bool,
}

impl BiasReport {
    /// Compare the fit's interaction coefficient against `true_effect`.
    pub fn new(fit: &FittedResult, true_effect: f64, alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(Error::Validation(format!("alpha must be in (0, 1), got {}", alpha)));
        }
        let c = fit
            .interaction()
            .ok_or_else(|| Error::Validation("fit has no interaction coefficient".into()))?;
        Ok(Self {
            true_effect,
            estimate: c.estimate,
            bias: c.estimate - true_effect,
            ci_low: c.ci_low,
            ci_high: c.ci_high,
            ci_covers_truth: c.ci_low <= true_effect && true_effect <= c.ci_high,
            p_value: c.p_value,
            significant: c.p_value < alpha,
        })
    }
}
