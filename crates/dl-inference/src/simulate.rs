//! Synthetic panel simulation for the 2-group, 5-period DiD design.
//!
//! Generates `N` units × 5 periods with:
//! - y_it = b0_g + u_i + b1_g·t + τ_t + δ·D_i·P_t + ε_it
//! - u_i ~ N(0, unit_effect_sd), τ_t ~ N(0, time_effect_sd), ε_it ~ N(0, noise_std)
//!
//! where `g` is the unit's group, `D_i` its treatment flag and `P_t = 1{t = 1}`.
//!
//! Draw order is fixed (assignment shuffle, unit effects, period effects,
//! row noise in unit-major order), so a seed fully determines the panel.

use dl_core::{Error, GroupSizes, PERIODS, POST_PERIOD, Panel, PanelRow, Result};
use dl_prob::normal;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Structural parameters of the data-generating process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Treated-group outcome level at period 0, before heterogeneity and treatment.
    pub baseline_treated: f64,
    /// Control-group outcome level at period 0.
    pub baseline_control: f64,
    /// Per-period linear slope of the treated group.
    pub trend_treated: f64,
    /// Per-period linear slope of the control group.
    pub trend_control: f64,
    /// Ground-truth effect added to treated rows in the post period.
    pub treatment_effect: f64,
    /// Standard deviation of the per-row residual (≥ 0).
    pub noise_std: f64,
    /// Total number of units (≥ 2).
    pub n_units: usize,
    /// Fraction of units treated, in (0, 1).
    pub treat_ratio: f64,
    /// Standard deviation of the per-unit baseline effect.
    pub unit_effect_sd: f64,
    /// Standard deviation of the per-period common shock.
    pub time_effect_sd: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            baseline_treated: 10.0,
            baseline_control: 40.0,
            trend_treated: 4.0,
            trend_control: 4.0,
            treatment_effect: 8.0,
            noise_std: 3.0,
            n_units: 500,
            treat_ratio: 0.3,
            unit_effect_sd: 2.0,
            time_effect_sd: 2.5,
        }
    }
}

impl SimulationConfig {
    /// `floor(N · treat_ratio)` treated units, the rest control.
    pub fn group_sizes(&self) -> GroupSizes {
        let n_treated = (self.n_units as f64 * self.treat_ratio).floor() as usize;
        GroupSizes { n_treated, n_control: self.n_units.saturating_sub(n_treated) }
    }

    /// Reject parameters that cannot produce an estimable panel.
    pub fn validate(&self) -> Result<()> {
        if self.n_units < 2 {
            return Err(Error::InvalidConfiguration(format!(
                "n_units must be >= 2, got {}",
                self.n_units
            )));
        }
        if !self.treat_ratio.is_finite() || self.treat_ratio <= 0.0 || self.treat_ratio >= 1.0 {
            return Err(Error::InvalidConfiguration(format!(
                "treat_ratio must be in (0, 1), got {}",
                self.treat_ratio
            )));
        }
        let sizes = self.group_sizes();
        if sizes.n_treated == 0 || sizes.n_control == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "n_units={} with treat_ratio={} leaves an empty group ({} treated, {} control)",
                self.n_units, self.treat_ratio, sizes.n_treated, sizes.n_control
            )));
        }
        for (name, sd) in [
            ("noise_std", self.noise_std),
            ("unit_effect_sd", self.unit_effect_sd),
            ("time_effect_sd", self.time_effect_sd),
        ] {
            if !sd.is_finite() || sd < 0.0 {
                return Err(Error::InvalidConfiguration(format!(
                    "{} must be finite and >= 0, got {}",
                    name, sd
                )));
            }
        }
        for (name, v) in [
            ("baseline_treated", self.baseline_treated),
            ("baseline_control", self.baseline_control),
            ("trend_treated", self.trend_treated),
            ("trend_control", self.trend_control),
            ("treatment_effect", self.treatment_effect),
        ] {
            if !v.is_finite() {
                return Err(Error::InvalidConfiguration(format!("{} must be finite", name)));
            }
        }
        Ok(())
    }
}

/// Simulate a panel with a fresh generator seeded from `seed`.
///
/// Identical `(config, seed)` pairs return bit-identical panels.
pub fn simulate(config: &SimulationConfig, seed: u64) -> Result<Panel> {
    let mut rng = StdRng::seed_from_u64(seed);
    simulate_with_rng(config, &mut rng)
}

/// Simulate a panel drawing from a caller-owned generator.
///
/// Validation happens before the first draw; on error `rng` is untouched.
pub fn simulate_with_rng<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Result<Panel> {
    config.validate()?;
    let sizes = config.group_sizes();
    let n = config.n_units;

    // Treated first, then shuffled across unit ids.
    let mut treat: Vec<u8> = std::iter::repeat_n(1u8, sizes.n_treated)
        .chain(std::iter::repeat_n(0u8, sizes.n_control))
        .collect();
    treat.shuffle(rng);

    let unit_effects = normal::sample_n(rng, n, 0.0, config.unit_effect_sd);
    let time_effects = normal::sample_n(rng, PERIODS.len(), 0.0, config.time_effect_sd);

    let mut rows = Vec::with_capacity(n * PERIODS.len());
    for unit in 0..n {
        let d = treat[unit];
        let (baseline, trend) = if d == 1 {
            (config.baseline_treated, config.trend_treated)
        } else {
            (config.baseline_control, config.trend_control)
        };
        let unit_effect = unit_effects[unit];

        for (&t, &time_effect) in PERIODS.iter().zip(&time_effects) {
            let post = u8::from(t == POST_PERIOD);
            let eps = normal::sample(rng, 0.0, config.noise_std);
            let outcome = baseline
                + unit_effect
                + trend * t as f64
                + time_effect
                + config.treatment_effect * f64::from(d * post)
                + eps;
            rows.push(PanelRow {
                unit,
                treat: d,
                time_period: t,
                time_indicator: post,
                unit_baseline_effect: Some(unit_effect),
                time_effect: Some(time_effect),
                outcome,
            });
        }
    }

    log::debug!(
        "simulated panel: {} units ({} treated, {} control), {} rows",
        n,
        sizes.n_treated,
        sizes.n_control,
        rows.len()
    );

    Panel::from_rows(rows)
}
