//! Monte Carlo study of the DiD estimator.
//!
//! Replays simulate → [`estimate_did`] → [`placebo_test`] over seeds
//! `base_seed, base_seed + 1, …` and summarises bias, CI coverage and the
//! rejection rates of both tests.
//!
//! Replications run on Rayon but are collected in seed order, so the summary
//! is identical for any thread count.

use dl_core::{Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::econometrics::{estimate_did, placebo_test};
use crate::simulate::{SimulationConfig, simulate};

/// Study settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Number of simulated panels.
    pub n_replications: usize,
    /// Seed of the first replication.
    pub base_seed: u64,
    /// Significance level for rejection rates.
    pub alpha: f64,
    /// Number of Rayon threads (`0` = automatic).
    pub n_threads: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self { n_replications: 200, base_seed: 0, alpha: 0.05, n_threads: 0 }
    }
}

/// One simulated panel's estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Replication {
    /// Seed used for the panel.
    pub seed: u64,
    /// DiD interaction estimate.
    pub att: f64,
    /// HC2 standard error of the estimate.
    pub att_se: f64,
    /// p-value of the estimate.
    pub att_p_value: f64,
    /// Whether the 95% CI covers the configured effect.
    pub ci_covers_truth: bool,
    /// Placebo interaction estimate.
    pub placebo_effect: f64,
    /// p-value of the placebo estimate.
    pub placebo_p_value: f64,
}

/// Aggregate over all successful replications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    /// Replications requested.
    pub n_replications: usize,
    /// Replications whose estimation failed (degenerate design).
    pub n_failed: usize,
    /// Configured treatment effect.
    pub true_effect: f64,
    /// Mean DiD estimate.
    pub mean_att: f64,
    /// `mean_att - true_effect`.
    pub bias: f64,
    /// Mean of `|att - true_effect|`.
    pub mean_abs_deviation: f64,
    /// Sample standard deviation of the estimates.
    pub sd_att: f64,
    /// Fraction of 95% CIs containing the true effect.
    pub coverage: f64,
    /// Fraction of DiD estimates with `p < alpha`.
    pub rejection_rate: f64,
    /// Fraction of placebo estimates with `p < alpha`.
    pub placebo_rejection_rate: f64,
    /// Per-seed results, in seed order.
    pub replications: Vec<Replication>,
    /// Total wall time in seconds.
    pub wall_s: f64,
}

fn replicate(sim: &SimulationConfig, seed: u64) -> Result<Replication> {
    let panel = simulate(sim, seed)?;
    let did = estimate_did(&panel)?;
    let placebo = placebo_test(&panel)?;
    let missing = || Error::Computation("fit has no interaction coefficient".into());
    let att = did.interaction().ok_or_else(missing)?;
    let pl = placebo.interaction().ok_or_else(missing)?;
    Ok(Replication {
        seed,
        att: att.estimate,
        att_se: att.std_error,
        att_p_value: att.p_value,
        ci_covers_truth: att.ci_low <= sim.treatment_effect && sim.treatment_effect <= att.ci_high,
        placebo_effect: pl.estimate,
        placebo_p_value: pl.p_value,
    })
}

/// Run the study.
///
/// Invalid simulation or study settings fail up front with
/// [`Error::InvalidConfiguration`]. A replication failing with
/// [`Error::Estimation`] is counted in `n_failed`; any other error aborts.
pub fn monte_carlo(sim: &SimulationConfig, mc: &MonteCarloConfig) -> Result<MonteCarloSummary> {
    sim.validate()?;
    if mc.n_replications == 0 {
        return Err(Error::InvalidConfiguration("n_replications must be > 0".into()));
    }
    if !(mc.alpha > 0.0 && mc.alpha < 1.0) {
        return Err(Error::InvalidConfiguration(format!(
            "alpha must be in (0, 1), got {}",
            mc.alpha
        )));
    }

    let start = std::time::Instant::now();

    let run = || -> Vec<Result<Replication>> {
        (0..mc.n_replications)
            .into_par_iter()
            .map(|i| replicate(sim, mc.base_seed.wrapping_add(i as u64)))
            .collect()
    };

    let outcomes = if mc.n_threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(mc.n_threads)
            .build()
            .map_err(|e| Error::Computation(format!("failed to create thread pool: {e}")))?;
        pool.install(run)
    } else {
        run()
    };

    let mut replications = Vec::with_capacity(outcomes.len());
    let mut n_failed = 0usize;
    for outcome in outcomes {
        match outcome {
            Ok(r) => replications.push(r),
            Err(Error::Estimation(_)) => n_failed += 1,
            Err(e) => return Err(e),
        }
    }
    if replications.is_empty() {
        return Err(Error::Estimation(format!(
            "all {} replications failed to estimate",
            mc.n_replications
        )));
    }

    let m = replications.len() as f64;
    let truth = sim.treatment_effect;
    let mean_att = replications.iter().map(|r| r.att).sum::<f64>() / m;
    let mean_abs_deviation = replications.iter().map(|r| (r.att - truth).abs()).sum::<f64>() / m;
    let sd_att = if replications.len() > 1 {
        (replications.iter().map(|r| (r.att - mean_att).powi(2)).sum::<f64>() / (m - 1.0)).sqrt()
    } else {
        0.0
    };
    let rate = |count: usize| count as f64 / m;
    let coverage = rate(replications.iter().filter(|r| r.ci_covers_truth).count());
    let rejection_rate = rate(replications.iter().filter(|r| r.att_p_value < mc.alpha).count());
    let placebo_rejection_rate =
        rate(replications.iter().filter(|r| r.placebo_p_value < mc.alpha).count());

    let wall_s = start.elapsed().as_secs_f64();
    log::debug!(
        "monte carlo: {} replications ({} failed), mean_att={:.4}, coverage={:.3}, {:.2}s",
        mc.n_replications,
        n_failed,
        mean_att,
        coverage,
        wall_s
    );

    Ok(MonteCarloSummary {
        n_replications: mc.n_replications,
        n_failed,
        true_effect: truth,
        mean_att,
        bias: mean_att - truth,
        mean_abs_deviation,
        sd_att,
        coverage,
        rejection_rate,
        placebo_rejection_rate,
        replications,
        wall_s,
    })
}
