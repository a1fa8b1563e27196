//! Simulation parameters from a config file plus command-line overrides.
//!
//! The config file is YAML or JSON (YAML is a superset, so one parser reads
//! both). Missing fields take the library defaults; flags given on the
//! command line win over the file. Range checks live in the library.

use anyhow::{Context, Result};
use dl_inference::SimulationConfig;
use std::path::{Path, PathBuf};

#[derive(clap::Args, Debug, Clone)]
pub struct SimArgs {
    /// Simulation config file (YAML or JSON).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Random seed (first seed for monte-carlo).
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Treated-group baseline at period 0.
    #[arg(long, allow_negative_numbers = true)]
    pub baseline_treated: Option<f64>,

    /// Control-group baseline at period 0.
    #[arg(long, allow_negative_numbers = true)]
    pub baseline_control: Option<f64>,

    /// Treated-group per-period trend.
    #[arg(long, allow_negative_numbers = true)]
    pub trend_treated: Option<f64>,

    /// Control-group per-period trend.
    #[arg(long, allow_negative_numbers = true)]
    pub trend_control: Option<f64>,

    /// True treatment effect.
    #[arg(long, allow_negative_numbers = true)]
    pub treatment_effect: Option<f64>,

    /// Residual noise standard deviation.
    #[arg(long)]
    pub noise_std: Option<f64>,

    /// Number of units.
    #[arg(long)]
    pub n_units: Option<usize>,

    /// Fraction of units treated, in (0, 1).
    #[arg(long)]
    pub treat_ratio: Option<f64>,

    /// Standard deviation of unit baseline effects.
    #[arg(long)]
    pub unit_effect_sd: Option<f64>,

    /// Standard deviation of period shocks.
    #[arg(long)]
    pub time_effect_sd: Option<f64>,
}

impl SimArgs {
    /// File (or defaults) with flag overrides applied.
    pub fn resolve(&self) -> Result<SimulationConfig> {
        let mut cfg = match &self.config {
            Some(path) => read_simulation_config(path)?,
            None => SimulationConfig::default(),
        };
        let f64_overrides = [
            (&mut cfg.baseline_treated, self.baseline_treated),
            (&mut cfg.baseline_control, self.baseline_control),
            (&mut cfg.trend_treated, self.trend_treated),
            (&mut cfg.trend_control, self.trend_control),
            (&mut cfg.treatment_effect, self.treatment_effect),
            (&mut cfg.noise_std, self.noise_std),
            (&mut cfg.treat_ratio, self.treat_ratio),
            (&mut cfg.unit_effect_sd, self.unit_effect_sd),
            (&mut cfg.time_effect_sd, self.time_effect_sd),
        ];
        for (slot, value) in f64_overrides {
            if let Some(v) = value {
                *slot = v;
            }
        }
        if let Some(n) = self.n_units {
            cfg.n_units = n;
        }
        tracing::debug!(?cfg, "resolved simulation config");
        Ok(cfg)
    }
}

pub fn read_simulation_config(path: &Path) -> Result<SimulationConfig> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: SimulationConfig = serde_yaml_ng::from_slice(&bytes)
        .with_context(|| format!("parsing simulation config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SimArgs {
        SimArgs {
            config: None,
            seed: 42,
            baseline_treated: None,
            baseline_control: None,
            trend_treated: None,
            trend_control: None,
            treatment_effect: None,
            noise_std: None,
            n_units: None,
            treat_ratio: None,
            unit_effect_sd: None,
            time_effect_sd: None,
        }
    }

    #[test]
    fn test_defaults_without_file() {
        assert_eq!(args().resolve().unwrap(), SimulationConfig::default());
    }

    #[test]
    fn test_flags_override() {
        let a = SimArgs { treatment_effect: Some(-5.0), n_units: Some(30), ..args() };
        let cfg = a.resolve().unwrap();
        assert_eq!(cfg.treatment_effect, -5.0);
        assert_eq!(cfg.n_units, 30);
        assert_eq!(cfg.noise_std, 3.0);
    }

    #[test]
    fn test_yaml_and_json_files() {
        let dir = std::env::temp_dir();
        let yaml = dir.join(format!("didlab_cfg_{}.yaml", std::process::id()));
        std::fs::write(&yaml, "n_units: 12\ntreat_ratio: 0.5\nnoise_std: 0\n").unwrap();
        let json = dir.join(format!("didlab_cfg_{}.json", std::process::id()));
        std::fs::write(&json, r#"{"n_units": 12, "treat_ratio": 0.5, "noise_std": 0}"#).unwrap();

        let a = read_simulation_config(&yaml).unwrap();
        let b = read_simulation_config(&json).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n_units, 12);
        assert_eq!(a.baseline_control, 40.0);

        let with_override = SimArgs { config: Some(yaml.clone()), n_units: Some(20), ..args() };
        assert_eq!(with_override.resolve().unwrap().n_units, 20);

        let _ = std::fs::remove_file(yaml);
        let _ = std::fs::remove_file(json);
    }
}
