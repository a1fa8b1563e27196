//! DiDLab CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dl_core::Panel;
use dl_inference::econometrics::conf_int;
use dl_inference::monte_carlo::{MonteCarloConfig, monte_carlo};
use dl_inference::{BiasReport, DidMeans, estimate_did, placebo_test, simulate};
use std::path::{Path, PathBuf};

mod config;

use config::SimArgs;

#[derive(Parser)]
#[command(name = "didlab")]
#[command(about = "DiDLab - difference-in-differences simulation and estimation")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a panel and print it as JSON
    Simulate {
        #[command(flatten)]
        sim: SimArgs,

        /// Output file (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 2×2 DiD estimate on periods 0 → 1 (HC2 standard errors)
    Estimate {
        #[command(flatten)]
        sim: SimArgs,

        /// Estimate on a panel JSON file instead of simulating one.
        #[arg(long)]
        panel: Option<PathBuf>,

        /// Significance level for the reported decision.
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Placebo DiD on periods -1 → 0 (parallel-trends check)
    Placebo {
        #[command(flatten)]
        sim: SimArgs,

        /// Test a panel JSON file instead of simulating one.
        #[arg(long)]
        panel: Option<PathBuf>,

        /// Significance level for the reported decision.
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Repeat simulate → estimate → placebo over many seeds
    MonteCarlo {
        #[command(flatten)]
        sim: SimArgs,

        /// Number of replications (seeds `seed .. seed + n`).
        #[arg(long, default_value = "200")]
        replications: usize,

        /// Significance level for rejection rates.
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Threads (0 = auto). Results do not depend on this.
        #[arg(long, default_value = "0")]
        threads: usize,

        /// Keep per-seed results in the output.
        #[arg(long)]
        include_replications: bool,

        /// Output file (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Simulate { sim, output } => cmd_simulate(&sim, output.as_ref()),
        Commands::Estimate { sim, panel, alpha, format, output } => {
            cmd_estimate(&sim, panel.as_deref(), alpha, format, output.as_ref())
        }
        Commands::Placebo { sim, panel, alpha, format, output } => {
            cmd_placebo(&sim, panel.as_deref(), alpha, format, output.as_ref())
        }
        Commands::MonteCarlo { sim, replications, alpha, threads, include_replications, output } => {
            cmd_monte_carlo(&sim, replications, alpha, threads, include_replications, output.as_ref())
        }
    }
}

fn cmd_simulate(sim: &SimArgs, output: Option<&PathBuf>) -> Result<()> {
    let cfg = sim.resolve()?;
    let panel = simulate(&cfg, sim.seed)?;
    let sizes = panel.group_sizes();
    tracing::info!(
        rows = panel.len(),
        treated = sizes.n_treated,
        control = sizes.n_control,
        seed = sim.seed,
        "panel simulated"
    );
    write_json(output, serde_json::to_value(&panel)?)
}

/// Simulated panel plus the true effect, or a panel read from disk.
fn load_or_simulate(sim: &SimArgs, panel_path: Option<&Path>) -> Result<(Panel, Option<f64>)> {
    match panel_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading panel");
            let bytes =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let panel: Panel = serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing panel {}", path.display()))?;
            Ok((panel, None))
        }
        None => {
            let cfg = sim.resolve()?;
            let panel = simulate(&cfg, sim.seed)?;
            Ok((panel, Some(cfg.treatment_effect)))
        }
    }
}

fn cmd_estimate(
    sim: &SimArgs,
    panel_path: Option<&Path>,
    alpha: f64,
    format: Format,
    output: Option<&PathBuf>,
) -> Result<()> {
    check_alpha(alpha)?;
    let (panel, true_effect) = load_or_simulate(sim, panel_path)?;
    let fit = estimate_did(&panel)?;
    let means = DidMeans::from_fit(&fit)?;
    let bias = true_effect.map(|t| BiasReport::new(&fit, t, alpha)).transpose()?;
    let att = fit.interaction().context("fit has no interaction coefficient")?;
    let (ci_low, ci_high) = conf_int(&fit, dl_core::INTERACTION, alpha)?
        .context("fit has no interaction coefficient")?;
    let significant = att.p_value < alpha;
    tracing::info!(att = att.estimate, se = att.std_error, p = att.p_value, "did estimate");

    match format {
        Format::Json => write_json(
            output,
            serde_json::json!({
                "fit": fit,
                "significant": significant,
                "alpha": alpha,
                "conf_int": { "level": 1.0 - alpha, "low": ci_low, "high": ci_high },
                "group_sizes": panel.group_sizes(),
                "group_means": panel.group_means(),
                "did_means": means,
                "bias": bias,
            }),
        ),
        Format::Text => {
            let mut text = fit.summary();
            text.push_str(&format!(
                "\n\nEstimated effect: {:.3}  {:.1}% CI [{:.3}, {:.3}]  p = {:.3}\n",
                att.estimate,
                100.0 * (1.0 - alpha),
                ci_low,
                ci_high,
                att.p_value
            ));
            text.push_str(if significant {
                "Statistically significant at the chosen level.\n"
            } else {
                "Not statistically significant at the chosen level.\n"
            });
            if let Some(b) = bias {
                text.push_str(&format!(
                    "True effect: {:.3}  bias: {:+.3}  CI covers truth: {}\n",
                    b.true_effect, b.bias, b.ci_covers_truth
                ));
            }
            write_text(output, &text)
        }
    }
}

fn cmd_placebo(
    sim: &SimArgs,
    panel_path: Option<&Path>,
    alpha: f64,
    format: Format,
    output: Option<&PathBuf>,
) -> Result<()> {
    check_alpha(alpha)?;
    let (panel, _) = load_or_simulate(sim, panel_path)?;
    let fit = placebo_test(&panel)?;
    let effect = fit.interaction().context("fit has no interaction coefficient")?;
    let rejected = effect.p_value < alpha;
    tracing::info!(effect = effect.estimate, p = effect.p_value, rejected, "placebo test");

    match format {
        Format::Json => write_json(
            output,
            serde_json::json!({
                "fit": fit,
                "alpha": alpha,
                "parallel_trends_rejected": rejected,
            }),
        ),
        Format::Text => {
            let mut text = fit.summary();
            text.push_str(&format!(
                "\n\nPlacebo effect: {:.3}  95% CI [{:.3}, {:.3}]  p = {:.3}\n",
                effect.estimate, effect.ci_low, effect.ci_high, effect.p_value
            ));
            text.push_str(if rejected {
                "Pre-treatment trends diverge: parallel trends looks doubtful.\n"
            } else {
                "No evidence of diverging pre-treatment trends.\n"
            });
            write_text(output, &text)
        }
    }
}

fn cmd_monte_carlo(
    sim: &SimArgs,
    replications: usize,
    alpha: f64,
    threads: usize,
    include_replications: bool,
    output: Option<&PathBuf>,
) -> Result<()> {
    check_alpha(alpha)?;
    let cfg = sim.resolve()?;
    let mc = MonteCarloConfig { n_replications: replications, base_seed: sim.seed, alpha, n_threads: threads };
    let mut summary = monte_carlo(&cfg, &mc)?;
    tracing::info!(
        mean_att = summary.mean_att,
        coverage = summary.coverage,
        failed = summary.n_failed,
        wall_s = summary.wall_s,
        "monte carlo complete"
    );
    if !include_replications {
        summary.replications.clear();
    }
    write_json(output, serde_json::to_value(&summary)?)
}

fn check_alpha(alpha: f64) -> Result<()> {
    anyhow::ensure!(alpha > 0.0 && alpha < 1.0, "--alpha must be in (0, 1), got {}", alpha);
    Ok(())
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    write_text(output, &serde_json::to_string_pretty(&value)?)
}

fn write_text(output: Option<&PathBuf>, text: &str) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{}", text);
    }
    Ok(())
}
