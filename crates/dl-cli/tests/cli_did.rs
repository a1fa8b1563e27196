use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_didlab"))
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn tmp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("didlab_cli_{}_{}_{}", std::process::id(), nanos, name));
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let out = run(args);
    assert!(
        out.status.success(),
        "{:?} should succeed, stderr={}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout should be valid JSON")
}

fn interaction(fit: &serde_json::Value) -> &serde_json::Value {
    fit["coefficients"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "treat:time_indicator")
        .expect("interaction coefficient")
}

#[test]
fn simulate_is_deterministic_and_shaped() {
    let cfg = fixture_path("scenario.yaml");
    let a = run_json(&["simulate", "--config", cfg.to_string_lossy().as_ref(), "--seed", "42"]);
    let b = run_json(&["simulate", "--config", cfg.to_string_lossy().as_ref(), "--seed", "42"]);
    assert_eq!(a, b);

    let rows = a["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 50);
    let treated = rows.iter().filter(|r| r["treat"] == 1).count();
    assert_eq!(treated, 25);
    assert!(rows[0].get("unit_baseline_effect").is_some());
}

#[test]
fn estimate_scenario_recovers_effect() {
    let cfg = fixture_path("scenario.yaml");
    let v = run_json(&["estimate", "--config", cfg.to_string_lossy().as_ref(), "--seed", "42"]);
    let c = interaction(&v["fit"]);
    assert!((c["estimate"].as_f64().unwrap() - 8.0).abs() < 1e-9);
    assert_eq!(v["fit"]["cov_type"], "hc2");
    assert_eq!(v["fit"]["n_obs"], 20);
    assert_eq!(v["group_sizes"]["n_treated"], 5);
    assert_eq!(v["bias"]["true_effect"], 8.0);
    assert_eq!(v["group_means"].as_array().unwrap().len(), 10);
}

#[test]
fn estimate_reads_panel_file_without_bias() {
    let panel = fixture_path("small_panel.json");
    let v = run_json(&["estimate", "--panel", panel.to_string_lossy().as_ref()]);
    // control 6.1 -> 8.0, treated 4.0 -> 9.2
    let c = interaction(&v["fit"]);
    assert!((c["estimate"].as_f64().unwrap() - 3.3).abs() < 1e-9);
    assert!(v["bias"].is_null());
    assert_eq!(v["fit"]["n_obs"], 8);
}

#[test]
fn placebo_reads_panel_file() {
    let panel = fixture_path("small_panel.json");
    let v = run_json(&["placebo", "--panel", panel.to_string_lossy().as_ref()]);
    // control 5.2 -> 6.1, treated 3.1 -> 4.0
    let c = interaction(&v["fit"]);
    assert!(c["estimate"].as_f64().unwrap().abs() < 1e-9);
    assert_eq!(v["fit"]["window"]["pre_period"], -1);
    assert_eq!(v["parallel_trends_rejected"], false);
}

#[test]
fn text_format_writes_summary_file() {
    let out_path = tmp_path("summary.txt");
    let out = run(&[
        "estimate",
        "--n-units",
        "200",
        "--treatment-effect",
        "-5",
        "--format",
        "text",
        "--output",
        out_path.to_string_lossy().as_ref(),
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let text = std::fs::read_to_string(&out_path).unwrap();
    assert!(text.contains("DiD estimate (ATT)"));
    assert!(text.contains("HC2"));
    assert!(text.contains("True effect: -5.000"));
    let _ = std::fs::remove_file(out_path);
}

#[test]
fn monte_carlo_summary_contract() {
    let v = run_json(&[
        "monte-carlo",
        "--n-units",
        "200",
        "--replications",
        "20",
        "--seed",
        "3",
        "--threads",
        "2",
    ]);
    assert_eq!(v["n_replications"], 20);
    assert_eq!(v["n_failed"], 0);
    assert!(v["mean_att"].as_f64().unwrap().is_finite());
    assert!(v["replications"].as_array().unwrap().is_empty());
}

#[test]
fn invalid_configuration_fails() {
    let out = run(&["simulate", "--n-units", "1"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Invalid configuration"), "stderr={}", stderr);

    let out = run(&["estimate", "--treat-ratio", "0"]);
    assert!(!out.status.success());
}

#[test]
fn alpha_out_of_range_fails_for_every_command() {
    let panel = fixture_path("small_panel.json");
    let panel = panel.to_string_lossy();
    for cmd in ["estimate", "placebo"] {
        let out = run(&[cmd, "--panel", panel.as_ref(), "--alpha", "5"]);
        assert!(!out.status.success(), "{} --alpha 5 should fail", cmd);
        assert!(String::from_utf8_lossy(&out.stderr).contains("--alpha must be in (0, 1)"));
    }
    let out = run(&["monte-carlo", "--n-units", "20", "--replications", "2", "--alpha", "0"]);
    assert!(!out.status.success());
}

#[test]
fn estimate_reports_interval_at_requested_alpha() {
    let panel = fixture_path("small_panel.json");
    let panel = panel.to_string_lossy();
    let v95 = run_json(&["estimate", "--panel", panel.as_ref()]);
    let v90 = run_json(&["estimate", "--panel", panel.as_ref(), "--alpha", "0.1"]);

    let att = interaction(&v95["fit"]);
    let ci95 = &v95["conf_int"];
    assert!((ci95["low"].as_f64().unwrap() - att["ci_low"].as_f64().unwrap()).abs() < 1e-12);
    assert!((ci95["high"].as_f64().unwrap() - att["ci_high"].as_f64().unwrap()).abs() < 1e-12);

    let ci90 = &v90["conf_int"];
    assert!((ci90["level"].as_f64().unwrap() - 0.9).abs() < 1e-12);
    assert!(ci90["low"].as_f64().unwrap() > ci95["low"].as_f64().unwrap());
    assert!(ci90["high"].as_f64().unwrap() < ci95["high"].as_f64().unwrap());
}
