use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_eeg_cli"))
}

fn run(args: &[&str]) -> Output {
    cli()
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(args)
        .output()
        .expect("failed to run eeg_cli")
}

fn generate_sine(dir: &Path, name: &str, frequency: &str) -> String {
    let path = dir.join(name).to_string_lossy().into_owned();
    let output = run(&["generate", "--frequency", frequency, "--output", &path]);
    assert!(
        output.status.success(),
        "generate exited with {:?}",
        output.status.code()
    );
    path
}

fn analyze_json(input: &str, extra: &[&str]) -> Value {
    let mut args = vec!["analyze", "--input", input];
    args.extend_from_slice(extra);
    let output = run(&args);
    assert!(
        output.status.success(),
        "analyze exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    serde_json::from_str(stdout.trim()).expect("analysis report JSON payload")
}

#[test]
fn theta_sine_scores_high() {
    let dir = TempDir::new().unwrap();
    let input = generate_sine(dir.path(), "theta.csv", "6");

    let json = analyze_json(&input, &[]);
    assert!(json["score"].as_u64().unwrap() >= 70, "report: {json}");
    assert_eq!(json["severity"], "high");
    assert_eq!(json["origin"]["kind"], "uploaded");
    assert_eq!(json["trace"].as_array().unwrap().len(), 500);
}

#[test]
fn alpha_sine_scores_floor() {
    let dir = TempDir::new().unwrap();
    let input = generate_sine(dir.path(), "alpha.csv", "10");

    let json = analyze_json(&input, &[]);
    assert_eq!(json["score"], 10);
    assert_eq!(json["banner"], "LOW RISK: Signal within normal range.");
}

#[test]
fn single_column_upload_uses_seeded_fallback() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("one.csv");
    std::fs::write(&input, "Fz\n1.0\n2.0\n").unwrap();
    let input = input.to_string_lossy().into_owned();

    let first = analyze_json(&input, &["--seed", "7"]);
    let second = analyze_json(&input, &["--seed", "7"]);

    assert_eq!(first["origin"]["kind"], "synthetic_fallback");
    assert_eq!(first["channel_count"], 19);
    assert!(first["notice"].is_string());
    assert_eq!(first["score"], second["score"]);
    assert_eq!(first["trace"], second["trace"]);
}

#[test]
fn config_after_subcommand_selects_scored_channel() {
    let dir = TempDir::new().unwrap();

    let alpha = eeg_risk_dashboard::signal::synthetic::sine_wave(10.0, 1.0, 250.0, 1000);
    let theta = eeg_risk_dashboard::signal::synthetic::sine_wave(6.0, 1.0, 250.0, 1000);
    let mut rows = String::from("Fp1,Fp2\n");
    for (a, t) in alpha.iter().zip(&theta) {
        rows.push_str(&format!("{a},{t}\n"));
    }
    let input = dir.path().join("mixed.csv");
    std::fs::write(&input, rows).unwrap();

    let config = dir.path().join("dashboard.json");
    std::fs::write(&config, r#"{"scoring":{"channel_index":1}}"#).unwrap();

    let input = input.to_string_lossy().into_owned();
    let default_run = analyze_json(&input, &[]);
    let configured = analyze_json(&input, &["--config", config.to_str().unwrap()]);

    assert_eq!(default_run["channel"], "Fp1");
    assert_eq!(default_run["score"], 10);
    assert_eq!(configured["channel"], "Fp2");
    assert!(configured["score"].as_u64().unwrap() >= 70, "report: {configured}");
}

#[test]
fn text_report_and_plot_written() {
    let dir = TempDir::new().unwrap();
    let input = generate_sine(dir.path(), "theta.csv", "6");
    let plot = dir.path().join("trace.html");

    let output = run(&[
        "analyze",
        "--input",
        &input,
        "--format",
        "text",
        "--plot",
        plot.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("HIGH RISK"), "got {stdout}");
    assert!(stdout.contains("(4.0 s)"), "got {stdout}");
    assert!(stdout.contains("not a diagnosis"));

    let html = std::fs::read_to_string(&plot).expect("plot written");
    assert!(html.contains("Frontal Lobe Activity (Filtered)"));
}

#[test]
fn non_numeric_upload_fails_with_code() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.csv");
    std::fs::write(&input, "Fz,Cz\n1.0,abc\n").unwrap();

    let output = run(&["analyze", "--input", input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("code 1003"), "got {stderr}");
}

#[test]
fn research_prints_bundled_table() {
    let output = run(&["research"]);
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("table JSON");
    assert_eq!(json["headers"][0], "subject");
    assert!(!json["rows"].as_array().unwrap().is_empty());
}

#[test]
fn research_missing_file_prints_generic_message() {
    let output = run(&["research", "--path", "no/such/demographic.csv"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("demographic.csv not found in data folder."));
}
