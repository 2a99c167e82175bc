use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    let mut cmd = cargo_bin_cmd!("castscore");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("[scorer]"));
    assert!(content.contains("batch_size = 5"));
}

#[test]
fn config_init_refuses_overwrite_without_force() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "# existing").expect("seed config");

    let mut cmd = cargo_bin_cmd!("castscore");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn analyze_stub_outputs_valid_json() {
    let mut cmd = cargo_bin_cmd!("castscore");
    let output = cmd
        .env("CASTSCORE__SCORER__PROVIDER", "stub")
        .args([
            "analyze",
            "--text",
            "A thoughtful take on how client incentives shape protocol design",
            "--json",
        ])
        .output()
        .expect("run analyze");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let score = value.get("quality_score").and_then(Value::as_u64).expect("score");
    assert!(score <= 100);
    assert!(value.get("category").is_some());
}

#[test]
fn analyze_greeting_is_capped() {
    let mut cmd = cargo_bin_cmd!("castscore");
    let output = cmd
        .env("CASTSCORE__SCORER__PROVIDER", "stub")
        .args(["analyze", "--text", "gm", "--json"])
        .output()
        .expect("run analyze");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let score = value.get("quality_score").and_then(Value::as_u64).expect("score");
    assert!(score <= 5);
}

#[test]
fn batch_dry_run_reports_counts() {
    let dir = TempDir::new().expect("temp dir");
    let input_path = dir.path().join("casts.json");
    fs::write(
        &input_path,
        r#"[
            {"hash": "0xa", "text": "First cast with enough substance to score"},
            {"hash": "0xb", "text": "Second cast, also reasonably substantial"}
        ]"#,
    )
    .expect("write input");

    let mut cmd = cargo_bin_cmd!("castscore");
    let output = cmd
        .env("CASTSCORE__SCORER__PROVIDER", "stub")
        .env("CASTSCORE__BATCH__DELAY_MS", "0")
        .args(["batch", "--dry-run", "--json", "--input"])
        .arg(&input_path)
        .output()
        .expect("run batch");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value.get("processed").and_then(Value::as_u64), Some(2));
    assert_eq!(value.get("failed").and_then(Value::as_u64), Some(0));
}

#[test]
fn doctor_reports_stub_scorer_ok() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("castscore");
    let output = cmd
        .current_dir(dir.path())
        .env("CASTSCORE__SCORER__PROVIDER", "stub")
        .args(["doctor", "--json"])
        .output()
        .expect("run doctor");

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(
        value.pointer("/scorer/status").and_then(Value::as_str),
        Some("ok")
    );
}
