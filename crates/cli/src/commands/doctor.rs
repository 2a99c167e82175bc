//! Doctor command - validate configuration and show status

use anyhow::Result;
use castscore_adapters::store::SqliteScoreStore;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    scorer: CheckResult,
    hub: CheckResult,
    database: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        scorer: CheckResult::error("Not checked"),
        hub: CheckResult::error("Not checked"),
        database: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.scorer = check_scorer(config);
        report.hub = check_hub(config);
        report.database = check_database(config).await;
    }

    let checks = [&report.config, &report.scorer, &report.hub, &report.database];
    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, args.check.as_deref());
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_scorer(config: &AppConfig) -> CheckResult {
    let provider = &config.scorer.provider;
    let model = &config.scorer.model;

    match provider.as_str() {
        "stub" => CheckResult::ok("Provider: stub (offline, deterministic)".to_string()),
        "openai_compat" => {
            let env_var = &config.scorer.api_key_env;
            if env_var.is_empty() {
                return CheckResult::error("No API key env var configured for openai_compat");
            }

            match std::env::var(env_var) {
                Ok(val) if !val.is_empty() => CheckResult::ok(format!(
                    "Provider: openai_compat, Model: {}, API key: {} (set)",
                    model, env_var
                )),
                _ => CheckResult::warn(format!(
                    "Provider: openai_compat, Model: {}, API key: {} (not set, \
                     analyses will report not-analyzed)",
                    model, env_var
                )),
            }
        }
        other => CheckResult::error(format!("Unknown provider: {}", other)),
    }
}

fn check_hub(config: &AppConfig) -> CheckResult {
    let base_url = config.hub.base_url.trim();

    if base_url.is_empty() {
        return CheckResult::error("Hub base_url is empty");
    }

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return CheckResult::error(format!("Hub base_url is not an HTTP URL: {}", base_url));
    }

    let env_var = &config.hub.api_key_env;
    match std::env::var(env_var) {
        Ok(val) if !val.is_empty() => {
            CheckResult::ok(format!("Hub: {}, API key: {} (set)", base_url, env_var))
        }
        _ => CheckResult::warn(format!(
            "Hub: {}, API key: {} (not set, unauthenticated requests)",
            base_url, env_var
        )),
    }
}

async fn check_database(config: &AppConfig) -> CheckResult {
    match SqliteScoreStore::open_pair(&config.general.db_path).await {
        Ok(_) => CheckResult::ok(format!(
            "Database writable: {}",
            config.general.db_path.display()
        )),
        Err(e) => CheckResult::error(format!(
            "Cannot open database {}: {}",
            config.general.db_path.display(),
            e
        )),
    }
}

fn print_report(report: &DoctorReport, only: Option<&str>) {
    println!("castscore Doctor Report");
    println!("=======================");
    println!();

    let checks: [(&str, &str, &CheckResult); 4] = [
        ("config", "Config", &report.config),
        ("scorer", "Scorer", &report.scorer),
        ("hub", "Hub", &report.hub),
        ("database", "Database", &report.database),
    ];

    for (key, name, result) in checks {
        if only.is_none_or(|o| o == key) {
            print_check(name, result);
        }
    }

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to score! Try: castscore analyze --text \"your cast text\"");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
