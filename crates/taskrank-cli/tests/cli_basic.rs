//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary HOME so the
//! config file and database never touch the real user directories.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_taskrank"))
        .args(args)
        .env("HOME", home)
        .env_remove("TASKRANK_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn write_batch(dir: &Path, json: &str) -> String {
    let path = dir.join("batch.json");
    std::fs::write(&path, json).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_config_defaults() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "scoring.default_strategy"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "smart_balance");

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "server.bind"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "127.0.0.1:8000");
    assert!(home.path().join(".config/taskrank/config.toml").exists());
}

#[test]
fn test_config_set_persists() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(
        home.path(),
        &["config", "set", "scoring.default_strategy", "high_impact"],
    );
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "scoring.default_strategy"]);
    assert_eq!(stdout.trim(), "high_impact");

    let (_, _, code) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "scoring.default_strategy"]);
    assert_eq!(stdout.trim(), "smart_balance");
}

#[test]
fn test_config_rejects_bad_values() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["config", "set", "scoring.default_strategy", "whatever"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_analyze_then_suggest() {
    let home = TempDir::new().unwrap();
    let file = write_batch(
        home.path(),
        r#"[
            {"title": "Quick fix", "due_date": "2099-01-05", "estimated_hours": 1, "importance": 6},
            {"title": "Big rewrite", "due_date": "2099-01-05", "estimated_hours": 8, "importance": 9}
        ]"#,
    );

    let (stdout, stderr, code) = run_cli(home.path(), &["analyze", &file, "--strategy", "fastest_wins"]);
    assert_eq!(code, 0, "analyze failed: {stderr}");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let tasks = parsed["tasks"].as_array().unwrap();
    assert_eq!(tasks[0]["title"], "Quick fix");
    assert_eq!(tasks[0]["score"], 96.0);

    let (stdout, stderr, code) = run_cli(home.path(), &["suggest"]);
    assert_eq!(code, 0, "suggest failed: {stderr}");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let suggestions = parsed["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0]["based_on"], "high_importance");
    assert_eq!(suggestions[0]["title"], "Quick fix");
}

#[test]
fn test_analyze_reports_validation_errors() {
    let home = TempDir::new().unwrap();
    let file = write_batch(home.path(), r#"[{"title": "No date"}]"#);
    let (_, stderr, code) = run_cli(home.path(), &["analyze", &file]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Title and due_date are required fields."));
}

#[test]
fn test_suggest_on_empty_store() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["suggest"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("No tasks available to suggest."));
}
