//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "setminder-cli", "--"])
        .args(args)
        .env("SETMINDER_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_workout_status() {
    let (stdout, _, code) = run_cli(&["workout", "status"]);
    assert_eq!(code, 0, "workout status failed");

    // First JSON document on stdout is the workout record.
    let mut de = serde_json::Deserializer::from_str(&stdout).into_iter::<serde_json::Value>();
    let workout = de.next().unwrap().unwrap();
    assert_eq!(workout["sets"].as_array().unwrap().len(), 8);
    assert!(workout["date"].as_str().unwrap().len() == 10);
}

#[test]
fn test_workout_status_is_repeatable() {
    let (_, _, code) = run_cli(&["workout", "status"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(&["workout", "status"]);
    assert_eq!(code, 0);
}

#[test]
fn test_workout_show_unknown_date() {
    let (stdout, _, code) = run_cli(&["workout", "show", "1999-01-01"]);
    assert_eq!(code, 0, "workout show failed");
    assert!(stdout.contains("no workout recorded"));
}

#[test]
fn test_workout_show_rejects_bad_date() {
    let (_, stderr, code) = run_cli(&["workout", "show", "not-a-date"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid date"));
}

#[test]
fn test_config_get() {
    let (stdout, _, code) = run_cli(&["config", "get", "workout.start_hour"]);
    assert_eq!(code, 0, "config get failed");
    assert!(!stdout.trim().is_empty());
}

#[test]
fn test_config_get_unknown_key() {
    let (_, stderr, code) = run_cli(&["config", "get", "workout.bogus"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_set_and_list() {
    let (stdout, _, code) = run_cli(&["config", "set", "notifications.enabled", "true"]);
    assert_eq!(code, 0, "config set failed");
    assert!(stdout.contains("ok"));

    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["notifications"]["enabled"], true);
}

#[test]
fn test_completions_generate() {
    let (stdout, _, code) = run_cli(&["completions", "bash"]);
    assert_eq!(code, 0, "completions failed");
    assert!(stdout.contains("setminder"));
}
