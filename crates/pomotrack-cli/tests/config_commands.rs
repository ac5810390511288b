//! Config get/set/list/reset against a temporary data directory.

mod common;

use common::{run_cli, run_cli_success};

#[test]
fn test_defaults_are_written_on_first_run() {
    let home = tempfile::tempdir().unwrap();
    let out = run_cli_success(home.path(), &["config", "get", "display.tick_interval_ms"]);
    assert_eq!(out.trim(), "500");
    assert!(home.path().join("config.toml").exists());
}

#[test]
fn test_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    assert_eq!(
        run_cli_success(home.path(), &["config", "set", "display.tick_interval_ms", "250"]).trim(),
        "ok"
    );
    let out = run_cli_success(home.path(), &["config", "get", "display.tick_interval_ms"]);
    assert_eq!(out.trim(), "250");
}

#[test]
fn test_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "timer.work_minutes"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"), "stderr: {stderr}");
}

#[test]
fn test_invalid_value_is_rejected_and_not_saved() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "display.tick_interval_ms", "0"]);
    assert_eq!(code, 1);
    let out = run_cli_success(home.path(), &["config", "get", "display.tick_interval_ms"]);
    assert_eq!(out.trim(), "500");
}

#[test]
fn test_reset_restores_defaults() {
    let home = tempfile::tempdir().unwrap();
    run_cli_success(home.path(), &["config", "set", "logging.filter", "debug"]);
    run_cli_success(home.path(), &["config", "reset"]);
    let out = run_cli_success(home.path(), &["config", "list"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["logging"]["filter"], "warn");
    assert_eq!(json["storage"]["database"], "pomotrack.db");
}

#[test]
fn test_time_only_label_format_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "display.day_label_format", "%H:%M"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("day_label_format"), "stderr: {stderr}");
    run_cli_success(home.path(), &["stats", "week"]);
}
