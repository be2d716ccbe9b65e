//! Integration tests for the `pilights` binary.
//!
//! Patterns run with `--dry-run` so no GPIO hardware is needed, and every
//! test points `--config` into a temporary directory.

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("pilights")
}

/// A config path inside a fresh temp dir. The file itself does not exist.
fn missing_config(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("config.toml")
}

fn dry_run(dir: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cli();
    cmd.arg("--config").arg(missing_config(dir)).arg("--dry-run");
    cmd
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pilights"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ── Patterns (dry run) ──

#[test]
fn cli_on_lights_all_pins() {
    let dir = tempfile::tempdir().unwrap();
    dry_run(&dir)
        .arg("on")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: 14 pin writes"));
}

#[test]
fn cli_verbose_cycle_echoes_pin_writes() {
    let dir = tempfile::tempdir().unwrap();
    dry_run(&dir)
        .args(["-v", "cycle", "--pins", "19,13,6", "--mode", "full"])
        .assert()
        .success()
        .stdout(predicate::str::contains("19: on"))
        .stdout(predicate::str::contains("6: off"))
        .stdout(predicate::str::contains("Dry run: 10 pin writes"));
}

#[test]
fn cli_flicker_ending_on_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    let output = dry_run(&dir)
        .args([
            "--json",
            "flicker",
            "--group",
            "red",
            "--times",
            "2",
            "--ends-with",
            "on",
            "--interval-ms",
            "10",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("dry run --json should produce valid JSON");
    assert_eq!(json["pin_writes"], 4 * 2 * 2 + 4);
    assert_eq!(json["total_delay_ms"], 50);
    assert_eq!(json["lit"], serde_json::json!([6, 12, 13, 19]));
}

#[test]
fn cli_pulse_counts_pwm_writes() {
    let dir = tempfile::tempdir().unwrap();
    dry_run(&dir)
        .args(["pulse", "--times", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("513 PWM writes"));
}

#[test]
fn cli_demo_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    dry_run(&dir)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Lit at end: none"));
}

#[test]
fn cli_unconfigured_pin_fails() {
    let dir = tempfile::tempdir().unwrap();
    dry_run(&dir)
        .args(["on", "--pins", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GPIO 2 is not configured"));
}

#[test]
fn cli_pulse_on_unconfigured_pin_fails() {
    let dir = tempfile::tempdir().unwrap();
    dry_run(&dir)
        .args(["pulse", "--pins", "2", "--times", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GPIO 2 is not configured"));
}

#[test]
fn cli_invalid_config_refuses_to_play() {
    let dir = tempfile::tempdir().unwrap();
    let path = missing_config(&dir);
    std::fs::write(&path, "[timing]\npulse_pin = 2\n").unwrap();
    cli()
        .arg("--config")
        .arg(&path)
        .args(["--dry-run", "on"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pulse pin GPIO 2"));
}

#[test]
fn cli_rejects_unknown_cycle_mode() {
    let dir = tempfile::tempdir().unwrap();
    dry_run(&dir)
        .args(["cycle", "--mode", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sideways"));
}

#[test]
fn cli_pins_and_group_conflict() {
    let dir = tempfile::tempdir().unwrap();
    dry_run(&dir)
        .args(["on", "--pins", "19", "--group", "red"])
        .assert()
        .failure();
}

// ── Pins / config ──

#[test]
fn cli_pins_lists_groups() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .arg("--config")
        .arg(missing_config(&dir))
        .arg("pins")
        .assert()
        .success()
        .stdout(predicate::str::contains("19, 13, 6, 12"))
        .stdout(predicate::str::contains("14 LEDs"));
}

#[test]
fn cli_pins_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli()
        .arg("--config")
        .arg(missing_config(&dir))
        .args(["--json", "pins"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["blues"], serde_json::json!([27, 18, 4, 23, 16]));
    assert_eq!(json["all"].as_array().unwrap().len(), 14);
}

#[test]
fn cli_config_json_produces_valid_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli()
        .arg("--config")
        .arg(missing_config(&dir))
        .args(["--json", "config"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("config --json should produce valid JSON");
    assert!(json["settings"].is_object());
    assert_eq!(json["config_file_exists"], false);
    assert!(json["problems"].as_array().unwrap().is_empty());
}

#[test]
fn cli_config_init_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = missing_config(&dir);
    cli()
        .arg("--config")
        .arg(&path)
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));
    assert!(path.exists());
}

#[test]
fn cli_pattern_help_mentions_pins() {
    cli()
        .args(["step-up", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--pins"));
}
