//! Scenario: the `circ` binary end to end.
//!
//! # Invariants under test
//! - `config-hash` prints a 64-char hex hash that is the same on every call.
//! - `validate` accepts the shipped scenario and prints its entity counts.
//! - `--fail-on-unused-keys` turns an unread key into a non-zero exit.
//! - `run` prints one summary line per period and, with `--exports`, writes
//!   the manifest and per-period tables.
//! - A structural error in a period exits non-zero and names the phase.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

fn config(rel: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../configs")
        .join(rel)
        .to_string_lossy()
        .into_owned()
}

fn circ() -> Command {
    let mut cmd = Command::cargo_bin("circ").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).unwrap()
}

#[test]
fn config_hash_is_stable() {
    let base = config("two_department.yaml");
    let a = stdout_of(circ().args(["config-hash", &base]));
    let b = stdout_of(circ().args(["config-hash", &base]));
    assert_eq!(a, b);

    let hash_line = a.lines().next().unwrap();
    let hash = hash_line.strip_prefix("config_hash=").unwrap();
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

    // An overlay changes the effective config and so the hash.
    let c = stdout_of(circ().args(["config-hash", &base, &config("overlays/equalise.yaml")]));
    assert_ne!(a.lines().next(), c.lines().next());
}

#[test]
fn validate_prints_entity_counts() {
    circ()
        .args(["validate", "--config", &config("two_department.yaml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("commodities=4"))
        .stdout(predicate::str::contains("industries=2"))
        .stdout(predicate::str::contains("classes=2"))
        .stdout(predicate::str::contains("unused_keys=0"))
        .stdout(predicate::str::contains("valid=true"));
}

#[test]
fn unused_keys_fail_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let overlay = dir.path().join("typo.yaml");
    fs::write(&overlay, "global:\n  investment_ration: 0.5\n").unwrap();
    let overlay = overlay.to_string_lossy().into_owned();

    // Warn policy: still valid, key counted.
    circ()
        .args(["validate", "--config", &config("two_department.yaml"), "--config", &overlay])
        .assert()
        .success()
        .stdout(predicate::str::contains("unused_keys=1"));

    // Fail policy: refused.
    circ()
        .args([
            "validate",
            "--config",
            &config("two_department.yaml"),
            "--config",
            &overlay,
            "--fail-on-unused-keys",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_UNUSED_KEYS"));
}

#[test]
fn invalid_scenario_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let overlay = dir.path().join("bad.yaml");
    fs::write(&overlay, "capitalist_class: Landlords\n").unwrap();

    circ()
        .args([
            "validate",
            "--config",
            &config("two_department.yaml"),
            "--config",
            &overlay.to_string_lossy(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Landlords"));
}

#[test]
fn run_prints_periods_and_writes_artifacts() {
    let exports = tempfile::tempdir().unwrap();
    let out = stdout_of(circ().args([
        "run",
        "--config",
        &config("two_department.yaml"),
        "--periods",
        "3",
        "--exports",
        &exports.path().to_string_lossy(),
    ]));

    assert!(out.contains("period=1 time_stamp=t1"));
    assert!(out.contains("period=3 time_stamp=t3"));
    assert!(out.contains("periods_run=3"));
    assert!(out.contains("latest_time_stamp=t3"));

    let run_dir = out
        .lines()
        .find_map(|l| l.strip_prefix("run_dir="))
        .map(PathBuf::from)
        .unwrap();
    assert!(run_dir.join("manifest.json").exists());
    let periods = fs::read_to_string(run_dir.join("periods.csv")).unwrap();
    assert_eq!(periods.lines().count(), 1 + 3);
}

#[test]
fn structural_error_exits_non_zero() {
    circ()
        .args([
            "run",
            "--config",
            &config("two_department.yaml"),
            "--config",
            &config("overlays/dynamic.yaml"),
            "--periods",
            "2",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("period=1").not())
        .stderr(predicate::str::contains("aborted in prices"))
        .stderr(predicate::str::contains("'dynamic' is not supported"));
}
