//! CLI command integration tests.
//! Each test clears the QM_* environment so defaults (offline) apply.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn qm_cmd() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("qm").unwrap();
    for key in [
        "QM_CONFIG",
        "QM_USE_CIRCUIT",
        "QM_REMOTE_URL",
        "QM_REMOTE_TOKEN",
        "QM_GEOCODER",
        "QM_NARRATOR",
        "GEMINI_API_KEY",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn analyze_prints_summary() {
    qm_cmd()
        .args(["analyze", "古い石段を登る寺の記憶", "--emotion", "nostalgic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("emotion:    nostalgic"))
        .stdout(predicate::str::contains("country:    japan"))
        .stdout(predicate::str::contains("secondary:").count(2));
}

#[test]
fn analyze_json_is_parseable() {
    let output = qm_cmd()
        .args(["analyze", "lavender fields in provence", "--emotion", "peaceful", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["emotion"], "peaceful");
    assert_eq!(json["secondary_locations"].as_array().unwrap().len(), 2);
    assert!(json["analysis_time_ms"].is_u64());
}

#[test]
fn analyze_empty_memory_succeeds() {
    qm_cmd()
        .args(["analyze", "", "--emotion", "warm", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"memory_path\""));
}

#[test]
fn state_reports_defaults() {
    qm_cmd()
        .arg("state")
        .assert()
        .success()
        .stdout(predicate::str::contains("backend:    local_simulation"))
        .stdout(predicate::str::contains("qubits:     8"))
        .stdout(predicate::str::contains("last:       never"));
}

#[test]
fn map_emits_points() {
    let output = qm_cmd()
        .args(["map", "sunset over the eiffel tower", "--emotion", "peaceful", "--kind", "coherence"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "coherence");
    assert_eq!(json["points"].as_array().unwrap().len(), 3);
}

#[test]
fn map_rejects_unknown_kind() {
    qm_cmd()
        .args(["map", "x", "--emotion", "warm", "--kind", "heatwave"])
        .assert()
        .failure();
}

#[test]
fn config_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("qm.toml");
    std::fs::write(&path, "[circuit]\nenabled = true\nqubits = 6\n").unwrap();

    qm_cmd()
        .arg("--config")
        .arg(&path)
        .arg("state")
        .assert()
        .success()
        .stdout(predicate::str::contains("qubits:     6"))
        .stdout(predicate::str::contains("circuit:    on"));
}

#[test]
fn gemini_without_key_fails() {
    qm_cmd()
        .env("QM_NARRATOR", "gemini")
        .args(["analyze", "x", "--emotion", "warm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}
