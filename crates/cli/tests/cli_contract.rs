use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture should be written");
    path
}

fn last_line_json(stdout: &[u8]) -> Value {
    let text = String::from_utf8_lossy(stdout);
    let line = text.lines().last().expect("stdout should not be empty");
    serde_json::from_str(line).expect("last line should be a json summary")
}

const MEASURE_LINE: &str = r#"[
    {"toggle": "line"},
    {"click": [0, 0]},
    {"click": [3, 0]},
    {"click": [3, 4]},
    {"context_menu": [3, 4]},
    {"wait_ms": 100},
    {"toggle": "measure_distance"},
    {"click": [3, 2]}
]"#;

#[test]
fn replay_prints_status_and_summary() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_file(&temp, "measure.json", MEASURE_LINE);

    let output = cargo_bin_cmd!("mapsketch")
        .arg("replay")
        .arg(&script)
        .arg("--summary")
        .env_remove("MAPSKETCH_DRAW_SETTLE_MS")
        .assert()
        .success()
        .stdout(predicate::str::contains("Drew a line"))
        .stdout(predicate::str::contains("Distance measured: 7m"))
        .get_output()
        .stdout
        .clone();

    let summary = last_line_json(&output);
    assert_eq!(summary["active_tool"], "measure_distance");
    assert_eq!(summary["features"], 1);
    assert_eq!(summary["measurements"], 1);
    assert_eq!(summary["visible_overlays"], 1);
}

#[test]
fn replay_places_text_from_prompt_answers() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_file(
        &temp,
        "text.json",
        r#"[{"prompt": "Harbour"}, {"toggle": "text"}, {"click": [10, 10]}]"#,
    );

    cargo_bin_cmd!("mapsketch")
        .arg("replay")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added text \"Harbour\""))
        .stdout(predicate::str::contains("Text placement off"));
}

#[test]
fn replay_clear_steps_empty_the_map() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = MEASURE_LINE.trim_end().trim_end_matches(']').to_string()
        + r#", {"clear_measurements": null}, {"clear_drawings": null}]"#;
    let script = write_file(&temp, "clear.json", &script);

    let output = cargo_bin_cmd!("mapsketch")
        .arg("replay")
        .arg(&script)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 measurement(s)"))
        .get_output()
        .stdout
        .clone();

    let summary = last_line_json(&output);
    assert_eq!(summary["features"], 0);
    assert_eq!(summary["measurements"], 0);
}

#[test]
fn replay_uses_config_file() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    // With no settle delay the finished circle leaves draw mode at once
    let config = write_file(&temp, "tools.json", r#"{ "draw_settle_ms": 0 }"#);
    let script = write_file(
        &temp,
        "circle.json",
        r#"[{"toggle": "circle"}, {"click": [0, 0]}, {"click": [25, 0]}]"#,
    );

    let output = cargo_bin_cmd!("mapsketch")
        .arg("replay")
        .arg(&script)
        .arg("--config")
        .arg(&config)
        .arg("--summary")
        .env_remove("MAPSKETCH_DRAW_SETTLE_MS")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary = last_line_json(&output);
    assert_eq!(summary["active_tool"], Value::Null);
    assert_eq!(summary["features"], 1);
}

#[test]
fn replay_fails_for_missing_script() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cargo_bin_cmd!("mapsketch")
        .arg("replay")
        .arg(temp.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read script"));
}

#[test]
fn replay_fails_for_malformed_script() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_file(&temp, "bad.json", r#"[{"toggle": "lasso"}]"#);

    cargo_bin_cmd!("mapsketch")
        .arg("replay")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed script"));
}

#[test]
fn replay_fails_for_invalid_config() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let config = write_file(&temp, "tools.json", r#"{ "hit_tolerance_px": -3 }"#);
    let script = write_file(&temp, "empty.json", "[]");

    cargo_bin_cmd!("mapsketch")
        .arg("replay")
        .arg(&script)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("hit_tolerance_px"));
}

#[test]
fn version_prints_crate_version() {
    cargo_bin_cmd!("mapsketch")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
