//! Integration tests for the clinspan CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get the path to a test fixture
fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{}", name)
}

fn annotate() -> Command {
    let mut cmd = Command::cargo_bin("clinspan").unwrap();
    cmd.arg("annotate")
        .arg("-c")
        .arg(fixture_path("clinspan.toml"))
        .arg("-q");
    cmd
}

#[test]
fn test_annotate_json() {
    let output = annotate()
        .arg("-i")
        .arg(fixture_path("note-hpi.txt"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let annotation = &records[0]["annotation"];
    let summary = &annotation["condition_summary"]["condition"];

    assert!(summary.get("Essential hypertension").is_some());
    assert!(summary.get("Dyspnea").is_some());
    // nested in the compound mention, or in family history
    assert!(summary.get("Hypertensive disorder").is_none());
    assert!(summary.get("Chest pain").is_none());

    assert_eq!(annotation["negated"][0]["entity"]["tag"], "Chest pain");
    assert_eq!(annotation["demographic_summary"]["gender"]["Female"]["concept_id"], 4149281);
    assert_eq!(annotation["vitals"]["summary"]["bp"]["142/91"]["concept_id"], 0);
    assert!(annotation["vitals"]["summary"]["age"].get("67").is_some());
}

#[test]
fn test_annotate_glob_jsonl() {
    annotate()
        .arg("-i")
        .arg(fixture_path("note-*.txt"))
        .arg("-f")
        .arg("jsonl")
        .assert()
        .success()
        .stdout(predicate::str::contains("note-hpi.txt"))
        .stdout(predicate::str::contains("note-short.txt"))
        .stdout(predicate::function(|out: &str| out.lines().count() == 2));
}

#[test]
fn test_annotate_text() {
    annotate()
        .arg("-i")
        .arg(fixture_path("note-short.txt"))
        .arg("-f")
        .arg("text")
        .assert()
        .success()
        .stdout(predicate::str::contains("== tests/fixtures/note-short.txt =="))
        .stdout(predicate::str::contains("Dyspnea (312437): dyspnea"))
        .stdout(predicate::str::contains("demographic smoking: Smoker (4298794)"));
}

#[test]
fn test_output_file_and_threads() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.json");

    annotate()
        .arg("-i")
        .arg(fixture_path("note-*.txt"))
        .arg("-o")
        .arg(&output)
        .arg("--threads")
        .arg("2")
        .assert()
        .success();

    let records: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 2);
}

#[test]
fn test_unreadable_file_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let bad = temp_dir.path().join("bad.txt");
    fs::write(&bad, [0xff, 0xfe]).unwrap();

    let mut cmd = Command::cargo_bin("clinspan").unwrap();
    cmd.arg("annotate")
        .arg("-c")
        .arg(fixture_path("clinspan.toml"))
        .arg("-i")
        .arg(fixture_path("note-short.txt"))
        .arg("-i")
        .arg(&bad)
        .arg("-f")
        .arg("jsonl");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("note-short.txt"))
        .stdout(predicate::str::contains("bad.txt").not())
        .stderr(predicate::str::contains("Skipping"));
}

#[test]
fn test_no_matching_files() {
    annotate()
        .arg("-i")
        .arg("nonexistent/*.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No files found"));
}

#[test]
fn test_missing_required_input() {
    let mut cmd = Command::cargo_bin("clinspan").unwrap();
    cmd.arg("annotate")
        .arg("-c")
        .arg(fixture_path("clinspan.toml"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_validate_reports_counts() {
    let mut cmd = Command::cargo_bin("clinspan").unwrap();
    cmd.arg("validate").arg("-c").arg(fixture_path("clinspan.toml"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Condition sequences: 4"))
        .stdout(predicate::str::contains("Demographic rules:   3"));
}

#[test]
fn test_validate_missing_resource() {
    let mut cmd = Command::cargo_bin("clinspan").unwrap();
    cmd.arg("validate").arg("-c").arg(fixture_path("broken.toml"));

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Configuration is invalid"))
        .stdout(predicate::str::contains("missing.csv"));
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("clinspan").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("annotate"))
        .stdout(predicate::str::contains("validate"));
}
