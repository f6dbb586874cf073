//! CLI tests for the `dp` binary

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join("school.yml")
}

/// A `dp` command isolated from the user's config and data directories
fn dp(temp_dir: &TempDir) -> Command {
    let config = temp_dir.path().join("draftplan.yml");
    fs::write(&config, "planning:\n  days-per-week: 5\n").unwrap();

    let mut cmd = Command::cargo_bin("dp").unwrap();
    cmd.env("XDG_DATA_HOME", temp_dir.path().join("data"))
        .env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn test_window_command() {
    let temp_dir = TempDir::new().unwrap();
    dp(&temp_dir)
        .args(["window", "--level", "grade-9", "--subject", "math"])
        .arg("--fixture")
        .arg(fixture_path())
        .args(["--start", "2024-01-15", "--end", "2024-03-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("38"))
        .stdout(predicate::str::contains("Presidents Day"));
}

#[test]
fn test_window_rejects_reversed_range() {
    let temp_dir = TempDir::new().unwrap();
    dp(&temp_dir)
        .args(["window", "--level", "grade-9", "--subject", "math"])
        .arg("--fixture")
        .arg(fixture_path())
        .args(["--start", "2024-03-15", "--end", "2024-01-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date range"));
}

#[test]
fn test_curriculum_json() {
    let temp_dir = TempDir::new().unwrap();
    let output = dp(&temp_dir)
        .args(["curriculum", "--level", "grade-9", "--subject", "math", "--format", "json"])
        .arg("--fixture")
        .arg(fixture_path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let hierarchy: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(hierarchy["units"][0]["id"], "number");
    assert_eq!(hierarchy["units"][1]["topics"].as_array().unwrap().len(), 3);
}

#[test]
fn test_unknown_subject_fails() {
    let temp_dir = TempDir::new().unwrap();
    dp(&temp_dir)
        .args(["curriculum", "--level", "grade-9", "--subject", "latin"])
        .arg("--fixture")
        .arg(fixture_path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No curriculum"));
}

#[test]
fn test_plan_reports_compression_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    let lessons = temp_dir.path().join("lessons.jsonl");
    dp(&temp_dir)
        .args(["plan", "--level", "grade-9", "--subject", "math"])
        .arg("--fixture")
        .arg(fixture_path())
        .args(["--start", "2024-01-15", "--end", "2024-03-15"])
        .arg("--lessons")
        .arg(&lessons)
        .assert()
        .success()
        .stdout(predicate::str::contains("[compression]"))
        .stdout(predicate::str::contains("Draft discarded"));
    assert!(!lessons.exists());
}

#[test]
fn test_plan_commit_writes_lessons() {
    let temp_dir = TempDir::new().unwrap();
    let lessons = temp_dir.path().join("out").join("lessons.jsonl");
    dp(&temp_dir)
        .args(["plan", "--level", "grade-9", "--subject", "science", "--class", "9a"])
        .arg("--fixture")
        .arg(fixture_path())
        .args(["--start", "2024-01-15", "--end", "2024-03-15"])
        .args(["--exclude", "membranes", "--commit"])
        .arg("--lessons")
        .arg(&lessons)
        .assert()
        .success()
        .stdout(predicate::str::contains("Committed"));

    let content = fs::read_to_string(&lessons).unwrap();
    let records: Vec<serde_json::Value> = content.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r["status"] == "not_finalized"));
    assert!(records.iter().all(|r| r["topic_id"] != "membranes"));
}

#[test]
fn test_plan_rejects_unknown_topic_edit() {
    let temp_dir = TempDir::new().unwrap();
    dp(&temp_dir)
        .args(["plan", "--level", "grade-9", "--subject", "science"])
        .arg("--fixture")
        .arg(fixture_path())
        .args(["--start", "2024-01-15", "--end", "2024-03-15"])
        .args(["--move", "photosynthesis=0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown topic: photosynthesis"));
}

#[test]
fn test_plan_rejects_oversized_repace() {
    let temp_dir = TempDir::new().unwrap();
    let lessons = temp_dir.path().join("lessons.jsonl");
    dp(&temp_dir)
        .args(["plan", "--level", "grade-9", "--subject", "math"])
        .arg("--fixture")
        .arg(fixture_path())
        .args(["--start", "2024-01-15", "--end", "2024-03-15"])
        .args(["--repace", "integers=4294967295", "--commit"])
        .arg("--lessons")
        .arg(&lessons)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 52"));
    assert!(!lessons.exists());
}
