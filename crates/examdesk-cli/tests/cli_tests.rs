//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the user's real config and credentials.
fn examdesk(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("examdesk").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("EXAMDESK_CONFIG")
        .env_remove("EXAMDESK_PASSWORD")
        .env("EXAMDESK_BASE_URL", "http://127.0.0.1:9/");
    cmd
}

const MULTIPLE_CHOICE: &str = "Question 1: What is 2+2? A. 3 B. 4 C. 5 D. 6\n\
                               Question 2: Pick a vowel. A. b B. e";

#[test]
fn parse_multiple_choice_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("mc.txt"), MULTIPLE_CHOICE).unwrap();

    examdesk(dir.path())
        .arg("parse")
        .arg("--multiple-choice")
        .arg("mc.txt")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. [multichoices] What is 2+2?"))
        .stdout(predicate::str::contains("   D. 6"))
        .stdout(predicate::str::contains("2 question(s) parsed."));
}

#[test]
fn parse_json_output() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("mc.txt"), MULTIPLE_CHOICE).unwrap();
    std::fs::write(
        dir.path().join("tf.txt"),
        "Question 1: Check. a) 1 < 2 b) 2 < 1",
    )
    .unwrap();

    let output = examdesk(dir.path())
        .arg("parse")
        .arg("--multiple-choice")
        .arg("mc.txt")
        .arg("--true-false")
        .arg("tf.txt")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["type"], "multichoices");
    assert_eq!(records[0]["multichoices"]["options"].as_array().unwrap().len(), 4);
    assert_eq!(records[2]["type"], "true-false");
}

#[test]
fn parse_custom_label() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("sa.txt"),
        "Câu 1: Thủ đô của Việt Nam? Câu 2: 7 x 6 = ?",
    )
    .unwrap();

    examdesk(dir.path())
        .arg("parse")
        .arg("--short-answer")
        .arg("sa.txt")
        .arg("--label")
        .arg("Câu")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 question(s) parsed."));
}

#[test]
fn parse_without_markers() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("mc.txt"), "just some notes").unwrap();

    examdesk(dir.path())
        .arg("parse")
        .arg("--multiple-choice")
        .arg("mc.txt")
        .assert()
        .success()
        .stdout(predicate::str::contains("No questions found"));
}

#[test]
fn parse_requires_input() {
    let dir = TempDir::new().unwrap();
    examdesk(dir.path()).arg("parse").assert().failure();
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    examdesk(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created examdesk.toml"))
        .stdout(predicate::str::contains("Created drafts/example.toml"));

    assert!(dir.path().join("examdesk.toml").exists());
    assert!(dir.path().join("drafts/example.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    examdesk(dir.path()).arg("init").assert().success();

    examdesk(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_example_draft() {
    let dir = TempDir::new().unwrap();
    examdesk(dir.path()).arg("init").assert().success();

    examdesk(dir.path())
        .arg("validate")
        .arg("--draft")
        .arg("drafts/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 questions, 15 min"))
        .stdout(predicate::str::contains("Draft valid."));
}

#[test]
fn validate_reports_missing_answers() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("draft.toml"),
        r#"
title = "Unkeyed"
time = 0

[text]
multiple_choice = "Question 1: What is 2+2? A. 3 B. 4"
"#,
    )
    .unwrap();

    examdesk(dir.path())
        .arg("validate")
        .arg("--draft")
        .arg("draft.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING"))
        .stdout(predicate::str::contains("[question 1]"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    examdesk(dir.path())
        .arg("validate")
        .arg("--draft")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn create_exam_dry_run_prints_payload() {
    let dir = TempDir::new().unwrap();
    examdesk(dir.path()).arg("init").assert().success();

    let output = examdesk(dir.path())
        .arg("create-exam")
        .arg("--draft")
        .arg("drafts/example.toml")
        .arg("--class")
        .arg("class-7")
        .arg("--dry-run")
        .output()
        .unwrap();
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["title"], "Arithmetic warm-up");
    assert_eq!(payload["classId"], "class-7");
    assert_eq!(payload["questions"].as_array().unwrap().len(), 4);
    assert_eq!(payload["questions"][0]["multichoices"]["correctAnswer"], 1);
}

#[test]
fn whoami_without_credential() {
    let dir = TempDir::new().unwrap();
    examdesk(dir.path())
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("sign in again"))
        .stderr(predicate::str::contains("Hint: run `examdesk signin`"));
}

#[test]
fn unreachable_server_suggests_retry() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("examdesk.toml"), "refresh_token = \"rt-1\"\n").unwrap();

    examdesk(dir.path())
        .arg("classes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("network error"))
        .stderr(predicate::str::contains("Hint: check the server address"));
}

#[test]
fn create_class_validates_locally() {
    let dir = TempDir::new().unwrap();
    examdesk(dir.path())
        .arg("create-class")
        .arg("--name")
        .arg("  ")
        .arg("--max-members")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("class name must not be empty"))
        .stderr(predicate::str::contains("at least 1 member"));
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    examdesk(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Client for the examdesk exam platform"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    examdesk(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("examdesk"));
}
