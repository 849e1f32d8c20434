use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use visual_templates::logging::{self, ConsoleOutput, LoggingConfig};

fn write_document(root: &Path) {
    let folder = root.join("Doc");
    fs::create_dir_all(&folder).unwrap();
    fs::write(
        folder.join("report.json"),
        json!({
            "sections": [{
                "name": "p1",
                "visualContainers": [
                    { "config": "{\"visualType\":\"card\"}" },
                    { "config": "[1, 2]" }
                ]
            }]
        })
        .to_string(),
    )
    .unwrap();
}

fn command(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("visual-templates").expect("failed to find binary");
    cmd.current_dir(workspace)
        .env_remove("RUST_LOG")
        .env_remove("VISUAL_TEMPLATES_LOG_LEVEL");
    cmd
}

#[test]
fn file_sink_receives_events_without_console() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let workspace = temp_dir.path();
    write_document(workspace);
    fs::write(
        workspace.join("visual-templates.toml"),
        "[logging]\nenable_file = true\nconsole_output = \"none\"\n",
    )
    .unwrap();

    command(workspace)
        .args(["extract", "Doc"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    let contents = fs::read_to_string(
        workspace
            .join(".visual-templates")
            .join("logs")
            .join("visual-templates.log"),
    )
    .expect("failed to read log file");
    assert!(contents.contains("extracting visuals from page"));
    assert!(contents.contains("skipping visual"));
}

#[test]
fn console_sink_defaults_to_stderr() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let workspace = temp_dir.path();
    write_document(workspace);

    command(workspace)
        .args(["extract", "Doc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 1 visual config(s)"))
        .stderr(predicate::str::contains("config decodes to an array"));

    assert!(!workspace.join(".visual-templates").exists());
}

#[test]
fn level_filter_comes_from_environment() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let workspace = temp_dir.path();
    write_document(workspace);

    command(workspace)
        .env("VISUAL_TEMPLATES_LOG_LEVEL", "error")
        .args(["extract", "Doc"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn invalid_level_fails_before_running() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let workspace = temp_dir.path();

    command(workspace)
        .env("VISUAL_TEMPLATES_LOG_LEVEL", "not a level!!")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid tracing directive"));
}

#[test]
fn init_refuses_a_second_subscriber() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let config = LoggingConfig {
        console_output: ConsoleOutput::None,
        ..LoggingConfig::default()
    };

    let guard = logging::init(&config, temp_dir.path()).expect("first init succeeds");
    assert!(guard.log_file_path().is_none());
    assert_eq!(guard.console_output(), ConsoleOutput::None);

    let second = logging::init(&config, temp_dir.path());
    assert!(second.is_err());
}
