use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn cli(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("visual-templates").unwrap();
    cmd.current_dir(workspace)
        .env_remove("RUST_LOG")
        .env_remove("VISUAL_TEMPLATES_TEMPLATES_ROOT")
        .env_remove("VISUAL_TEMPLATES_SCHEMA")
        .env("VISUAL_TEMPLATES_LOG_LEVEL", "error");
    cmd
}

fn layout(configs: &[Value]) -> Value {
    let containers: Vec<Value> = configs
        .iter()
        .map(|config| json!({ "config": config.to_string() }))
        .collect();
    json!({
        "sections": [{
            "name": "ReportSection1",
            "displayName": "Overview",
            "visualContainers": containers
        }]
    })
}

fn golden_card() -> Value {
    json!({
        "visualType": "card",
        "title": { "text": "Sales KPI" },
        "background": { "show": true, "color": "#FFFFFF" },
        "x": 1, "y": 2, "width": 3, "height": 4
    })
}

fn write_folder(root: &Path, name: &str, configs: &[Value]) {
    let folder = root.join(name);
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("report.json"), layout(configs).to_string()).unwrap();
}

fn write_archive(path: &Path, configs: &[Value]) {
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(
        layout(configs)
            .to_string()
            .encode_utf16()
            .flat_map(u16::to_le_bytes),
    );
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    zip.start_file("Report/Layout", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(&bytes).unwrap();
    zip.finish().unwrap();
}

fn write_schema(root: &Path) {
    fs::create_dir_all(root.join("templates")).unwrap();
    fs::write(
        root.join("templates/template.schema.json"),
        json!({
            "type": "object",
            "required": ["visualType", "title", "background"]
        })
        .to_string(),
    )
    .unwrap();
}

#[test]
fn test_top_level_help_lists_commands() {
    let tmp = TempDir::new().unwrap();
    cli(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TEMPLATE COMMANDS"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("promote"));
}

#[test]
fn test_apply_help_mentions_preserved_fields() {
    let tmp = TempDir::new().unwrap();
    cli(tmp.path())
        .args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--match"))
        .stdout(predicate::str::contains("position, size, filters, and data roles"));
}

#[test]
fn test_extract_archive_to_default_output() {
    let tmp = TempDir::new().unwrap();
    write_archive(&tmp.path().join("Golden.pbix"), &[golden_card()]);

    cli(tmp.path())
        .args(["extract", "Golden.pbix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reading Golden.pbix (archive)"))
        .stdout(predicate::str::contains("Extracted 1 visual config(s) from 1 page(s)"));

    let extracted = tmp
        .path()
        .join("extracted_visual_templates/Golden/ReportSection1/card_Sales_KPI_0.json");
    let value: Value = serde_json::from_slice(&fs::read(extracted).unwrap()).unwrap();
    assert_eq!(value, golden_card());
}

#[test]
fn test_extract_missing_source_fails() {
    let tmp = TempDir::new().unwrap();
    cli(tmp.path())
        .args(["extract", "Missing.pbix"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("[ERROR] NOT_FOUND"));
}

#[test]
fn test_extract_corrupt_archive_reports_format_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("Bad.pbix"), b"garbage").unwrap();
    cli(tmp.path())
        .args(["extract", "Bad.pbix"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FORMAT_ARCHIVE_UNREADABLE"))
        .stderr(predicate::str::contains("file: Bad.pbix"));
}

#[test]
fn test_authoring_then_apply_flow() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_schema(root);
    write_archive(&root.join("Golden.pbix"), &[golden_card()]);
    write_folder(
        root,
        "Regional",
        &[json!({
            "visualType": "card",
            "title": { "text": "Regional sales kpi" },
            "background": { "show": false },
            "x": 500, "y": 600, "width": 10, "height": 20
        })],
    );

    cli(root)
        .args(["extract", "Golden.pbix", "--output", "work"])
        .assert()
        .success();

    cli(root)
        .args([
            "promote",
            "work/Golden/ReportSection1/card_Sales_KPI_0.json",
            "--name",
            "KPI",
            "--schema",
            "templates/template.schema.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed document-specific fields: x, y, width, height"))
        .stdout(predicate::str::contains("(card/KPI)"));

    cli(root)
        .args(["validate", "--schema", "templates/template.schema.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked 1 template(s): 1 valid, 0 invalid"));

    cli(root)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("card/KPI"));

    cli(root)
        .args([
            "apply",
            "Regional",
            "--template",
            "templates/card/KPI.json",
            "--match",
            "Sales",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("fixed 1 visual(s)"));

    let layout: Value =
        serde_json::from_slice(&fs::read(root.join("Regional/report.json")).unwrap()).unwrap();
    let config: Value =
        serde_json::from_str(layout["sections"][0]["visualContainers"][0]["config"].as_str().unwrap())
            .unwrap();
    assert_eq!(
        config,
        json!({
            "visualType": "card",
            "title": { "text": "Sales KPI" },
            "background": { "show": true, "color": "#FFFFFF" },
            "x": 500, "y": 600, "width": 10, "height": 20
        })
    );
}

#[test]
fn test_validate_fails_on_invalid_template() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_schema(root);
    fs::create_dir_all(root.join("templates/card")).unwrap();
    fs::write(
        root.join("templates/card/Placed.json"),
        json!({ "visualType": "card", "title": {}, "background": {}, "x": 3 }).to_string(),
    )
    .unwrap();
    fs::write(
        root.join("visual-templates.toml"),
        "[templates]\nschema = \"templates/template.schema.json\"\n",
    )
    .unwrap();

    cli(root)
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID"))
        .stdout(predicate::str::contains("/x [PreservedKey]"))
        .stderr(predicate::str::contains("1 template(s) failed validation"));
}

#[test]
fn test_apply_refuses_template_failing_schema() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_schema(root);
    write_folder(root, "Target", &[golden_card()]);
    fs::write(root.join("partial.json"), json!({ "visualType": "card" }).to_string()).unwrap();
    let before = fs::read(root.join("Target/report.json")).unwrap();

    cli(root)
        .args([
            "apply",
            "Target",
            "--template",
            "partial.json",
            "--match",
            "card",
            "--schema",
            "templates/template.schema.json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed validation; nothing was applied"));

    assert_eq!(fs::read(root.join("Target/report.json")).unwrap(), before);
}

#[test]
fn test_apply_continues_past_failures_and_exits_nonzero() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_folder(root, "Good", &[golden_card()]);
    write_archive(&root.join("ReadOnly.pbix"), &[golden_card()]);
    fs::write(
        root.join("template.json"),
        json!({ "visualType": "card", "border": { "show": true } }).to_string(),
    )
    .unwrap();

    cli(root)
        .args([
            "apply",
            "ReadOnly.pbix",
            "Good",
            "--template",
            "template.json",
            "--match",
            "card",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("ReadOnly.pbix: FAILED"))
        .stdout(predicate::str::contains("Good: fixed 1 visual(s)"))
        .stderr(predicate::str::contains("1 of 2 document(s) could not be updated"));
}

#[test]
fn test_apply_rejects_blank_match_token() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_folder(root, "Good", &[golden_card()]);
    fs::write(root.join("template.json"), "{}").unwrap();

    cli(root)
        .args(["apply", "Good", "--template", "template.json", "--match", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Match token cannot be empty"));
}

#[test]
fn test_list_empty_root() {
    let tmp = TempDir::new().unwrap();
    cli(tmp.path())
        .args(["list", "--templates-root", "nowhere"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No templates found under nowhere"));
}
