use insta::assert_snapshot;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use visual_templates::core::{ErrorCategory, SchemaValidator, TemplateSchema, ViolationKind};

fn schema_value() -> serde_json::Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["visualType", "title", "background"],
        "properties": {
            "visualType": { "type": "string" },
            "title": {
                "type": "object",
                "required": ["text"],
                "properties": { "text": { "type": "string" } }
            },
            "background": {
                "type": "object",
                "properties": { "show": { "type": "boolean" } }
            }
        }
    })
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn template_tree(root: &Path) {
    write(
        &root.join("template.schema.json"),
        &schema_value().to_string(),
    );
    write(
        &root.join("card/KPI.json"),
        &json!({
            "visualType": "card",
            "title": { "text": "Standard KPI Card" },
            "background": { "show": true }
        })
        .to_string(),
    );
    write(
        &root.join("card/NoType.json"),
        &json!({ "title": { "text": "T" }, "background": {} }).to_string(),
    );
    write(
        &root.join("slicer/Placed.json"),
        &json!({
            "visualType": "slicer",
            "title": { "text": "Region" },
            "background": { "show": "yes" },
            "width": 200
        })
        .to_string(),
    );
    write(&root.join("slicer/Broken.json"), "{ \"visualType\": ");
    write(&root.join("README.md"), "not a template");
}

fn rendered(root: &Path, validator: &SchemaValidator) -> String {
    let batch = validator.validate_tree(root).unwrap();
    let mut lines = Vec::new();
    for file in &batch.files {
        let name = file
            .path
            .strip_prefix(root)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/");
        if file.report.passed() {
            lines.push(format!("{}: ok", name));
        }
        for violation in &file.report.violations {
            lines.push(format!("{}: {:?} at '{}'", name, violation.kind, violation.path));
        }
    }
    lines.join("\n")
}

#[test]
fn batch_check_reports_every_failure() {
    let tmp = TempDir::new().unwrap();
    template_tree(tmp.path());
    let schema = TemplateSchema::load(&tmp.path().join("template.schema.json")).unwrap();
    let validator = SchemaValidator::new(Some(schema));

    assert_snapshot!(rendered(tmp.path(), &validator), @r###"
    card/KPI.json: ok
    card/NoType.json: MissingKey at '/visualType'
    slicer/Broken.json: Parse at ''
    slicer/Placed.json: TypeMismatch at '/background/show'
    slicer/Placed.json: PreservedKey at '/width'
    "###);

    let batch = validator.validate_tree(tmp.path()).unwrap();
    assert_eq!(batch.checked(), 4);
    assert_eq!(batch.failures().count(), 3);
    assert!(!batch.passed());
}

#[test]
fn single_file_can_be_checked() {
    let tmp = TempDir::new().unwrap();
    template_tree(tmp.path());
    let validator = SchemaValidator::new(Some(TemplateSchema::from_value(&schema_value()).unwrap()));

    let batch = validator.validate_tree(&tmp.path().join("card/KPI.json")).unwrap();
    assert_eq!(batch.checked(), 1);
    assert!(batch.passed());
}

#[test]
fn missing_template_root_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let error = SchemaValidator::new(None)
        .validate_tree(&tmp.path().join("templates"))
        .unwrap_err();
    assert_eq!(error.category, ErrorCategory::NotFound);
}

#[test]
fn nested_required_key_path_is_reported() {
    let validator = SchemaValidator::new(Some(TemplateSchema::from_value(&schema_value()).unwrap()));
    let report = validator.validate(&json!({
        "visualType": "card",
        "title": {},
        "background": {}
    }));
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].kind, ViolationKind::MissingKey);
    assert_eq!(report.violations[0].path, "/title/text");
}

#[test]
fn unparsable_schema_file_cannot_gate() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.schema.json");
    fs::write(&path, "{").unwrap();
    let error = TemplateSchema::load(&path).err().unwrap();
    assert_eq!(error.category, ErrorCategory::ValidationError);
}
