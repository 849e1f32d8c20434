use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use visual_templates::core::config::LayoutConfig;
use visual_templates::core::{ConfigExtractor, LayoutReader};

fn container(config: Value) -> Value {
    json!({ "x": 0, "y": 0, "config": config.to_string() })
}

/// Folder document with duplicate titles across pages and a few visuals the
/// extractor has to skip.
fn write_document(root: &Path) -> PathBuf {
    let folder = root.join("Golden");
    fs::create_dir_all(&folder).unwrap();
    let layout = json!({
        "sections": [
            {
                "name": "ReportSection1",
                "displayName": "Overview",
                "visualContainers": [
                    container(json!({
                        "visualType": "card",
                        "title": { "text": "Sales KPI" },
                        "x": 100, "y": 50, "width": 250, "height": 150,
                        "dataRoles": [{ "role": "Values" }]
                    })),
                    { "x": 5, "config": "{\\\"visualType\\\":\\\"slicer\\\"}" },
                    { "x": 6, "config": "{oops" },
                    { "x": 7 }
                ]
            },
            {
                "name": "ReportSection2",
                "displayName": "Detail",
                "visualContainers": [
                    container(json!({ "visualType": "card", "title": { "text": "Sales KPI" } })),
                    container(json!({ "title": { "text": "Notes: Q1/Q2 (draft)" } }))
                ]
            }
        ]
    });
    fs::write(folder.join("report.json"), layout.to_string()).unwrap();
    folder
}

fn relative_files(root: &Path) -> Vec<String> {
    let mut files = Vec::new();
    collect(root, root, &mut files);
    files.sort();
    files
}

fn collect(root: &Path, dir: &Path, files: &mut Vec<String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            files.push(
                path.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/"),
            );
        }
    }
}

fn extract(folder: &Path, output: &Path) -> visual_templates::core::ExtractionSummary {
    let loaded = LayoutReader::new(LayoutConfig::default()).read(folder).unwrap();
    ConfigExtractor::new()
        .extract(&loaded.document, &loaded.source.document_stem(), output)
        .unwrap()
}

#[test]
fn extracts_one_file_per_decodable_visual() {
    let tmp = TempDir::new().unwrap();
    let folder = write_document(tmp.path());
    let output = tmp.path().join("out");

    let summary = extract(&folder, &output);

    assert_eq!(summary.extracted, 4);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.without_config, 1);
    assert_eq!(summary.pages, 2);
    assert_eq!(
        relative_files(&output),
        vec![
            "Golden/ReportSection1/card_Sales_KPI_0.json",
            "Golden/ReportSection1/slicer_Untitled_Visual_1.json",
            "Golden/ReportSection2/card_Sales_KPI_2.json",
            "Golden/ReportSection2/unknown_type_Notes_Q1Q2_draft_3.json",
        ]
    );
}

#[test]
fn extracted_file_keeps_preserved_fields() {
    let tmp = TempDir::new().unwrap();
    let folder = write_document(tmp.path());
    let output = tmp.path().join("out");

    extract(&folder, &output);

    let path = output.join("Golden/ReportSection1/card_Sales_KPI_0.json");
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n    \"visualType\": \"card\""));
    assert!(text.ends_with("}\n"));

    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["x"], json!(100));
    assert_eq!(value["dataRoles"], json!([{ "role": "Values" }]));
}

#[test]
fn extraction_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let folder = write_document(tmp.path());
    let output = tmp.path().join("out");

    let first = extract(&folder, &output);
    let snapshot: Vec<(String, Vec<u8>)> = relative_files(&output)
        .into_iter()
        .map(|name| {
            let bytes = fs::read(output.join(&name)).unwrap();
            (name, bytes)
        })
        .collect();

    let second = extract(&folder, &output);
    assert_eq!(first, second);
    for (name, bytes) in snapshot {
        assert_eq!(fs::read(output.join(&name)).unwrap(), bytes, "{} changed", name);
    }
}
