#![allow(clippy::result_large_err)]

//! Template acceptance gate: JSON Schema checks plus the rule that a
//! template never carries preserved keys.

use crate::core::document::payload::json_kind;
use crate::core::document::PRESERVED_FIELDS;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::utils::serialization::strip_utf8_bom;
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Validator};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    MissingKey,
    TypeMismatch,
    PreservedKey,
    NotAnObject,
    Parse,
    Other,
}

/// One reason a template was rejected. `path` is a JSON pointer; the root
/// is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "(root)" } else { &self.path };
        write!(f, "{} [{:?}] {}", path, self.kind, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    fn push(&mut self, path: impl Into<String>, kind: ViolationKind, message: impl Into<String>) {
        self.violations.push(Violation {
            path: path.into(),
            kind,
            message: message.into(),
        });
    }
}

/// A compiled draft 7 schema.
pub struct TemplateSchema {
    validator: Validator,
}

impl TemplateSchema {
    pub fn from_value(schema: &Value) -> Result<Self, AppError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(schema)
            .map_err(|err| {
                AppError::new(
                    ErrorCategory::ValidationError,
                    format!("Invalid template schema: {}", err),
                )
            })?;
        Ok(Self { validator })
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.is_file() {
            return Err(AppError::not_found("Schema", path));
        }
        let bytes = fs::read(path)?;
        let value: Value = serde_json::from_slice(strip_utf8_bom(&bytes)).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Schema {} is not valid JSON: {}", path.display(), e),
            )
        })?;
        Self::from_value(&value).map_err(|e| e.with_entry("path", path.display().to_string()))
    }

    fn collect(&self, instance: &Value, report: &mut ValidationReport) {
        for err in self.validator.iter_errors(instance) {
            let pointer = err.instance_path.to_string();
            let (path, kind) = match &err.kind {
                ValidationErrorKind::Required { property } => {
                    let key = property
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| property.to_string());
                    (format!("{}/{}", pointer, key), ViolationKind::MissingKey)
                }
                ValidationErrorKind::Type { .. } => (pointer, ViolationKind::TypeMismatch),
                _ => (pointer, ViolationKind::Other),
            };
            report.push(path, kind, err.to_string());
        }
    }
}

/// Checks templates. Without a schema only the structural rules apply.
pub struct SchemaValidator {
    schema: Option<TemplateSchema>,
}

impl SchemaValidator {
    pub fn new(schema: Option<TemplateSchema>) -> Self {
        Self { schema }
    }

    pub fn has_schema(&self) -> bool {
        self.schema.is_some()
    }

    pub fn validate(&self, template: &Value) -> ValidationReport {
        let mut report = ValidationReport::default();

        let Some(object) = template.as_object() else {
            report.push(
                "",
                ViolationKind::NotAnObject,
                format!("template must be a JSON object, found {}", json_kind(template)),
            );
            return report;
        };

        if let Some(schema) = &self.schema {
            schema.collect(template, &mut report);
        }

        for key in PRESERVED_FIELDS {
            if object.contains_key(key) {
                report.push(
                    format!("/{}", key),
                    ViolationKind::PreservedKey,
                    format!("\"{}\" is document-specific and must not appear in a template", key),
                );
            }
        }

        report
    }

    /// Read and validate one file. Unreadable or unparsable files fail with
    /// a `Parse` violation.
    pub fn validate_file(&self, path: &Path) -> ValidationReport {
        let parsed = fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                serde_json::from_slice::<Value>(strip_utf8_bom(&bytes)).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(value) => self.validate(&value),
            Err(message) => {
                let mut report = ValidationReport::default();
                report.push("", ViolationKind::Parse, message);
                report
            }
        }
    }

    /// Validate every template under `root`, or `root` itself when it is a
    /// file. Never stops at the first failure.
    pub fn validate_tree(&self, root: &Path) -> Result<BatchReport, AppError> {
        if !root.exists() {
            return Err(AppError::not_found("Template path", root));
        }

        let files = if root.is_file() {
            vec![root.to_path_buf()]
        } else {
            let mut files = Vec::new();
            collect_templates(root, &mut files)?;
            files.sort();
            files
        };

        let mut batch = BatchReport::default();
        for path in files {
            let report = self.validate_file(&path);
            if report.passed() {
                tracing::debug!(file = %path.display(), "template valid");
            } else {
                tracing::warn!(
                    file = %path.display(),
                    violations = report.violations.len(),
                    "template rejected"
                );
            }
            batch.files.push(FileReport { path, report });
        }
        Ok(batch)
    }
}

/// `*.json` files below `dir`, excluding `*.schema.json`.
fn collect_templates(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), AppError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        AppError::new(
            ErrorCategory::IoError,
            format!("Failed to read directory {}", dir.display()),
        )
        .with_cause(e)
    })?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_templates(&path, files)?;
        } else if is_template_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_template_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name.ends_with(".json") && !name.ends_with(".schema.json")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub report: ValidationReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn checked(&self) -> usize {
        self.files.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|file| !file.report.passed())
    }

    pub fn passed(&self) -> bool {
        self.failures().next().is_none()
    }
}
