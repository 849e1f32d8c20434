#![allow(clippy::result_large_err)]

use crate::core::document::VisualConfig;
use crate::core::error::AppError;
use crate::core::extractor::sanitize_name;
use crate::core::schema::SchemaValidator;
use crate::core::types::ErrorCategory;
use crate::utils::files::safe_component;
use crate::utils::serialization::{strip_utf8_bom, FileSerializer, FileUtils, PrettyJsonSerializer};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// A template discovered under `{root}/{category}/{name}.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    /// Visual type grouping (directory name).
    pub category: String,
    /// File stem.
    pub name: String,
    pub path: PathBuf,
}

/// The trusted template set on disk.
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Templates sorted by category, then name. A missing root is an empty set.
    pub fn list(&self) -> Result<Vec<TemplateInfo>, AppError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut infos = Vec::new();
        for category_dir in read_dir_paths(&self.root)? {
            if !category_dir.is_dir() {
                continue;
            }
            let category = category_dir
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();

            for path in read_dir_paths(&category_dir)? {
                let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                    continue;
                };
                if !path.is_file() || !file_name.ends_with(".json") || file_name.ends_with(".schema.json") {
                    continue;
                }
                infos.push(TemplateInfo {
                    category: category.clone(),
                    name: file_name.trim_end_matches(".json").to_string(),
                    path,
                });
            }
        }

        infos.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        Ok(infos)
    }

    /// Read one template file.
    pub fn load(path: &Path) -> Result<VisualConfig, AppError> {
        if !path.is_file() {
            return Err(AppError::not_found("Template", path));
        }
        let bytes = fs::read(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read template {}: {}", path.display(), e),
            )
        })?;
        let value: Value = serde_json::from_slice(strip_utf8_bom(&bytes)).map_err(|e| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("Template {} is not valid JSON: {}", path.display(), e),
            )
        })?;
        VisualConfig::from_value(value).ok_or_else(|| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("Template {} must be a JSON object", path.display()),
            )
        })
    }

    /// Strip preserved keys from an extracted config, validate the result,
    /// and only then write it into the store.
    ///
    /// `category` defaults to the visual type and `name` to the sanitized
    /// title.
    pub fn promote(
        &self,
        extracted: &VisualConfig,
        category: Option<&str>,
        name: Option<&str>,
        validator: &SchemaValidator,
    ) -> Result<TemplateInfo, AppError> {
        let template = extracted.without_preserved();
        let stripped = extracted.preserved_keys();
        if !stripped.is_empty() {
            tracing::debug!(keys = ?stripped, "stripped preserved fields");
        }

        let report = validator.validate(&Value::Object(template.as_map().clone()));
        if !report.passed() {
            let mut error = AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "Template failed validation with {} violation(s)",
                    report.violations.len()
                ),
            )
            .with_suggestion("Fix the listed keys and promote again");
            for (index, violation) in report.violations.iter().enumerate() {
                error.add_context(&format!("violation_{}", index + 1), &violation.to_string());
            }
            return Err(error);
        }

        let category = safe_component(
            &category
                .map(str::to_string)
                .unwrap_or_else(|| sanitize_name(template.visual_type_or_default())),
        );
        let name = safe_component(
            &name
                .map(str::to_string)
                .unwrap_or_else(|| sanitize_name(template.title_or_default())),
        );
        let path = self.root.join(&category).join(format!("{}.json", name));
        if path.exists() {
            tracing::info!(path = %path.display(), "replacing existing template");
        }

        FileUtils
            .save_to_file(&path, &template, &PrettyJsonSerializer::new())
            .map_err(|e| {
                AppError::new(
                    ErrorCategory::IoError,
                    format!("Failed to write template {}", path.display()),
                )
                .with_cause(e)
            })?;

        Ok(TemplateInfo {
            category,
            name,
            path,
        })
    }
}

fn read_dir_paths(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| {
        AppError::new(
            ErrorCategory::IoError,
            format!("Failed to scan templates directory {}: {}", dir.display(), e),
        )
    })? {
        let entry = entry.map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to inspect template entry in {}: {}", dir.display(), e),
            )
        })?;
        paths.push(entry.path());
    }
    Ok(paths)
}
