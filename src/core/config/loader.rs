#![allow(clippy::result_large_err)]

use super::{ToolConfig, CONFIG_FILE_NAME};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve the configuration for one invocation.
    ///
    /// An explicit path must exist. Without one, `visual-templates.toml` in
    /// `base_dir` is used when present, defaults otherwise. Environment
    /// variables override file values either way.
    pub fn load(explicit: Option<&Path>, base_dir: &Path) -> Result<ToolConfig, AppError> {
        let file_config = match explicit {
            Some(path) => Some(
                Self::load_from_file(path)?
                    .ok_or_else(|| AppError::not_found("Config file", path))?,
            ),
            None => Self::load_from_file(&base_dir.join(CONFIG_FILE_NAME))?,
        };

        let mut config = file_config.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load config from a specific file path.
    /// Returns Ok(None) if the file doesn't exist.
    pub fn load_from_file(path: &Path) -> Result<Option<ToolConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: ToolConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        Ok(Some(config))
    }

    /// Environment variables take precedence over config file values.
    fn apply_env_overrides(config: &mut ToolConfig) {
        if let Ok(entry) = env::var("VISUAL_TEMPLATES_ARCHIVE_ENTRY") {
            config.layout.archive_entry = entry;
        }

        if let Ok(file) = env::var("VISUAL_TEMPLATES_FOLDER_FILE") {
            config.layout.folder_file = file;
        }

        if let Ok(name) = env::var("VISUAL_TEMPLATES_OUTPUT_DIR_NAME") {
            config.extract.output_dir_name = name;
        }

        if let Ok(root) = env::var("VISUAL_TEMPLATES_TEMPLATES_ROOT") {
            config.templates.root = PathBuf::from(root);
        }

        if let Ok(schema) = env::var("VISUAL_TEMPLATES_SCHEMA") {
            if !schema.trim().is_empty() {
                config.templates.schema = Some(PathBuf::from(schema));
            }
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "VISUAL_TEMPLATES_ARCHIVE_ENTRY - Archive entry holding the layout (default: Report/Layout)",
            "VISUAL_TEMPLATES_FOLDER_FILE - Layout file inside a document folder (default: report.json)",
            "VISUAL_TEMPLATES_OUTPUT_DIR_NAME - Extraction directory created next to the source (default: extracted_visual_templates)",
            "VISUAL_TEMPLATES_TEMPLATES_ROOT - Root of the trusted template tree (default: templates)",
            "VISUAL_TEMPLATES_SCHEMA - Schema every template must satisfy",
            "VISUAL_TEMPLATES_LOG_LEVEL - Default tracing level when RUST_LOG is unset (default: info)",
        ]
    }
}
