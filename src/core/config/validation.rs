#![allow(clippy::result_large_err)]

use super::ToolConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &ToolConfig) -> Result<(), AppError> {
        Self::require_relative_name("layout.archive_entry", &config.layout.archive_entry)?;
        Self::require_relative_name("layout.folder_file", &config.layout.folder_file)?;
        Self::require_relative_name(
            "extract.output_dir_name",
            &config.extract.output_dir_name,
        )?;

        if config.templates.root.as_os_str().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "templates.root cannot be empty",
            ));
        }

        Ok(())
    }

    fn require_relative_name(field: &str, value: &str) -> Result<(), AppError> {
        if value.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                format!("{} cannot be empty", field),
            ));
        }
        if value.split(['/', '\\']).any(|part| part == "..") {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                format!("{} must not contain '..' components", field),
            ));
        }
        Ok(())
    }
}
