#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `content` in a single step.
///
/// The bytes go to a temp file in the destination directory which is then
/// renamed over the target, so readers see either the old file or the new
/// one. Parent directories are created as needed.
pub fn replace_file(path: &Path, content: &[u8]) -> Result<(), AppError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| {
        AppError::new(
            ErrorCategory::IoError,
            format!("Failed to create directory {}: {}", parent.display(), e),
        )
    })?;

    let mut staged = NamedTempFile::new_in(parent).map_err(|e| {
        AppError::new(
            ErrorCategory::IoError,
            format!("Failed to stage write in {}: {}", parent.display(), e),
        )
    })?;
    staged.write_all(content)?;
    staged.flush()?;
    staged.persist(path).map_err(|e| {
        AppError::new(
            ErrorCategory::IoError,
            format!("Failed to replace {}: {}", path.display(), e.error),
        )
    })?;
    Ok(())
}

/// Replace characters that would split a path component.
pub fn safe_component(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" => "_".to_string(),
        "." | ".." => cleaned.replace('.', "_"),
        _ => cleaned,
    }
}
