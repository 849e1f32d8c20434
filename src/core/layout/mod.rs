#![allow(clippy::result_large_err)]

//! Locates, decodes, and parses a report layout from an archive or a
//! document folder, and writes folder layouts back.

pub mod encoding;

pub use encoding::decode_utf16;

use crate::core::config::LayoutConfig;
use crate::core::document::ReportDocument;
use crate::core::error::{AppError, FormatErrorKind};
use crate::core::types::{ErrorCategory, SourceKind};
use crate::utils::serialization::{strip_utf8_bom, FileSerializer, FileUtils, PrettyJsonSerializer};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Where a document's layout lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSource {
    pub kind: SourceKind,
    /// Path the user pointed at: the archive file or the document folder.
    pub path: PathBuf,
    /// Archive entry name, or layout file name inside the folder.
    pub entry: String,
}

impl LayoutSource {
    /// Classify `path`: directories are folder documents, files are archives.
    pub fn detect(path: &Path, config: &LayoutConfig) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::not_found("Document", path));
        }
        let (kind, entry) = if path.is_dir() {
            (SourceKind::Folder, config.folder_file.clone())
        } else {
            (SourceKind::Archive, config.archive_entry.clone())
        };
        Ok(Self {
            kind,
            path: path.to_path_buf(),
            entry,
        })
    }

    /// File holding the layout: the archive itself or `{folder}/{entry}`.
    pub fn layout_path(&self) -> PathBuf {
        match self.kind {
            SourceKind::Archive => self.path.clone(),
            SourceKind::Folder => self.path.join(&self.entry),
        }
    }

    /// Name used for the per-document extraction directory.
    pub fn document_stem(&self) -> String {
        let stem = match self.kind {
            SourceKind::Archive => self.path.file_stem(),
            SourceKind::Folder => self.path.file_name(),
        };
        stem.map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "document".to_string())
    }

    /// Only folder layouts can be written back.
    pub fn is_writable(&self) -> bool {
        self.kind == SourceKind::Folder
    }

    /// Archives are read-only; only folder documents accept a rewrite.
    pub fn ensure_writable(&self) -> Result<(), AppError> {
        if self.is_writable() {
            return Ok(());
        }
        Err(AppError::new(
            ErrorCategory::ValidationError,
            format!(
                "{} is an archive; only document folders can be rewritten",
                self.path.display()
            ),
        )
        .with_suggestion("Save the report as a document folder and apply templates there"))
    }

    fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A parsed document together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub source: LayoutSource,
    pub document: ReportDocument,
}

pub struct LayoutReader {
    config: LayoutConfig,
}

impl LayoutReader {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Read and parse the document at `path`.
    pub fn read(&self, path: &Path) -> Result<LoadedDocument, AppError> {
        let source = LayoutSource::detect(path, &self.config)?;
        tracing::info!(
            kind = %source.kind,
            path = %source.path.display(),
            "reading report layout"
        );

        let text = match source.kind {
            SourceKind::Archive => read_archive_layout(&source)?,
            SourceKind::Folder => read_folder_layout(&source)?,
        };
        let document = parse_layout(&text).map_err(|e| {
            e.with_entry("file", source.display_name())
                .with_entry("entry", source.entry.clone())
        })?;

        for duplicate in document.duplicate_section_ids() {
            tracing::warn!(
                section = %duplicate,
                file = %source.display_name(),
                "section identifier appears more than once"
            );
        }
        tracing::debug!(
            sections = document.sections().len(),
            containers = document.container_count(),
            "layout parsed"
        );

        Ok(LoadedDocument { source, document })
    }

    /// Write a folder document back to its layout file as indented JSON.
    pub fn write_back(&self, loaded: &LoadedDocument) -> Result<PathBuf, AppError> {
        loaded.source.ensure_writable()?;
        let path = loaded.source.layout_path();
        FileUtils
            .save_to_file(&path, &loaded.document, &PrettyJsonSerializer::new())
            .map_err(|e| {
                AppError::new(
                    ErrorCategory::IoError,
                    format!("Failed to save {}", path.display()),
                )
                .with_entry("file", path.display().to_string())
                .with_cause(e)
            })?;
        Ok(path)
    }
}

/// Parse decoded layout text into a document.
pub fn parse_layout(text: &str) -> Result<ReportDocument, AppError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    serde_json::from_str::<ReportDocument>(text).map_err(|e| {
        AppError::format(
            FormatErrorKind::MalformedLayout,
            format!("Layout is not a valid report document: {}", e),
        )
        .with_cause(e)
    })
}

fn read_archive_layout(source: &LayoutSource) -> Result<String, AppError> {
    let file_context = |e: AppError| {
        e.with_entry("file", source.display_name())
            .with_entry("entry", source.entry.clone())
    };

    let file = File::open(&source.path).map_err(|e| {
        file_context(AppError::new(
            ErrorCategory::IoError,
            format!("Failed to open {}: {}", source.path.display(), e),
        ))
    })?;
    let mut archive = ZipArchive::new(file).map_err(|e| {
        file_context(
            AppError::format(
                FormatErrorKind::ArchiveUnreadable,
                format!("{} is not a valid archive", source.display_name()),
            )
            .with_cause(e),
        )
    })?;

    let mut entry = match archive.by_name(&source.entry) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(file_context(
                AppError::format(
                    FormatErrorKind::LayoutEntryMissing,
                    format!(
                        "Could not find '{}' inside {}",
                        source.entry,
                        source.display_name()
                    ),
                )
                .with_suggestion(
                    "The container format may have changed; inspect the archive entries",
                ),
            ));
        }
        Err(e) => {
            return Err(file_context(
                AppError::format(
                    FormatErrorKind::ArchiveUnreadable,
                    format!("Failed to open entry '{}'", source.entry),
                )
                .with_cause(e),
            ));
        }
    };

    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).map_err(|e| {
        file_context(
            AppError::format(
                FormatErrorKind::ArchiveUnreadable,
                format!("Failed to read entry '{}'", source.entry),
            )
            .with_cause(e),
        )
    })?;

    decode_utf16(&bytes).map_err(file_context)
}

fn read_folder_layout(source: &LayoutSource) -> Result<String, AppError> {
    let path = source.layout_path();
    if !path.is_file() {
        return Err(AppError::not_found("Layout file", &path).with_suggestion(format!(
            "Ensure {} is a document folder containing {}",
            source.path.display(),
            source.entry
        )));
    }
    let bytes = fs::read(&path).map_err(|e| {
        AppError::new(
            ErrorCategory::IoError,
            format!("Failed to read {}: {}", path.display(), e),
        )
    })?;
    String::from_utf8(strip_utf8_bom(&bytes).to_vec()).map_err(|e| {
        AppError::format(
            FormatErrorKind::DecodeFailure,
            format!("{} is not valid UTF-8", path.display()),
        )
        .with_entry("file", source.display_name())
        .with_entry("entry", source.entry.clone())
        .with_cause(e)
    })
}
