use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    FormatError,
    NotFound,
    ValidationError,
    SerializationError,
    IoError,
    ConfigError,
    InternalError,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Kind of on-disk document a layout was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// ZIP-compatible container holding a UTF-16 layout entry.
    Archive,
    /// Document folder holding a UTF-8 layout file.
    Folder,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Archive => write!(f, "archive"),
            SourceKind::Folder => write!(f, "folder"),
        }
    }
}

/// Outcome of a single extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    /// Visuals written to disk.
    pub extracted: usize,
    /// Visuals whose payload could not be decoded even after the fallback.
    pub skipped: usize,
    /// Containers that carried no payload at all.
    pub without_config: usize,
    /// Sections walked.
    pub pages: usize,
    /// Directory the run wrote into (`{output_root}/{document_stem}`).
    pub output_dir: PathBuf,
    /// Files written, in extraction order.
    pub written: Vec<PathBuf>,
}

/// Outcome of applying one template to one target document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Layout file the document was read from and written back to.
    pub document: PathBuf,
    /// Containers whose payload was replaced.
    pub fixed: usize,
    /// Containers that carried a payload.
    pub examined: usize,
    /// Containers skipped because their payload could not be decoded.
    pub undecodable: usize,
    /// Whether the document was rewritten.
    pub written: bool,
    /// `title (visualType)` labels of the fixed visuals.
    pub matched: Vec<String>,
}
