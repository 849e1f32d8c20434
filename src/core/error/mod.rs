use crate::core::types::ErrorCategory;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;

/// Reasons a document cannot be turned into a `ReportDocument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatErrorKind {
    #[error("archive is not a readable ZIP container")]
    ArchiveUnreadable,
    #[error("layout entry is missing from the archive")]
    LayoutEntryMissing,
    #[error("layout bytes could not be decoded as text")]
    DecodeFailure,
    #[error("layout text is not a well-formed report document")]
    MalformedLayout,
}

impl FormatErrorKind {
    /// Stable error code used in diagnostics.
    pub fn code(self) -> &'static str {
        match self {
            FormatErrorKind::ArchiveUnreadable => "FORMAT_ARCHIVE_UNREADABLE",
            FormatErrorKind::LayoutEntryMissing => "FORMAT_LAYOUT_ENTRY_MISSING",
            FormatErrorKind::DecodeFailure => "FORMAT_DECODE_FAILURE",
            FormatErrorKind::MalformedLayout => "FORMAT_MALFORMED_LAYOUT",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub format_kind: Option<FormatErrorKind>,
    pub code: String,
    pub message: String,
    pub context: BTreeMap<String, String>,
    pub recovery_suggestions: Vec<String>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        AppError {
            category,
            format_kind: None,
            code: default_code(category).to_string(),
            message: message.into(),
            context: BTreeMap::new(),
            recovery_suggestions: vec![],
            occurred_at: Utc::now(),
            source: None,
        }
    }

    /// Fatal, per-document layout error.
    pub fn format<T: Into<String>>(kind: FormatErrorKind, message: T) -> Self {
        let mut error = AppError::new(ErrorCategory::FormatError, message);
        error.format_kind = Some(kind);
        error.code = kind.code().to_string();
        error
    }

    /// A referenced input path does not exist.
    pub fn not_found(what: &str, path: &Path) -> Self {
        AppError::new(
            ErrorCategory::NotFound,
            format!("{} not found at {}", what, path.display()),
        )
        .with_entry("path", path.display().to_string())
    }

    pub fn with_cause(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_entry<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_suggestion<T: Into<String>>(mut self, suggestion: T) -> Self {
        self.recovery_suggestions.push(suggestion.into());
        self
    }

    pub fn add_context(&mut self, key: &str, value: &str) {
        self.context.insert(key.to_string(), value.to_string());
    }

    /// Returns `true` when this is a FormatError of the given kind.
    pub fn is_format(&self, kind: FormatErrorKind) -> bool {
        self.format_kind == Some(kind)
    }
}

fn default_code(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::FormatError => "FORMAT_ERROR",
        ErrorCategory::NotFound => "NOT_FOUND",
        ErrorCategory::ValidationError => "VALIDATION_ERROR",
        ErrorCategory::SerializationError => "SERIALIZATION_ERROR",
        ErrorCategory::IoError => "IO_ERROR",
        ErrorCategory::ConfigError => "CONFIG_ERROR",
        ErrorCategory::InternalError => "INTERNAL_ERROR",
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            write!(f, " ({})", pairs.join(", "))?;
        }
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError {
            category: ErrorCategory::InternalError,
            format_kind: None,
            code: "ANYHOW_ERROR".to_string(),
            message: e.to_string(),
            context: BTreeMap::new(),
            recovery_suggestions: vec!["Check the error details".to_string()],
            occurred_at: Utc::now(),
            source: Some(e),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError {
            category: ErrorCategory::IoError,
            format_kind: None,
            code: "IO_ERROR".to_string(),
            message: e.to_string(),
            context: BTreeMap::new(),
            recovery_suggestions: vec!["Check file permissions and paths".to_string()],
            occurred_at: Utc::now(),
            source: Some(anyhow::anyhow!(e)),
        }
    }
}

pub trait ErrorReporter {
    fn report_error(&self, error: &AppError);
}

/// Writes diagnostics to the terminal.
pub struct DefaultErrorReporter;

impl DefaultErrorReporter {
    pub fn new() -> Self {
        DefaultErrorReporter
    }

    /// Render an error the way `report_error` prints it.
    pub fn render(error: &AppError) -> String {
        let mut lines = vec![format!("[ERROR] {}: {}", error.code, error.message)];
        for (key, value) in &error.context {
            lines.push(format!("  {}: {}", key, value));
        }
        if let Some(ref source) = error.source {
            lines.push(format!("  Caused by: {}", source));
        }
        for suggestion in &error.recovery_suggestions {
            lines.push(format!("  Hint: {}", suggestion));
        }
        lines.join("\n")
    }
}

impl Default for DefaultErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter for DefaultErrorReporter {
    fn report_error(&self, error: &AppError) {
        eprintln!("{}", Self::render(error));
    }
}
