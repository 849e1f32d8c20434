pub mod config;
pub mod document;
pub mod error;
pub mod extractor;
pub mod layout;
pub mod merger;
pub mod schema;
pub mod template;
pub mod types;

pub use config::{ConfigLoader, ConfigValidator, ToolConfig};
pub use document::{
    ConfigPayload, DecodeOutcome, DecodeSkip, ReportDocument, Section, VisualConfig,
    VisualContainer, PRESERVED_FIELDS,
};
pub use error::{AppError, DefaultErrorReporter, ErrorReporter, FormatErrorKind};
pub use extractor::ConfigExtractor;
pub use layout::{LayoutReader, LayoutSource, LoadedDocument};
pub use merger::{BatchMerge, MatchToken, TemplateMerger};
pub use schema::{SchemaValidator, TemplateSchema, ValidationReport, Violation, ViolationKind};
pub use template::{TemplateInfo, TemplateStore};
pub use types::*;
