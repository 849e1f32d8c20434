#![allow(clippy::result_large_err)]

//! Writes every decodable visual configuration of a document to its own
//! JSON file under `{output_root}/{document_stem}/{page_id}/`.

use crate::core::document::{DecodeOutcome, ReportDocument, VisualConfig};
use crate::core::error::AppError;
use crate::core::types::{ErrorCategory, ExtractionSummary};
use crate::utils::files::safe_component;
use crate::utils::serialization::{FileSerializer, FileUtils, PrettyJsonSerializer};
use std::fs;
use std::path::Path;

/// Keep alphanumerics, spaces, and underscores, trim trailing whitespace,
/// then turn spaces into underscores.
pub fn sanitize_name(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    kept.trim_end().replace(' ', "_")
}

/// `{visualType}_{safeTitle}_{index}.json`
pub fn template_file_name(config: &VisualConfig, index: usize) -> String {
    format!(
        "{}_{}_{}.json",
        sanitize_name(config.visual_type_or_default()),
        sanitize_name(config.title_or_default()),
        index
    )
}

pub struct ConfigExtractor {
    serializer: PrettyJsonSerializer,
}

impl ConfigExtractor {
    pub fn new() -> Self {
        Self {
            serializer: PrettyJsonSerializer::new(),
        }
    }

    /// Extract every visual of `document`.
    ///
    /// Undecodable payloads are skipped and counted; they never fail the run.
    /// The sequence index spans the whole document, so file names stay unique
    /// across pages and are identical between runs on an unchanged source.
    pub fn extract(
        &self,
        document: &ReportDocument,
        document_stem: &str,
        output_root: &Path,
    ) -> Result<ExtractionSummary, AppError> {
        let output_dir = output_root.join(safe_component(document_stem));
        let mut summary = ExtractionSummary {
            output_dir: output_dir.clone(),
            ..Default::default()
        };

        for section in document.sections() {
            summary.pages += 1;
            let page_dir = output_dir.join(safe_component(section.page_id()));
            fs::create_dir_all(&page_dir).map_err(|e| {
                AppError::new(
                    ErrorCategory::IoError,
                    format!("Failed to create {}: {}", page_dir.display(), e),
                )
            })?;
            tracing::info!(page = %section.page_name(), "extracting visuals from page");

            for (position, container) in section.visual_containers().iter().enumerate() {
                let Some(payload) = container.payload() else {
                    summary.without_config += 1;
                    continue;
                };

                let config = match payload.decode() {
                    DecodeOutcome::Decoded(config) => config,
                    DecodeOutcome::Skipped(reason) => {
                        tracing::warn!(
                            page = %section.page_id(),
                            container = position,
                            "skipping visual: {}",
                            reason
                        );
                        summary.skipped += 1;
                        continue;
                    }
                };

                let file_name = template_file_name(&config, summary.extracted);
                let path = page_dir.join(&file_name);
                FileUtils
                    .save_to_file(&path, &config, &self.serializer)
                    .map_err(|e| {
                        AppError::new(
                            ErrorCategory::IoError,
                            format!("Failed to write {}", path.display()),
                        )
                        .with_cause(e)
                    })?;

                tracing::info!(
                    visual = %config.label(),
                    file = %file_name,
                    "saved visual config"
                );
                summary.extracted += 1;
                summary.written.push(path);
            }
        }

        Ok(summary)
    }
}

impl Default for ConfigExtractor {
    fn default() -> Self {
        Self::new()
    }
}
