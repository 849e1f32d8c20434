#![allow(clippy::result_large_err)]

//! Applies a template to the matching visuals of a target document.
//!
//! A merge runs in two stages that must stay in this order:
//! the template is deep-copied into a fresh config, then the preserved
//! values captured from the current config are written over it.

use crate::core::document::{DecodeOutcome, ReportDocument, VisualConfig, PRESERVED_FIELDS};
use crate::core::error::AppError;
use crate::core::layout::LayoutReader;
use crate::core::types::{ErrorCategory, MergeSummary};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Case-insensitive token selecting which visuals a template applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchToken {
    raw: String,
    folded: String,
}

impl MatchToken {
    pub fn new(token: impl Into<String>) -> Result<Self, AppError> {
        let raw = token.into();
        if raw.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "Match token cannot be empty",
            )
            .with_suggestion("Pass part of a visual title or an exact visual type"));
        }
        let folded = raw.to_lowercase();
        Ok(Self { raw, folded })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Title substring first, then exact visual type.
    pub fn matches(&self, config: &VisualConfig) -> bool {
        if let Some(title) = config.title_text() {
            if title.to_lowercase().contains(&self.folded) {
                return true;
            }
        }
        config
            .visual_type()
            .is_some_and(|visual_type| visual_type.to_lowercase() == self.folded)
    }
}

/// Preserved values present in a config, in `PRESERVED_FIELDS` order.
///
/// `null` counts as absent.
pub fn capture_preserved(config: &VisualConfig) -> Vec<(&'static str, Value)> {
    PRESERVED_FIELDS
        .iter()
        .filter_map(|key| match config.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some((*key, value.clone())),
        })
        .collect()
}

pub fn reapply_preserved(config: &mut VisualConfig, preserved: Vec<(&'static str, Value)>) {
    for (key, value) in preserved {
        config.insert(key, value);
    }
}

/// Build the replacement config for one matched visual. `template` is not
/// modified.
pub fn merge_config(current: &VisualConfig, template: &VisualConfig) -> VisualConfig {
    let preserved = capture_preserved(current);
    let mut merged = template.clone();
    reapply_preserved(&mut merged, preserved);
    merged
}

/// Outcome of applying one template to several documents.
#[derive(Debug, Default)]
pub struct BatchMerge {
    pub results: Vec<(PathBuf, Result<MergeSummary, AppError>)>,
}

impl BatchMerge {
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|(_, result)| result.is_err()).count()
    }

    pub fn total_fixed(&self) -> usize {
        self.results
            .iter()
            .filter_map(|(_, result)| result.as_ref().ok())
            .map(|summary| summary.fixed)
            .sum()
    }

    pub fn succeeded(&self) -> bool {
        self.failures() == 0
    }

    /// Category shared by every failed document, or `InternalError` when the
    /// failures disagree. `None` when nothing failed.
    pub fn failure_category(&self) -> Option<ErrorCategory> {
        let mut categories = self
            .results
            .iter()
            .filter_map(|(_, result)| result.as_ref().err())
            .map(|error| error.category);
        let first = categories.next()?;
        if categories.all(|category| category == first) {
            Some(first)
        } else {
            Some(ErrorCategory::InternalError)
        }
    }
}

pub struct TemplateMerger {
    template: VisualConfig,
    token: MatchToken,
}

impl TemplateMerger {
    pub fn new(template: VisualConfig, token: MatchToken) -> Self {
        for key in template.preserved_keys() {
            tracing::warn!(
                key = key,
                "template carries a preserved field; the target's value will be kept"
            );
        }
        Self { template, token }
    }

    pub fn template(&self) -> &VisualConfig {
        &self.template
    }

    pub fn token(&self) -> &MatchToken {
        &self.token
    }

    /// Replace the payload of every matching container in place.
    ///
    /// The returned summary has an empty `document` path and `written == false`.
    pub fn apply_to_document(&self, document: &mut ReportDocument) -> Result<MergeSummary, AppError> {
        let mut summary = MergeSummary::default();

        for section in document.sections_mut() {
            let page = section.page_id().to_string();
            for container in section.visual_containers_mut() {
                let Some(payload) = container.payload() else {
                    continue;
                };
                summary.examined += 1;

                let current = match payload.decode() {
                    DecodeOutcome::Decoded(config) => config,
                    DecodeOutcome::Skipped(reason) => {
                        tracing::debug!(page = %page, "ignoring undecodable visual: {}", reason);
                        summary.undecodable += 1;
                        continue;
                    }
                };
                if !self.token.matches(&current) {
                    continue;
                }

                let merged = merge_config(&current, &self.template);
                container.replace_config(&merged).map_err(|e| {
                    AppError::new(
                        ErrorCategory::SerializationError,
                        format!("Failed to encode merged config for {}", current.label()),
                    )
                    .with_entry("page", page.clone())
                    .with_cause(e)
                })?;

                tracing::info!(page = %page, visual = %current.label(), "applied template");
                summary.fixed += 1;
                summary.matched.push(current.label());
            }
        }

        Ok(summary)
    }

    /// Read, merge, and rewrite one folder document. Nothing is written when
    /// no visual matches.
    pub fn apply_to_path(&self, reader: &LayoutReader, path: &Path) -> Result<MergeSummary, AppError> {
        let mut loaded = reader.read(path)?;
        loaded.source.ensure_writable()?;

        let mut summary = self.apply_to_document(&mut loaded.document)?;
        summary.document = loaded.source.layout_path();

        if summary.fixed == 0 {
            tracing::info!(
                document = %summary.document.display(),
                token = %self.token.as_str(),
                "no matching visuals; document left untouched"
            );
            return Ok(summary);
        }

        reader.write_back(&loaded)?;
        summary.written = true;
        tracing::info!(
            document = %summary.document.display(),
            fixed = summary.fixed,
            "document rewritten"
        );
        Ok(summary)
    }

    /// Apply to each target independently. A failure does not stop the
    /// remaining targets and nothing is rolled back.
    pub fn apply_batch(&self, reader: &LayoutReader, targets: &[PathBuf]) -> BatchMerge {
        let mut batch = BatchMerge::default();
        for target in targets {
            let result = self.apply_to_path(reader, target);
            if let Err(ref error) = result {
                tracing::error!(target = %target.display(), "merge failed: {}", error);
            }
            batch.results.push((target.clone(), result));
        }
        batch
    }
}
