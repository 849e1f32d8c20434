//! In-memory report document: sections, visual containers, and their
//! string-encoded configuration payloads.
//!
//! Only the fields the pipeline needs are modeled. Everything else on every
//! level is captured in an `extra` map so a read/modify/write cycle keeps
//! unknown data intact.

pub mod payload;
pub mod visual;

pub use payload::{ConfigPayload, DecodeOutcome, DecodeSkip};
pub use visual::{
    is_preserved, VisualConfig, DEFAULT_TITLE, DEFAULT_VISUAL_TYPE, PRESERVED_FIELDS,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page identifier used when a section carries no `name`.
pub const DEFAULT_PAGE_ID: &str = "unknown_page";

/// Display name used when a section carries no `displayName`.
pub const DEFAULT_PAGE_NAME: &str = "Unknown Page";

/// Root of a report layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sections: Option<Vec<Section>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReportDocument {
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections: Some(sections),
            extra: Map::new(),
        }
    }

    /// Sections in display order.
    pub fn sections(&self) -> &[Section] {
        self.sections.as_deref().unwrap_or_default()
    }

    pub fn sections_mut(&mut self) -> &mut [Section] {
        self.sections.as_deref_mut().unwrap_or_default()
    }

    /// Number of containers across every section.
    pub fn container_count(&self) -> usize {
        self.sections()
            .iter()
            .map(|section| section.visual_containers().len())
            .sum()
    }

    /// Section identifiers that appear more than once, in first-seen order.
    pub fn duplicate_section_ids(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for section in self.sections() {
            let id = section.page_id();
            if !seen.insert(id) && !duplicates.iter().any(|d| d == id) {
                duplicates.push(id.to_string());
            }
        }
        duplicates
    }
}

/// One page of the report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(
        rename = "visualContainers",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    visual_containers: Option<Vec<VisualContainer>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Section {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            display_name: Some(display_name.into()),
            visual_containers: Some(Vec::new()),
            extra: Map::new(),
        }
    }

    pub fn with_container(mut self, container: VisualContainer) -> Self {
        self.visual_containers
            .get_or_insert_with(Vec::new)
            .push(container);
        self
    }

    /// Stable identifier, used as the page directory during extraction.
    pub fn page_id(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_PAGE_ID)
    }

    pub fn page_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(DEFAULT_PAGE_NAME)
    }

    pub fn visual_containers(&self) -> &[VisualContainer] {
        self.visual_containers.as_deref().unwrap_or_default()
    }

    pub fn visual_containers_mut(&mut self) -> &mut [VisualContainer] {
        self.visual_containers.as_deref_mut().unwrap_or_default()
    }
}

/// One placed visual. Position fields may live in `extra` next to the payload
/// depending on the document shape; they are never touched by a merge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualContainer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<ConfigPayload>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VisualContainer {
    pub fn new(config: ConfigPayload) -> Self {
        Self {
            config: Some(config),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// The raw payload, or `None` when the container has none or it is empty.
    pub fn payload(&self) -> Option<&ConfigPayload> {
        self.config.as_ref().filter(|payload| !payload.is_empty())
    }

    /// Replace the payload with the encoding of `config`.
    pub fn replace_config(&mut self, config: &VisualConfig) -> serde_json::Result<()> {
        self.config = Some(ConfigPayload::encode(config)?);
        Ok(())
    }
}
