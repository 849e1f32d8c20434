use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys that bind a visual to its document: placement, size, filters, and
/// data roles. A template never overrides them.
pub const PRESERVED_FIELDS: [&str; 7] = ["x", "y", "z", "width", "height", "filters", "dataRoles"];

/// Visual type used when a config has no string `visualType`.
pub const DEFAULT_VISUAL_TYPE: &str = "unknown_type";

/// Title used when a config has no string `title.text`.
pub const DEFAULT_TITLE: &str = "Untitled Visual";

pub fn is_preserved(key: &str) -> bool {
    PRESERVED_FIELDS.contains(&key)
}

/// A decoded configuration payload: formatting (standard) keys plus the
/// document-owned preserved keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisualConfig(Map<String, Value>);

impl VisualConfig {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn visual_type(&self) -> Option<&str> {
        self.0.get("visualType").and_then(Value::as_str)
    }

    /// `title.text`, when `title` is an object holding a string `text`.
    pub fn title_text(&self) -> Option<&str> {
        self.0
            .get("title")
            .and_then(Value::as_object)
            .and_then(|title| title.get("text"))
            .and_then(Value::as_str)
    }

    pub fn visual_type_or_default(&self) -> &str {
        self.visual_type().unwrap_or(DEFAULT_VISUAL_TYPE)
    }

    pub fn title_or_default(&self) -> &str {
        self.title_text().unwrap_or(DEFAULT_TITLE)
    }

    /// Preserved keys present on this config, in `PRESERVED_FIELDS` order.
    pub fn preserved_keys(&self) -> Vec<&'static str> {
        PRESERVED_FIELDS
            .iter()
            .copied()
            .filter(|key| self.0.contains_key(*key))
            .collect()
    }

    /// Copy of this config with every preserved key removed.
    pub fn without_preserved(&self) -> VisualConfig {
        let map = self
            .0
            .iter()
            .filter(|(key, _)| !is_preserved(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        VisualConfig(map)
    }

    /// `'title' (visualType)` label used in progress output.
    pub fn label(&self) -> String {
        format!(
            "'{}' ({})",
            self.title_text().unwrap_or(""),
            self.visual_type_or_default()
        )
    }
}
