use super::visual::VisualConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// String-encoded JSON document stored in a container's `config` field.
///
/// Kept as the original string until a merge replaces it, so payloads that
/// are never matched are written back byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigPayload(String);

/// Result of decoding a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Decoded(VisualConfig),
    Skipped(DecodeSkip),
}

/// Why a payload was skipped. Recoverable: the visual is left out and the
/// run continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeSkip {
    /// Not valid JSON, even after unescaping.
    Unparseable { error: String },
    /// Valid JSON, but not an object.
    NotAnObject { found: &'static str },
}

impl fmt::Display for DecodeSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeSkip::Unparseable { error } => write!(f, "unparsable config string: {}", error),
            DecodeSkip::NotAnObject { found } => {
                write!(f, "config decodes to {} instead of an object", found)
            }
        }
    }
}

impl ConfigPayload {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the payload, retrying once after unescaping `\"` and `\n`.
    pub fn decode(&self) -> DecodeOutcome {
        let parsed = match serde_json::from_str::<Value>(&self.0) {
            Ok(value) => value,
            Err(_) => match serde_json::from_str::<Value>(&unescape(&self.0)) {
                Ok(value) => value,
                Err(err) => {
                    return DecodeOutcome::Skipped(DecodeSkip::Unparseable {
                        error: err.to_string(),
                    })
                }
            },
        };

        match parsed {
            Value::Object(map) => DecodeOutcome::Decoded(VisualConfig::from_map(map)),
            other => DecodeOutcome::Skipped(DecodeSkip::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Serialize a config into a compact payload string.
    pub fn encode(config: &VisualConfig) -> serde_json::Result<Self> {
        serde_json::to_string(config).map(Self)
    }
}

fn unescape(raw: &str) -> String {
    raw.replace("\\\"", "\"").replace("\\n", "\n")
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
