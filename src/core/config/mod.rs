pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "visual-templates.toml";

/// Tool configuration loaded from visual-templates.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ToolConfig {
    /// Where layouts live inside documents
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Extraction output settings
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Trusted template set
    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Layout locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    /// Entry inside an archive holding the UTF-16 layout
    #[serde(default = "default_archive_entry")]
    pub archive_entry: String,

    /// File inside a document folder holding the UTF-8 layout
    #[serde(default = "default_folder_file")]
    pub folder_file: String,
}

/// Extraction settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractConfig {
    /// Directory created next to the source when no output root is given
    #[serde(default = "default_output_dir_name")]
    pub output_dir_name: String,
}

/// Trusted template set settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplatesConfig {
    /// Root of the `{category}/{name}.json` tree
    #[serde(default = "default_templates_root")]
    pub root: PathBuf,

    /// Schema every template must satisfy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,
}

fn default_archive_entry() -> String {
    "Report/Layout".to_string()
}

fn default_folder_file() -> String {
    "report.json".to_string()
}

fn default_output_dir_name() -> String {
    "extracted_visual_templates".to_string()
}

fn default_templates_root() -> PathBuf {
    PathBuf::from("templates")
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            archive_entry: default_archive_entry(),
            folder_file: default_folder_file(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            output_dir_name: default_output_dir_name(),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            root: default_templates_root(),
            schema: None,
        }
    }
}
