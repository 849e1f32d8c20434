//! Utility helpers: JSON serializers and whole-file replacement.
pub mod files;
pub mod serialization;

pub use files::{replace_file, safe_component};
pub use serialization::FileSerializer;
pub use serialization::FileUtils;
pub use serialization::PrettyJsonSerializer;
pub use serialization::Serializer;
