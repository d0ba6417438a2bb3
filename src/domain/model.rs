use serde::{Deserialize, Serialize};
use std::path::Path;

pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A unit of loaded text plus where it came from.
///
/// Loaders set `source` (and `page` for PDFs); splitters copy the parent's
/// metadata onto every chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(page_content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            page_content: page_content.into(),
            metadata,
        }
    }

    pub fn from_source(page_content: impl Into<String>, source: &Path) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(
            "source".to_string(),
            serde_json::Value::String(source.display().to_string()),
        );
        Self::with_metadata(page_content, metadata)
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(|v| v.as_str())
    }

    pub fn page(&self) -> Option<u64> {
        self.metadata.get("page").and_then(|v| v.as_u64())
    }

    /// Char offset in the parent text; `-1` when the chunk could not be
    /// located there.
    pub fn start_index(&self) -> Option<i64> {
        self.metadata.get("start_index").and_then(|v| v.as_i64())
    }

    /// Length in chars, the unit chunk sizes are measured in.
    pub fn char_len(&self) -> usize {
        self.page_content.chars().count()
    }
}
