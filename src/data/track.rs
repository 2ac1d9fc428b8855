use serde::{Deserialize, Serialize};
use super::Metadata;

/// Represents an entry of the current track list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEntry {
    /// Track identifier, unique within the track list
    pub id: String,

    /// Metadata for this entry (may be sparse)
    #[serde(default)]
    pub metadata: Metadata,
}

impl TrackEntry {
    /// Create a new entry without metadata
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: Metadata::default(),
        }
    }

    /// Create a new entry with metadata
    pub fn with_metadata(id: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            metadata,
        }
    }
}
