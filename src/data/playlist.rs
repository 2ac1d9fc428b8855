use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// A playlist reference as exposed by the MPRIS playlists interface
///
/// Equality is structural: two values with the same id, name and icon are
/// the same playlist even when they were built independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct PlaylistInfo {
    /// Object path style identifier, e.g. `/org/webmusic/playlist/1`
    pub id: String,

    /// Display name
    pub name: String,

    /// Icon URL, empty if the site has none
    #[serde(default)]
    pub icon: String,
}

impl PlaylistInfo {
    /// Create a new playlist reference
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
        }
    }
}

/// Orderings a site can offer for its playlists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum PlaylistOrdering {
    /// Alphabetical ordering by name, ascending
    Alphabetical,
    /// Ordering by creation date, oldest first
    CreationDate,
    /// Ordering by last modification date, oldest first
    ModifiedDate,
    /// Ordering by date of last playback, oldest first
    LastPlayDate,
    /// A user-defined ordering
    UserDefined,
}

impl Default for PlaylistOrdering {
    fn default() -> Self {
        PlaylistOrdering::UserDefined
    }
}
