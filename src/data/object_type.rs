/// Type tags addressing the objects registered with the bridge
use strum_macros::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ObjectType {
    /// The bridge itself (diagnostics, ping/pong, version)
    Api,
    /// The media player (org.mpris.MediaPlayer2.Player)
    Player,
    /// Playlist information (org.mpris.MediaPlayer2.Playlists)
    Playlist,
    /// The current track list (org.mpris.MediaPlayer2.TrackList)
    Tracklist,
}

impl ObjectType {
    /// Integer code used on the wire
    pub fn code(&self) -> i64 {
        match self {
            ObjectType::Api => 0,
            ObjectType::Player => 1,
            ObjectType::Playlist => 2,
            ObjectType::Tracklist => 3,
        }
    }

    /// Look up a type tag by its wire code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ObjectType::Api),
            1 => Some(ObjectType::Player),
            2 => Some(ObjectType::Playlist),
            3 => Some(ObjectType::Tracklist),
            _ => None,
        }
    }

    /// Get a list of all type tags
    pub fn all() -> Vec<ObjectType> {
        vec![
            ObjectType::Api,
            ObjectType::Player,
            ObjectType::Playlist,
            ObjectType::Tracklist,
        ]
    }
}

impl_code_serde!(ObjectType, "object type");
