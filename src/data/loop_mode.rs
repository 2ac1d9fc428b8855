/// Loop mode enumeration for playback
///
/// Corresponds to the LoopStatus property of the MPRIS player interface.
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LoopMode {
    /// No repeat
    None,
    /// Repeat the whole playlist
    Playlist,
    /// Repeat the current track
    Track,
}

impl Default for LoopMode {
    fn default() -> Self {
        LoopMode::None
    }
}

impl LoopMode {
    pub fn code(&self) -> i64 {
        match self {
            LoopMode::None => 0,
            LoopMode::Playlist => 1,
            LoopMode::Track => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(LoopMode::None),
            1 => Some(LoopMode::Playlist),
            2 => Some(LoopMode::Track),
            _ => None,
        }
    }

    /// The mode a repeat button cycles to next
    pub fn next(&self) -> Self {
        match self {
            LoopMode::None => LoopMode::Playlist,
            LoopMode::Playlist => LoopMode::Track,
            LoopMode::Track => LoopMode::None,
        }
    }
}

impl_code_serde!(LoopMode, "loop mode");
