/// Playback status as reported by the page's player
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlaybackStatus {
    /// Nothing is playing
    Stop,
    /// Media is playing
    Play,
    /// Playback is paused
    Pause,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        PlaybackStatus::Stop
    }
}

impl PlaybackStatus {
    pub fn code(&self) -> i64 {
        match self {
            PlaybackStatus::Stop => 0,
            PlaybackStatus::Play => 1,
            PlaybackStatus::Pause => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PlaybackStatus::Stop),
            1 => Some(PlaybackStatus::Play),
            2 => Some(PlaybackStatus::Pause),
            _ => None,
        }
    }
}

impl_code_serde!(PlaybackStatus, "playback status");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(serde_json::to_value(PlaybackStatus::Play).unwrap(), serde_json::json!(1));
        assert_eq!(
            serde_json::from_value::<PlaybackStatus>(serde_json::json!(2)).unwrap(),
            PlaybackStatus::Pause
        );
        assert!(serde_json::from_value::<PlaybackStatus>(serde_json::json!(3)).is_err());
        assert_eq!(PlaybackStatus::default(), PlaybackStatus::Stop);
    }
}
