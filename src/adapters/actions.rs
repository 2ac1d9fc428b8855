//! Site-side handlers for host-issued actions
//!
//! Every handler has a default that reports the action as unsupported, so a
//! site only implements what its page can actually do.

use crate::data::{LoopMode, PlaylistInfo, PlaylistOrdering, ShowKind};
use crate::error::AdapterError;

fn unsupported<T>(name: &str) -> Result<T, AdapterError> {
    Err(AdapterError::Unsupported(name.to_string()))
}

/// Player controls of a site
pub trait PlayerActions: Send + Sync {
    fn play(&mut self) -> Result<(), AdapterError> {
        unsupported("actionPlay")
    }

    fn pause(&mut self) -> Result<(), AdapterError> {
        unsupported("actionPause")
    }

    fn stop(&mut self) -> Result<(), AdapterError> {
        unsupported("actionStop")
    }

    fn next(&mut self) -> Result<(), AdapterError> {
        unsupported("actionNext")
    }

    fn previous(&mut self) -> Result<(), AdapterError> {
        unsupported("actionPrevious")
    }

    fn repeat(&mut self, _mode: LoopMode) -> Result<(), AdapterError> {
        unsupported("actionRepeat")
    }

    /// Set the volume, 0.0 to 1.0
    fn volume(&mut self, _level: f64) -> Result<(), AdapterError> {
        unsupported("actionVolume")
    }

    fn toggle_shuffle(&mut self) -> Result<(), AdapterError> {
        unsupported("actionToggleShuffle")
    }

    fn toggle_like(&mut self) -> Result<(), AdapterError> {
        unsupported("actionToggleLike")
    }

    /// Jump to an absolute position in microseconds
    fn track_position(&mut self, _position: i64) -> Result<(), AdapterError> {
        unsupported("actionTrackPosition")
    }

    fn search(&mut self, _text: &str) -> Result<(), AdapterError> {
        unsupported("actionSearch")
    }

    fn show(&mut self, _kind: ShowKind, _id: &str) -> Result<(), AdapterError> {
        unsupported("actionShow")
    }
}

/// Playlist browsing of a site
pub trait PlaylistActions: Send + Sync {
    fn get_playlists(
        &mut self,
        _index: u32,
        _max_count: u32,
        _order: PlaylistOrdering,
        _reverse_order: bool,
    ) -> Result<Vec<PlaylistInfo>, AdapterError> {
        unsupported("actionGetPlaylists")
    }

    fn activate_playlist(&mut self, _id: &str) -> Result<(), AdapterError> {
        unsupported("actionActivatePlaylist")
    }
}

/// Track list editing of a site
pub trait TracklistActions: Send + Sync {
    fn go_to(&mut self, _track_id: &str) -> Result<(), AdapterError> {
        unsupported("actionGoTo")
    }

    fn add_track(&mut self, _uri: &str, _after_track: &str, _set_as_current: bool) -> Result<(), AdapterError> {
        unsupported("actionAddTrack")
    }

    fn remove_track(&mut self, _track_id: &str) -> Result<(), AdapterError> {
        unsupported("actionRemoveTrack")
    }
}

/// A site that supports no actions at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NullActions;

impl PlayerActions for NullActions {}

impl PlaylistActions for NullActions {}

impl TracklistActions for NullActions {}
