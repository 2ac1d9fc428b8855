use delegate::delegate;
use enumflags2::{bitflags, BitFlags};
use log::{debug, trace, warn};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::adapters::PlayerActions;
use crate::bridge::changeset::ChangeSet;
use crate::bridge::object::{common_operations, ObservableObject};
use crate::bridge::operations::{parse_value, OperationTable};
use crate::bridge::tracker::ChangeTracker;
use crate::bridge::transport::SignalSender;
use crate::data::{LoopMode, Metadata, ObjectType, PlaybackStatus, ShowKind};
use crate::error::DispatchError;

/// Position jump, in microseconds, above which a position update counts as a seek
pub const DEFAULT_SEEK_THRESHOLD: u64 = 2_000_000;

/// Fields of the metadata group, tracked individually
#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MetadataField {
    Url = 0b0000_0001,
    Artists = 0b0000_0010,
    Track = 0b0000_0100,
    Album = 0b0000_1000,
    ArtUrl = 0b0001_0000,
    TrackLength = 0b0010_0000,
}

/// The media player of a site (org.mpris.MediaPlayer2.Player)
///
/// Every field except the track position is change-tracked. Position updates
/// are never reported as property changes; a jump larger than the seek
/// threshold emits a `seeked` signal instead. Metadata fields are dirty-flagged
/// one by one and flushed as a single `metadata` entry.
pub struct Player {
    tracker: ChangeTracker,
    actions: Box<dyn PlayerActions>,
    seek_threshold: u64,

    ready: bool,

    can_control: bool,
    can_play: bool,
    can_pause: bool,
    can_seek: bool,
    can_go_next: bool,
    can_go_previous: bool,
    can_shuffle: bool,
    can_repeat: bool,
    can_like: bool,

    playback_status: PlaybackStatus,
    repeat: LoopMode,
    volume: f64,
    shuffle: bool,
    like: bool,
    track_position: i64,

    metadata: Metadata,
    metadata_dirty: BitFlags<MetadataField>,
}

/// Getter and change-tracked setter for plain fields
macro_rules! tracked_fields {
    ($($field:ident, $setter:ident, $name:literal: $type:ty;)*) => {
        impl Player {
            $(
                pub fn $field(&self) -> $type {
                    self.$field
                }

                pub fn $setter(&mut self, value: $type) -> bool {
                    self.tracker.update($name, &mut self.$field, value)
                }
            )*
        }
    };
}

tracked_fields! {
    ready, set_ready, "ready": bool;
    can_control, set_can_control, "canControl": bool;
    can_play, set_can_play, "canPlay": bool;
    can_pause, set_can_pause, "canPause": bool;
    can_seek, set_can_seek, "canSeek": bool;
    can_go_next, set_can_go_next, "canGoNext": bool;
    can_go_previous, set_can_go_previous, "canGoPrevious": bool;
    can_shuffle, set_can_shuffle, "canShuffle": bool;
    can_repeat, set_can_repeat, "canRepeat": bool;
    can_like, set_can_like, "canLike": bool;
    playback_status, set_playback_status, "playbackStatus": PlaybackStatus;
    repeat, set_repeat, "repeat": LoopMode;
    shuffle, set_shuffle, "shuffle": bool;
    like, set_like, "like": bool;
}

impl Player {
    pub fn new(signals: SignalSender, actions: Box<dyn PlayerActions>) -> Self {
        Self {
            tracker: ChangeTracker::new(ObjectType::Player, signals),
            actions,
            seek_threshold: DEFAULT_SEEK_THRESHOLD,
            ready: false,
            can_control: false,
            can_play: false,
            can_pause: false,
            can_seek: false,
            can_go_next: false,
            can_go_previous: false,
            can_shuffle: false,
            can_repeat: false,
            can_like: false,
            playback_status: PlaybackStatus::default(),
            repeat: LoopMode::default(),
            volume: 0.5,
            shuffle: false,
            like: false,
            track_position: 0,
            metadata: Metadata::default(),
            metadata_dirty: BitFlags::empty(),
        }
    }

    pub fn with_seek_threshold(mut self, threshold: u64) -> Self {
        self.seek_threshold = threshold;
        self
    }

    pub fn seek_threshold(&self) -> u64 {
        self.seek_threshold
    }

    delegate! {
        to self.tracker {
            pub fn object_type(&self) -> ObjectType;
            pub fn changes(&self) -> &ChangeSet;
            pub fn send_signal(&self, name: &str, parameter: Option<serde_json::Value>);
            pub fn warning(&self, text: &str);
            pub fn debug(&self, text: &str);
            pub fn ping(&self);
        }
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Set the volume, conventionally 0.0 to 1.0
    pub fn set_volume(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            warn!("Ignoring volume {}", value);
            return false;
        }
        self.tracker.update("volume", &mut self.volume, value)
    }

    pub fn track_position(&self) -> i64 {
        self.track_position
    }

    /// Update the playback position in microseconds
    ///
    /// Returns true if the change was reported as a seek.
    pub fn set_track_position(&mut self, value: i64) -> bool {
        if value == self.track_position {
            return false;
        }
        let seeked = self.track_position.abs_diff(value) > self.seek_threshold;
        self.track_position = value;

        if seeked {
            debug!("Position jumped to {}", value);
            self.tracker.send_signal("seeked", Some(json!(value)));
        } else {
            trace!("Position {}", value);
        }
        seeked
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Metadata fields changed since the last flush
    pub fn pending_metadata(&self) -> BitFlags<MetadataField> {
        self.metadata_dirty
    }

    pub fn set_url(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        Self::mark(&mut self.metadata_dirty, MetadataField::Url, &mut self.metadata.url, value)
    }

    pub fn set_artists(&mut self, value: Vec<String>) -> bool {
        Self::mark(&mut self.metadata_dirty, MetadataField::Artists, &mut self.metadata.artists, value)
    }

    /// Set a single artist; an empty name clears the artists
    pub fn set_artist(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() {
            self.set_artists(Vec::new())
        } else {
            self.set_artists(vec![value])
        }
    }

    pub fn set_track(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        Self::mark(&mut self.metadata_dirty, MetadataField::Track, &mut self.metadata.track, value)
    }

    pub fn set_album(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        Self::mark(&mut self.metadata_dirty, MetadataField::Album, &mut self.metadata.album, value)
    }

    pub fn set_art_url(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        Self::mark(&mut self.metadata_dirty, MetadataField::ArtUrl, &mut self.metadata.art_url, value)
    }

    /// Track length in microseconds
    pub fn set_track_length(&mut self, value: i64) -> bool {
        Self::mark(
            &mut self.metadata_dirty,
            MetadataField::TrackLength,
            &mut self.metadata.track_length,
            value,
        )
    }

    /// Replace all metadata fields at once
    pub fn set_metadata(&mut self, metadata: Metadata) -> bool {
        let Metadata {
            url,
            artists,
            track,
            album,
            art_url,
            track_length,
        } = metadata;

        // no short-circuit: every field has to be applied
        let mut changed = self.set_url(url);
        changed |= self.set_artists(artists);
        changed |= self.set_track(track);
        changed |= self.set_album(album);
        changed |= self.set_art_url(art_url);
        changed |= self.set_track_length(track_length);
        changed
    }

    /// Apply a partial metadata record from the page
    ///
    /// Keys missing from `value` keep their current contents.
    pub fn merge_metadata(&mut self, value: Value) -> Result<bool, DispatchError> {
        let merged = match value {
            Value::Object(fields) => {
                let mut current = json!(self.metadata);
                if let Value::Object(map) = &mut current {
                    map.extend(fields);
                }
                current
            }
            other => other,
        };
        Ok(self.set_metadata(parse_value("metadata", merged)?))
    }

    fn mark<V: PartialEq>(dirty: &mut BitFlags<MetadataField>, field: MetadataField, slot: &mut V, value: V) -> bool {
        if *slot == value {
            return false;
        }
        *slot = value;
        dirty.insert(field);
        true
    }

    /// Flush pending changes; the metadata group is added as one entry first
    pub fn send_property_change(&mut self) -> bool {
        ObservableObject::flush_changes(self)
    }

    /// Replace the site action handlers
    pub fn set_actions(&mut self, actions: Box<dyn PlayerActions>) {
        self.actions = actions;
    }
}

impl ObservableObject for Player {
    fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut ChangeTracker {
        &mut self.tracker
    }

    fn operations() -> &'static OperationTable<Self> {
        &PLAYER_OPERATIONS
    }

    fn flush_changes(&mut self) -> bool {
        if !self.metadata_dirty.is_empty() {
            trace!("Metadata fields changed: {:?}", self.metadata_dirty);
            self.tracker.record("metadata", &self.metadata);
            self.metadata_dirty = BitFlags::empty();
        }
        self.tracker.send_property_change()
    }
}

/// Setter closure that decodes the parameter and calls a typed setter
macro_rules! setter {
    ($method:ident, $name:literal, $type:ty) => {
        |player: &mut Player, value| {
            player.$method(parse_value::<$type>($name, value)?);
            Ok(())
        }
    };
}

static PLAYER_OPERATIONS: Lazy<OperationTable<Player>> = Lazy::new(|| {
    common_operations(OperationTable::<Player>::new("player"))
        .property("ready", |p| json!(p.ready), setter!(set_ready, "ready", bool))
        .property("canControl", |p| json!(p.can_control), setter!(set_can_control, "canControl", bool))
        .property("canPlay", |p| json!(p.can_play), setter!(set_can_play, "canPlay", bool))
        .property("canPause", |p| json!(p.can_pause), setter!(set_can_pause, "canPause", bool))
        .property("canSeek", |p| json!(p.can_seek), setter!(set_can_seek, "canSeek", bool))
        .property("canGoNext", |p| json!(p.can_go_next), setter!(set_can_go_next, "canGoNext", bool))
        .property("canGoPrevious", |p| json!(p.can_go_previous), setter!(set_can_go_previous, "canGoPrevious", bool))
        .property("canShuffle", |p| json!(p.can_shuffle), setter!(set_can_shuffle, "canShuffle", bool))
        .property("canRepeat", |p| json!(p.can_repeat), setter!(set_can_repeat, "canRepeat", bool))
        .property("canLike", |p| json!(p.can_like), setter!(set_can_like, "canLike", bool))
        .property("playbackStatus", |p| json!(p.playback_status), setter!(set_playback_status, "playbackStatus", PlaybackStatus))
        .property("repeat", |p| json!(p.repeat), setter!(set_repeat, "repeat", LoopMode))
        .property("volume", |p| json!(p.volume), setter!(set_volume, "volume", f64))
        .property("shuffle", |p| json!(p.shuffle), setter!(set_shuffle, "shuffle", bool))
        .property("like", |p| json!(p.like), setter!(set_like, "like", bool))
        .property("trackPosition", |p| json!(p.track_position), setter!(set_track_position, "trackPosition", i64))
        .property("metadata", |p| json!(p.metadata), |player, value| {
            player.merge_metadata(value)?;
            Ok(())
        })
        .property("url", |p| json!(p.metadata.url), setter!(set_url, "url", String))
        .property("artists", |p| json!(p.metadata.artists), |player, value| {
            // a single name is accepted as well
            let artists: Metadata = parse_value("artists", json!({ "artists": value }))?;
            player.set_artists(artists.artists);
            Ok(())
        })
        .property("track", |p| json!(p.metadata.track), setter!(set_track, "track", String))
        .property("album", |p| json!(p.metadata.album), setter!(set_album, "album", String))
        .property("artUrl", |p| json!(p.metadata.art_url), setter!(set_art_url, "artUrl", String))
        .property("trackLength", |p| json!(p.metadata.track_length), setter!(set_track_length, "trackLength", i64))
        .read_only("pendingChanges", |p| p.tracker.changes().to_value())
        .function("sendPropertyChange", |p, _| Ok(json!(p.send_property_change())))
        .function("actionPlay", |p, _| {
            let result = p.actions.play();
            p.tracker.report_action("actionPlay", result)
        })
        .function("actionPause", |p, _| {
            let result = p.actions.pause();
            p.tracker.report_action("actionPause", result)
        })
        .function("actionStop", |p, _| {
            let result = p.actions.stop();
            p.tracker.report_action("actionStop", result)
        })
        .function("actionNext", |p, _| {
            let result = p.actions.next();
            p.tracker.report_action("actionNext", result)
        })
        .function("actionPrevious", |p, _| {
            let result = p.actions.previous();
            p.tracker.report_action("actionPrevious", result)
        })
        .function("actionRepeat", |p, args| {
            let mode: LoopMode = args.get(0)?;
            let result = p.actions.repeat(mode);
            p.tracker.report_action("actionRepeat", result)
        })
        .function("actionVolume", |p, args| {
            let level: f64 = args.get(0)?;
            let result = p.actions.volume(level);
            p.tracker.report_action("actionVolume", result)
        })
        .function("actionToggleShuffle", |p, _| {
            let result = p.actions.toggle_shuffle();
            p.tracker.report_action("actionToggleShuffle", result)
        })
        .function("actionToggleLike", |p, _| {
            let result = p.actions.toggle_like();
            p.tracker.report_action("actionToggleLike", result)
        })
        .function("actionTrackPosition", |p, args| {
            let position: i64 = args.get(0)?;
            let result = p.actions.track_position(position);
            p.tracker.report_action("actionTrackPosition", result)
        })
        .function("actionSearch", |p, args| {
            let text: String = args.get(0)?;
            let result = p.actions.search(&text);
            p.tracker.report_action("actionSearch", result)
        })
        .function("actionShow", |p, args| {
            let kind: ShowKind = args.get(0)?;
            let id: String = args.get(1)?;
            let result = p.actions.show(kind, &id);
            p.tracker.report_action("actionShow", result)
        })
});
