use delegate::delegate;
use log::debug;
use once_cell::sync::Lazy;
use serde_json::json;

use crate::adapters::PlaylistActions;
use crate::bridge::changeset::ChangeSet;
use crate::bridge::host::PLAYLIST_CHANGED;
use crate::bridge::object::{common_operations, ObservableObject};
use crate::bridge::operations::{parse_value, OperationTable};
use crate::bridge::tracker::ChangeTracker;
use crate::bridge::transport::SignalSender;
use crate::data::{ObjectType, PlaylistInfo, PlaylistOrdering};

/// Playlists of a site (org.mpris.MediaPlayer2.Playlists)
pub struct Playlist {
    tracker: ChangeTracker,
    actions: Box<dyn PlaylistActions>,
    count: u32,
    orderings: Vec<PlaylistOrdering>,
    active_playlist: Option<PlaylistInfo>,
}

impl Playlist {
    pub fn new(signals: SignalSender, actions: Box<dyn PlaylistActions>) -> Self {
        Self {
            tracker: ChangeTracker::new(ObjectType::Playlist, signals),
            actions,
            count: 0,
            orderings: vec![PlaylistOrdering::default()],
            active_playlist: None,
        }
    }

    delegate! {
        to self.tracker {
            pub fn object_type(&self) -> ObjectType;
            pub fn changes(&self) -> &ChangeSet;
            pub fn warning(&self, text: &str);
            pub fn debug(&self, text: &str);
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Number of playlists the site offers
    pub fn set_count(&mut self, value: u32) -> bool {
        self.tracker.update("count", &mut self.count, value)
    }

    pub fn orderings(&self) -> &[PlaylistOrdering] {
        &self.orderings
    }

    pub fn set_orderings(&mut self, value: Vec<PlaylistOrdering>) -> bool {
        self.tracker.update("orderings", &mut self.orderings, value)
    }

    pub fn active_playlist(&self) -> Option<&PlaylistInfo> {
        self.active_playlist.as_ref()
    }

    /// Replace the active playlist
    ///
    /// A value with the same id, name and icon as the current one is not a
    /// change, even if it was built separately.
    pub fn set_active_playlist(&mut self, value: Option<PlaylistInfo>) -> bool {
        self.tracker.update("activePlaylist", &mut self.active_playlist, value)
    }

    /// Announce a change of a playlist that is not the active one
    ///
    /// The active playlist is skipped; its changes go out through
    /// `propertiesChanged` instead. Returns true if the signal was sent.
    pub fn send_playlist_changed(&self, playlist: &PlaylistInfo) -> bool {
        if self.active_playlist.as_ref() == Some(playlist) {
            debug!("{} is active, its changes go out as property changes", playlist.id);
            return false;
        }
        self.tracker.send_signal(PLAYLIST_CHANGED, Some(json!(playlist)));
        true
    }

    pub fn send_property_change(&mut self) -> bool {
        self.tracker.send_property_change()
    }

    pub fn set_actions(&mut self, actions: Box<dyn PlaylistActions>) {
        self.actions = actions;
    }
}

impl ObservableObject for Playlist {
    fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut ChangeTracker {
        &mut self.tracker
    }

    fn operations() -> &'static OperationTable<Self> {
        &PLAYLIST_OPERATIONS
    }
}

static PLAYLIST_OPERATIONS: Lazy<OperationTable<Playlist>> = Lazy::new(|| {
    common_operations(OperationTable::<Playlist>::new("playlist"))
        .property("count", |p| json!(p.count), |p, value| {
            p.set_count(parse_value("count", value)?);
            Ok(())
        })
        .property("orderings", |p| json!(p.orderings), |p, value| {
            p.set_orderings(parse_value("orderings", value)?);
            Ok(())
        })
        .property("activePlaylist", |p| json!(p.active_playlist), |p, value| {
            p.set_active_playlist(parse_value("activePlaylist", value)?);
            Ok(())
        })
        .function("sendPropertyChange", |p, _| Ok(json!(p.send_property_change())))
        .function("sendPlaylistChanged", |p, args| {
            let playlist: PlaylistInfo = args.get(0)?;
            p.send_playlist_changed(&playlist);
            Ok(serde_json::Value::Null)
        })
        .function("actionGetPlaylists", |p, args| {
            let index: u32 = args.optional(0)?.unwrap_or(0);
            let max_count: u32 = args.optional(1)?.unwrap_or(p.count);
            let order: PlaylistOrdering = args.optional(2)?.unwrap_or_default();
            let reverse_order: bool = args.optional(3)?.unwrap_or(false);
            let result = p.actions.get_playlists(index, max_count, order, reverse_order);
            p.tracker.report_action("actionGetPlaylists", result)
        })
        .function("actionActivatePlaylist", |p, args| {
            let id: String = args.get(0)?;
            let result = p.actions.activate_playlist(&id);
            p.tracker.report_action("actionActivatePlaylist", result)
        })
});
