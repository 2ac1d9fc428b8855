use delegate::delegate;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::adapters::TracklistActions;
use crate::bridge::changeset::ChangeSet;
use crate::bridge::host::TRACK_LIST_REPLACED;
use crate::bridge::object::{common_operations, ObservableObject};
use crate::bridge::operations::{parse_value, Arguments, OperationTable};
use crate::bridge::tracker::ChangeTracker;
use crate::bridge::transport::SignalSender;
use crate::data::{ObjectType, TrackEntry};
use crate::error::DispatchError;

/// The current track list of a site (org.mpris.MediaPlayer2.TrackList)
///
/// The list is emitted wholesale whenever it is replaced.
pub struct Tracklist {
    tracker: ChangeTracker,
    actions: Box<dyn TracklistActions>,
    can_edit_tracks: bool,
    tracks: Vec<TrackEntry>,
}

impl Tracklist {
    pub fn new(signals: SignalSender, actions: Box<dyn TracklistActions>) -> Self {
        Self {
            tracker: ChangeTracker::new(ObjectType::Tracklist, signals),
            actions,
            can_edit_tracks: false,
            tracks: Vec::new(),
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

    pub fn can_edit_tracks(&self) -> bool {
        self.can_edit_tracks
    }

    pub fn set_can_edit_tracks(&mut self, value: bool) -> bool {
        self.tracker.update("canEditTracks", &mut self.can_edit_tracks, value)
    }

    pub fn tracks(&self) -> &[TrackEntry] {
        &self.tracks
    }

    /// Identifiers of the current tracks, in order
    pub fn track_ids(&self) -> Vec<String> {
        self.tracks.iter().map(|track| track.id.clone()).collect()
    }

    pub fn set_tracks(&mut self, value: Vec<TrackEntry>) -> bool {
        self.tracker.update("tracks", &mut self.tracks, value)
    }

    /// Metadata of the requested tracks; unknown ids are skipped
    pub fn tracks_metadata(&self, ids: &[String]) -> Vec<TrackEntry> {
        ids.iter()
            .filter_map(|id| self.tracks.iter().find(|track| &track.id == id))
            .cloned()
            .collect()
    }

    /// Replace the track list and announce it with `TrackListReplaced`
    ///
    /// The signal carries the new list, so `tracks` is not flushed again
    /// through `propertiesChanged`.
    pub fn send_track_list_replaced(&mut self, tracks: Vec<TrackEntry>, current: Option<&str>) {
        self.tracks = tracks;
        self.tracker.changes_mut().remove("tracks");
        self.tracker
            .send_signal(TRACK_LIST_REPLACED, Some(json!([self.track_ids(), current])));
    }

    pub fn send_property_change(&mut self) -> bool {
        self.tracker.send_property_change()
    }

    pub fn set_actions(&mut self, actions: Box<dyn TracklistActions>) {
        self.actions = actions;
    }
}

impl ObservableObject for Tracklist {
    fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut ChangeTracker {
        &mut self.tracker
    }

    fn operations() -> &'static OperationTable<Self> {
        &TRACKLIST_OPERATIONS
    }
}

/// Track ids from either spread arguments or one list argument
fn requested_ids(arguments: &Arguments) -> Result<Vec<String>, DispatchError> {
    let mut ids = Vec::new();
    for value in arguments.values() {
        match value {
            Value::Array(_) => ids.extend(parse_value::<Vec<String>>("actionGetTracksMetadata", value.clone())?),
            other => ids.push(parse_value::<String>("actionGetTracksMetadata", other.clone())?),
        }
    }
    Ok(ids)
}

static TRACKLIST_OPERATIONS: Lazy<OperationTable<Tracklist>> = Lazy::new(|| {
    common_operations(OperationTable::<Tracklist>::new("tracklist"))
        .property("canEditTracks", |t| json!(t.can_edit_tracks), |t, value| {
            t.set_can_edit_tracks(parse_value("canEditTracks", value)?);
            Ok(())
        })
        .property("tracks", |t| json!(t.tracks), |t, value| {
            t.set_tracks(parse_value("tracks", value)?);
            Ok(())
        })
        .function("sendPropertyChange", |t, _| Ok(json!(t.send_property_change())))
        .function("sendTrackListReplaced", |t, args| {
            let tracks: Vec<TrackEntry> = args.get(0)?;
            let current: Option<String> = args.optional(1)?;
            t.send_track_list_replaced(tracks, current.as_deref());
            Ok(Value::Null)
        })
        .function("actionGetTracksMetadata", |t, args| {
            let ids = requested_ids(args)?;
            Ok(json!(t.tracks_metadata(&ids)))
        })
        .function("actionGoTo", |t, args| {
            let id: String = args.get(0)?;
            let result = t.actions.go_to(&id);
            t.tracker.report_action("actionGoTo", result)
        })
        .function("actionAddTrack", |t, args| {
            let uri: String = args.get(0)?;
            let after_track: String = args.optional(1)?.unwrap_or_default();
            let set_as_current: bool = args.optional(2)?.unwrap_or(false);
            let result = t.actions.add_track(&uri, &after_track, set_as_current);
            t.tracker.report_action("actionAddTrack", result)
        })
        .function("actionRemoveTrack", |t, args| {
            let id: String = args.get(0)?;
            let result = t.actions.remove_track(&id);
            t.tracker.report_action("actionRemoveTrack", result)
        })
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::NullActions;
    use crate::bridge::codec::EnvelopeCodec;
    use crate::bridge::object::BridgeObject;
    use crate::bridge::transport::ChannelTransport;
    use crate::data::Metadata;
    use std::sync::Arc;

    fn tracklist() -> (Tracklist, crossbeam::channel::Receiver<String>) {
        let (transport, receiver) = ChannelTransport::new();
        (Tracklist::new(SignalSender::new(Arc::new(transport)), Box::new(NullActions)), receiver)
    }

    fn entry(id: &str, track: &str) -> TrackEntry {
        let mut metadata = Metadata::new();
        metadata.track = track.to_string();
        TrackEntry::with_metadata(id, metadata)
    }

    #[test]
    fn test_track_list_replaced() {
        let (mut tracklist, receiver) = tracklist();
        tracklist.send_track_list_replaced(vec![entry("/t/1", "One"), entry("/t/2", "Two")], Some("/t/2"));

        let envelope = EnvelopeCodec::new().decode(&receiver.try_recv().unwrap()).unwrap();
        assert_eq!(envelope.identifier, "TrackListReplaced");
        assert_eq!(envelope.parameter, Some(json!([["/t/1", "/t/2"], "/t/2"])));
        assert!(!tracklist.changes().contains("tracks"));
    }

    #[test]
    fn test_replaced_list_is_sent_once() {
        let (mut tracklist, receiver) = tracklist();
        tracklist.set_can_edit_tracks(true);
        tracklist.set_tracks(vec![entry("/t/0", "Zero")]);
        tracklist.send_track_list_replaced(vec![entry("/t/1", "One")], None);
        assert_eq!(tracklist.changes().names(), vec!["canEditTracks"]);

        tracklist.send_property_change();
        let codec = EnvelopeCodec::new();
        let sent: Vec<_> = receiver.try_iter().map(|m| codec.decode(&m).unwrap()).collect();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].identifier, "TrackListReplaced");
        assert_eq!(sent[1].identifier, "propertiesChanged");
        assert_eq!(sent[1].parameter, Some(json!({"canEditTracks": true})));
        assert_eq!(tracklist.track_ids(), vec!["/t/1".to_string()]);
    }

    #[test]
    fn test_track_list_replaced_by_name() {
        let (mut tracklist, receiver) = tracklist();
        let args = Arguments::from_parameter(
            "sendTrackListReplaced",
            Some(json!([[{"id": "/t/1", "metadata": {"track": "One"}}], null])),
        );
        assert_eq!(tracklist.call_function("sendTrackListReplaced", &args), Ok(Value::Null));
        assert_eq!(tracklist.track_ids(), vec!["/t/1".to_string()]);

        let envelope = EnvelopeCodec::new().decode(&receiver.try_recv().unwrap()).unwrap();
        assert_eq!(envelope.parameter, Some(json!([["/t/1"], null])));
    }

    #[test]
    fn test_same_tracks_are_not_a_change() {
        let (mut tracklist, _receiver) = tracklist();
        tracklist.set_tracks(vec![entry("/t/1", "One")]);
        tracklist.send_property_change();
        assert!(!tracklist.set_tracks(vec![entry("/t/1", "One")]));
        assert!(tracklist.changes().is_empty());
    }

    #[test]
    fn test_tracks_metadata_accepts_spread_and_list() {
        let (mut tracklist, _receiver) = tracklist();
        tracklist.set_tracks(vec![entry("/t/1", "One"), entry("/t/2", "Two")]);

        let spread = Arguments::from_parameter("actionGetTracksMetadata", Some(json!(["/t/2", "/t/9"])));
        let result = tracklist.call_function("actionGetTracksMetadata", &spread).unwrap();
        assert_eq!(result.as_array().map(|a| a.len()), Some(1));
        assert_eq!(result[0]["metadata"]["track"], json!("Two"));

        let nested = Arguments::new("actionGetTracksMetadata", vec![json!(["/t/1", "/t/2"])]);
        let result = tracklist.call_function("actionGetTracksMetadata", &nested).unwrap();
        assert_eq!(result.as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_editing_without_support() {
        let (mut tracklist, receiver) = tracklist();
        let args = Arguments::from_parameter("actionRemoveTrack", Some(json!("/t/1")));
        assert!(tracklist.call_function("actionRemoveTrack", &args).is_err());

        let warning = EnvelopeCodec::new().decode(&receiver.try_recv().unwrap()).unwrap();
        assert_eq!(warning.parameter, Some(json!("Function actionRemoveTrack is not available")));
    }
}
