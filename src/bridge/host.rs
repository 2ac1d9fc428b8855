//! Host-side helpers
//!
//! A host written in Rust uses these to route the bridge's outbound traffic
//! by identifier and to build inbound commands.

use serde_json::{json, Value};

use crate::bridge::changeset::ChangeSet;
use crate::bridge::codec::EnvelopeCodec;
use crate::bridge::envelope::CommandEnvelope;
use crate::bridge::tracker::PROPERTIES_CHANGED;
use crate::data::{Action, LoopMode, ObjectType, PlaylistInfo, ShowKind};
use crate::error::BridgeError;

/// Signal emitted when the position jumped
pub const SEEKED: &str = "seeked";

/// Signal emitted when a non-active playlist changed
pub const PLAYLIST_CHANGED: &str = "PlaylistChanged";

/// Signal emitted when the whole track list was replaced
pub const TRACK_LIST_REPLACED: &str = "TrackListReplaced";

/// An outbound message, routed by action and identifier
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    PropertiesChanged {
        object_type: ObjectType,
        changes: ChangeSet,
    },
    Seeked {
        position: i64,
    },
    PlaylistChanged(PlaylistInfo),
    TrackListReplaced {
        tracks: Vec<String>,
        current: Option<String>,
    },
    Warning {
        object_type: ObjectType,
        text: String,
    },
    Debug {
        object_type: ObjectType,
        text: String,
    },
    /// Any other call to a host-side function
    Call(CommandEnvelope),
    /// Any other signal
    Signal(CommandEnvelope),
}

impl HostEvent {
    /// Decode and route one outbound message
    pub fn decode(message: &str) -> Result<HostEvent, BridgeError> {
        let envelope = EnvelopeCodec::new().decode(message)?;
        Self::from_envelope(envelope)
    }

    pub fn from_envelope(envelope: CommandEnvelope) -> Result<HostEvent, BridgeError> {
        let parameter = envelope.parameter.clone().unwrap_or(Value::Null);

        let event = match (envelope.action, envelope.identifier.as_str()) {
            (Action::SendSignal, PROPERTIES_CHANGED) => HostEvent::PropertiesChanged {
                object_type: envelope.object_type,
                changes: parse(PROPERTIES_CHANGED, parameter)?,
            },
            (Action::SendSignal, SEEKED) => HostEvent::Seeked {
                position: parse(SEEKED, parameter)?,
            },
            (Action::SendSignal, PLAYLIST_CHANGED) => {
                HostEvent::PlaylistChanged(parse(PLAYLIST_CHANGED, parameter)?)
            }
            (Action::SendSignal, TRACK_LIST_REPLACED) => {
                let (tracks, current) = parse(TRACK_LIST_REPLACED, parameter)?;
                HostEvent::TrackListReplaced { tracks, current }
            }
            (Action::SendSignal, _) => HostEvent::Signal(envelope),
            (Action::CallFunction, "warning") => HostEvent::Warning {
                object_type: envelope.object_type,
                text: text_of(parameter),
            },
            (Action::CallFunction, "debug") => HostEvent::Debug {
                object_type: envelope.object_type,
                text: text_of(parameter),
            },
            _ => HostEvent::Call(envelope),
        };
        Ok(event)
    }

    /// Whether this event is diagnostic output rather than player state
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, HostEvent::Warning { .. } | HostEvent::Debug { .. })
    }
}

fn parse<T: serde::de::DeserializeOwned>(name: &str, value: Value) -> Result<T, BridgeError> {
    serde_json::from_value(value).map_err(|e| BridgeError::InvalidParameter(format!("{}: {}", name, e)))
}

fn text_of(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// The player action vocabulary a host can invoke
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerAction {
    Play,
    Pause,
    Stop,
    Next,
    Previous,
    Repeat(LoopMode),
    Volume(f64),
    ToggleShuffle,
    ToggleLike,
    /// Absolute position in microseconds
    TrackPosition(i64),
    Search(String),
    Show(ShowKind, String),
}

impl PlayerAction {
    /// Function name on the player object
    pub fn identifier(&self) -> &'static str {
        match self {
            PlayerAction::Play => "actionPlay",
            PlayerAction::Pause => "actionPause",
            PlayerAction::Stop => "actionStop",
            PlayerAction::Next => "actionNext",
            PlayerAction::Previous => "actionPrevious",
            PlayerAction::Repeat(_) => "actionRepeat",
            PlayerAction::Volume(_) => "actionVolume",
            PlayerAction::ToggleShuffle => "actionToggleShuffle",
            PlayerAction::ToggleLike => "actionToggleLike",
            PlayerAction::TrackPosition(_) => "actionTrackPosition",
            PlayerAction::Search(_) => "actionSearch",
            PlayerAction::Show(_, _) => "actionShow",
        }
    }

    pub fn parameter(&self) -> Option<Value> {
        match self {
            PlayerAction::Repeat(mode) => Some(json!(mode)),
            PlayerAction::Volume(level) => Some(json!(level)),
            PlayerAction::TrackPosition(position) => Some(json!(position)),
            PlayerAction::Search(text) => Some(json!(text)),
            PlayerAction::Show(kind, id) => Some(json!([kind, id])),
            _ => None,
        }
    }

    pub fn to_envelope(&self) -> CommandEnvelope {
        CommandEnvelope::call_function(ObjectType::Player, self.identifier(), self.parameter())
    }
}

/// Builds encoded inbound commands
#[derive(Debug, Clone, Copy, Default)]
pub struct HostCommand {
    codec: EnvelopeCodec,
}

impl HostCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_property(&self, object_type: ObjectType, name: &str) -> Result<String, BridgeError> {
        self.codec.encode(&CommandEnvelope::get_property(object_type, name))
    }

    pub fn set_property(&self, object_type: ObjectType, name: &str, value: Value) -> Result<String, BridgeError> {
        self.codec.encode(&CommandEnvelope::set_property(object_type, name, value))
    }

    pub fn call(&self, object_type: ObjectType, name: &str, parameter: Option<Value>) -> Result<String, BridgeError> {
        self.codec.encode(&CommandEnvelope::call_function(object_type, name, parameter))
    }

    pub fn player_action(&self, action: &PlayerAction) -> Result<String, BridgeError> {
        self.codec.encode(&action.to_envelope())
    }

    /// Decode the bridge's reply to a command
    pub fn decode_result(&self, reply: &str) -> Result<Value, BridgeError> {
        self.codec.decode_result(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(envelope: CommandEnvelope) -> String {
        EnvelopeCodec::new().encode(&envelope).unwrap()
    }

    #[test]
    fn test_routes_signals() {
        let message = encode(CommandEnvelope::signal(ObjectType::Player, "seeked", Some(json!(4_000_000))));
        assert_eq!(HostEvent::decode(&message).unwrap(), HostEvent::Seeked { position: 4_000_000 });

        let message = encode(CommandEnvelope::signal(
            ObjectType::Player,
            "propertiesChanged",
            Some(json!({"playbackStatus": 1, "volume": 0.5})),
        ));
        match HostEvent::decode(&message).unwrap() {
            HostEvent::PropertiesChanged { object_type, changes } => {
                assert_eq!(object_type, ObjectType::Player);
                assert_eq!(changes.names(), vec!["playbackStatus", "volume"]);
            }
            other => panic!("unexpected event {:?}", other),
        }

        let message = encode(CommandEnvelope::signal(
            ObjectType::Tracklist,
            "TrackListReplaced",
            Some(json!([["/t/1", "/t/2"], "/t/1"])),
        ));
        assert_eq!(
            HostEvent::decode(&message).unwrap(),
            HostEvent::TrackListReplaced {
                tracks: vec!["/t/1".to_string(), "/t/2".to_string()],
                current: Some("/t/1".to_string()),
            }
        );
    }

    #[test]
    fn test_routes_diagnostics_by_identifier() {
        let message = encode(CommandEnvelope::call_function(ObjectType::Player, "warning", Some(json!("careful"))));
        let event = HostEvent::decode(&message).unwrap();
        assert!(event.is_diagnostic());
        assert_eq!(
            event,
            HostEvent::Warning {
                object_type: ObjectType::Player,
                text: "careful".to_string()
            }
        );

        let message = encode(CommandEnvelope::call_function(ObjectType::Api, "ping", Some(json!("Hey!"))));
        assert!(matches!(HostEvent::decode(&message).unwrap(), HostEvent::Call(_)));
    }

    #[test]
    fn test_player_action_envelopes() {
        let show = PlayerAction::Show(ShowKind::Album, "42".to_string()).to_envelope();
        assert_eq!(show.identifier, "actionShow");
        assert_eq!(show.parameter, Some(json!(["album", "42"])));
        assert_eq!(show.arguments().len(), 2);

        let repeat = PlayerAction::Repeat(LoopMode::Track).to_envelope();
        assert_eq!(repeat.parameter, Some(json!(2)));
        assert_eq!(PlayerAction::Play.to_envelope().parameter, None);
    }

    #[test]
    fn test_malformed_signal_payload() {
        let message = encode(CommandEnvelope::signal(ObjectType::Player, "seeked", Some(json!("soon"))));
        assert!(matches!(HostEvent::decode(&message), Err(BridgeError::InvalidParameter(_))));
    }
}
