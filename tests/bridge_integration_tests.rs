//! End-to-end tests of the bridge: host commands in, signals out

#[path = "common/mod.rs"]
mod common;
use common::*;

use serde_json::json;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use webmusic::adapters::{ExampleAdapter, SiteAdapter};
use webmusic::bridge::{FailureMarker, HostCommand, HostEvent, PlayerAction, Registration, RegistrationPolicy};
use webmusic::config::BridgeConfig;
use webmusic::data::{LoopMode, ObjectType, PlaybackStatus, ShowKind};

fn commands() -> HostCommand {
    HostCommand::new()
}

#[test]
fn test_api_object_is_always_registered() {
    let (bridge, _transport) = setup_bridge(BridgeConfig::default());

    let reply = bridge.receive(&commands().get_property(ObjectType::Api, "version").unwrap());
    assert_eq!(reply, format!("\"{}\"", env!("CARGO_PKG_VERSION")));

    let reply = bridge.receive(&commands().get_property(ObjectType::Api, "objects").unwrap());
    assert_eq!(reply, "[0]");

    let _adapter = ExampleAdapter::install(&bridge).unwrap();
    let reply = bridge.receive(&commands().get_property(ObjectType::Api, "objects").unwrap());
    assert_eq!(reply, "[0,1,2]");
}

#[test]
fn test_ping_pong() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());

    let reply = bridge.receive(&commands().call(ObjectType::Api, "pong", Some(json!("Hey!"))).unwrap());
    assert_eq!(reply, "\"Hey! Let's go!\"");

    let reply = bridge.receive(&commands().call(ObjectType::Api, "ping", None).unwrap());
    assert_eq!(reply, "null");
    let events = transport.events();
    assert!(events.iter().any(|event| matches!(event, HostEvent::Call(envelope) if envelope.identifier == "ping")));
}

#[test]
fn test_property_write_then_read() {
    let (bridge, _transport) = setup_bridge(BridgeConfig::default());
    let _adapter = ExampleAdapter::install(&bridge).unwrap();

    let reply = bridge.receive(&commands().set_property(ObjectType::Player, "playbackStatus", json!(1)).unwrap());
    assert_eq!(reply, "true");

    let reply = bridge.receive(&commands().get_property(ObjectType::Player, "playbackStatus").unwrap());
    assert_eq!(reply, "1");
}

#[test]
fn test_unknown_target_is_safe() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());

    let reply = bridge.receive(&commands().get_property(ObjectType::Player, "volume").unwrap());
    assert_eq!(reply, "false");
    assert_eq!(warnings(&transport.events()), vec!["No object registered for type player".to_string()]);
}

#[test]
fn test_failure_marker_is_configurable() {
    let config = BridgeConfig {
        failure_marker: FailureMarker::Null,
        ..BridgeConfig::default()
    };
    let (bridge, _transport) = setup_bridge(config);

    let reply = bridge.receive(&commands().get_property(ObjectType::Tracklist, "tracks").unwrap());
    assert_eq!(reply, "null");
}

#[test]
fn test_unknown_identifier_and_action() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());
    let _adapter = ExampleAdapter::install(&bridge).unwrap();

    let reply = bridge.receive(&commands().get_property(ObjectType::Player, "colour").unwrap());
    assert_eq!(reply, "false");

    let reply = bridge.receive(r#"{"Type":1,"Action":7,"Identifier":"volume"}"#);
    assert_eq!(reply, "false");

    let reply = bridge.receive(r#"{"Type":1,"Action":3,"Identifier":"seeked"}"#);
    assert_eq!(reply, "false");

    let warnings = warnings(&transport.events());
    assert_eq!(warnings.len(), 3);
    assert_eq!(warnings[0], "Unknown identifier 'colour'");
    assert_eq!(warnings[1], "Can not handle unknown Action: 7");
}

#[test]
fn test_malformed_message_is_dropped() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());

    assert_eq!(bridge.receive("{\"Type\":1"), "false");
    assert_eq!(bridge.receive(""), "false");

    let warnings = warnings(&transport.events());
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|text| text.starts_with("Dropping message")));
}

#[test]
fn test_invalid_setter_value_leaves_state_untouched() {
    let (bridge, _transport) = setup_bridge(BridgeConfig::default());
    let adapter = ExampleAdapter::install(&bridge).unwrap();

    let reply = bridge.receive(&commands().set_property(ObjectType::Player, "repeat", json!("sometimes")).unwrap());
    assert_eq!(reply, "false");
    assert_eq!(adapter.player().read().unwrap().repeat(), LoopMode::None);
    assert!(adapter.player().read().unwrap().changes().is_empty());
}

#[test]
fn test_actions_reach_the_page() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());
    let mut adapter = ExampleAdapter::install(&bridge).unwrap();
    adapter.start().unwrap();
    adapter.update().unwrap();
    transport.take();

    let reply = bridge.receive(&commands().player_action(&PlayerAction::Volume(42.0)).unwrap());
    assert_eq!(reply, "null");
    assert_eq!(adapter.page().lock().unwrap().volume, 42.0);

    let reply = bridge.receive(&commands().player_action(&PlayerAction::Pause).unwrap());
    assert_eq!(reply, "null");

    adapter.update().unwrap();
    let events = transport.state_events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        HostEvent::PropertiesChanged { object_type, changes } => {
            assert_eq!(*object_type, ObjectType::Player);
            assert_eq!(changes.names(), vec!["playbackStatus", "volume"]);
            assert_eq!(changes.get("volume"), Some(&json!(42.0)));
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_unsupported_action_warns_and_fails() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());
    let _adapter = ExampleAdapter::install(&bridge).unwrap();

    let show = PlayerAction::Show(ShowKind::Album, "42".to_string());
    assert_eq!(bridge.receive(&commands().player_action(&show).unwrap()), "false");
    assert_eq!(
        warnings(&transport.events()),
        vec!["Function actionShow is not available".to_string()]
    );
}

#[test]
fn test_first_update_reports_everything() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());
    let mut adapter = ExampleAdapter::install(&bridge).unwrap();
    adapter.start().unwrap();
    adapter.update().unwrap();

    let events = transport.state_events();
    assert_eq!(events.len(), 2);

    match &events[0] {
        HostEvent::PropertiesChanged { object_type, changes } => {
            assert_eq!(*object_type, ObjectType::Player);
            assert_eq!(
                changes.names(),
                vec![
                    "canControl",
                    "canPlay",
                    "canPause",
                    "canSeek",
                    "canGoNext",
                    "canGoPrevious",
                    "canShuffle",
                    "canRepeat",
                    "canLike",
                    "ready",
                    "playbackStatus",
                    "metadata",
                ]
            );
            assert_eq!(changes.get("playbackStatus"), Some(&json!(1)));
            let metadata = changes.get("metadata").unwrap();
            assert_eq!(metadata["artists"], json!(["Artist 1", "Artist 2"]));
            assert_eq!(metadata["track"], json!("Test Track"));
            assert_eq!(metadata["url"], json!("http://webmusic.tiede.org/id/1"));
            assert!(!changes.contains("trackPosition"));
        }
        other => panic!("unexpected event {:?}", other),
    }

    match &events[1] {
        HostEvent::PropertiesChanged { object_type, changes } => {
            assert_eq!(*object_type, ObjectType::Playlist);
            assert_eq!(changes.get("count"), Some(&json!(2)));
            assert_eq!(
                changes.get("activePlaylist"),
                Some(&json!({"id": "/org/webmusic/playlist/1", "name": "Testplaylist", "icon": ""}))
            );
        }
        other => panic!("unexpected event {:?}", other),
    }

    // ordinary playback progress produces no traffic at all
    adapter.update().unwrap();
    assert!(transport.state_events().is_empty());
}

#[test]
fn test_seek_is_reported_once() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());
    let mut adapter = ExampleAdapter::install(&bridge).unwrap();
    adapter.update().unwrap();
    transport.take();

    let reply = bridge.receive(&commands().player_action(&PlayerAction::TrackPosition(60_000_000)).unwrap());
    assert_eq!(reply, "null");

    adapter.update().unwrap();
    assert_eq!(transport.state_events(), vec![HostEvent::Seeked { position: 60_500_000 }]);
}

#[test]
fn test_playlists_are_served_by_the_site() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());
    let mut adapter = ExampleAdapter::install(&bridge).unwrap();
    adapter.update().unwrap();
    transport.take();

    let reply = bridge.receive(&commands().call(ObjectType::Playlist, "actionGetPlaylists", Some(json!([0, 10, "UserDefined", true]))).unwrap());
    let playlists = commands().decode_result(&reply).unwrap();
    assert_eq!(playlists[0]["name"], json!("Testplaylist2"));
    assert_eq!(playlists.as_array().map(|p| p.len()), Some(2));

    let reply = bridge.receive(&commands().call(ObjectType::Playlist, "actionActivatePlaylist", Some(json!("/org/webmusic/playlist/2"))).unwrap());
    assert_eq!(reply, "null");

    adapter.update().unwrap();
    let events = transport.state_events();
    assert!(events.iter().any(|event| matches!(
        event,
        HostEvent::PropertiesChanged { object_type: ObjectType::Playlist, changes } if changes.contains("activePlaylist")
    )));
}

#[test]
fn test_registration_replaces_with_warning() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());
    let adapter = ExampleAdapter::install(&bridge).unwrap();
    transport.take();

    let replacement = Arc::new(RwLock::new(bridge.new_player()));
    assert_eq!(bridge.register(replacement.clone()), Registration::Replaced);
    assert_eq!(warnings(&transport.events()).len(), 1);

    replacement.write().unwrap().set_playback_status(PlaybackStatus::Pause);
    let reply = bridge.receive(&commands().get_property(ObjectType::Player, "playbackStatus").unwrap());
    assert_eq!(reply, "2");
    drop(adapter);
}

#[test]
fn test_registration_can_be_rejected() {
    let config = BridgeConfig {
        registration_policy: RegistrationPolicy::Reject,
        ..BridgeConfig::default()
    };
    let (bridge, transport) = setup_bridge(config);
    let _adapter = ExampleAdapter::install(&bridge).unwrap();
    transport.take();

    let mut other = bridge.new_player();
    other.set_playback_status(PlaybackStatus::Pause);
    assert_eq!(bridge.register(Arc::new(RwLock::new(other))), Registration::Rejected);
    assert_eq!(warnings(&transport.events()).len(), 1);

    let reply = bridge.receive(&commands().get_property(ObjectType::Player, "playbackStatus").unwrap());
    assert_eq!(reply, "0");

    assert!(ExampleAdapter::install(&bridge).is_err());
}

#[test]
fn test_flush_all() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());
    let adapter = ExampleAdapter::install(&bridge).unwrap();

    adapter.player().write().unwrap().set_like(true);
    adapter.playlist().write().unwrap().set_count(5);

    assert_eq!(bridge.flush_all(), 2);
    assert_eq!(transport.state_events().len(), 2);
    assert_eq!(bridge.flush_all(), 0);
}

#[test]
fn test_polling_and_shutdown() {
    let config = BridgeConfig {
        poll_interval_ms: 10,
        ..BridgeConfig::default()
    };
    let (bridge, transport) = setup_bridge(config);
    let adapter = ExampleAdapter::install(&bridge).unwrap();
    let page = adapter.page();
    bridge.start_adapter(Box::new(adapter)).unwrap();

    assert!(wait_for(|| transport.len() >= 2, Duration::from_secs(5)));
    assert!(transport
        .state_events()
        .iter()
        .any(|event| matches!(event, HostEvent::PropertiesChanged { object_type: ObjectType::Player, .. })));

    bridge.shutdown();
    assert!(bridge.is_shut_down());
    assert!(bridge.registry().is_empty());

    // nothing polls the page any more
    let position = page.lock().unwrap().position;
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(page.lock().unwrap().position, position);
}

#[test]
fn test_page_not_ready_keeps_polling() {
    let (bridge, transport) = setup_bridge(BridgeConfig::default());
    let mut adapter = ExampleAdapter::install(&bridge).unwrap();
    adapter.page().lock().unwrap().loaded = false;

    assert!(adapter.update().is_err());
    assert!(!adapter.is_ready());
    assert!(transport.state_events().is_empty());

    adapter.page().lock().unwrap().loaded = true;
    adapter.update().unwrap();
    assert_eq!(transport.state_events().len(), 2);
}
