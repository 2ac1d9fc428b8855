// Common helpers for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use webmusic::bridge::{Bridge, HostEvent, Transport};
use webmusic::config::BridgeConfig;
use webmusic::error::TransportError;

/// Transport that records every outbound message and answers `null`
#[derive(Clone, Default)]
pub struct RecordingTransport {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all messages recorded so far
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }

    /// Take all messages recorded so far, routed as host events
    pub fn events(&self) -> Vec<HostEvent> {
        self.take()
            .iter()
            .map(|message| HostEvent::decode(message).unwrap())
            .collect()
    }

    /// Events without debug and warning output
    pub fn state_events(&self) -> Vec<HostEvent> {
        self.events().into_iter().filter(|event| !event.is_diagnostic()).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl Transport for RecordingTransport {
    fn submit(&self, message: &str) -> Result<String, TransportError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok("null".to_string())
    }
}

/// A bridge on a recording transport
pub fn setup_bridge(config: BridgeConfig) -> (Bridge, RecordingTransport) {
    let transport = RecordingTransport::new();
    let bridge = Bridge::new(Arc::new(transport.clone()), config);
    (bridge, transport)
}

/// Poll until `condition` holds or the timeout expires
pub fn wait_for<F: Fn() -> bool>(condition: F, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

/// Warnings among the given events
pub fn warnings(events: &[HostEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            HostEvent::Warning { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}
