//! The host call boundary and the outbound side of the bridge

use std::sync::Arc;
use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, trace, warn};
use serde_json::Value;

use crate::bridge::codec::EnvelopeCodec;
use crate::bridge::envelope::CommandEnvelope;
use crate::data::{Action, ObjectType};
use crate::error::TransportError;

/// The single function-call boundary to the host
///
/// `submit` delivers one encoded envelope and returns the host's encoded
/// reply. Implementations must not call back into the bridge from inside
/// `submit`: the submitting object is still locked while the host runs.
pub trait Transport: Send + Sync {
    fn submit(&self, message: &str) -> Result<String, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&str) -> Result<String, TransportError> + Send + Sync,
{
    fn submit(&self, message: &str) -> Result<String, TransportError> {
        self(message)
    }
}

/// Transport that drops everything, used before a host is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn submit(&self, message: &str) -> Result<String, TransportError> {
        trace!("Dropping message without host: {}", message);
        Ok("null".to_string())
    }
}

/// Transport that queues outbound messages on a crossbeam channel
///
/// The host side drains the receiver at its own pace; every submit is
/// answered with `null` immediately.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: Sender<String>,
}

impl ChannelTransport {
    pub fn new() -> (Self, Receiver<String>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl Transport for ChannelTransport {
    fn submit(&self, message: &str) -> Result<String, TransportError> {
        self.sender
            .send(message.to_string())
            .map_err(|_| TransportError::Disconnected("receiver dropped".to_string()))?;
        Ok("null".to_string())
    }
}

/// Encodes outbound envelopes and hands them to the transport
///
/// Cloned into every observable object. Sending is fire-and-forget: failures
/// are logged and otherwise ignored.
#[derive(Clone)]
pub struct SignalSender {
    transport: Arc<dyn Transport>,
    codec: EnvelopeCodec,
    forward_diagnostics: bool,
}

impl SignalSender {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            codec: EnvelopeCodec::new(),
            forward_diagnostics: true,
        }
    }

    /// A sender without a host
    pub fn detached() -> Self {
        Self::new(Arc::new(NullTransport))
    }

    /// Whether warnings and debug text are also delivered to the host
    pub fn with_forward_diagnostics(mut self, forward: bool) -> Self {
        self.forward_diagnostics = forward;
        self
    }

    pub fn forwards_diagnostics(&self) -> bool {
        self.forward_diagnostics
    }

    pub fn codec(&self) -> &EnvelopeCodec {
        &self.codec
    }

    /// Encode and submit an envelope, returning the decoded reply
    pub fn send_command(&self, envelope: &CommandEnvelope) -> Option<Value> {
        let message = match self.codec.encode(envelope) {
            Ok(message) => message,
            Err(e) => {
                warn!("Not sending {}: {}", envelope, e);
                return None;
            }
        };

        trace!("Submitting {}", message);
        match self.transport.submit(&message) {
            Ok(reply) => match self.codec.decode_result(&reply) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Host reply to {} not decodable: {}", envelope.identifier, e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to deliver {}: {}", envelope, e);
                None
            }
        }
    }

    /// Emit a SEND_SIGNAL envelope
    pub fn send_signal(&self, object_type: ObjectType, name: &str, parameter: Option<Value>) {
        let envelope = CommandEnvelope::new(object_type, Action::SendSignal, name, parameter);
        self.send_command(&envelope);
    }

    /// Invoke a host-side function
    pub fn call(&self, object_type: ObjectType, name: &str, parameter: Option<Value>) -> Option<Value> {
        let envelope = CommandEnvelope::new(object_type, Action::CallFunction, name, parameter);
        self.send_command(&envelope)
    }

    /// Log a warning and deliver it to the host as a `warning` call
    pub fn warning(&self, object_type: ObjectType, text: &str) {
        warn!("[{}] {}", object_type, text);
        if self.forward_diagnostics {
            self.call(object_type, "warning", Some(Value::String(text.to_string())));
        }
    }

    /// Log debug text and deliver it to the host as a `debug` call
    pub fn debug(&self, object_type: ObjectType, text: &str) {
        debug!("[{}] {}", object_type, text);
        if self.forward_diagnostics {
            self.call(object_type, "debug", Some(Value::String(text.to_string())));
        }
    }
}

impl std::fmt::Debug for SignalSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalSender")
            .field("forward_diagnostics", &self.forward_diagnostics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_channel_transport_queues_messages() {
        let (transport, receiver) = ChannelTransport::new();
        let sender = SignalSender::new(Arc::new(transport));

        sender.send_signal(ObjectType::Player, "seeked", Some(json!(5_000_000)));
        let message = receiver.try_recv().unwrap();
        assert_eq!(
            message,
            r#"{"Type":1,"Action":3,"Identifier":"seeked","Parameter":"5000000"}"#
        );
    }

    #[test]
    fn test_warning_is_forwarded_as_call() {
        let (transport, receiver) = ChannelTransport::new();
        let sender = SignalSender::new(Arc::new(transport));

        sender.warning(ObjectType::Player, "Function actionPlay is not available");
        let envelope = EnvelopeCodec::new().decode(&receiver.try_recv().unwrap()).unwrap();
        assert_eq!(envelope.action, Action::CallFunction);
        assert_eq!(envelope.identifier, "warning");
        assert_eq!(envelope.parameter, Some(json!("Function actionPlay is not available")));
    }

    #[test]
    fn test_diagnostics_stay_local_when_disabled() {
        let (transport, receiver) = ChannelTransport::new();
        let sender = SignalSender::new(Arc::new(transport)).with_forward_diagnostics(false);

        sender.debug(ObjectType::Api, "hello");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_closure_transport_reply() {
        let transport = |_: &str| -> Result<String, TransportError> { Ok("[1,2]".to_string()) };
        let sender = SignalSender::new(Arc::new(transport));
        assert_eq!(sender.call(ObjectType::Api, "ping", None), Some(json!([1, 2])));
    }

    #[test]
    fn test_disconnected_channel_is_not_fatal() {
        let (transport, receiver) = ChannelTransport::new();
        drop(receiver);
        let sender = SignalSender::new(Arc::new(transport));
        assert_eq!(sender.call(ObjectType::Api, "ping", None), None);
    }
}
