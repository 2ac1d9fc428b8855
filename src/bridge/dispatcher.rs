use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::bridge::codec::EnvelopeCodec;
use crate::bridge::envelope::CommandEnvelope;
use crate::bridge::registry::Registry;
use crate::bridge::transport::SignalSender;
use crate::data::{Action, ObjectType};
use crate::error::DispatchError;

/// The value returned to the host when an inbound command fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FailureMarker {
    #[default]
    False,
    Null,
}

impl FailureMarker {
    pub fn value(&self) -> Value {
        match self {
            FailureMarker::False => Value::Bool(false),
            FailureMarker::Null => Value::Null,
        }
    }
}

/// Resolves inbound envelopes against the registry
pub struct Dispatcher {
    registry: Registry,
    codec: EnvelopeCodec,
    signals: SignalSender,
    failure: FailureMarker,
}

impl Dispatcher {
    pub fn new(registry: Registry, signals: SignalSender, failure: FailureMarker) -> Self {
        Self {
            registry,
            codec: EnvelopeCodec::new(),
            signals,
            failure,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn failure_marker(&self) -> FailureMarker {
        self.failure
    }

    /// Perform one decoded command
    ///
    /// Property writes answer `true`; function calls answer their return
    /// value. Nothing is applied unless the identifier resolves.
    pub fn dispatch(&self, envelope: &CommandEnvelope) -> Result<Value, DispatchError> {
        if !envelope.action.is_dispatchable() {
            return Err(DispatchError::UnsupportedAction(envelope.action));
        }

        let object = self
            .registry
            .get(envelope.object_type)
            .ok_or(DispatchError::UnknownTarget(envelope.object_type))?;

        match envelope.action {
            Action::GetProperty => {
                let object = object
                    .read()
                    .map_err(|_| DispatchError::Poisoned(envelope.object_type))?;
                object.get_property(&envelope.identifier)
            }
            Action::SetProperty => {
                let mut object = object
                    .write()
                    .map_err(|_| DispatchError::Poisoned(envelope.object_type))?;
                let value = envelope.parameter.clone().unwrap_or(Value::Null);
                object.set_property(&envelope.identifier, value)?;
                Ok(Value::Bool(true))
            }
            Action::CallFunction => {
                let arguments = envelope.arguments();
                let mut object = object
                    .write()
                    .map_err(|_| DispatchError::Poisoned(envelope.object_type))?;
                object.call_function(&envelope.identifier, &arguments)
            }
            _ => Err(DispatchError::UnsupportedAction(envelope.action)),
        }
    }

    /// Handle one encoded inbound message and produce the encoded reply
    ///
    /// Never fails: decode and dispatch errors turn into the failure marker.
    pub fn handle_message(&self, message: &str) -> String {
        trace!("Received {}", message);

        let result = match self.codec.decode(message) {
            Ok(envelope) => {
                debug!("Dispatching {}", envelope);
                match self.dispatch(&envelope) {
                    Ok(value) => value,
                    Err(e) => {
                        if !e.is_reported() {
                            self.signals.warning(target_of(&e, &envelope), &e.to_string());
                        }
                        self.failure.value()
                    }
                }
            }
            Err(e) => {
                self.signals.warning(ObjectType::Api, &format!("Dropping message: {}", e));
                self.failure.value()
            }
        };

        match self.codec.encode_result(&result) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Failed to encode result: {}", e);
                self.failure.value().to_string()
            }
        }
    }
}

fn target_of(error: &DispatchError, envelope: &CommandEnvelope) -> ObjectType {
    match error {
        // the addressed object does not exist; report through the API object
        DispatchError::UnknownTarget(_) => ObjectType::Api,
        _ => envelope.object_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::NullActions;
    use crate::bridge::object::shared;
    use crate::bridge::registry::RegistrationPolicy;
    use crate::bridge::transport::ChannelTransport;
    use crate::objects::Player;
    use crossbeam::channel::Receiver;
    use serde_json::json;
    use std::sync::Arc;

    fn setup(failure: FailureMarker) -> (Dispatcher, Receiver<String>) {
        let (transport, receiver) = ChannelTransport::new();
        let signals = SignalSender::new(Arc::new(transport));
        let registry = Registry::new(RegistrationPolicy::Replace, signals.clone());
        registry.register(shared(Player::new(signals.clone(), Box::new(NullActions))));
        (Dispatcher::new(registry, signals, failure), receiver)
    }

    #[test]
    fn test_set_then_get() {
        let (dispatcher, _receiver) = setup(FailureMarker::False);
        let set = CommandEnvelope::set_property(ObjectType::Player, "playbackStatus", json!(1));
        assert_eq!(dispatcher.dispatch(&set), Ok(Value::Bool(true)));

        let get = CommandEnvelope::get_property(ObjectType::Player, "playbackStatus");
        assert_eq!(dispatcher.dispatch(&get), Ok(json!(1)));
    }

    #[test]
    fn test_errors_by_kind() {
        let (dispatcher, _receiver) = setup(FailureMarker::False);

        let unknown = CommandEnvelope::get_property(ObjectType::Tracklist, "tracks");
        assert_eq!(
            dispatcher.dispatch(&unknown),
            Err(DispatchError::UnknownTarget(ObjectType::Tracklist))
        );

        let read_only = CommandEnvelope::set_property(ObjectType::Player, "type", json!(3));
        assert_eq!(
            dispatcher.dispatch(&read_only),
            Err(DispatchError::ReadOnly("type".to_string()))
        );

        let signal = CommandEnvelope::signal(ObjectType::Player, "seeked", None);
        assert_eq!(
            dispatcher.dispatch(&signal),
            Err(DispatchError::UnsupportedAction(Action::SendSignal))
        );
    }

    #[test]
    fn test_failures_become_the_marker() {
        let codec = EnvelopeCodec::new();
        let message = codec
            .encode(&CommandEnvelope::get_property(ObjectType::Player, "nothing"))
            .unwrap();

        let (dispatcher, receiver) = setup(FailureMarker::False);
        assert_eq!(dispatcher.handle_message(&message), "false");
        let warning = codec.decode(&receiver.try_recv().unwrap()).unwrap();
        assert_eq!(warning.identifier, "warning");
        assert_eq!(warning.object_type, ObjectType::Player);

        let (dispatcher, _receiver) = setup(FailureMarker::Null);
        assert_eq!(dispatcher.handle_message(&message), "null");
        assert_eq!(dispatcher.handle_message("]"), "null");
    }

    #[test]
    fn test_failed_set_changes_nothing() {
        let (dispatcher, _receiver) = setup(FailureMarker::False);
        let set = CommandEnvelope::set_property(ObjectType::Player, "volume", json!("loud"));
        assert!(dispatcher.dispatch(&set).is_err());

        let get = CommandEnvelope::get_property(ObjectType::Player, "volume");
        assert_eq!(dispatcher.dispatch(&get), Ok(json!(0.5)));
        let player = dispatcher.registry().get(ObjectType::Player).unwrap();
        assert!(player.read().unwrap().changes().is_empty());
    }
}
