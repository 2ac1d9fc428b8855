//! Two-layer envelope codec
//!
//! The host's call primitive only round-trips flat strings, numbers and booleans
//! faithfully. Parameters are therefore serialized on their own first (inner
//! layer) and embedded as a string in the envelope record (outer layer).

use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::envelope::CommandEnvelope;
use crate::data::{Action, ObjectType};
use crate::error::BridgeError;

/// Inner layer: a parameter value as a standalone JSON document
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadCodec;

impl PayloadCodec {
    pub fn encode(&self, value: &Value) -> Result<String, BridgeError> {
        serde_json::to_string(value).map_err(|e| BridgeError::Encode(format!("parameter: {}", e)))
    }

    pub fn decode(&self, payload: &str) -> Result<Value, BridgeError> {
        serde_json::from_str(payload).map_err(|e| BridgeError::InvalidParameter(e.to_string()))
    }
}

/// Outer record as it appears on the wire
#[derive(Debug, Serialize, Deserialize)]
struct WireEnvelope {
    #[serde(rename = "Type")]
    object_type: ObjectType,

    #[serde(rename = "Action")]
    action: Action,

    #[serde(rename = "Identifier")]
    identifier: String,

    #[serde(rename = "Parameter", default, skip_serializing_if = "Option::is_none")]
    parameter: Option<Value>,
}

/// Outer layer: the envelope record itself
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeCodec {
    payload: PayloadCodec,
}

impl EnvelopeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode an envelope, nesting the parameter as a string if present
    pub fn encode(&self, envelope: &CommandEnvelope) -> Result<String, BridgeError> {
        let parameter = match &envelope.parameter {
            Some(value) if !value.is_null() => Some(Value::String(self.payload.encode(value)?)),
            _ => None,
        };

        let wire = WireEnvelope {
            object_type: envelope.object_type,
            action: envelope.action,
            identifier: envelope.identifier.clone(),
            parameter,
        };

        serde_json::to_string(&wire).map_err(|e| BridgeError::Encode(format!("envelope: {}", e)))
    }

    /// Decode an envelope, undoing the nested parameter encoding
    pub fn decode(&self, message: &str) -> Result<CommandEnvelope, BridgeError> {
        let wire: WireEnvelope =
            serde_json::from_str(message).map_err(|e| BridgeError::MalformedEnvelope(e.to_string()))?;

        let parameter = match wire.parameter {
            None | Some(Value::Null) => None,
            Some(Value::String(payload)) => Some(self.payload.decode(&payload)?),
            Some(other) => {
                // Hosts that skip the inner layer still get served
                trace!("Accepting parameter without nested encoding for '{}'", wire.identifier);
                Some(other)
            }
        };

        Ok(CommandEnvelope::new(wire.object_type, wire.action, wire.identifier, parameter))
    }

    /// Encode a dispatch result for the reply string
    pub fn encode_result(&self, result: &Value) -> Result<String, BridgeError> {
        serde_json::to_string(result).map_err(|e| BridgeError::Encode(format!("result: {}", e)))
    }

    /// Decode a reply string produced by `encode_result`
    pub fn decode_result(&self, reply: &str) -> Result<Value, BridgeError> {
        serde_json::from_str(reply).map_err(|e| BridgeError::InvalidResult(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codec() -> EnvelopeCodec {
        EnvelopeCodec::new()
    }

    #[test]
    fn test_parameter_is_nested_as_string() {
        let envelope = CommandEnvelope::call_function(ObjectType::Player, "actionShow", Some(json!(["album", "42"])));
        let message = codec().encode(&envelope).unwrap();
        let outer: Value = serde_json::from_str(&message).unwrap();

        assert_eq!(outer["Type"], json!(1));
        assert_eq!(outer["Action"], json!(2));
        assert_eq!(outer["Identifier"], json!("actionShow"));
        assert_eq!(outer["Parameter"], json!("[\"album\",\"42\"]"));
    }

    #[test]
    fn test_absent_parameter_is_omitted() {
        let envelope = CommandEnvelope::get_property(ObjectType::Playlist, "count");
        let message = codec().encode(&envelope).unwrap();
        assert_eq!(message, r#"{"Type":2,"Action":0,"Identifier":"count"}"#);
    }

    #[test]
    fn test_round_trip() {
        let envelopes = vec![
            CommandEnvelope::get_property(ObjectType::Api, "version"),
            CommandEnvelope::set_property(ObjectType::Player, "volume", json!(0.25)),
            CommandEnvelope::call_function(ObjectType::Player, "actionSearch", Some(json!("a \"quoted\" text"))),
            CommandEnvelope::signal(
                ObjectType::Player,
                "propertiesChanged",
                Some(json!({"metadata": {"artists": ["A", "B"], "trackLength": 1}, "shuffle": true})),
            ),
            CommandEnvelope::new(ObjectType::Tracklist, Action::Unknown(9), "odd", None),
        ];

        for envelope in envelopes {
            let decoded = codec().decode(&codec().encode(&envelope).unwrap()).unwrap();
            assert_eq!(decoded, envelope);
        }
    }

    #[test]
    fn test_unencoded_parameter_is_accepted() {
        let decoded = codec()
            .decode(r#"{"Type":1,"Action":2,"Identifier":"actionVolume","Parameter":42}"#)
            .unwrap();
        assert_eq!(decoded.parameter, Some(json!(42)));
    }

    #[test]
    fn test_malformed_messages() {
        assert!(matches!(codec().decode("not json"), Err(BridgeError::MalformedEnvelope(_))));
        assert!(matches!(
            codec().decode(r#"{"Type":1,"Action":0}"#),
            Err(BridgeError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            codec().decode(r#"{"Type":12,"Action":0,"Identifier":"x"}"#),
            Err(BridgeError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            codec().decode(r#"{"Type":1,"Action":1,"Identifier":"volume","Parameter":"{broken"}"#),
            Err(BridgeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_result_encoding() {
        assert_eq!(codec().encode_result(&json!(false)).unwrap(), "false");
        assert_eq!(codec().decode_result("[1,2]").unwrap(), json!([1, 2]));
        assert!(codec().decode_result("").is_err());
    }
}
