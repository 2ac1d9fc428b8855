use thiserror::Error;

use crate::data::{Action, ObjectType};

/// Errors raised while encoding or decoding envelopes
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BridgeError {
    #[error("Failed to encode {0}")]
    Encode(String),

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Failed to decode parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to decode result: {0}")]
    InvalidResult(String),
}

/// Errors raised while dispatching a command against a registered object
///
/// None of these cross the script/host edge: the bridge turns each of them
/// into the configured failure marker.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("No object registered for type {0}")]
    UnknownTarget(ObjectType),

    #[error("Unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("'{0}' is not a property")]
    NotAProperty(String),

    #[error("'{0}' is not a function")]
    NotAFunction(String),

    #[error("Property '{0}' is read-only")]
    ReadOnly(String),

    #[error("Invalid argument for '{identifier}': {reason}")]
    InvalidArgument { identifier: String, reason: String },

    #[error("Can not handle unknown Action: {0}")]
    UnsupportedAction(Action),

    #[error("Function {0} is not available")]
    Unavailable(String),

    #[error("Function {identifier} failed: {reason}")]
    ActionFailed { identifier: String, reason: String },

    #[error("Object of type {0} is not accessible (poisoned lock)")]
    Poisoned(ObjectType),
}

impl DispatchError {
    /// Errors that the target object already reported to the host itself
    pub fn is_reported(&self) -> bool {
        matches!(self, DispatchError::Unavailable(_) | DispatchError::ActionFailed { .. })
    }
}

/// Errors raised by the host call boundary
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("Host is not reachable: {0}")]
    Disconnected(String),
}

/// Errors raised by site adapters and their action handlers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Page is not ready yet")]
    NotReady,

    #[error("Page error: {0}")]
    Page(String),

    #[error("Function {0} is not available")]
    Unsupported(String),
}
