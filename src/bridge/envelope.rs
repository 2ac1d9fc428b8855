use std::fmt;
use serde_json::Value;

use crate::bridge::operations::Arguments;
use crate::data::{Action, ObjectType};

/// One cross-boundary operation: a property read or write, a function call or a signal
///
/// Envelopes carry no correlation id; every round trip completes before the
/// next one starts.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEnvelope {
    /// Which registered object the envelope addresses
    pub object_type: ObjectType,

    /// What to do with it
    pub action: Action,

    /// Property, function or signal name
    pub identifier: String,

    /// Optional payload; `null` is treated as absent
    pub parameter: Option<Value>,
}

impl CommandEnvelope {
    /// Create a new envelope
    pub fn new(
        object_type: ObjectType,
        action: Action,
        identifier: impl Into<String>,
        parameter: Option<Value>,
    ) -> Self {
        Self {
            object_type,
            action,
            identifier: identifier.into(),
            parameter: parameter.filter(|value| !value.is_null()),
        }
    }

    pub fn get_property(object_type: ObjectType, name: impl Into<String>) -> Self {
        Self::new(object_type, Action::GetProperty, name, None)
    }

    pub fn set_property(object_type: ObjectType, name: impl Into<String>, value: Value) -> Self {
        Self::new(object_type, Action::SetProperty, name, Some(value))
    }

    pub fn call_function(object_type: ObjectType, name: impl Into<String>, parameter: Option<Value>) -> Self {
        Self::new(object_type, Action::CallFunction, name, parameter)
    }

    pub fn signal(object_type: ObjectType, name: impl Into<String>, parameter: Option<Value>) -> Self {
        Self::new(object_type, Action::SendSignal, name, parameter)
    }

    /// Positional arguments for a function call
    ///
    /// No parameter means no arguments, a sequence is spread into its elements,
    /// anything else becomes the sole argument.
    pub fn arguments(&self) -> Arguments {
        Arguments::from_parameter(&self.identifier, self.parameter.clone())
    }
}

impl fmt::Display for CommandEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.object_type, self.action, self.identifier)?;
        if let Some(parameter) = &self.parameter {
            write!(f, " {}", parameter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_parameter_is_absent() {
        let envelope = CommandEnvelope::call_function(ObjectType::Player, "actionPlay", Some(Value::Null));
        assert_eq!(envelope.parameter, None);
        assert!(envelope.arguments().is_empty());
    }

    #[test]
    fn test_display() {
        let envelope = CommandEnvelope::set_property(ObjectType::Player, "volume", json!(0.5));
        assert_eq!(envelope.to_string(), "player:set_property volume 0.5");
    }
}
