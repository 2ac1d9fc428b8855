//! Per-entity operation tables
//!
//! Every observable object type builds one table, once, that maps identifiers
//! to getters, setters and invocable handlers. The dispatcher only ever goes
//! through these tables, so "call anything by name" stays statically checked.

use std::collections::HashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DispatchError;

/// Reads a property
pub type Getter<T> = fn(&T) -> Value;

/// Writes a property from a decoded parameter
pub type Setter<T> = fn(&mut T, Value) -> Result<(), DispatchError>;

/// Invokes a function with positional arguments
pub type Handler<T> = fn(&mut T, &Arguments) -> Result<Value, DispatchError>;

/// A named entry of an operation table
pub enum Operation<T> {
    Property {
        get: Getter<T>,
        set: Option<Setter<T>>,
    },
    Function(Handler<T>),
}

/// Identifier to operation mapping for one entity type
pub struct OperationTable<T> {
    name: &'static str,
    operations: HashMap<&'static str, Operation<T>>,
}

impl<T> OperationTable<T> {
    /// Create an empty table; `name` is used in log output only
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            operations: HashMap::new(),
        }
    }

    /// Add a readable and writable property
    pub fn property(mut self, identifier: &'static str, get: Getter<T>, set: Setter<T>) -> Self {
        self.operations.insert(identifier, Operation::Property { get, set: Some(set) });
        self
    }

    /// Add a property that can only be read
    pub fn read_only(mut self, identifier: &'static str, get: Getter<T>) -> Self {
        self.operations.insert(identifier, Operation::Property { get, set: None });
        self
    }

    /// Add an invocable function
    pub fn function(mut self, identifier: &'static str, handler: Handler<T>) -> Self {
        self.operations.insert(identifier, Operation::Function(handler));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.operations.contains_key(identifier)
    }

    /// All identifiers, sorted
    pub fn identifiers(&self) -> Vec<&'static str> {
        let mut identifiers: Vec<&'static str> = self.operations.keys().copied().collect();
        identifiers.sort_unstable();
        identifiers
    }

    /// Read a property; never has side effects
    pub fn get(&self, target: &T, identifier: &str) -> Result<Value, DispatchError> {
        match self.operations.get(identifier) {
            Some(Operation::Property { get, .. }) => Ok(get(target)),
            Some(Operation::Function(_)) => Err(DispatchError::NotAProperty(identifier.to_string())),
            None => Err(DispatchError::UnknownIdentifier(identifier.to_string())),
        }
    }

    /// Write a property
    pub fn set(&self, target: &mut T, identifier: &str, value: Value) -> Result<(), DispatchError> {
        match self.operations.get(identifier) {
            Some(Operation::Property { set: Some(set), .. }) => set(target, value),
            Some(Operation::Property { set: None, .. }) => Err(DispatchError::ReadOnly(identifier.to_string())),
            Some(Operation::Function(_)) => Err(DispatchError::NotAProperty(identifier.to_string())),
            None => Err(DispatchError::UnknownIdentifier(identifier.to_string())),
        }
    }

    /// Invoke a function
    pub fn call(&self, target: &mut T, identifier: &str, arguments: &Arguments) -> Result<Value, DispatchError> {
        match self.operations.get(identifier) {
            Some(Operation::Function(handler)) => handler(target, arguments),
            Some(Operation::Property { .. }) => Err(DispatchError::NotAFunction(identifier.to_string())),
            None => Err(DispatchError::UnknownIdentifier(identifier.to_string())),
        }
    }
}

/// Positional arguments of a function call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    identifier: String,
    values: Vec<Value>,
}

impl Arguments {
    /// Create arguments from already separated values
    pub fn new(identifier: &str, values: Vec<Value>) -> Self {
        Self {
            identifier: identifier.to_string(),
            values,
        }
    }

    /// Apply the call convention to an envelope parameter
    ///
    /// No parameter means no arguments, a sequence is spread into positional
    /// arguments, any other value becomes the only argument.
    pub fn from_parameter(identifier: &str, parameter: Option<Value>) -> Self {
        let values = match parameter {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(values)) => values,
            Some(value) => vec![value],
        };
        Self::new(identifier, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Decode a required argument
    pub fn get<A: DeserializeOwned>(&self, index: usize) -> Result<A, DispatchError> {
        match self.values.get(index) {
            Some(value) => parse_value(&self.identifier, value.clone()),
            None => Err(DispatchError::InvalidArgument {
                identifier: self.identifier.clone(),
                reason: format!("missing argument {}", index),
            }),
        }
    }

    /// Decode an optional argument; `null` counts as missing
    pub fn optional<A: DeserializeOwned>(&self, index: usize) -> Result<Option<A>, DispatchError> {
        match self.values.get(index) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => parse_value(&self.identifier, value.clone()).map(Some),
        }
    }
}

/// Decode a parameter into the type a setter or handler expects
pub fn parse_value<A: DeserializeOwned>(identifier: &str, value: Value) -> Result<A, DispatchError> {
    serde_json::from_value(value).map_err(|e| DispatchError::InvalidArgument {
        identifier: identifier.to_string(),
        reason: e.to_string(),
    })
}
