use std::sync::{Arc, RwLock};
use serde_json::{json, Value};

use crate::bridge::changeset::ChangeSet;
use crate::bridge::operations::{Arguments, OperationTable};
use crate::bridge::tracker::ChangeTracker;
use crate::data::ObjectType;
use crate::error::DispatchError;

/// The observable object capability set as seen by the registry and dispatcher
///
/// Implemented for every [`ObservableObject`]; the dispatcher never needs to
/// know the concrete entity behind a type tag.
pub trait BridgeObject: Send + Sync {
    fn object_type(&self) -> ObjectType;

    /// Pending, not yet flushed deltas
    fn changes(&self) -> &ChangeSet;

    fn get_property(&self, identifier: &str) -> Result<Value, DispatchError>;

    fn set_property(&mut self, identifier: &str, value: Value) -> Result<(), DispatchError>;

    fn call_function(&mut self, identifier: &str, arguments: &Arguments) -> Result<Value, DispatchError>;

    /// Flush pending deltas to the host; returns whether anything was sent
    fn send_property_change(&mut self) -> bool;

    /// Names of all properties and functions
    fn identifiers(&self) -> Vec<&'static str>;
}

/// A registered object shared between the registry, adapters and poll tasks
pub type SharedObject = Arc<RwLock<dyn BridgeObject>>;

/// Concrete entity built on a [`ChangeTracker`] and an operation table
pub trait ObservableObject: Sized + Send + Sync + 'static {
    fn tracker(&self) -> &ChangeTracker;

    fn tracker_mut(&mut self) -> &mut ChangeTracker;

    /// The entity's operation table, built once per type
    fn operations() -> &'static OperationTable<Self>;

    /// Flush pending deltas; entities with derived groups override this
    fn flush_changes(&mut self) -> bool {
        self.tracker_mut().send_property_change()
    }
}

impl<T: ObservableObject> BridgeObject for T {
    fn object_type(&self) -> ObjectType {
        self.tracker().object_type()
    }

    fn changes(&self) -> &ChangeSet {
        self.tracker().changes()
    }

    fn get_property(&self, identifier: &str) -> Result<Value, DispatchError> {
        T::operations().get(self, identifier)
    }

    fn set_property(&mut self, identifier: &str, value: Value) -> Result<(), DispatchError> {
        T::operations().set(self, identifier, value)
    }

    fn call_function(&mut self, identifier: &str, arguments: &Arguments) -> Result<Value, DispatchError> {
        T::operations().call(self, identifier, arguments)
    }

    fn send_property_change(&mut self) -> bool {
        self.flush_changes()
    }

    fn identifiers(&self) -> Vec<&'static str> {
        T::operations().identifiers()
    }
}

/// Wrap an entity for registration
pub fn shared<T: ObservableObject>(object: T) -> Arc<RwLock<T>> {
    Arc::new(RwLock::new(object))
}

/// Operations every observable object offers: `type`, `ping` and `pong`
pub fn common_operations<T: ObservableObject>(table: OperationTable<T>) -> OperationTable<T> {
    table
        .read_only("type", |object| json!(object.tracker().object_type()))
        .function("ping", |object, _| {
            object.tracker().ping();
            Ok(Value::Null)
        })
        .function("pong", |object, arguments| {
            let text: String = arguments.get(0)?;
            Ok(Value::String(object.tracker().pong(&text)))
        })
}
