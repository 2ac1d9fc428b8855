use log::{debug, trace};
use serde::Serialize;
use serde_json::Value;

use crate::bridge::changeset::ChangeSet;
use crate::bridge::transport::SignalSender;
use crate::data::ObjectType;
use crate::error::{AdapterError, DispatchError};

/// Signal carrying a flushed change set
pub const PROPERTIES_CHANGED: &str = "propertiesChanged";

/// Change tracking capability composed into every observable object
///
/// Owns the object's type tag, its pending change set and the outbound
/// sender used for flushes, signals and diagnostics.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    object_type: ObjectType,
    changes: ChangeSet,
    signals: SignalSender,
}

impl ChangeTracker {
    pub fn new(object_type: ObjectType, signals: SignalSender) -> Self {
        Self {
            object_type,
            changes: ChangeSet::new(),
            signals,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn changes_mut(&mut self) -> &mut ChangeSet {
        &mut self.changes
    }

    pub fn signals(&self) -> &SignalSender {
        &self.signals
    }

    /// Attach a different outbound sender
    pub fn set_signals(&mut self, signals: SignalSender) {
        self.signals = signals;
    }

    /// Assign a tracked field
    ///
    /// Equal values leave both the field and the change set untouched.
    /// Returns whether the field changed.
    pub fn update<V>(&mut self, name: &str, slot: &mut V, value: V) -> bool
    where
        V: PartialEq + Serialize,
    {
        if *slot == value {
            return false;
        }
        self.record(name, &value);
        *slot = value;
        true
    }

    /// Record a delta without touching any field
    pub fn record<V: Serialize + ?Sized>(&mut self, name: &str, value: &V) {
        match serde_json::to_value(value) {
            Ok(value) => {
                trace!("[{}] {} changed to {}", self.object_type, name, value);
                self.changes.insert(name, value);
            }
            Err(e) => debug!("[{}] Could not record {}: {}", self.object_type, name, e),
        }
    }

    /// Flush pending deltas as one `propertiesChanged` signal
    ///
    /// Nothing is sent if the change set is empty. The change set is cleared
    /// whether or not delivery succeeds.
    pub fn send_property_change(&mut self) -> bool {
        if self.changes.is_empty() {
            return false;
        }
        let changes = self.changes.take();
        debug!("[{}] Sending {} changed properties", self.object_type, changes.len());
        self.signals
            .send_signal(self.object_type, PROPERTIES_CHANGED, Some(changes.to_value()));
        true
    }

    pub fn send_signal(&self, name: &str, parameter: Option<Value>) {
        self.signals.send_signal(self.object_type, name, parameter);
    }

    pub fn warning(&self, text: &str) {
        self.signals.warning(self.object_type, text);
    }

    pub fn debug(&self, text: &str) {
        self.signals.debug(self.object_type, text);
    }

    /// Send a test message to the host
    pub fn ping(&self) {
        self.debug("Send ping: Hey!");
        self.signals
            .call(self.object_type, "ping", Some(Value::String("Hey!".to_string())));
    }

    /// Answer a host-side ping
    pub fn pong(&self, text: &str) -> String {
        format!("{} Let's go!", text)
    }

    /// Turn the outcome of a site action into a dispatch result
    ///
    /// Unsupported actions and page failures are reported to the host as
    /// warnings before they are returned.
    pub fn report_action<V: Serialize>(
        &self,
        identifier: &str,
        result: Result<V, AdapterError>,
    ) -> Result<Value, DispatchError> {
        match result {
            Ok(value) => Ok(serde_json::to_value(value).unwrap_or(Value::Null)),
            Err(AdapterError::Unsupported(_)) => {
                self.warning(&format!("Function {} is not available", identifier));
                Err(DispatchError::Unavailable(identifier.to_string()))
            }
            Err(e) => {
                self.warning(&format!("Function {} failed: {}", identifier, e));
                Err(DispatchError::ActionFailed {
                    identifier: identifier.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
