use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::bridge::object::SharedObject;
use crate::bridge::transport::SignalSender;
use crate::data::ObjectType;

type ObjectMap = HashMap<ObjectType, SharedObject>;

/// What happens when a second object registers for an occupied type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RegistrationPolicy {
    /// Replace the previous instance and warn
    #[default]
    Replace,
    /// Keep the previous instance and warn
    Reject,
}

/// Outcome of a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    Replaced,
    Rejected,
}

impl Registration {
    /// Whether the offered object is now the registered one
    pub fn is_active(&self) -> bool {
        matches!(self, Registration::Registered | Registration::Replaced)
    }
}

/// Type tag to instance mapping, at most one instance per tag
///
/// Created together with the bridge and passed to the dispatcher; clones
/// share the same mapping.
#[derive(Clone)]
pub struct Registry {
    objects: Arc<RwLock<ObjectMap>>,
    policy: RegistrationPolicy,
    signals: SignalSender,
}

impl Registry {
    pub fn new(policy: RegistrationPolicy, signals: SignalSender) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            policy,
            signals,
        }
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    /// Register an object under its own type tag
    ///
    /// Problems are reported as warnings through the bridge; the registry is
    /// left unchanged whenever the result is `Rejected`.
    pub fn register(&self, object: SharedObject) -> Registration {
        let object_type = match object.read() {
            Ok(guard) => guard.object_type(),
            Err(_) => {
                self.signals
                    .warning(ObjectType::Api, "Can not register object: it is not accessible");
                return Registration::Rejected;
            }
        };

        let mut objects = match self.objects.write() {
            Ok(objects) => objects,
            Err(_) => {
                warn!("Registry lock poisoned, can not register {}", object_type);
                return Registration::Rejected;
            }
        };

        if objects.contains_key(&object_type) {
            match self.policy {
                RegistrationPolicy::Replace => {
                    objects.insert(object_type, object);
                    drop(objects);
                    self.signals.warning(
                        object_type,
                        &format!("Object of type {} registered again, replacing the previous instance", object_type),
                    );
                    Registration::Replaced
                }
                RegistrationPolicy::Reject => {
                    drop(objects);
                    self.signals.warning(
                        object_type,
                        &format!("Object of type {} is already registered, keeping the previous instance", object_type),
                    );
                    Registration::Rejected
                }
            }
        } else {
            objects.insert(object_type, object);
            info!("Registered object of type {}", object_type);
            Registration::Registered
        }
    }

    /// Look up the instance for a type tag
    pub fn get(&self, object_type: ObjectType) -> Option<SharedObject> {
        match self.objects.read() {
            Ok(objects) => objects.get(&object_type).cloned(),
            Err(_) => {
                warn!("Registry lock poisoned, can not look up {}", object_type);
                None
            }
        }
    }

    pub fn contains(&self, object_type: ObjectType) -> bool {
        self.get(object_type).is_some()
    }

    /// Remove the instance for a type tag
    pub fn unregister(&self, object_type: ObjectType) -> Option<SharedObject> {
        let removed = self.objects.write().ok()?.remove(&object_type);
        if removed.is_some() {
            debug!("Unregistered object of type {}", object_type);
        }
        removed
    }

    /// Registered type tags, in wire code order
    pub fn types(&self) -> Vec<ObjectType> {
        types_of(&self.objects)
    }

    /// Registered objects, in wire code order
    pub fn objects(&self) -> Vec<SharedObject> {
        ObjectType::all()
            .into_iter()
            .filter_map(|object_type| self.get(object_type))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all registrations
    pub fn clear(&self) {
        if let Ok(mut objects) = self.objects.write() {
            debug!("Clearing {} registered objects", objects.len());
            objects.clear();
        }
    }

    /// A handle that does not keep the registry alive
    pub fn downgrade(&self) -> RegistryHandle {
        RegistryHandle {
            objects: Arc::downgrade(&self.objects),
        }
    }
}

/// Weak, read-only view of a registry
///
/// Used by registered objects that report on the registry itself, so that no
/// reference cycle exists between the registry and its members.
#[derive(Debug, Clone, Default)]
pub struct RegistryHandle {
    objects: Weak<RwLock<ObjectMap>>,
}

impl RegistryHandle {
    /// Registered type tags; empty once the registry is gone
    pub fn types(&self) -> Vec<ObjectType> {
        match self.objects.upgrade() {
            Some(objects) => types_of(&objects),
            None => Vec::new(),
        }
    }
}

fn types_of(objects: &RwLock<ObjectMap>) -> Vec<ObjectType> {
    match objects.read() {
        Ok(objects) => {
            let mut types: Vec<ObjectType> = objects.keys().copied().collect();
            types.sort_by_key(|object_type| object_type.code());
            types
        }
        Err(_) => Vec::new(),
    }
}
