use once_cell::sync::Lazy;
use serde_json::json;

use crate::bridge::object::{common_operations, ObservableObject};
use crate::bridge::operations::OperationTable;
use crate::bridge::registry::RegistryHandle;
use crate::bridge::tracker::ChangeTracker;
use crate::bridge::transport::SignalSender;
use crate::data::ObjectType;

/// Bridge version reported to the host
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The generic API object, registered by the bridge itself
///
/// Lets the host check the connection (`ping`/`pong`) and find out which
/// objects the site registered.
pub struct ApiObject {
    tracker: ChangeTracker,
    registry: RegistryHandle,
}

impl ApiObject {
    pub fn new(signals: SignalSender, registry: RegistryHandle) -> Self {
        Self {
            tracker: ChangeTracker::new(ObjectType::Api, signals),
            registry,
        }
    }

    /// Registered type tags
    pub fn objects(&self) -> Vec<ObjectType> {
        self.registry.types()
    }
}

impl ObservableObject for ApiObject {
    fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut ChangeTracker {
        &mut self.tracker
    }

    fn operations() -> &'static OperationTable<Self> {
        &API_OPERATIONS
    }
}

static API_OPERATIONS: Lazy<OperationTable<ApiObject>> = Lazy::new(|| {
    common_operations(OperationTable::<ApiObject>::new("api"))
        .read_only("version", |_| json!(VERSION))
        .read_only("objects", |api| json!(api.objects()))
});
