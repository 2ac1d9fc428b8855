pub mod actions;
pub mod example;

pub use actions::{NullActions, PlayerActions, PlaylistActions, TracklistActions};
pub use example::ExampleAdapter;

use crate::error::AdapterError;

/// A per-website integration that mirrors the page's player into the bridge
///
/// `start` is called once after registration, `update` on every poll cycle
/// for which `is_ready` holds. An adapter whose page is not initialized yet
/// either answers false from `is_ready` or returns `AdapterError::NotReady`
/// from `update`; in both cases it is simply polled again.
pub trait SiteAdapter: Send {
    /// Name used for the poll thread and in log output
    fn name(&self) -> &str;

    fn start(&mut self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Re-sample the page state into the observable objects and flush them
    fn update(&mut self) -> Result<(), AdapterError>;

    /// Whether the page can be sampled this cycle
    fn is_ready(&self) -> bool {
        true
    }
}
