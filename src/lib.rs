/// Wire enumerations and value types
pub mod data;

/// Envelope codec, registry, dispatcher and the bridge facade
pub mod bridge;

/// Observable player, playlist and tracklist objects
pub mod objects;

/// Site adapter interface and the example site
pub mod adapters;

/// Poll scheduling
pub mod helpers;

pub mod config;
pub mod error;
pub mod logging;

pub use bridge::{Bridge, BridgeObject, CommandEnvelope, EnvelopeCodec, HostEvent, SignalSender, Transport};
pub use config::BridgeConfig;
pub use error::{AdapterError, BridgeError, DispatchError, TransportError};
pub use objects::{Player, Playlist, Tracklist};
