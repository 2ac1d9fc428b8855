// Concrete observable objects a site adapter fills in

pub mod api;
pub mod player;
pub mod playlist;
pub mod tracklist;

pub use api::ApiObject;
pub use player::{MetadataField, Player, DEFAULT_SEEK_THRESHOLD};
pub use playlist::Playlist;
pub use tracklist::Tracklist;
