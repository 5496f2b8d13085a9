//! Named playlists of local audio files, kept in a single JSON document, with
//! one-track-at-a-time playback.

pub mod config;
pub mod error;
pub mod player;
pub mod probe;
pub mod service;
pub mod store;
pub mod track;

pub use config::Config;
pub use error::{Error, Result};
pub use player::{AudioEngine, Gateway, PlaybackState, RodioEngine};
pub use service::PlaylistService;
pub use store::PlaylistStore;
pub use track::Track;
