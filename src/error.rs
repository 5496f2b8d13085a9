use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything the playlist service can fail with
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("playlist not found: {0}")]
    NotFound(String),

    #[error("playlist store error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("playback error: {0}")]
    Playback(#[from] PlaybackError),
}

/// A track was rejected before anything was written
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("not a readable audio file: {}", .path.display())]
    UnreadableAudio { path: PathBuf },

    #[error("invalid volume {volume} for {}", .path.display())]
    InvalidVolume { path: PathBuf, volume: f64 },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("could not read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid playlist document", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("playlist {name:?} in {} has malformed tracks", .path.display())]
    MalformedPlaylist {
        path: PathBuf,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode {}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not serialize playlist {name:?}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raised by an `AudioEngine` when it cannot take a file
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not open audio output")]
    Output(#[from] rodio::StreamError),

    #[error("could not create sink")]
    Sink(#[from] rodio::PlayError),

    #[error("could not open file")]
    Open(#[from] std::io::Error),

    #[error("could not decode file")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("no file loaded")]
    NothingLoaded,
}

#[derive(Debug, Error)]
#[error("could not play {}", .path.display())]
pub struct PlaybackError {
    pub path: PathBuf,
    #[source]
    pub source: EngineError,
}
