//! Error types shared by the remote and local playback layers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A remote call was rejected or could not reach the service.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The service answered with a non-success status.
    #[error("{message} (HTTP {code})")]
    Status { code: u16, message: String },

    /// The request never got an answer.
    #[error("network error: {0}")]
    Network(String),

    /// The answer could not be understood.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// No usable access token.
    #[error("authorization failed: {0}")]
    Auth(String),

    /// An id or URI the service would not accept.
    #[error("invalid id {0:?}")]
    InvalidId(String),
}

/// Malformed user input, rejected before anything is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("enter a search query first")]
    EmptyQuery,

    #[error("invalid seek: {0:?} is not a whole number of seconds")]
    InvalidSeek(String),

    #[error("select tracks first")]
    NoSelection,

    #[error("playlist name must not be empty")]
    EmptyPlaylistName,

    #[error("playlist id must not be empty")]
    EmptyPlaylistId,
}

/// A local file could not be opened or decoded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("load failed: cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("load failed: cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
}

/// Failure of a single user command. Every handler isolates its own failure
/// and reports it as a notice.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal startup conditions.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("credentials required: client id and client secret must both be set")]
    MissingCredentials,

    #[error(transparent)]
    Auth(#[from] TransportError),

    #[error("no audio output device: {0}")]
    AudioOutput(#[from] rodio::StreamError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
