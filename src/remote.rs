//! Remote playback: the service transport, command dispatch, status polling
//! and playlist export.

mod auth;
mod controller;
mod export;
mod poller;
mod spotify;
mod transport;
mod types;

pub use auth::{Credentials, client};
pub use controller::{PlayOutcome, RemoteOptions, RemotePlaybackController};
pub use poller::{PollEvent, PollerHandle, spawn_poller};
pub use spotify::{SpotifyTransport, client_error};
pub use transport::{BrowserOpener, LinkOpener, RemoteTransport};
pub use types::*;
