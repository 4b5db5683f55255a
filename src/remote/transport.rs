//! The capability the controller and poller use to talk to the remote service.

use crate::error::TransportError;

use super::types::{AudioFeatures, CurrentPlayback, PlaylistItem, PlaylistRef, RepeatMode, Track};

/// Authenticated calls into the remote service.
///
/// Implementations must be shareable between the UI thread and the poller.
pub trait RemoteTransport: Send + Sync {
    fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, TransportError>;

    fn start_playback(&self, uri: &str) -> Result<(), TransportError>;
    fn pause(&self) -> Result<(), TransportError>;
    fn next_track(&self) -> Result<(), TransportError>;
    fn previous_track(&self) -> Result<(), TransportError>;

    fn shuffle_state(&self) -> Result<bool, TransportError>;
    fn set_shuffle(&self, on: bool) -> Result<(), TransportError>;
    fn repeat_state(&self) -> Result<RepeatMode, TransportError>;
    fn set_repeat(&self, mode: RepeatMode) -> Result<(), TransportError>;

    fn set_volume(&self, percent: u8) -> Result<(), TransportError>;
    fn seek(&self, position_ms: u64) -> Result<(), TransportError>;

    /// `Ok(None)` when the service reports no playback at all.
    fn current_playback(&self) -> Result<Option<CurrentPlayback>, TransportError>;

    /// `Ok(None)` when the service has no features for the track.
    fn audio_features(&self, track_id: &str) -> Result<Option<AudioFeatures>, TransportError>;

    fn current_user_id(&self) -> Result<String, TransportError>;
    fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<PlaylistRef, TransportError>;
    fn add_to_playlist(&self, playlist_id: &str, uris: &[String]) -> Result<(), TransportError>;
    /// Every item of the playlist, across all pages.
    fn playlist_items(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>, TransportError>;
}

/// Opens a URL outside the app; the degraded-mode path for `play`.
pub trait LinkOpener {
    fn open(&self, url: &str) -> Result<(), String>;
}

/// Opens links in the user's default browser.
pub struct BrowserOpener;

impl LinkOpener for BrowserOpener {
    fn open(&self, url: &str) -> Result<(), String> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err("empty URL".to_string());
        }
        webbrowser::open(trimmed).map_err(|e| e.to_string())
    }
}
