//! Dispatch of user commands to the remote service, and the reconciled view
//! of what the service is doing.
//!
//! The controller lives on the UI thread. Poll observations reach it through
//! [`RemotePlaybackController::apply_poll`]; nothing else writes its status.

use std::path::Path;
use std::sync::Arc;

use crate::error::{CommandError, ValidationError};

use super::export::write_export;
use super::transport::{LinkOpener, RemoteTransport};
use super::types::{
    AudioFeatures, CurrentPlayback, ExportEntry, ExportSummary, PlaylistSummary, RemotePlaybackStatus,
    RepeatMode, Track,
};

/// Behavior switches taken from `[remote]` settings.
#[derive(Debug, Clone)]
pub struct RemoteOptions {
    pub search_limit: u32,
    pub public_playlists: bool,
    pub show_stopped_when_idle: bool,
}

/// Result of [`RemotePlaybackController::play`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Playback started remotely; features for this track id should be refreshed.
    Started(Option<String>),
    /// The service refused; the track's web link was opened instead.
    OpenedInBrowser,
}

pub struct RemotePlaybackController {
    transport: Arc<dyn RemoteTransport>,
    opener: Box<dyn LinkOpener>,
    options: RemoteOptions,

    results: Vec<Track>,
    status: Option<RemotePlaybackStatus>,
    last_track_uri: Option<String>,
    features: Option<AudioFeatures>,
    volume: u8,
    message: String,
}

impl RemotePlaybackController {
    pub fn new(
        transport: Arc<dyn RemoteTransport>,
        opener: Box<dyn LinkOpener>,
        options: RemoteOptions,
    ) -> Self {
        Self {
            transport,
            opener,
            options,
            results: Vec::new(),
            status: None,
            last_track_uri: None,
            features: None,
            volume: 50,
            message: "Connected".to_string(),
        }
    }

    /// Clone of the transport handle, for the poller thread.
    pub fn transport(&self) -> Arc<dyn RemoteTransport> {
        self.transport.clone()
    }

    pub fn results(&self) -> &[Track] {
        &self.results
    }

    pub fn status(&self) -> Option<&RemotePlaybackStatus> {
        self.status.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn features(&self) -> Option<&AudioFeatures> {
        self.features.as_ref()
    }

    /// Last volume sent, or last reported by the active device.
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Replace the result set with a fresh search. Prior results survive a failure.
    pub fn search(&mut self, query: &str) -> Result<usize, CommandError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }
        let tracks = self
            .transport
            .search_tracks(query, self.options.search_limit)?;
        let count = tracks.len();
        log::info!("search {query:?}: {count} tracks");
        self.results = tracks;
        self.message = format!("Found {count} tracks");
        Ok(count)
    }

    /// Start the search result at `index`. A rejection falls back to opening
    /// the track's web link and leaves the reconciled status alone.
    pub fn play(&mut self, index: usize) -> Result<PlayOutcome, CommandError> {
        let track = self
            .results
            .get(index)
            .cloned()
            .ok_or(ValidationError::NoSelection)?;

        match self.transport.start_playback(&track.uri) {
            Ok(()) => {
                log::info!("remote play {}", track.uri);
                self.message = format!("Playing: {}", track.name);
                self.last_track_uri = Some(track.uri.clone());
                Ok(PlayOutcome::Started(track.id))
            }
            Err(err) => {
                log::warn!("remote play rejected ({err}); opening {}", track.external_url);
                if let Err(open_err) = self.opener.open(&track.external_url) {
                    log::warn!("failed to open {}: {open_err}", track.external_url);
                    return Err(err.into());
                }
                self.message = format!("Opened in browser: {}", track.name);
                Ok(PlayOutcome::OpenedInBrowser)
            }
        }
    }

    pub fn pause(&mut self) -> Result<(), CommandError> {
        self.transport.pause()?;
        self.message = "Paused".to_string();
        Ok(())
    }

    /// The service has no hard stop; stopping pauses.
    pub fn stop(&mut self) -> Result<(), CommandError> {
        self.transport.pause()?;
        self.message = "Stopped".to_string();
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), CommandError> {
        self.transport.next_track()?;
        Ok(())
    }

    pub fn previous(&mut self) -> Result<(), CommandError> {
        self.transport.previous_track()?;
        Ok(())
    }

    /// Read the remote shuffle flag and send its complement.
    pub fn toggle_shuffle(&mut self) -> Result<bool, CommandError> {
        let next = !self.transport.shuffle_state()?;
        self.transport.set_shuffle(next)?;
        self.message = format!("Shuffle: {}", if next { "On" } else { "Off" });
        Ok(next)
    }

    /// Alternate remote repeat between `off` and `context`.
    pub fn toggle_repeat(&mut self) -> Result<RepeatMode, CommandError> {
        let next = self.transport.repeat_state()?.toggled();
        self.transport.set_repeat(next)?;
        self.message = format!("Repeat: {next}");
        Ok(next)
    }

    /// Values outside 0-100 are clamped.
    pub fn set_volume(&mut self, percent: i32) -> Result<u8, CommandError> {
        let percent = percent.clamp(0, 100) as u8;
        self.transport.set_volume(percent)?;
        self.volume = percent;
        self.message = format!("Volume: {percent}%");
        Ok(percent)
    }

    /// Seek to a whole number of seconds given as raw user input.
    pub fn seek(&mut self, input: &str) -> Result<u64, CommandError> {
        let secs = parse_seek_seconds(input)?;
        self.transport.seek(secs.saturating_mul(1000))?;
        self.message = format!("Seeked to {secs}s");
        Ok(secs)
    }

    pub fn create_playlist(
        &mut self,
        name: &str,
        tracks: &[Track],
    ) -> Result<PlaylistSummary, CommandError> {
        if tracks.is_empty() {
            return Err(ValidationError::NoSelection.into());
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyPlaylistName.into());
        }

        let user_id = self.transport.current_user_id()?;
        let playlist = self
            .transport
            .create_playlist(&user_id, name, self.options.public_playlists)?;
        let uris = uris_of(tracks);
        self.transport.add_to_playlist(&playlist.id, &uris)?;

        log::info!("created playlist {} ({}) with {} tracks", playlist.name, playlist.id, uris.len());
        self.message = format!("Playlist '{}' created", playlist.name);
        Ok(PlaylistSummary {
            id: playlist.id,
            name: playlist.name,
            added: uris.len(),
        })
    }

    pub fn add_to_playlist(
        &mut self,
        playlist_id: &str,
        tracks: &[Track],
    ) -> Result<usize, CommandError> {
        if tracks.is_empty() {
            return Err(ValidationError::NoSelection.into());
        }
        let playlist_id = playlist_id.trim();
        if playlist_id.is_empty() {
            return Err(ValidationError::EmptyPlaylistId.into());
        }

        let uris = uris_of(tracks);
        self.transport.add_to_playlist(playlist_id, &uris)?;
        log::info!("added {} tracks to {playlist_id}", uris.len());
        self.message = format!("Added to {playlist_id}");
        Ok(uris.len())
    }

    /// Write `<dir>/<playlist_id>_export.json`. Items whose track is gone are skipped.
    pub fn export_playlist(
        &mut self,
        playlist_id: &str,
        dir: &Path,
    ) -> Result<ExportSummary, CommandError> {
        let playlist_id = playlist_id.trim();
        if playlist_id.is_empty() {
            return Err(ValidationError::EmptyPlaylistId.into());
        }

        let entries: Vec<ExportEntry> = self
            .transport
            .playlist_items(playlist_id)?
            .into_iter()
            .filter_map(|item| item.track)
            .map(|track| ExportEntry {
                name: track.name,
                artist: track.artist,
                uri: track.uri,
            })
            .collect();

        let summary = write_export(dir, playlist_id, &entries)?;
        log::info!("exported {} tracks to {}", summary.count, summary.path.display());
        self.message = format!("Exported {} tracks to {}", summary.count, summary.path.display());
        Ok(summary)
    }

    /// Fetch audio features for `track_id`. Failures only get logged.
    pub fn refresh_features(&mut self, track_id: &str) {
        match self.transport.audio_features(track_id) {
            Ok(Some(features)) => self.features = Some(features),
            Ok(None) => log::debug!("no audio features for {track_id}"),
            Err(e) => log::warn!("audio features for {track_id}: {e}"),
        }
    }

    /// Reconcile with one poll observation. Returns the track id whose features
    /// should be refreshed, at most once per track change. Tracks without an
    /// id (local files) update the status but never ask for features.
    pub fn apply_poll(&mut self, observed: Option<CurrentPlayback>) -> Option<String> {
        let Some(playback) = observed else {
            if self.options.show_stopped_when_idle {
                self.status = None;
                self.message = "Stopped".to_string();
            }
            return None;
        };

        let status = RemotePlaybackStatus::from(&playback);
        let mut changed = None;
        if let Some(volume) = playback.volume_percent {
            self.volume = volume;
        }

        match (&playback.track, playback.is_playing) {
            (Some(track), true) => {
                self.message = format!(
                    "Playing: {} - {} | {:.0}s",
                    track.name,
                    track.artist,
                    status.progress.as_secs_f64()
                );
                if self.last_track_uri.as_deref() != Some(track.uri.as_str()) {
                    log::debug!("remote track changed to {}", track.uri);
                    self.last_track_uri = Some(track.uri.clone());
                    changed = track.id.clone();
                }
            }
            (_, false) => self.message = "Paused".to_string(),
            // Playing something that is not a track (an episode or an ad).
            (None, true) => {}
        }

        self.status = Some(status);
        changed
    }
}

fn uris_of(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.uri.clone()).collect()
}

/// A seek target is a non-negative whole number of seconds.
fn parse_seek_seconds(input: &str) -> Result<u64, ValidationError> {
    input
        .trim()
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidSeek(input.to_string()))
}
