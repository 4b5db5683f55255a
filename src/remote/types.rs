//! Remote playback data types.
//!
//! These are the projections the rest of the app works with; the wire format
//! of the service stays inside `remote::spotify`.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A track as returned by a search, a playlist listing or the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// `None` for the user's own local files added to a playlist.
    pub id: Option<String>,
    pub name: String,
    /// Name of the first credited artist.
    pub artist: String,
    /// `spotify:track:...`, or `spotify:local:...` for local files.
    pub uri: String,
    /// Web player link, used when playback cannot be started remotely.
    pub external_url: String,
}

impl Track {
    /// Label used in result lists: `Name - Artist`.
    pub fn display(&self) -> String {
        format!("{} - {}", self.name, self.artist)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RepeatMode {
    #[default]
    Off,
    Context,
    /// Reported by the service; never produced by the repeat toggle.
    Track,
}

impl RepeatMode {
    /// Wire name used by the service.
    pub fn as_str(self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::Context => "context",
            RepeatMode::Track => "track",
        }
    }

    /// Repeat only alternates between `off` and `context`.
    pub fn toggled(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::Context,
            RepeatMode::Context | RepeatMode::Track => RepeatMode::Off,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of the remote player, as returned by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentPlayback {
    pub is_playing: bool,
    pub track: Option<Track>,
    pub progress_ms: u64,
    pub shuffle_state: bool,
    pub repeat_state: RepeatMode,
    /// Volume of the active device, when it reports one.
    pub volume_percent: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub uri: String,
    pub name: String,
    pub artist: String,
}

/// Reconciled view of the remote player. Rebuilt from every poll, never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlaybackStatus {
    pub track: Option<NowPlaying>,
    pub is_playing: bool,
    pub progress: Duration,
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

impl From<&CurrentPlayback> for RemotePlaybackStatus {
    fn from(p: &CurrentPlayback) -> Self {
        Self {
            track: p.track.as_ref().map(|t| NowPlaying {
                uri: t.uri.clone(),
                name: t.name.clone(),
                artist: t.artist.clone(),
            }),
            is_playing: p.is_playing,
            progress: Duration::from_millis(p.progress_ms),
            shuffle: p.shuffle_state,
            repeat: p.repeat_state,
        }
    }
}

/// Audio features of one track, each in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFeatures {
    pub track_id: String,
    pub danceability: f64,
    pub energy: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
}

impl AudioFeatures {
    /// Named values in plotting order.
    pub fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("danceability", self.danceability),
            ("energy", self.energy),
            ("speechiness", self.speechiness),
            ("acousticness", self.acousticness),
            ("instrumentalness", self.instrumentalness),
            ("liveness", self.liveness),
            ("valence", self.valence),
        ]
    }
}

/// A playlist entry; `track` is `None` when the underlying item is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub added: usize,
}

/// Flattened projection written to the export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub name: String,
    pub artist: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub count: usize,
}
