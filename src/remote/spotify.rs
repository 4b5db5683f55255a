//! Web API transport backed by `rspotify`'s blocking client.

use chrono::TimeDelta;
use rspotify::http::HttpError;
use rspotify::model as api;
use rspotify::prelude::*;
use rspotify::{AuthCodeSpotify, ClientError};
use serde_json::Value;

use crate::error::TransportError;

use super::transport::RemoteTransport;
use super::types::{AudioFeatures, CurrentPlayback, PlaylistItem, PlaylistRef, RepeatMode, Track};

/// The service accepts at most this many URIs per add request.
const ADD_BATCH: usize = 100;

/// Turn an `rspotify` failure into a message a user can read.
pub fn client_error(err: ClientError) -> TransportError {
    match err {
        ClientError::Http(http) => match *http {
            HttpError::StatusCode(response) => {
                let code = response.status();
                let fallback = response.status_text().to_string();
                let body = response.into_string().unwrap_or_default();
                TransportError::Status {
                    code,
                    message: error_message(&body).unwrap_or(fallback),
                }
            }
            other => TransportError::Network(other.to_string()),
        },
        ClientError::InvalidToken => TransportError::Auth("no valid access token".to_string()),
        ClientError::ParseJson(e) => TransportError::Decode(e.to_string()),
        other => TransportError::Network(other.to_string()),
    }
}

/// API errors look like `{"error": {"status": 404, "message": "..."}}`, account
/// errors like `{"error": "invalid_grant", "error_description": "..."}`.
fn error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    let error = parsed.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| parsed.get("error_description").and_then(Value::as_str))
        .or_else(|| error.as_str())
        .map(str::to_string)
}

fn invalid_id(id: &str) -> TransportError {
    TransportError::InvalidId(id.to_string())
}

fn track_id(uri_or_id: &str) -> Result<api::TrackId<'_>, TransportError> {
    api::TrackId::from_id_or_uri(uri_or_id.trim()).map_err(|_| invalid_id(uri_or_id))
}

fn playlist_id(id: &str) -> Result<api::PlaylistId<'_>, TransportError> {
    api::PlaylistId::from_id_or_uri(id.trim()).map_err(|_| invalid_id(id))
}

/// Local files have no id, so the service names them by their tags:
/// `spotify:local:<artist>:<album>:<title>:<seconds>`, form-encoded.
fn local_uri(artist: &str, album: &str, title: &str, seconds: i64) -> String {
    let part = |s: &str| urlencoding::encode(s).replace("%20", "+");
    format!(
        "spotify:local:{}:{}:{}:{seconds}",
        part(artist),
        part(album),
        part(title)
    )
}

fn track_from(full: &api::FullTrack) -> Track {
    let first_artist = full.artists.first().map(|a| a.name.as_str());
    let uri = match &full.id {
        Some(id) => id.uri(),
        None => local_uri(
            first_artist.unwrap_or_default(),
            &full.album.name,
            &full.name,
            full.duration.num_seconds(),
        ),
    };
    let name = if full.name.is_empty() {
        "Unknown Title"
    } else {
        full.name.as_str()
    };
    Track {
        id: full.id.as_ref().map(|id| id.id().to_string()),
        name: name.to_string(),
        artist: first_artist.unwrap_or("Unknown Artist").to_string(),
        uri,
        external_url: full.external_urls.get("spotify").cloned().unwrap_or_default(),
    }
}

/// Episodes and other non-track items are treated as missing.
fn playable_track(item: &api::PlayableItem) -> Option<Track> {
    match item {
        api::PlayableItem::Track(full) => Some(track_from(full)),
        _ => None,
    }
}

fn repeat_from(state: api::RepeatState) -> RepeatMode {
    match state {
        api::RepeatState::Off => RepeatMode::Off,
        api::RepeatState::Context => RepeatMode::Context,
        api::RepeatState::Track => RepeatMode::Track,
    }
}

fn repeat_to(mode: RepeatMode) -> api::RepeatState {
    match mode {
        RepeatMode::Off => api::RepeatState::Off,
        RepeatMode::Context => api::RepeatState::Context,
        RepeatMode::Track => api::RepeatState::Track,
    }
}

fn playback_from(ctx: &api::CurrentPlaybackContext) -> CurrentPlayback {
    CurrentPlayback {
        is_playing: ctx.is_playing,
        track: ctx.item.as_ref().and_then(playable_track),
        progress_ms: ctx
            .progress
            .map(|p| p.num_milliseconds().max(0) as u64)
            .unwrap_or(0),
        shuffle_state: ctx.shuffle_state,
        repeat_state: repeat_from(ctx.repeat_state),
        volume_percent: ctx.device.volume_percent.map(|v| v.min(100) as u8),
    }
}

pub struct SpotifyTransport {
    client: AuthCodeSpotify,
}

impl SpotifyTransport {
    /// `client` must already hold a token.
    pub fn new(client: AuthCodeSpotify) -> Self {
        Self { client }
    }
}

impl RemoteTransport for SpotifyTransport {
    fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, TransportError> {
        let result = self
            .client
            .search(query, api::SearchType::Track, None, None, Some(limit), None)
            .map_err(client_error)?;
        let api::SearchResult::Tracks(page) = result else {
            return Err(TransportError::Decode("search: no track results".to_string()));
        };
        // Results without an id cannot be played or looked up.
        Ok(page
            .items
            .iter()
            .filter(|t| t.id.is_some())
            .map(track_from)
            .collect())
    }

    fn start_playback(&self, uri: &str) -> Result<(), TransportError> {
        let id = track_id(uri)?;
        self.client
            .start_uris_playback([api::PlayableId::Track(id)], None, None, None)
            .map_err(client_error)
    }

    fn pause(&self) -> Result<(), TransportError> {
        self.client.pause_playback(None).map_err(client_error)
    }

    fn next_track(&self) -> Result<(), TransportError> {
        self.client.next_track(None).map_err(client_error)
    }

    fn previous_track(&self) -> Result<(), TransportError> {
        self.client.previous_track(None).map_err(client_error)
    }

    fn shuffle_state(&self) -> Result<bool, TransportError> {
        Ok(self
            .current_playback()?
            .map(|p| p.shuffle_state)
            .unwrap_or(false))
    }

    fn set_shuffle(&self, on: bool) -> Result<(), TransportError> {
        self.client.shuffle(on, None).map_err(client_error)
    }

    fn repeat_state(&self) -> Result<RepeatMode, TransportError> {
        Ok(self
            .current_playback()?
            .map(|p| p.repeat_state)
            .unwrap_or_default())
    }

    fn set_repeat(&self, mode: RepeatMode) -> Result<(), TransportError> {
        self.client.repeat(repeat_to(mode), None).map_err(client_error)
    }

    fn set_volume(&self, percent: u8) -> Result<(), TransportError> {
        self.client
            .volume(percent.min(100), None)
            .map_err(client_error)
    }

    fn seek(&self, position_ms: u64) -> Result<(), TransportError> {
        let position = TimeDelta::milliseconds(i64::try_from(position_ms).unwrap_or(i64::MAX));
        self.client.seek_track(position, None).map_err(client_error)
    }

    fn current_playback(&self) -> Result<Option<CurrentPlayback>, TransportError> {
        let ctx = self
            .client
            .current_playback(None, Some(&[api::AdditionalType::Track]))
            .map_err(client_error)?;
        Ok(ctx.as_ref().map(playback_from))
    }

    fn audio_features(&self, track: &str) -> Result<Option<AudioFeatures>, TransportError> {
        let f = self
            .client
            .track_features(track_id(track)?)
            .map_err(client_error)?;
        Ok(Some(AudioFeatures {
            track_id: f.id.id().to_string(),
            danceability: f64::from(f.danceability),
            energy: f64::from(f.energy),
            speechiness: f64::from(f.speechiness),
            acousticness: f64::from(f.acousticness),
            instrumentalness: f64::from(f.instrumentalness),
            liveness: f64::from(f.liveness),
            valence: f64::from(f.valence),
        }))
    }

    fn current_user_id(&self) -> Result<String, TransportError> {
        let user = self.client.current_user().map_err(client_error)?;
        Ok(user.id.id().to_string())
    }

    fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<PlaylistRef, TransportError> {
        let user = api::UserId::from_id(user_id).map_err(|_| invalid_id(user_id))?;
        let created = self
            .client
            .user_playlist_create(user, name, Some(public), None, None)
            .map_err(client_error)?;
        Ok(PlaylistRef {
            id: created.id.id().to_string(),
            name: created.name,
        })
    }

    fn add_to_playlist(&self, playlist: &str, uris: &[String]) -> Result<(), TransportError> {
        let playlist = playlist_id(playlist)?;
        let ids = uris
            .iter()
            .map(|uri| track_id(uri).map(api::PlayableId::Track))
            .collect::<Result<Vec<_>, _>>()?;
        for batch in ids.chunks(ADD_BATCH) {
            self.client
                .playlist_add_items(playlist.as_ref(), batch.iter().map(|id| id.as_ref()), None)
                .map_err(client_error)?;
        }
        Ok(())
    }

    fn playlist_items(&self, playlist: &str) -> Result<Vec<PlaylistItem>, TransportError> {
        let playlist = playlist_id(playlist)?;
        self.client
            .playlist_items(playlist, None, None)
            .map(|item| {
                item.map(|entry| PlaylistItem {
                    track: entry.track.as_ref().and_then(playable_track),
                })
                .map_err(client_error)
            })
            .collect()
    }
}
