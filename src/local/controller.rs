//! Command dispatch for local file playback.

use crate::error::{CommandError, ValidationError};
use crate::library::LocalTrack;

use super::engine::AudioEngine;
use super::playlist::LocalPlaylist;

/// Owns the playlist, the engine handle and the local playback state.
///
/// Only the UI thread touches it, so nothing here is synchronized.
pub struct LocalPlaybackController<E: AudioEngine> {
    engine: E,
    playlist: LocalPlaylist,
    playing: bool,
    volume: f32,
    message: String,
}

impl<E: AudioEngine> LocalPlaybackController<E> {
    /// `initial_volume` is a percentage and gets clamped like [`Self::set_volume`].
    pub fn new(mut engine: E, initial_volume: u8) -> Self {
        let volume = percent_to_volume(i32::from(initial_volume));
        engine.set_volume(volume);
        Self {
            engine,
            playlist: LocalPlaylist::new(),
            playing: false,
            volume,
            message: "No files loaded".to_string(),
        }
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        self.playlist.tracks()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.playlist.current_index()
    }

    pub fn current(&self) -> Option<&LocalTrack> {
        self.playlist.current()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Append tracks whose path is not listed yet, in the given order.
    /// Returns how many were added.
    pub fn add_files(&mut self, tracks: impl IntoIterator<Item = LocalTrack>) -> usize {
        let added = tracks
            .into_iter()
            .filter(|t| self.playlist.add(t.clone()))
            .count();
        log::info!("added {added} local files, {} total", self.playlist.len());
        self.message = format!("Playlist: {} files", self.playlist.len());
        added
    }

    /// Empty the playlist. Whatever is playing keeps playing.
    pub fn clear(&mut self) {
        self.playlist.clear();
        self.message = "Playlist cleared".to_string();
    }

    pub fn play_at(&mut self, index: usize) -> Result<(), CommandError> {
        if !self.playlist.select(index) {
            return Err(ValidationError::NoSelection.into());
        }
        self.start_current()
    }

    pub fn toggle_pause(&mut self) {
        if self.playing {
            self.engine.pause();
            self.playing = false;
            self.message = "Paused".to_string();
        } else {
            self.engine.unpause();
            self.playing = true;
            self.message = "Resumed".to_string();
        }
    }

    pub fn stop(&mut self) {
        self.engine.stop();
        self.playing = false;
        self.message = "Stopped".to_string();
    }

    /// Wrap to the next file and play it. Does nothing on an empty playlist.
    pub fn next(&mut self) -> Result<(), CommandError> {
        if self.playlist.advance().is_none() {
            return Ok(());
        }
        self.stop();
        self.start_current()
    }

    /// Wrap to the previous file and play it. Does nothing on an empty playlist.
    pub fn previous(&mut self) -> Result<(), CommandError> {
        if self.playlist.retreat().is_none() {
            return Ok(());
        }
        self.stop();
        self.start_current()
    }

    /// Percent in, clamped to 0-100; stored and applied as a fraction.
    pub fn set_volume(&mut self, percent: i32) -> f32 {
        self.volume = percent_to_volume(percent);
        self.engine.set_volume(self.volume);
        self.message = format!("Volume: {:.1}", self.volume);
        self.volume
    }

    fn start_current(&mut self) -> Result<(), CommandError> {
        let Some(track) = self.playlist.current() else {
            return Err(ValidationError::NoSelection.into());
        };
        let display = track.display.clone();

        // A failed load leaves `playing` as it was.
        self.engine.load(&track.path)?;
        self.engine.play();
        self.playing = true;
        log::info!("local play {display}");
        self.message = format!("Playing: {display}");
        Ok(())
    }
}

fn percent_to_volume(percent: i32) -> f32 {
    percent.clamp(0, 100) as f32 / 100.0
}
