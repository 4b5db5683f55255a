use super::cleanup_token_cache;
use super::event_loop::Session;
use crate::app::{PromptKind, Tab};
use crate::config::{RemoteSettings, Settings};
use crate::error::{LoadError, TransportError};
use crate::local::{AudioEngine, LocalPlaybackController};
use crate::remote::{
    AudioFeatures, CurrentPlayback, LinkOpener, PlaylistItem, PlaylistRef, PollEvent,
    RemoteOptions, RemotePlaybackController, RemoteTransport, RepeatMode, Track,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
    fail_loads: AtomicBool,
}

impl Recorder {
    fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

fn track(id: &str) -> Track {
    Track {
        id: Some(id.to_string()),
        name: format!("Song {id}"),
        artist: "Artist".to_string(),
        uri: format!("spotify:track:{id}"),
        external_url: format!("https://open.spotify.com/track/{id}"),
    }
}

struct StubTransport {
    rec: Arc<Recorder>,
}

impl RemoteTransport for StubTransport {
    fn search_tracks(&self, query: &str, _limit: u32) -> Result<Vec<Track>, TransportError> {
        self.rec.push(format!("search {query}"));
        Ok(vec![track("a"), track("b")])
    }
    fn start_playback(&self, uri: &str) -> Result<(), TransportError> {
        self.rec.push(format!("play {uri}"));
        Ok(())
    }
    fn pause(&self) -> Result<(), TransportError> {
        self.rec.push("pause");
        Ok(())
    }
    fn next_track(&self) -> Result<(), TransportError> {
        Ok(())
    }
    fn previous_track(&self) -> Result<(), TransportError> {
        Ok(())
    }
    fn shuffle_state(&self) -> Result<bool, TransportError> {
        Ok(false)
    }
    fn set_shuffle(&self, _on: bool) -> Result<(), TransportError> {
        Ok(())
    }
    fn repeat_state(&self) -> Result<RepeatMode, TransportError> {
        Ok(RepeatMode::Off)
    }
    fn set_repeat(&self, _mode: RepeatMode) -> Result<(), TransportError> {
        Ok(())
    }
    fn set_volume(&self, percent: u8) -> Result<(), TransportError> {
        self.rec.push(format!("volume {percent}"));
        Ok(())
    }
    fn seek(&self, position_ms: u64) -> Result<(), TransportError> {
        self.rec.push(format!("seek {position_ms}"));
        Ok(())
    }
    fn current_playback(&self) -> Result<Option<CurrentPlayback>, TransportError> {
        Ok(None)
    }
    fn audio_features(&self, track_id: &str) -> Result<Option<AudioFeatures>, TransportError> {
        self.rec.push(format!("features {track_id}"));
        Ok(None)
    }
    fn current_user_id(&self) -> Result<String, TransportError> {
        Ok("me".to_string())
    }
    fn create_playlist(
        &self,
        _user_id: &str,
        name: &str,
        _public: bool,
    ) -> Result<PlaylistRef, TransportError> {
        Ok(PlaylistRef {
            id: "pl".to_string(),
            name: name.to_string(),
        })
    }
    fn add_to_playlist(&self, playlist_id: &str, uris: &[String]) -> Result<(), TransportError> {
        self.rec
            .push(format!("add {playlist_id} {}", uris.join(",")));
        Ok(())
    }
    fn playlist_items(&self, _playlist_id: &str) -> Result<Vec<PlaylistItem>, TransportError> {
        Ok(Vec::new())
    }
}

struct NoBrowser;

impl LinkOpener for NoBrowser {
    fn open(&self, _url: &str) -> Result<(), String> {
        Err("no browser".to_string())
    }
}

struct StubEngine {
    rec: Arc<Recorder>,
}

impl AudioEngine for StubEngine {
    fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        if self.rec.fail_loads.load(Ordering::SeqCst) {
            return Err(LoadError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "bad file"),
            });
        }
        self.rec.push(format!("load {}", path.display()));
        Ok(())
    }
    fn play(&mut self) {
        self.rec.push("play");
    }
    fn pause(&mut self) {
        self.rec.push("pause");
    }
    fn unpause(&mut self) {
        self.rec.push("unpause");
    }
    fn stop(&mut self) {
        self.rec.push("stop");
    }
    fn set_volume(&mut self, _volume: f32) {}
}

struct Fixture {
    session: Session<StubEngine>,
    remote: Arc<Recorder>,
    engine: Arc<Recorder>,
}

fn fixture(settings: Settings) -> Fixture {
    let remote_rec = Arc::new(Recorder::default());
    let engine_rec = Arc::new(Recorder::default());
    let remote = RemotePlaybackController::new(
        Arc::new(StubTransport {
            rec: remote_rec.clone(),
        }),
        Box::new(NoBrowser),
        RemoteOptions {
            search_limit: settings.remote.search_limit,
            public_playlists: true,
            show_stopped_when_idle: false,
        },
    );
    let local = LocalPlaybackController::new(
        StubEngine {
            rec: engine_rec.clone(),
        },
        50,
    );
    Fixture {
        session: Session::new(settings, remote, local),
        remote: remote_rec,
        engine: engine_rec,
    }
}

fn press(session: &mut Session<StubEngine>, code: KeyCode) -> bool {
    session.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_text(session: &mut Session<StubEngine>, text: &str) {
    for c in text.chars() {
        press(session, KeyCode::Char(c));
    }
}

fn with_local_file(f: &mut Fixture, dir: &Path) {
    let file = dir.join("song.mp3");
    std::fs::write(&file, b"x").unwrap();
    f.session.app.tab = Tab::Local;
    press(&mut f.session, KeyCode::Char('o'));
    type_text(&mut f.session, &file.display().to_string());
    press(&mut f.session, KeyCode::Enter);
}

fn playing(id: &str) -> CurrentPlayback {
    CurrentPlayback {
        is_playing: true,
        track: Some(track(id)),
        progress_ms: 0,
        shuffle_state: false,
        repeat_state: RepeatMode::Off,
        volume_percent: None,
    }
}

#[test]
fn search_prompt_runs_query_and_resets_cursor() {
    let mut f = fixture(Settings::default());
    let s = &mut f.session;
    s.app.remote_cursor = 5;

    press(s, KeyCode::Char('/'));
    assert_eq!(s.app.prompt.as_ref().map(|p| p.kind), Some(PromptKind::Search));
    type_text(s, "queen");
    press(s, KeyCode::Enter);

    assert!(s.app.prompt.is_none());
    assert_eq!(s.remote.results().len(), 2);
    assert_eq!(s.app.remote_cursor, 0);
    assert_eq!(f.remote.count("search queen"), 1);
}

#[test]
fn blank_search_becomes_a_notice() {
    let mut f = fixture(Settings::default());
    let s = &mut f.session;
    press(s, KeyCode::Char('/'));
    press(s, KeyCode::Enter);

    assert!(s.app.error(Tab::Remote).is_some());
    assert_eq!(f.remote.count("search"), 0);
}

#[test]
fn quit_key_is_text_inside_a_prompt() {
    let mut f = fixture(Settings::default());
    let s = &mut f.session;
    press(s, KeyCode::Char('/'));
    assert!(!press(s, KeyCode::Char('q')));
    assert_eq!(s.app.prompt.as_ref().unwrap().input, "q");
    press(s, KeyCode::Esc);
    assert!(press(s, KeyCode::Char('q')));
}

#[test]
fn ctrl_c_always_quits() {
    let mut f = fixture(Settings::default());
    press(&mut f.session, KeyCode::Char('/'));
    assert!(
        f.session
            .handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
    );
}

#[test]
fn invalid_seek_input_sends_nothing() {
    let mut f = fixture(Settings::default());
    let s = &mut f.session;
    press(s, KeyCode::Char('g'));
    type_text(s, "soon");
    press(s, KeyCode::Enter);

    assert!(s.app.error(Tab::Remote).is_some());
    assert_eq!(f.remote.count("seek"), 0);

    press(s, KeyCode::Char('g'));
    type_text(s, "30");
    press(s, KeyCode::Enter);
    assert!(s.app.error(Tab::Remote).is_none());
    assert_eq!(f.remote.count("seek 30000"), 1);
}

#[test]
fn remote_volume_keys_step_and_clamp() {
    let mut f = fixture(Settings::default());
    let s = &mut f.session;
    for _ in 0..20 {
        press(s, KeyCode::Char('+'));
    }
    assert_eq!(s.remote.volume(), 100);
    press(s, KeyCode::Char('-'));
    assert_eq!(s.remote.volume(), 95);
}

#[test]
fn add_to_playlist_uses_marked_results() {
    let mut f = fixture(Settings::default());
    let s = &mut f.session;
    press(s, KeyCode::Char('/'));
    type_text(s, "x");
    press(s, KeyCode::Enter);

    press(s, KeyCode::Char('j'));
    press(s, KeyCode::Char(' '));
    press(s, KeyCode::Char('a'));
    type_text(s, "pl9");
    press(s, KeyCode::Enter);

    assert_eq!(f.remote.count("add pl9 spotify:track:b"), 1);
}

#[test]
fn poll_events_refresh_features_once_per_track() {
    let mut f = fixture(Settings::default());
    let s = &mut f.session;
    s.apply_poll_event(PollEvent::Playback(Some(playing("a"))));
    s.apply_poll_event(PollEvent::Playback(Some(playing("a"))));
    s.apply_poll_event(PollEvent::Playback(None));
    assert_eq!(f.remote.count("features a"), 1);

    s.apply_poll_event(PollEvent::Playback(Some(playing("b"))));
    assert_eq!(f.remote.count("features"), 2);
}

#[test]
fn adding_a_missing_path_reports_on_the_local_tab() {
    let mut f = fixture(Settings::default());
    let s = &mut f.session;
    s.app.tab = Tab::Local;
    press(s, KeyCode::Char('o'));
    type_text(s, "/definitely/not/here.mp3");
    press(s, KeyCode::Enter);

    assert!(s.app.error(Tab::Local).is_some());
    assert!(s.app.error(Tab::Remote).is_none());
    assert!(s.local.tracks().is_empty());
}

#[test]
fn local_keys_add_and_play() {
    let dir = tempfile::tempdir().unwrap();
    let mut f = fixture(Settings::default());
    with_local_file(&mut f, dir.path());

    assert_eq!(f.session.local.tracks().len(), 1);
    press(&mut f.session, KeyCode::Enter);
    assert!(f.session.local.is_playing());
    assert_eq!(f.engine.count("load"), 1);

    press(&mut f.session, KeyCode::Char(' '));
    assert!(!f.session.local.is_playing());
}

#[test]
fn both_backends_may_play_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let mut f = fixture(Settings::default());
    with_local_file(&mut f, dir.path());
    press(&mut f.session, KeyCode::Enter);

    f.session.apply_poll_event(PollEvent::Playback(Some(playing("z"))));
    f.session.app.tab = Tab::Remote;
    press(&mut f.session, KeyCode::Char('/'));
    type_text(&mut f.session, "x");
    press(&mut f.session, KeyCode::Enter);
    press(&mut f.session, KeyCode::Enter);

    assert!(f.session.local.is_playing());
    assert_eq!(f.engine.count("stop"), 0);
}

#[test]
fn exclusive_mode_stops_local_when_remote_starts() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.playback.exclusive = true;
    let mut f = fixture(settings);
    with_local_file(&mut f, dir.path());
    press(&mut f.session, KeyCode::Enter);
    assert!(f.session.local.is_playing());

    f.session.app.tab = Tab::Remote;
    press(&mut f.session, KeyCode::Char('/'));
    type_text(&mut f.session, "x");
    press(&mut f.session, KeyCode::Enter);
    press(&mut f.session, KeyCode::Enter);

    assert!(!f.session.local.is_playing());
    assert_eq!(f.engine.count("stop"), 1);
}

#[test]
fn exclusive_mode_pauses_remote_when_local_starts() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.playback.exclusive = true;
    let mut f = fixture(settings);
    with_local_file(&mut f, dir.path());

    f.session.apply_poll_event(PollEvent::Playback(Some(playing("z"))));
    press(&mut f.session, KeyCode::Enter);

    assert_eq!(f.remote.count("pause"), 1);
    assert!(f.session.local.is_playing());
}

#[test]
fn exclusive_mode_leaves_remote_alone_when_local_does_not_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.playback.exclusive = true;
    let mut f = fixture(settings);
    f.session.apply_poll_event(PollEvent::Playback(Some(playing("z"))));
    f.session.app.tab = Tab::Local;

    // Empty playlist: next and previous have nothing to start.
    press(&mut f.session, KeyCode::Char('n'));
    press(&mut f.session, KeyCode::Char('b'));
    assert!(!f.session.local.is_playing());
    assert_eq!(f.remote.count("pause"), 0);

    with_local_file(&mut f, dir.path());
    f.engine.fail_loads.store(true, Ordering::SeqCst);
    press(&mut f.session, KeyCode::Enter);
    press(&mut f.session, KeyCode::Char('n'));
    assert!(!f.session.local.is_playing());
    assert!(f.session.app.error(Tab::Local).is_some());
    assert_eq!(f.remote.count("pause"), 0);

    f.engine.fail_loads.store(false, Ordering::SeqCst);
    press(&mut f.session, KeyCode::Char('n'));
    assert!(f.session.local.is_playing());
    assert_eq!(f.remote.count("pause"), 1);
}

#[test]
fn token_cache_is_removed_only_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join(".cache");

    std::fs::write(&cache, "{}").unwrap();
    let keep = RemoteSettings {
        token_cache: cache.clone(),
        delete_token_cache_on_exit: false,
        ..RemoteSettings::default()
    };
    assert!(!cleanup_token_cache(&keep));
    assert!(cache.exists());

    let remove = RemoteSettings {
        delete_token_cache_on_exit: true,
        ..keep
    };
    assert!(cleanup_token_cache(&remove));
    assert!(!cache.exists());
    assert!(!cleanup_token_cache(&remove));
}
