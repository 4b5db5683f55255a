use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Prompt, PromptKind, Tab};
use crate::config::Settings;
use crate::error::CommandError;
use crate::library;
use crate::local::{AudioEngine, LocalPlaybackController};
use crate::remote::{PlayOutcome, PollEvent, PollerHandle, RemotePlaybackController, Track};
use crate::ui::{self, View};

/// UI-thread state: the app model and both controllers.
///
/// Every key press and every poll observation is applied here, so the
/// controllers never need locking.
pub struct Session<E: AudioEngine> {
    pub app: App,
    pub remote: RemotePlaybackController,
    pub local: LocalPlaybackController<E>,
    settings: Settings,
}

impl<E: AudioEngine> Session<E> {
    pub fn new(
        settings: Settings,
        remote: RemotePlaybackController,
        local: LocalPlaybackController<E>,
    ) -> Self {
        Self {
            app: App::new(Tab::from(settings.ui.start_tab)),
            remote,
            local,
            settings,
        }
    }

    /// Give the local controller back for an orderly shutdown.
    pub fn into_local(self) -> LocalPlaybackController<E> {
        self.local
    }

    pub fn view(&self, poll_failures: u64) -> View<'_, E> {
        View {
            app: &self.app,
            remote: &self.remote,
            local: &self.local,
            poll_failures,
            ui: &self.settings.ui,
        }
    }

    pub fn apply_poll_event(&mut self, event: PollEvent) {
        match event {
            PollEvent::Playback(observed) => {
                if let Some(track_id) = self.remote.apply_poll(observed) {
                    self.remote.refresh_features(&track_id);
                }
            }
        }
    }

    /// Handle one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        if self.app.prompt.is_some() {
            match key.code {
                KeyCode::Esc => self.app.cancel_prompt(),
                KeyCode::Enter => {
                    if let Some(prompt) = self.app.submit_prompt() {
                        self.submit(prompt);
                    }
                }
                KeyCode::Backspace => self.app.pop_prompt_char(),
                KeyCode::Char(c) => self.app.push_prompt_char(c),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab | KeyCode::BackTab => self.app.switch_tab(),
            _ => match self.app.tab {
                Tab::Remote => self.handle_remote_key(key.code),
                Tab::Local => self.handle_local_key(key.code),
            },
        }
        false
    }

    fn handle_remote_key(&mut self, code: KeyCode) {
        let len = self.remote.results().len();
        let step = i32::from(self.settings.local.volume_step);
        match code {
            KeyCode::Char('/') => self.app.open_prompt(PromptKind::Search),
            KeyCode::Char('g') => self.app.open_prompt(PromptKind::Seek),
            KeyCode::Char('c') => self.app.open_prompt(PromptKind::PlaylistName),
            KeyCode::Char('a') => self.app.open_prompt(PromptKind::PlaylistId),
            KeyCode::Char('e') => self.app.open_prompt(PromptKind::ExportId),
            KeyCode::Char('j') | KeyCode::Down => self.app.step_cursor(true, len),
            KeyCode::Char('k') | KeyCode::Up => self.app.step_cursor(false, len),
            KeyCode::Char(' ') => self.app.toggle_mark(len),
            KeyCode::Enter => self.play_remote(),
            KeyCode::Char('p') => {
                let r = self.remote.pause();
                self.report(Tab::Remote, r);
            }
            KeyCode::Char('x') => {
                let r = self.remote.stop();
                self.report(Tab::Remote, r);
            }
            KeyCode::Char('n') => {
                let r = self.remote.next();
                self.report(Tab::Remote, r);
            }
            KeyCode::Char('b') => {
                let r = self.remote.previous();
                self.report(Tab::Remote, r);
            }
            KeyCode::Char('s') => {
                let r = self.remote.toggle_shuffle();
                self.report(Tab::Remote, r);
            }
            KeyCode::Char('r') => {
                let r = self.remote.toggle_repeat();
                self.report(Tab::Remote, r);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let r = self.remote.set_volume(i32::from(self.remote.volume()) + step);
                self.report(Tab::Remote, r);
            }
            KeyCode::Char('-') => {
                let r = self.remote.set_volume(i32::from(self.remote.volume()) - step);
                self.report(Tab::Remote, r);
            }
            _ => {}
        }
    }

    fn handle_local_key(&mut self, code: KeyCode) {
        let len = self.local.tracks().len();
        let step = i32::from(self.settings.local.volume_step);
        match code {
            KeyCode::Char('o') => self.app.open_prompt(PromptKind::AddPath),
            KeyCode::Char('j') | KeyCode::Down => self.app.step_cursor(true, len),
            KeyCode::Char('k') | KeyCode::Up => self.app.step_cursor(false, len),
            KeyCode::Enter => {
                let r = self.local.play_at(self.app.local_cursor);
                self.after_local_command(r.is_ok());
                self.report(Tab::Local, r);
            }
            KeyCode::Char(' ') | KeyCode::Char('p') => {
                let was_playing = self.local.is_playing();
                self.local.toggle_pause();
                self.after_local_command(!was_playing);
                self.app.clear_error(Tab::Local);
            }
            KeyCode::Char('x') => {
                self.local.stop();
                self.app.clear_error(Tab::Local);
            }
            KeyCode::Char('n') => {
                let r = self.local.next();
                self.follow_local();
                self.after_local_command(r.is_ok());
                self.report(Tab::Local, r);
            }
            KeyCode::Char('b') => {
                let r = self.local.previous();
                self.follow_local();
                self.after_local_command(r.is_ok());
                self.report(Tab::Local, r);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.local.set_volume(local_percent(self.local.volume()) + step);
            }
            KeyCode::Char('-') => {
                self.local.set_volume(local_percent(self.local.volume()) - step);
            }
            KeyCode::Char('C') => {
                self.local.clear();
                self.app.clamp_local_cursor(0);
                self.app.clear_error(Tab::Local);
            }
            _ => {}
        }
    }

    fn submit(&mut self, prompt: Prompt) {
        let input = prompt.input;
        match prompt.kind {
            PromptKind::Search => {
                let r = self.remote.search(&input);
                if r.is_ok() {
                    self.app.reset_results();
                }
                self.report(Tab::Remote, r);
            }
            PromptKind::Seek => {
                let r = self.remote.seek(&input);
                self.report(Tab::Remote, r);
            }
            PromptKind::PlaylistName => {
                let tracks = self.selected_tracks();
                let r = self.remote.create_playlist(&input, &tracks);
                self.report(Tab::Remote, r);
            }
            PromptKind::PlaylistId => {
                let tracks = self.selected_tracks();
                let r = self.remote.add_to_playlist(&input, &tracks);
                self.report(Tab::Remote, r);
            }
            PromptKind::ExportId => {
                let dir = self.settings.remote.export_dir.clone();
                let r = self.remote.export_playlist(&input, &dir);
                self.report(Tab::Remote, r);
            }
            PromptKind::AddPath => self.add_local_path(&input),
        }
    }

    fn play_remote(&mut self) {
        let r = self.remote.play(self.app.remote_cursor);
        if let Ok(PlayOutcome::Started(track_id)) = &r {
            if let Some(track_id) = track_id {
                self.remote.refresh_features(track_id);
            }
            if self.settings.playback.exclusive && self.local.is_playing() {
                self.local.stop();
            }
        }
        self.report(Tab::Remote, r);
    }

    fn add_local_path(&mut self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        let found = library::expand(&[PathBuf::from(input)], &self.settings.local);
        if found.is_empty() {
            self.app
                .set_error(Tab::Local, format!("No audio files found at {input}"));
            return;
        }
        self.local.add_files(found);
        self.app.clear_error(Tab::Local);
    }

    fn selected_tracks(&self) -> Vec<Track> {
        let results = self.remote.results();
        self.app
            .selection(results.len())
            .into_iter()
            .map(|i| results[i].clone())
            .collect()
    }

    /// In exclusive mode, local playback that actually started pauses the
    /// remote player.
    fn after_local_command(&mut self, succeeded: bool) {
        let started = succeeded && self.local.is_playing() && self.local.current().is_some();
        if !started || !self.settings.playback.exclusive {
            return;
        }
        let remote_playing = self.remote.status().is_some_and(|s| s.is_playing);
        if remote_playing {
            if let Err(e) = self.remote.transport().pause() {
                log::warn!("could not pause remote playback: {e}");
            }
        }
    }

    fn follow_local(&mut self) {
        if let Some(i) = self.local.current_index() {
            self.app.local_cursor = i;
        }
    }

    /// Route a command result to the tab's notice line.
    fn report<T>(&mut self, tab: Tab, result: Result<T, CommandError>) {
        match result {
            Ok(_) => self.app.clear_error(tab),
            Err(e) => {
                log::warn!("{} command failed: {e}", tab.title());
                self.app.set_error(tab, e.to_string());
            }
        }
    }
}

fn local_percent(volume: f32) -> i32 {
    (volume * 100.0).round() as i32
}

/// Main terminal event loop: applies poll observations, draws, and handles
/// input. Returns `Ok(())` when shutdown is requested.
pub fn run<E: AudioEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    session: &mut Session<E>,
    poller: &PollerHandle,
    events: &Receiver<PollEvent>,
) -> std::io::Result<()> {
    loop {
        while let Ok(ev) = events.try_recv() {
            session.apply_poll_event(ev);
        }

        terminal.draw(|f| ui::draw(f, &session.view(poller.failures())))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if session.handle_key(key) {
                    break;
                }
            }
        }
    }

    Ok(())
}
