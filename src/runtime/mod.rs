use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::RemoteSettings;
use crate::error::AppError;
use crate::library;
use crate::local::{LocalPlaybackController, RodioEngine};
use crate::logging;
use crate::remote::{
    self, BrowserOpener, PollEvent, RemoteOptions, RemotePlaybackController,
    RemoteTransport, SpotifyTransport, spawn_poller,
};

mod event_loop;
mod settings;
mod startup;

#[cfg(test)]
mod tests;

pub fn run() -> Result<(), AppError> {
    let settings = settings::load_settings();

    match logging::init(&settings.log) {
        Ok(Some(path)) => log::debug!("log file {}", path.display()),
        Ok(None) => {}
        Err(e) => eprintln!("tandem: logging disabled: {e}"),
    }

    let credentials = startup::credentials(&settings.remote)?;
    let spotify = remote::client(&credentials, &settings.remote);
    startup::authorize(&spotify)?;
    let transport: Arc<dyn RemoteTransport> = Arc::new(SpotifyTransport::new(spotify));

    let engine = RodioEngine::open_default(f32::from(settings.local.initial_volume) / 100.0)?;
    let mut local = LocalPlaybackController::new(engine, settings.local.initial_volume);

    // Files and folders given on the command line start out in the playlist.
    let inputs: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    if !inputs.is_empty() {
        local.add_files(library::expand(&inputs, &settings.local));
    }

    let remote = RemotePlaybackController::new(
        transport.clone(),
        Box::new(BrowserOpener),
        RemoteOptions {
            search_limit: settings.remote.search_limit,
            public_playlists: settings.remote.public_playlists,
            show_stopped_when_idle: settings.remote.show_stopped_when_idle,
        },
    );

    let (poll_tx, poll_rx) = mpsc::channel::<PollEvent>();
    let mut poller = spawn_poller(
        transport,
        Duration::from_secs(settings.remote.poll_interval_secs),
        poll_tx,
    )?;

    let remote_settings = settings.remote.clone();
    let mut session = event_loop::Session::new(settings, remote, local);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &mut session, &poller, &poll_rx);

    // Shutdown: poller first, then the audio device, then the token cache.
    poller.stop();
    drop(session.into_local());
    cleanup_token_cache(&remote_settings);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("shut down");
    run_result.map_err(AppError::from)
}

/// Remove the token cache when configured to. Returns whether a file was removed.
fn cleanup_token_cache(settings: &RemoteSettings) -> bool {
    if !settings.delete_token_cache_on_exit {
        return false;
    }
    match fs::remove_file(&settings.token_cache) {
        Ok(()) => {
            log::info!("removed token cache {}", settings.token_cache.display());
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            log::warn!(
                "failed to remove token cache {}: {e}",
                settings.token_cache.display()
            );
            false
        }
    }
}
