//! Log setup. The terminal belongs to the UI while it runs, so records go to
//! a file instead of stderr.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;

use crate::config::{LogSettings, default_log_path};

/// Unknown level names fall back to `info`.
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

/// Configured file, or the XDG state default. `None` without a home directory.
pub fn log_path(settings: &LogSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(default_log_path)
}

/// Install the global logger. Returns the file records are appended to, or
/// `None` when there is nowhere to write them (logging stays off).
pub fn init(settings: &LogSettings) -> io::Result<Option<PathBuf>> {
    let Some(path) = log_path(settings) else {
        return Ok(None);
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let mut clog = colog::default_builder();
    clog.filter(None, parse_level(&settings.level));
    clog.target(env_logger::Target::Pipe(Box::new(file)));
    clog.write_style(env_logger::WriteStyle::Never);
    if clog.try_init().is_err() {
        // Already installed (tests, or a second call).
        return Ok(Some(path));
    }

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    log::info!("logging to {}", path.display());
    Ok(Some(path))
}
