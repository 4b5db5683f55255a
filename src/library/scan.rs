use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::LocalSettings;

use super::display::display_label;
use super::model::LocalTrack;

pub(super) fn is_audio_file(path: &Path, settings: &LocalSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build a track from `path`, reading tags when the file has any.
pub(super) fn read_track(path: &Path) -> LocalTrack {
    let mut title: Option<String> = None;
    let mut artist: Option<String> = None;
    let mut duration: Option<Duration> = None;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            duration = Some(tagged.properties().duration());
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                title = tag.title().map(|v| v.into_owned());
                artist = tag.artist().map(|v| v.into_owned());
            }
        }
        Err(e) => log::debug!("no tags for {}: {e}", path.display()),
    }

    LocalTrack {
        path: path.to_path_buf(),
        display: display_label(path, title.as_deref(), artist.as_deref()),
        duration,
    }
}

fn walk(dir: &Path, settings: &LocalSettings) -> Vec<LocalTrack> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut paths: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() || e.path().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_audio_file(p, settings))
        .collect();

    paths.sort();
    paths.iter().map(|p| read_track(p)).collect()
}

/// Turn user-supplied paths into playlist candidates, in input order.
///
/// Files are kept when their extension is configured; directories are walked
/// and contribute their audio files sorted by path. Anything else is skipped
/// with a warning.
pub fn expand(inputs: &[PathBuf], settings: &LocalSettings) -> Vec<LocalTrack> {
    let mut tracks = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = walk(input, settings);
            log::info!("{}: {} audio files", input.display(), found.len());
            tracks.extend(found);
        } else if input.is_file() {
            if is_audio_file(input, settings) {
                tracks.push(read_track(input));
            } else {
                log::warn!("skipping {}: not an audio file", input.display());
            }
        } else {
            log::warn!("skipping {}: no such file or directory", input.display());
        }
    }
    tracks
}
