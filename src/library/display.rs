use std::path::Path;

/// `Artist - Title` when both tags are usable, the title alone when only it
/// is, and the file stem otherwise.
pub fn display_label(path: &Path, title: Option<&str>, artist: Option<&str>) -> String {
    let title = title.map(str::trim).filter(|s| !s.is_empty());
    let artist = artist.map(str::trim).filter(|s| !s.is_empty());

    match (artist, title) {
        (Some(a), Some(t)) => format!("{a} - {t}"),
        (None, Some(t)) => t.to_string(),
        _ => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| path.display().to_string()),
    }
}
