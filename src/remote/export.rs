//! Playlist export sidecar files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::CommandError;

use super::types::{ExportEntry, ExportSummary};

/// `<playlist_id>_export.json`, with path separators in the id flattened.
pub fn export_file_name(playlist_id: &str) -> String {
    let safe: String = playlist_id
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{safe}_export.json")
}

/// Write `entries` as a pretty-printed (four-space indent) UTF-8 JSON array.
pub fn write_export(
    dir: &Path,
    playlist_id: &str,
    entries: &[ExportEntry],
) -> Result<ExportSummary, CommandError> {
    let path: PathBuf = dir.join(export_file_name(playlist_id));
    let mut out = BufWriter::new(File::create(&path)?);

    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    entries.serialize(&mut ser)?;
    out.flush()?;

    Ok(ExportSummary {
        path,
        count: entries.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> ExportEntry {
        ExportEntry {
            name: name.to_string(),
            artist: "Artist".to_string(),
            uri: format!("spotify:track:{name}"),
        }
    }

    #[test]
    fn export_file_name_is_keyed_by_playlist_id() {
        assert_eq!(export_file_name("37i9dQZF1DX"), "37i9dQZF1DX_export.json");
        assert_eq!(export_file_name(" a/b "), "a_b_export.json");
    }

    #[test]
    fn write_export_pretty_prints_with_four_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let summary = write_export(dir.path(), "pl", &[entry("one"), entry("two")]).unwrap();

        assert_eq!(summary.count, 2);
        assert_eq!(summary.path, dir.path().join("pl_export.json"));

        let text = std::fs::read_to_string(&summary.path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"name\": \"one\""));

        let parsed: Vec<ExportEntry> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, vec![entry("one"), entry("two")]);
    }

    #[test]
    fn write_export_of_nothing_is_an_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let summary = write_export(dir.path(), "empty", &[]).unwrap();
        assert_eq!(summary.count, 0);
        assert_eq!(std::fs::read_to_string(summary.path).unwrap(), "[]");
    }
}
