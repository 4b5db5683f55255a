use super::display::display_label;
use super::scan::is_audio_file;
use super::*;
use crate::config::LocalSettings;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn labels(tracks: &[LocalTrack]) -> Vec<String> {
    tracks.iter().map(|t| t.display.clone()).collect()
}

#[test]
fn display_label_prefers_artist_dash_title() {
    let p = Path::new("/tmp/Song.mp3");
    assert_eq!(display_label(p, Some("Song"), Some("Artist")), "Artist - Song");
    assert_eq!(display_label(p, Some("Song"), Some("  Artist  ")), "Artist - Song");
    assert_eq!(display_label(p, Some("Title"), None), "Title");
    assert_eq!(display_label(p, None, Some("Artist")), "Song");
    assert_eq!(display_label(p, Some("  "), None), "Song");
}

#[test]
fn is_audio_file_matches_configured_extensions_case_insensitive() {
    let settings = LocalSettings::default();
    assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.wav"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a"), &settings));

    let settings = LocalSettings {
        extensions: vec![".OPUS".into()],
        ..LocalSettings::default()
    };
    assert!(is_audio_file(Path::new("/tmp/a.opus"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a.mp3"), &settings));
}

#[test]
fn expand_walks_directories_sorted_by_path() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
    fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

    let tracks = expand(&[dir.path().to_path_buf()], &LocalSettings::default());
    assert_eq!(labels(&tracks), vec!["A", "b"]);
    assert_eq!(tracks[0].path, dir.path().join("A.ogg"));
    assert_eq!(tracks[0].duration, None);
}

#[test]
fn expand_keeps_input_order_across_files_and_dirs() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("one.wav"), b"x").unwrap();
    fs::write(sub.join("two.wav"), b"x").unwrap();
    let single = dir.path().join("zz.flac");
    fs::write(&single, b"x").unwrap();

    let inputs = vec![single.clone(), sub.clone()];
    let tracks = expand(&inputs, &LocalSettings::default());
    assert_eq!(labels(&tracks), vec!["zz", "one", "two"]);
}

#[test]
fn expand_skips_missing_paths_and_non_audio_files() {
    let dir = tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, b"x").unwrap();

    let inputs = vec![dir.path().join("missing.mp3"), notes];
    assert!(expand(&inputs, &LocalSettings::default()).is_empty());
}

#[test]
fn expand_respects_include_hidden_false() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
    fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();
    let hidden_dir = dir.path().join(".cache");
    fs::create_dir_all(&hidden_dir).unwrap();
    fs::write(hidden_dir.join("inside.mp3"), b"not real").unwrap();

    let settings = LocalSettings {
        include_hidden: false,
        ..LocalSettings::default()
    };
    let tracks = expand(&[dir.path().to_path_buf()], &settings);
    assert_eq!(labels(&tracks), vec!["visible"]);
}

#[test]
fn expand_respects_recursive_false() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("child.mp3"), b"not real").unwrap();

    let settings = LocalSettings {
        recursive: false,
        ..LocalSettings::default()
    };
    let tracks = expand(&[dir.path().to_path_buf()], &settings);
    assert_eq!(labels(&tracks), vec!["root"]);
}

#[test]
fn expand_respects_max_depth() {
    let dir = tempdir().unwrap();
    let d1 = dir.path().join("d1");
    let d2 = d1.join("d2");
    fs::create_dir_all(&d2).unwrap();
    fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
    fs::write(d1.join("one.mp3"), b"not real").unwrap();
    fs::write(d2.join("two.mp3"), b"not real").unwrap();

    // WalkDir depth counts root as 0, children as 1, grandchildren as 2.
    let settings = LocalSettings {
        max_depth: Some(2),
        ..LocalSettings::default()
    };
    let names = labels(&expand(&[dir.path().to_path_buf()], &settings));
    assert!(names.contains(&"root".to_string()));
    assert!(names.contains(&"one".to_string()));
    assert!(!names.contains(&"two".to_string()));
}

#[test]
fn expanded_paths_are_the_ones_found_on_disk() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("song.mp3");
    fs::write(&file, b"x").unwrap();

    let tracks = expand(&[file.clone()], &LocalSettings::default());
    let paths: Vec<PathBuf> = tracks.into_iter().map(|t| t.path).collect();
    assert_eq!(paths, vec![file]);
}
