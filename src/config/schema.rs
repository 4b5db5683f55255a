use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tandem/config.toml` or `~/.config/tandem/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TANDEM__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub remote: RemoteSettings,
    pub local: LocalSettings,
    pub playback: PlaybackSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Application client id. Prompted for at startup when empty.
    pub client_id: String,
    /// Application client secret. Prompted for at startup when empty.
    pub client_secret: String,
    /// Redirect URI registered for the application.
    pub redirect_uri: String,
    /// Space-separated authorization scopes.
    pub scopes: String,
    /// Where the access/refresh token is cached between runs.
    pub token_cache: PathBuf,
    /// Delete `token_cache` on exit.
    pub delete_token_cache_on_exit: bool,
    /// Number of results requested per search (1-50).
    pub search_limit: u32,
    /// Seconds between playback status polls.
    pub poll_interval_secs: u64,
    /// Whether playlists created from the app are public.
    pub public_playlists: bool,
    /// Directory that receives `<playlist id>_export.json` files.
    pub export_dir: PathBuf,
    /// Show "Stopped" when the service reports no playback at all,
    /// instead of keeping the last status.
    pub show_stopped_when_idle: bool,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8888/callback".to_string(),
            scopes: [
                "user-read-playback-state",
                "user-modify-playback-state",
                "user-read-currently-playing",
                "playlist-modify-public",
                "playlist-modify-private",
            ]
            .join(" "),
            token_cache: PathBuf::from(".cache"),
            delete_token_cache_on_exit: true,
            search_limit: 20,
            poll_interval_secs: 5,
            public_playlists: true,
            export_dir: PathBuf::from("."),
            show_stopped_when_idle: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks when expanding directories.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
    /// Volume (percent) applied at startup.
    pub initial_volume: u8,
    /// Percent added/removed per volume key press, both tabs.
    pub volume_step: u8,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "wav".into(), "ogg".into(), "flac".into()],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
            initial_volume: 50,
            volume_step: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Never let both backends sound at once: starting one pauses/stops the other.
    pub exclusive: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Which tab is active at startup.
    pub start_tab: TabSetting,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ remote & local, in tandem ~ ".to_string(),
            start_tab: TabSetting::Remote,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabSetting {
    #[default]
    #[serde(alias = "spotify", alias = "streaming")]
    Remote,
    #[serde(alias = "files", alias = "local-files")]
    Local,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    /// Log file; defaults to `$XDG_STATE_HOME/tandem/tandem.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
