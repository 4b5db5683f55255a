use std::path::PathBuf;
use std::time::Duration;

/// A local file in the playlist. Identity is the exact path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack {
    pub path: PathBuf,
    pub display: String,
    pub duration: Option<Duration>,
}
