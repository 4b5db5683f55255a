use crate::library::LocalTrack;

/// Ordered, duplicate-free list of local files with a cursor.
///
/// The cursor is meaningful only while the list is non-empty; it is kept in
/// range by wrapping on `advance`/`retreat`.
#[derive(Debug, Default)]
pub struct LocalPlaylist {
    tracks: Vec<LocalTrack>,
    index: usize,
}

impl LocalPlaylist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.index)
    }

    pub fn current(&self) -> Option<&LocalTrack> {
        self.tracks.get(self.index)
    }

    pub fn contains(&self, track: &LocalTrack) -> bool {
        self.tracks
            .iter()
            .any(|t| t.path.as_os_str() == track.path.as_os_str())
    }

    /// Append unless the exact same path is already listed.
    pub fn add(&mut self, track: LocalTrack) -> bool {
        if self.contains(&track) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.index = 0;
    }

    /// Move the cursor to `index`. Out-of-range indices are refused.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.tracks.len() {
            return false;
        }
        self.index = index;
        true
    }

    /// `(index + 1) mod len`; `None` when empty.
    pub fn advance(&mut self) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        self.index = (self.index + 1) % len;
        Some(self.index)
    }

    /// `(index - 1) mod len`; `None` when empty.
    pub fn retreat(&mut self) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        self.index = (self.index + len - 1) % len;
        Some(self.index)
    }
}
