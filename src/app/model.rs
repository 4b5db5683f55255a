//! Application model types: `App`, `Tab` and input prompts.
//!
//! `App` holds presentation state only: which tab is shown, cursors, the
//! multi-selection over search results, an open prompt and per-tab error
//! notices. Playback state lives in the controllers.

use std::collections::BTreeSet;

use crate::config::TabSetting;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Remote,
    Local,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Remote, Tab::Local];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Remote => "Spotify",
            Tab::Local => "Local files",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Remote => 0,
            Tab::Local => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Tab::Remote => Tab::Local,
            Tab::Local => Tab::Remote,
        }
    }
}

impl From<TabSetting> for Tab {
    fn from(t: TabSetting) -> Self {
        match t {
            TabSetting::Remote => Tab::Remote,
            TabSetting::Local => Tab::Local,
        }
    }
}

/// What a line of typed input is for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PromptKind {
    Search,
    Seek,
    PlaylistName,
    /// Target playlist for adding the selection.
    PlaylistId,
    ExportId,
    AddPath,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Search => "Search",
            PromptKind::Seek => "Seek to (seconds)",
            PromptKind::PlaylistName => "New playlist name",
            PromptKind::PlaylistId => "Add to playlist id",
            PromptKind::ExportId => "Export playlist id",
            PromptKind::AddPath => "Add file or folder",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    pub tab: Tab,
    pub prompt: Option<Prompt>,

    pub remote_cursor: usize,
    /// Marked search result indices, for playlist commands.
    pub marked: BTreeSet<usize>,
    pub local_cursor: usize,

    remote_error: Option<String>,
    local_error: Option<String>,
}

impl App {
    pub fn new(tab: Tab) -> Self {
        Self {
            tab,
            ..Self::default()
        }
    }

    pub fn switch_tab(&mut self) {
        self.tab = self.tab.other();
        self.prompt = None;
    }

    pub fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt {
            kind,
            input: String::new(),
        });
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn push_prompt_char(&mut self, c: char) {
        if let Some(p) = self.prompt.as_mut() {
            p.input.push(c);
        }
    }

    pub fn pop_prompt_char(&mut self) {
        if let Some(p) = self.prompt.as_mut() {
            p.input.pop();
        }
    }

    /// Close the prompt and hand back what was typed.
    pub fn submit_prompt(&mut self) -> Option<Prompt> {
        self.prompt.take()
    }

    pub fn error(&self, tab: Tab) -> Option<&str> {
        match tab {
            Tab::Remote => self.remote_error.as_deref(),
            Tab::Local => self.local_error.as_deref(),
        }
    }

    /// Record a failed command for `tab`. It stays until the next success there.
    pub fn set_error(&mut self, tab: Tab, message: impl Into<String>) {
        let slot = match tab {
            Tab::Remote => &mut self.remote_error,
            Tab::Local => &mut self.local_error,
        };
        *slot = Some(message.into());
    }

    pub fn clear_error(&mut self, tab: Tab) {
        match tab {
            Tab::Remote => self.remote_error = None,
            Tab::Local => self.local_error = None,
        }
    }

    /// Move the active tab's cursor by one, wrapping within `len`.
    pub fn step_cursor(&mut self, forward: bool, len: usize) {
        let cursor = match self.tab {
            Tab::Remote => &mut self.remote_cursor,
            Tab::Local => &mut self.local_cursor,
        };
        *cursor = wrap_step(*cursor, forward, len);
    }

    /// Toggle the mark on the result under the cursor.
    pub fn toggle_mark(&mut self, len: usize) {
        if self.remote_cursor >= len {
            return;
        }
        if !self.marked.remove(&self.remote_cursor) {
            self.marked.insert(self.remote_cursor);
        }
    }

    /// A new result set invalidates cursor and marks.
    pub fn reset_results(&mut self) {
        self.remote_cursor = 0;
        self.marked.clear();
    }

    /// Keep the local cursor inside a playlist of `len` entries.
    pub fn clamp_local_cursor(&mut self, len: usize) {
        if self.local_cursor >= len {
            self.local_cursor = len.saturating_sub(1);
        }
    }

    /// Indices the playlist commands act on: the marked results, or the one
    /// under the cursor when nothing is marked. Empty when there are no results.
    pub fn selection(&self, len: usize) -> Vec<usize> {
        if len == 0 {
            return Vec::new();
        }
        let marked: Vec<usize> = self.marked.iter().copied().filter(|&i| i < len).collect();
        if marked.is_empty() {
            vec![self.remote_cursor.min(len - 1)]
        } else {
            marked
        }
    }
}

fn wrap_step(current: usize, forward: bool, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let current = current.min(len - 1);
    if forward {
        (current + 1) % len
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}
