//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, List, ListItem, ListState, Padding,
        Paragraph, Tabs, Wrap,
    },
};
use std::time::Duration;

use crate::app::{App, Tab};
use crate::config::UiSettings;
use crate::local::{AudioEngine, LocalPlaybackController};
use crate::remote::{AudioFeatures, RemotePlaybackController};

const REMOTE_CONTROLS: &[(&str, &str)] = &[
    ("/", "search"),
    ("j/k", "up/down"),
    ("enter", "play"),
    ("space", "mark"),
    ("p", "pause"),
    ("x", "stop"),
    ("n/b", "next/prev"),
    ("s", "shuffle"),
    ("r", "repeat"),
    ("+/-", "volume"),
    ("g", "seek"),
    ("c", "new playlist from selection"),
    ("a", "add selection to playlist"),
    ("e", "export playlist"),
];

const LOCAL_CONTROLS: &[(&str, &str)] = &[
    ("o", "add file or folder"),
    ("j/k", "up/down"),
    ("enter", "play"),
    ("space/p", "pause/resume"),
    ("x", "stop"),
    ("n/b", "next/prev"),
    ("+/-", "volume"),
    ("C", "clear playlist"),
];

/// Everything one frame needs. Built fresh by the event loop for each draw.
pub struct View<'a, E: AudioEngine> {
    pub app: &'a App,
    pub remote: &'a RemotePlaybackController,
    pub local: &'a LocalPlaybackController<E>,
    pub poll_failures: u64,
    pub ui: &'a UiSettings,
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn controls_text(controls: &[(&str, &str)]) -> String {
    controls
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

fn footer_text(tab: Tab, poll_failures: u64) -> String {
    let controls = match tab {
        Tab::Remote => REMOTE_CONTROLS,
        Tab::Local => LOCAL_CONTROLS,
    };
    let mut text = controls_text(controls);
    text.push_str(" | [tab] switch tab | [esc] cancel input | [q] quit");
    if poll_failures > 0 {
        text.push_str(&format!(" | status polls failed: {poll_failures}"));
    }
    text
}

/// Feature values as whole percentages for the bar chart.
fn feature_bars(features: &AudioFeatures) -> Vec<(&'static str, u64)> {
    features
        .named()
        .into_iter()
        .map(|(name, v)| (name, (v.clamp(0.0, 1.0) * 100.0).round() as u64))
        .collect()
}

fn padded(title: &str) -> Block<'_> {
    Block::bordered()
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
        .title(title)
}

/// Window of `height` rows around `selected`, so the cursor stays visible.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn render_list(frame: &mut Frame, area: Rect, title: &str, labels: Vec<String>, selected: usize) {
    let total = labels.len();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_window(total, height, selected);

    let items: Vec<ListItem> = labels[start..end]
        .iter()
        .map(|l| ListItem::new(l.as_str()))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected.min(total - 1) - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn remote_status_text(remote: &RemotePlaybackController) -> String {
    let mut parts: Vec<String> = Vec::new();
    match remote.status() {
        Some(status) => {
            let state = if status.is_playing { "Playing" } else { "Paused" };
            match &status.track {
                Some(t) => parts.push(format!(
                    "{state}: {} - {} [{}]",
                    t.name,
                    t.artist,
                    format_mmss(status.progress)
                )),
                None => parts.push(state.to_string()),
            }
            parts.push(format!("Shuffle: {}", if status.shuffle { "On" } else { "Off" }));
            parts.push(format!("Repeat: {}", status.repeat));
        }
        None => parts.push("Nothing playing".to_string()),
    }
    parts.push(format!("Volume: {}%", remote.volume()));
    parts.join(" • ")
}

fn local_status_text<E: AudioEngine>(local: &LocalPlaybackController<E>) -> String {
    let mut parts: Vec<String> = Vec::new();
    let state = if local.is_playing() { "Playing" } else { "Idle" };
    match local.current() {
        Some(t) if local.is_playing() => parts.push(format!("{state}: {}", t.display)),
        _ => parts.push(state.to_string()),
    }
    parts.push(format!("Volume: {:.1}", local.volume()));
    parts.push(format!("{} files", local.tracks().len()));
    parts.join(" • ")
}

fn draw_remote<E: AudioEngine>(frame: &mut Frame, area: Rect, view: &View<'_, E>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let labels: Vec<String> = view
        .remote
        .results()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let mark = if view.app.marked.contains(&i) { "[x]" } else { "[ ]" };
            format!("{mark} {}", t.display())
        })
        .collect();
    render_list(frame, cols[0], " results ", labels, view.app.remote_cursor);

    match view.remote.features() {
        Some(features) => {
            let bars: Vec<Bar> = feature_bars(features)
                .into_iter()
                .map(|(name, v)| Bar::default().label(Line::from(name)).value(v))
                .collect();
            let chart = BarChart::default()
                .block(Block::bordered().title(" audio features "))
                .direction(Direction::Horizontal)
                .bar_width(1)
                .bar_gap(0)
                .max(100)
                .bar_style(Style::default().fg(Color::Green))
                .data(BarGroup::default().bars(&bars));
            frame.render_widget(chart, cols[1]);
        }
        None => {
            let empty = Paragraph::new("No features yet")
                .alignment(Alignment::Center)
                .block(Block::bordered().title(" audio features "));
            frame.render_widget(empty, cols[1]);
        }
    }
}

fn draw_local<E: AudioEngine>(frame: &mut Frame, area: Rect, view: &View<'_, E>) {
    let playing_index = view
        .local
        .current_index()
        .filter(|_| view.local.is_playing());
    let labels: Vec<String> = view
        .local
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let marker = if Some(i) == playing_index { "♪ " } else { "  " };
            match t.duration {
                Some(d) => format!("{marker}{} ({})", t.display, format_mmss(d)),
                None => format!("{marker}{}", t.display),
            }
        })
        .collect();
    render_list(frame, area, " playlist ", labels, view.app.local_cursor);
}

/// The prompt being typed, else the tab's error, else its last message.
fn notice_line<E: AudioEngine>(view: &View<'_, E>) -> Paragraph<'static> {
    if let Some(prompt) = &view.app.prompt {
        return Paragraph::new(format!("{}: {}_", prompt.kind.label(), prompt.input))
            .block(padded(" input "));
    }
    let tab = view.app.tab;
    if let Some(err) = view.app.error(tab) {
        return Paragraph::new(err.to_string())
            .fg(Color::Red)
            .block(padded(" notice "));
    }
    let message = match tab {
        Tab::Remote => view.remote.message(),
        Tab::Local => view.local.message(),
    };
    Paragraph::new(message.to_string()).block(padded(" notice "))
}

/// Render the entire UI into the provided `frame`.
pub fn draw<E: AudioEngine>(frame: &mut Frame, view: &View<'_, E>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header with tab titles
    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .select(view.app.tab.index())
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" tandem {}", view.ui.header_text))
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(tabs, chunks[0]);

    let status = match view.app.tab {
        Tab::Remote => remote_status_text(view.remote),
        Tab::Local => local_status_text(view.local),
    };
    let status_par = Paragraph::new(status)
        .block(padded(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    match view.app.tab {
        Tab::Remote => draw_remote(frame, chunks[2], view),
        Tab::Local => draw_local(frame, chunks[2], view),
    }

    frame.render_widget(notice_line(view), chunks[3]);

    let footer = Paragraph::new(footer_text(view.app.tab, view.poll_failures))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
