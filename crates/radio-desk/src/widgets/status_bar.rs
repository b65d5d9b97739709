//! Status bar: bottom line with playback state, last update and keys.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app_state::DeskView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Desk,
    Search,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Desk => "DESK",
            Self::Search => "SEARCH",
        }
    }
}

pub fn keys_hint(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Desk => {
            "1-4 panels  Space play/pause  m mute  Tab next  t theme  / search  q quit"
        }
        InputMode::Search => "type to search  Enter keep  Esc clear+close",
    }
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, view: &DeskView) {
    let palette = view.palette();
    let [left, right] =
        Layout::horizontal([Constraint::Min(10), Constraint::Length(24)]).areas(area);

    let (state, state_style) = if view.intent.playing {
        ("● LIVE", palette.style_playing())
    } else {
        ("○ OFF", palette.style_muted())
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", mode.label()),
            palette.style_secondary().add_modifier(Modifier::BOLD),
        ),
        Span::styled(state, state_style.add_modifier(Modifier::BOLD)),
    ];
    if view.intent.muted {
        spans.push(Span::styled(" muted", palette.style_accent()));
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled(keys_hint(mode), palette.style_muted()));
    frame.render_widget(Paragraph::new(Line::from(spans)), left);

    let updated = view
        .snapshot
        .map(|s| format!("updated {} ", s.fetched_at.format("%H:%M:%S")))
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(updated, palette.style_muted()))).right_aligned(),
        right,
    );
}
