//! FilterInput: wraps tui-input as the search bar of a list panel.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::Palette;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    Changed(String),
    Confirmed,
    Cancelled,
}

pub struct FilterInput {
    input: Input,
    active: bool,
    placeholder: String,
}

impl FilterInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Esc clears the text first, and closes the bar once it is empty.
    /// Enter keeps the text and closes the bar.
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterAction {
        match key.code {
            KeyCode::Esc if !self.input.value().is_empty() => {
                self.input.reset();
                FilterAction::Changed(String::new())
            }
            KeyCode::Esc => {
                self.active = false;
                FilterAction::Cancelled
            }
            KeyCode::Enter => {
                self.active = false;
                FilterAction::Confirmed
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                FilterAction::Changed(self.input.value().to_string())
            }
        }
    }

    /// Returns the cursor position while the bar is active.
    pub fn draw(&self, buf: &mut Buffer, area: Rect, palette: &Palette) -> Option<(u16, u16)> {
        if area.width < 3 || area.height == 0 {
            return None;
        }
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(3) as usize);
        let value = self.input.value();
        let text = if value.is_empty() {
            Span::styled(format!("/ {}", self.placeholder), palette.style_muted())
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!("/ {}", visible), palette.style_filter())
        };
        Paragraph::new(Line::from(text))
            .style(palette.style_filter())
            .render(area, buf);

        self.active.then(|| {
            let cursor_x = area.x + 2 + (self.input.visual_cursor() - scroll) as u16;
            (cursor_x.min(area.right() - 1), area.y)
        })
    }
}
