//! History panel: songs recently played on the station.

use chrono::{DateTime, Local};
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::action::Action;
use crate::app_state::DeskView;
use crate::component::PanelContent;
use crate::components::row;
use crate::panel::PanelId;
use crate::widgets::text::{centered, fit_width};

const TIME_COL: usize = 12;

#[derive(Default)]
pub struct HistoryPanel {
    scroll: usize,
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `HH:MM` for today, `dd/mm HH:MM` for anything older; `--:--` when unknown.
pub fn played_at_label(played_at: Option<i64>, now: DateTime<Local>) -> String {
    let Some(at) = played_at
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|utc| utc.with_timezone(&Local))
    else {
        return "--:--".to_string();
    };
    if at.date_naive() == now.date_naive() {
        at.format("%H:%M").to_string()
    } else {
        at.format("%d/%m %H:%M").to_string()
    }
}

impl PanelContent for HistoryPanel {
    fn id(&self) -> PanelId {
        PanelId::History
    }

    fn handle_key(&mut self, key: KeyEvent, view: &DeskView) -> Vec<Action> {
        let len = view.snapshot.map_or(0, |s| s.history.len());
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = (self.scroll + 1).min(len.saturating_sub(1));
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            _ => {}
        }
        Vec::new()
    }

    fn draw(&mut self, buf: &mut Buffer, area: Rect, _focused: bool, view: &DeskView) {
        let palette = view.palette();
        let width = usize::from(area.width);
        let history = view.snapshot.map(|s| s.history.as_slice()).unwrap_or(&[]);

        if history.is_empty() {
            if let Some(r) = row(area, area.height / 2) {
                Paragraph::new(Span::styled(
                    centered("song history is empty", width),
                    palette.style_muted(),
                ))
                .render(r, buf);
            }
            return;
        }

        self.scroll = self.scroll.min(history.len() - 1);
        let now = Local::now();
        let text_w = width.saturating_sub(TIME_COL + 1);
        // Two rows per entry: title, then artist.
        let per_page = usize::from(area.height / 2);
        for (i, entry) in history.iter().skip(self.scroll).take(per_page).enumerate() {
            let y = (i * 2) as u16;
            let time = format!(" {:<w$}", played_at_label(entry.played_at, now), w = TIME_COL);
            if let Some(r) = row(area, y) {
                let title = fit_width(&entry.song.title, text_w);
                Paragraph::new(Line::from(vec![
                    Span::styled(time, palette.style_muted()),
                    Span::styled(title, palette.style_title()),
                ]))
                .render(r, buf);
            }
            if let Some(r) = row(area, y + 1) {
                let artist = fit_width(&entry.song.artist, text_w);
                Paragraph::new(Line::from(vec![
                    Span::raw(" ".repeat(TIME_COL + 1)),
                    Span::styled(artist, palette.style_secondary()),
                ]))
                .render(r, buf);
            }
        }
    }

    fn badge(&self, view: &DeskView) -> Option<String> {
        view.snapshot
            .filter(|s| !s.history.is_empty())
            .map(|s| s.history.len().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_played_at_label() {
        let now = Local.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        let today = Local.with_ymd_and_hms(2026, 10, 17, 9, 5, 0).unwrap();
        let yesterday = Local.with_ymd_and_hms(2026, 10, 16, 23, 59, 0).unwrap();
        assert_eq!(played_at_label(Some(today.timestamp()), now), "09:05");
        assert_eq!(played_at_label(Some(yesterday.timestamp()), now), "16/10 23:59");
        assert_eq!(played_at_label(None, now), "--:--");
    }
}
