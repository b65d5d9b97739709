//! Requests panel: browse the requestable catalogue and ask for a song.
//!
//! The catalogue is fetched when the panel opens. Only one request may be in
//! flight at a time; further submissions are ignored until it settles.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use station_proto::protocol::{RequestOutcome, RequestableSong};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::action::Action;
use crate::app_state::DeskView;
use crate::component::PanelContent;
use crate::components::{inner_point, row};
use crate::panel::{PanelId, Point};
use crate::widgets::filter_input::{FilterAction, FilterInput};
use crate::widgets::scrollable_list::ScrollableList;
use crate::widgets::text::{centered, fit_width};

const SEARCH_ROW: u16 = 0;
const LIST_TOP: u16 = 2;
const LIST_ROWS: u16 = 12;
const NOTICE_ROW: u16 = 15;
const REQUEST_BUTTON: &str = "[req]";
const REQUEST_BUTTON_WIDTH: u16 = 5;

/// Inner x where the `[req]` button starts on each list row.
fn request_button_x(inner_width: u16) -> u16 {
    inner_width.saturating_sub(REQUEST_BUTTON_WIDTH + 1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

pub struct RequestsPanel {
    list: ScrollableList<RequestableSong>,
    search: FilterInput,
    load: LoadState,
    in_flight: bool,
    notice: Option<Notice>,
    cursor: Option<(u16, u16)>,
}

impl Default for RequestsPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(item: &RequestableSong, query: &str) -> bool {
    let q = query.to_lowercase();
    item.song.title.to_lowercase().contains(&q) || item.song.artist.to_lowercase().contains(&q)
}

impl RequestsPanel {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(matches),
            search: FilterInput::new("search song or artist…"),
            load: LoadState::Idle,
            in_flight: false,
            notice: None,
            cursor: None,
        }
    }

    /// Returns false when a load is already running.
    pub fn begin_load(&mut self) -> bool {
        if self.load == LoadState::Loading {
            return false;
        }
        self.load = LoadState::Loading;
        self.notice = None;
        true
    }

    pub fn on_loaded(&mut self, result: Result<Vec<RequestableSong>, String>) {
        match result {
            Ok(songs) => {
                debug!("requests: {} requestable songs", songs.len());
                self.list.set_items(songs);
                let query = self.search.text().to_string();
                self.list.set_filter(&query);
                self.load = LoadState::Loaded;
            }
            Err(e) => {
                debug!("requests: load failed: {}", e);
                self.load = LoadState::Failed;
                self.notice = Some(Notice::Error(
                    "Error loading requestable songs.".to_string(),
                ));
            }
        }
    }

    /// Request the selected song. `None` while another request is in flight
    /// or nothing is selected.
    pub fn submit_selected(&mut self) -> Option<Action> {
        if self.in_flight {
            debug!("requests: submission ignored, one already in flight");
            return None;
        }
        let id = self.list.selected_item()?.request_id.clone();
        self.in_flight = true;
        self.notice = None;
        Some(Action::SubmitRequest(id))
    }

    pub fn on_submitted(&mut self, result: Result<RequestOutcome, String>) {
        self.in_flight = false;
        self.notice = Some(match result {
            Ok(outcome) if outcome.success => Notice::Success(
                outcome
                    .message
                    .unwrap_or_else(|| "Request submitted!".to_string()),
            ),
            Ok(outcome) => Notice::Error(
                outcome
                    .message
                    .unwrap_or_else(|| "The request could not be placed.".to_string()),
            ),
            Err(_) => Notice::Error("Error sending request.".to_string()),
        });
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    fn apply_filter(&mut self, action: FilterAction) {
        if let FilterAction::Changed(query) = action {
            self.list.set_filter(&query);
        }
    }

    fn draw_list(&mut self, buf: &mut Buffer, area: Rect, view: &DeskView) {
        let palette = view.palette();
        let width = usize::from(area.width);
        let message = match self.load {
            LoadState::Idle | LoadState::Loading => Some("loading songs…"),
            LoadState::Failed => Some("could not load songs"),
            LoadState::Loaded if self.list.is_empty() => Some("no songs found"),
            LoadState::Loaded => None,
        };
        if let Some(message) = message {
            if let Some(r) = row(area, LIST_TOP + LIST_ROWS / 2) {
                Paragraph::new(Span::styled(centered(message, width), palette.style_muted()))
                    .render(r, buf);
            }
            return;
        }

        let height = usize::from(LIST_ROWS);
        self.list.ensure_visible(height);
        let selected = self.list.selected;
        let text_w = usize::from(request_button_x(area.width));
        for (i, (pos, item)) in self.list.visible_items(height).into_iter().enumerate() {
            let Some(r) = row(area, LIST_TOP + i as u16) else {
                break;
            };
            let label = format!(" {}", item.song.display());
            let label = fit_width(&label, text_w);
            let pad = " ".repeat(text_w.saturating_sub(label.width()));
            let style = if pos == selected {
                palette.style_selected()
            } else {
                palette.style_default()
            };
            let button_style = if self.in_flight {
                palette.style_muted()
            } else {
                palette.style_accent()
            };
            Paragraph::new(Line::from(vec![
                Span::styled(label, style),
                Span::styled(pad, style),
                Span::styled(REQUEST_BUTTON, button_style),
            ]))
            .render(r, buf);
        }
    }
}

impl PanelContent for RequestsPanel {
    fn id(&self) -> PanelId {
        PanelId::Requests
    }

    fn captures_input(&self) -> bool {
        self.search.is_active()
    }

    fn handle_key(&mut self, key: KeyEvent, _view: &DeskView) -> Vec<Action> {
        if self.search.is_active() {
            let action = self.search.handle_key(key);
            self.apply_filter(action);
            return Vec::new();
        }
        match key.code {
            KeyCode::Char('/') if self.load == LoadState::Loaded => self.search.activate(),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::PageDown => self.list.select_down(usize::from(LIST_ROWS)),
            KeyCode::PageUp => self.list.select_up(usize::from(LIST_ROWS)),
            KeyCode::Char('r') => return vec![Action::LoadRequests],
            KeyCode::Enter => return self.submit_selected().into_iter().collect(),
            _ => {}
        }
        Vec::new()
    }

    fn click(&mut self, local: Point, _view: &DeskView) -> Vec<Action> {
        let size = PanelId::Requests.size();
        let (inner_w, inner_h) = (size.width - 2, size.height - 2);
        let Some((x, y)) = inner_point(local, inner_w, inner_h) else {
            return Vec::new();
        };
        if y == SEARCH_ROW {
            if self.load == LoadState::Loaded {
                self.search.activate();
            }
            return Vec::new();
        }
        if self.load != LoadState::Loaded || !(LIST_TOP..LIST_TOP + LIST_ROWS).contains(&y) {
            return Vec::new();
        }
        if !self.list.handle_click(usize::from(y - LIST_TOP)) {
            return Vec::new();
        }
        let button_x = request_button_x(inner_w);
        if (button_x..button_x + REQUEST_BUTTON_WIDTH).contains(&x) {
            return self.submit_selected().into_iter().collect();
        }
        Vec::new()
    }

    fn badge(&self, _view: &DeskView) -> Option<String> {
        if self.in_flight {
            Some("sending…".to_string())
        } else if self.load == LoadState::Loaded {
            Some(self.list.total_len().to_string())
        } else {
            None
        }
    }

    fn draw(&mut self, buf: &mut Buffer, area: Rect, _focused: bool, view: &DeskView) {
        let palette = view.palette();
        self.cursor = row(area, SEARCH_ROW).and_then(|r| self.search.draw(buf, r, palette));
        self.draw_list(buf, area, view);

        let notice = match &self.notice {
            Some(Notice::Success(text)) => Some((text.as_str(), palette.style_playing())),
            Some(Notice::Error(text)) => Some((text.as_str(), palette.style_error())),
            None if self.in_flight => Some(("sending request…", palette.style_muted())),
            None => None,
        };
        if let (Some((text, style)), Some(r)) = (notice, row(area, NOTICE_ROW)) {
            Paragraph::new(Span::styled(centered(text, usize::from(area.width)), style))
                .render(r, buf);
        }
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackIntent;
    use crate::theme::Theme;
    use ratatui::crossterm::event::KeyModifiers;
    use station_proto::protocol::Song;

    fn view() -> DeskView<'static> {
        DeskView {
            snapshot: None,
            loading: false,
            elapsed: 0,
            progress: 0.0,
            intent: PlaybackIntent::default(),
            start_error: None,
            theme: Theme::Dark,
            focused: Some(PanelId::Requests),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn song(id: &str, title: &str, artist: &str) -> RequestableSong {
        RequestableSong {
            request_id: id.to_string(),
            song: Song {
                title: title.to_string(),
                artist: artist.to_string(),
                ..Default::default()
            },
        }
    }

    fn loaded() -> RequestsPanel {
        let mut panel = RequestsPanel::new();
        assert!(panel.begin_load());
        assert!(!panel.begin_load());
        panel.on_loaded(Ok(vec![
            song("1", "Sodade", "Cesaria Evora"),
            song("2", "Petit Pays", "Cesaria Evora"),
            song("3", "Mar Azul", "Bana"),
        ]));
        panel
    }

    #[test]
    fn test_one_request_in_flight() {
        let mut panel = loaded();
        let v = view();
        assert_eq!(
            panel.handle_key(key(KeyCode::Enter), &v),
            vec![Action::SubmitRequest("1".into())]
        );
        assert!(panel.in_flight());
        // A second submit while the first is pending does nothing.
        panel.handle_key(key(KeyCode::Down), &v);
        assert!(panel.handle_key(key(KeyCode::Enter), &v).is_empty());

        panel.on_submitted(Ok(RequestOutcome {
            success: true,
            message: None,
        }));
        assert!(!panel.in_flight());
        assert!(matches!(panel.notice(), Some(Notice::Success(_))));
        assert_eq!(
            panel.handle_key(key(KeyCode::Enter), &v),
            vec![Action::SubmitRequest("2".into())]
        );
    }

    #[test]
    fn test_refusal_and_transport_errors() {
        let mut panel = loaded();
        panel.submit_selected();
        panel.on_submitted(Ok(RequestOutcome {
            success: false,
            message: Some("Song already requested".into()),
        }));
        assert_eq!(
            panel.notice(),
            Some(&Notice::Error("Song already requested".into()))
        );

        panel.submit_selected();
        assert!(panel.notice().is_none());
        panel.on_submitted(Err("connection reset".into()));
        assert_eq!(
            panel.notice(),
            Some(&Notice::Error("Error sending request.".into()))
        );
    }

    #[test]
    fn test_search_filters_title_and_artist() {
        let mut panel = loaded();
        let v = view();
        panel.handle_key(key(KeyCode::Char('/')), &v);
        assert!(panel.captures_input());
        for c in "bana".chars() {
            panel.handle_key(key(KeyCode::Char(c)), &v);
        }
        panel.handle_key(key(KeyCode::Enter), &v);
        assert!(!panel.captures_input());
        assert_eq!(
            panel.handle_key(key(KeyCode::Enter), &v),
            vec![Action::SubmitRequest("3".into())]
        );
    }

    #[test]
    fn test_load_failure_sets_notice() {
        let mut panel = RequestsPanel::new();
        panel.begin_load();
        panel.on_loaded(Err("HTTP 500".into()));
        assert!(matches!(panel.notice(), Some(Notice::Error(_))));
        // Nothing to submit.
        assert!(panel.submit_selected().is_none());
        // Search stays closed until songs are there.
        panel.handle_key(key(KeyCode::Char('/')), &view());
        assert!(!panel.captures_input());
    }

    #[test]
    fn test_click_request_button() {
        let mut panel = loaded();
        let v = view();
        let inner_w = i32::from(PanelId::Requests.size().width - 2);
        // Second list row, on the [req] button (panel-local = inner + 1).
        let y = i32::from(LIST_TOP) + 1 + 1;
        let button_x = inner_w - 2 + 1;
        assert!(panel.click(Point::new(5, y), &v).is_empty());
        assert_eq!(
            panel.click(Point::new(button_x, y), &v),
            vec![Action::SubmitRequest("2".into())]
        );
    }
}
