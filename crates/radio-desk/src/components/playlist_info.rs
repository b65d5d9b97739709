use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::app_state::DeskView;
use crate::component::PanelContent;
use crate::components::row;
use crate::panel::PanelId;
use crate::widgets::text::fit_width;

#[derive(Default)]
pub struct PlaylistInfoPanel;

impl PlaylistInfoPanel {
    pub fn new() -> Self {
        Self
    }
}

impl PanelContent for PlaylistInfoPanel {
    fn id(&self) -> PanelId {
        PanelId::PlaylistInfo
    }

    fn draw(&mut self, buf: &mut Buffer, area: Rect, _focused: bool, view: &DeskView) {
        let palette = view.palette();
        let w = usize::from(area.width).saturating_sub(2);
        let playlist = view
            .snapshot
            .and_then(|s| s.playlist_name())
            .unwrap_or("Unknown");
        let next = view.snapshot.and_then(|s| s.next_song());

        let field = |text: &str, style: Style| Span::styled(format!(" {}", fit_width(text, w)), style);

        let mut lines = vec![
            (1, field("playlist", palette.style_muted())),
            (2, field(playlist, palette.style_title())),
            (4, field("playing next", palette.style_muted())),
        ];
        match next {
            Some(song) => {
                lines.push((5, field(&song.title, palette.style_title())));
                lines.push((6, field(&song.artist, palette.style_secondary())));
                lines.push((7, field(&song.album, palette.style_muted())));
            }
            None => lines.push((5, field("Not found", palette.style_secondary()))),
        }

        for (y, span) in lines {
            if let Some(r) = row(area, y) {
                Paragraph::new(Line::from(span)).render(r, buf);
            }
        }
    }
}
