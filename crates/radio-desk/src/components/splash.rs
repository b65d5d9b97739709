use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::app_state::DeskView;
use crate::widgets::text::centered;

/// Full-desktop placeholder shown until the first poll completes.
pub fn draw_loading(frame: &mut Frame, area: Rect, view: &DeskView) {
    let palette = view.palette();
    frame.render_widget(Block::default().style(palette.style_default()), area);
    if area.height == 0 {
        return;
    }
    let width = usize::from(area.width);
    let mid = area.y + area.height / 2;
    let lines = [
        (mid.saturating_sub(1), centered("radio cesaria", width), palette.style_title()),
        (mid + 1, centered("loading radio…", width), palette.style_muted()),
    ];
    for (y, text, style) in lines {
        if y >= area.y && y < area.bottom() {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(text, style))),
                Rect::new(area.x, y, area.width, 1),
            );
        }
    }
}
