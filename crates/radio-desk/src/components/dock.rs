//! Dock: the strip of launcher buttons along the left edge.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::action::Action;
use crate::app_state::DeskView;
use crate::panel::PanelId;
use crate::registry::WindowRegistry;

pub const DOCK_WIDTH: u16 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DockButton {
    Panel(PanelId),
    Theme,
}

impl DockButton {
    const ALL: [DockButton; 5] = [
        DockButton::Panel(PanelId::Player),
        DockButton::Panel(PanelId::History),
        DockButton::Panel(PanelId::Requests),
        DockButton::Panel(PanelId::PlaylistInfo),
        DockButton::Theme,
    ];

    fn action(self) -> Action {
        match self {
            DockButton::Panel(id) => Action::TogglePanel(id),
            DockButton::Theme => Action::ToggleTheme,
        }
    }
}

/// Buttons sit every other row, starting one row below the dock's top.
fn button_row(index: usize) -> u16 {
    1 + 2 * index as u16
}

#[derive(Default)]
pub struct Dock {
    area: Rect,
}

impl Dock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Which button, if any, sits at screen cell (`col`, `row`) as of the
    /// last draw.
    pub fn hit(&self, col: u16, row: u16) -> Option<Action> {
        if !self.area.contains((col, row).into()) {
            return None;
        }
        let y = row - self.area.y;
        DockButton::ALL
            .iter()
            .enumerate()
            .find(|(i, _)| button_row(*i) == y)
            .map(|(_, b)| b.action())
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect, registry: &WindowRegistry, view: &DeskView) {
        self.area = area;
        let palette = view.palette();
        frame.render_widget(Block::default().style(Style::default().bg(palette.dock_bg)), area);

        for (i, button) in DockButton::ALL.iter().enumerate() {
            let y = button_row(i);
            if y >= area.height {
                break;
            }
            let line = match button {
                DockButton::Panel(id) => {
                    let open = registry.is_open(*id);
                    let marker = if open { "●" } else { " " };
                    let label_style = if view.focused == Some(*id) {
                        palette.style_title()
                    } else if open {
                        Style::default().fg(palette.primary)
                    } else {
                        palette.style_secondary()
                    };
                    Line::from(vec![
                        Span::styled(format!(" {}", marker), palette.style_playing()),
                        Span::styled(format!("{} ", id.hotkey()), palette.style_muted()),
                        Span::styled(id.dock_label(), label_style),
                    ])
                }
                DockButton::Theme => Line::from(vec![
                    Span::styled("  t ", palette.style_muted()),
                    Span::styled(
                        view.theme.toggled().label(),
                        palette.style_accent().add_modifier(Modifier::ITALIC),
                    ),
                ]),
            };
            let r = Rect::new(area.x, area.y + y, area.width, 1);
            frame.render_widget(Paragraph::new(line), r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_maps_rows_to_buttons() {
        let dock = Dock {
            area: Rect::new(0, 0, DOCK_WIDTH, 20),
        };
        assert_eq!(dock.hit(2, 1), Some(Action::TogglePanel(PanelId::Player)));
        assert_eq!(dock.hit(2, 2), None);
        assert_eq!(dock.hit(2, 5), Some(Action::TogglePanel(PanelId::Requests)));
        assert_eq!(dock.hit(2, 9), Some(Action::ToggleTheme));
        assert_eq!(dock.hit(DOCK_WIDTH, 1), None);
    }
}
