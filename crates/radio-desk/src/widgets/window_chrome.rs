//! WindowChrome: the frame around a floating panel.
//!
//! Row 0 is the title bar: hotkey hint and title on the left, an optional
//! badge and the `[x]` close button on the right. The close button ends one
//! cell before the right corner, matching `panel::CLOSE_BUTTON_WIDTH`.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
};

use crate::theme::Palette;

pub fn window_chrome<'a>(
    title: &'a str,
    hotkey: char,
    focused: bool,
    badge: Option<String>,
    palette: &Palette,
) -> Block<'a> {
    let title_style = if focused {
        palette.style_title()
    } else {
        palette.style_secondary()
    };

    let left = Line::from(vec![
        Span::styled(format!("[{}] ", hotkey), palette.style_muted()),
        Span::styled(title, title_style),
    ]);

    let mut right = Vec::new();
    if let Some(text) = badge {
        right.push(Span::styled(
            format!(" {} ", text),
            Style::default()
                .fg(palette.playing)
                .add_modifier(Modifier::BOLD),
        ));
    }
    right.push(Span::styled(
        "[x]",
        Style::default().fg(if focused { palette.accent } else { palette.muted }),
    ));

    Block::default()
        .borders(Borders::ALL)
        .border_style(palette.style_border(focused))
        .style(palette.style_default())
        .title(left)
        .title_top(Line::from(right).right_aligned())
}
