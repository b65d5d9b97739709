//! Smooth Unicode progress bar widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Palette;

/// Render `elapsed / duration` with time labels on both sides.
/// `percent` is 0.0..=100.0.
pub fn draw_progress(
    buf: &mut Buffer,
    area: Rect,
    percent: f64,
    elapsed: u64,
    duration: u64,
    palette: &Palette,
) {
    if area.width < 4 || area.height == 0 {
        return;
    }

    let left_label = fmt_time(elapsed);
    let right_label = fmt_time(duration);
    let label_w = (left_label.len() + right_label.len() + 2) as u16;
    let bar_w = area.width.saturating_sub(label_w).max(4) as usize;

    let spans = vec![
        Span::styled(format!("{} ", left_label), palette.style_secondary()),
        Span::styled(bar(percent / 100.0, bar_w), palette.style_playing()),
        Span::styled(format!(" {}", right_label), palette.style_muted()),
    ];
    Paragraph::new(Line::from(spans)).render(area, buf);
}

/// `fraction` is clamped to 0.0..=1.0; the result is exactly `width` cells.
pub fn bar(fraction: f64, width: usize) -> String {
    const BLOCKS: [char; 9] = ['░', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

    // 8 eighths per cell
    let eighths = (fraction.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full_blocks = eighths / 8;
    let partial = eighths % 8;

    let mut out = String::with_capacity(width * 3);
    for _ in 0..full_blocks {
        out.push('█');
    }
    if full_blocks < width {
        out.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            out.push('░');
        }
    }
    out
}

pub fn fmt_time(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_time() {
        assert_eq!(fmt_time(0), "0:00");
        assert_eq!(fmt_time(65), "1:05");
        assert_eq!(fmt_time(3725), "1:02:05");
    }

    #[test]
    fn test_bar_width_is_stable() {
        for f in [0.0, 0.13, 0.5, 0.99, 1.0, 7.0, -1.0] {
            assert_eq!(bar(f, 20).chars().count(), 20, "fraction {}", f);
        }
        assert_eq!(bar(1.0, 4), "████");
        assert_eq!(bar(0.5, 4), "██░░");
    }
}
