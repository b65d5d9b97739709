//! Display-width aware text fitting.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate `s` to at most `width` terminal cells, ending in `…` when cut.
pub fn fit_width(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Left-pad `s` so it sits centred in `width` cells.
pub fn centered(s: &str, width: usize) -> String {
    let fitted = fit_width(s, width);
    let pad = width.saturating_sub(fitted.width()) / 2;
    format!("{}{}", " ".repeat(pad), fitted)
}
