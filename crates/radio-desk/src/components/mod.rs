pub mod dock;
pub mod history;
pub mod player;
pub mod playlist_info;
pub mod requests;
pub mod splash;

use ratatui::layout::Rect;

use crate::panel::Point;

/// Panel-local point to a position inside the frame's inner area, or `None`
/// on the border.
pub(crate) fn inner_point(local: Point, inner_width: u16, inner_height: u16) -> Option<(u16, u16)> {
    let x = local.x - 1;
    let y = local.y - 1;
    if x < 0 || y < 0 || x >= i32::from(inner_width) || y >= i32::from(inner_height) {
        return None;
    }
    Some((x as u16, y as u16))
}

/// One row of `area`, or `None` when it is clipped away.
pub(crate) fn row(area: Rect, y: u16) -> Option<Rect> {
    (y < area.height).then(|| Rect::new(area.x, area.y + y, area.width, 1))
}
