//! Floating panels on the desktop.
//!
//! Geometry is kept in desktop-relative cells as signed integers: a panel may
//! be dragged partly past the left or top edge, and the renderer clips it.

use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelId {
    Player,
    History,
    Requests,
    PlaylistInfo,
}

impl PanelId {
    pub const ALL: [PanelId; 4] = [
        PanelId::Player,
        PanelId::History,
        PanelId::Requests,
        PanelId::PlaylistInfo,
    ];

    pub fn index(self) -> usize {
        match self {
            PanelId::Player => 0,
            PanelId::History => 1,
            PanelId::Requests => 2,
            PanelId::PlaylistInfo => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PanelId::Player => "radio cesaria",
            PanelId::History => "song history",
            PanelId::Requests => "request a song",
            PanelId::PlaylistInfo => "playlist info",
        }
    }

    /// Short label used by the dock.
    pub fn dock_label(self) -> &'static str {
        match self {
            PanelId::Player => "player",
            PanelId::History => "history",
            PanelId::Requests => "requests",
            PanelId::PlaylistInfo => "playlist",
        }
    }

    pub fn hotkey(self) -> char {
        match self {
            PanelId::Player => '1',
            PanelId::History => '2',
            PanelId::Requests => '3',
            PanelId::PlaylistInfo => '4',
        }
    }

    pub fn from_hotkey(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.hotkey() == c)
    }

    pub fn size(self) -> Size {
        match self {
            PanelId::Player => Size::new(44, 16),
            PanelId::History => Size::new(50, 16),
            PanelId::Requests => Size::new(52, 18),
            PanelId::PlaylistInfo => Size::new(48, 11),
        }
    }

    pub fn default_position(self) -> Point {
        match self {
            PanelId::Player => Point::new(4, 2),
            PanelId::History => Point::new(14, 6),
            PanelId::Requests => Point::new(26, 3),
            PanelId::PlaylistInfo => Point::new(38, 5),
        }
    }

    /// Stacking order at startup: the player on top, then the rest in
    /// declaration order.
    pub fn initial_z(self) -> u32 {
        match self {
            PanelId::Player => 10,
            PanelId::History => 9,
            PanelId::Requests => 8,
            PanelId::PlaylistInfo => 7,
        }
    }

    /// Closing the primary panel stops playback.
    pub fn is_primary(self) -> bool {
        self == PanelId::Player
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Width of the `[x]` close button at the right end of the title row,
/// corner included.
pub const CLOSE_BUTTON_WIDTH: i32 = 4;

/// Where a pointer landed inside a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelHit {
    Close,
    /// The title row, minus the close button.
    Handle,
    /// Anywhere else; the point is panel-local.
    Body(Point),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub id: PanelId,
    pub is_open: bool,
    pub z_index: u32,
    pub position: Point,
}

impl Panel {
    pub fn new(id: PanelId) -> Self {
        Self {
            id,
            is_open: id.is_primary(),
            z_index: id.initial_z(),
            position: id.default_position(),
        }
    }

    pub fn size(&self) -> Size {
        self.id.size()
    }

    pub fn contains(&self, p: Point) -> bool {
        let size = self.size();
        let local = p - self.position;
        local.x >= 0
            && local.y >= 0
            && local.x < i32::from(size.width)
            && local.y < i32::from(size.height)
    }

    pub fn hit(&self, p: Point) -> Option<PanelHit> {
        if !self.contains(p) {
            return None;
        }
        let local = p - self.position;
        let width = i32::from(self.size().width);
        Some(match local.y {
            0 if local.x >= width - CLOSE_BUTTON_WIDTH => PanelHit::Close,
            0 => PanelHit::Handle,
            _ => PanelHit::Body(local),
        })
    }

    /// Start dragging from `pointer`; the anchor is the pointer's offset from
    /// the panel origin and stays fixed for the whole gesture.
    pub fn begin_drag(&self, pointer: Point) -> DragSession {
        DragSession {
            panel: self.id,
            anchor: pointer - self.position,
        }
    }

    pub fn drag_to(&mut self, session: &DragSession, pointer: Point) {
        if session.panel == self.id {
            self.position = pointer - session.anchor;
        }
    }
}

/// A drag gesture in progress. Owned by whoever routes pointer events; its
/// absence means no drag is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub panel: PanelId,
    pub anchor: Point,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_player_starts_open() {
        for id in PanelId::ALL {
            assert_eq!(Panel::new(id).is_open, id == PanelId::Player);
        }
    }

    #[test]
    fn initial_z_indices_are_distinct() {
        let mut zs: Vec<u32> = PanelId::ALL.iter().map(|id| id.initial_z()).collect();
        zs.sort_unstable();
        zs.dedup();
        assert_eq!(zs.len(), PanelId::ALL.len());
    }

    #[test]
    fn hotkeys_round_trip() {
        for id in PanelId::ALL {
            assert_eq!(PanelId::from_hotkey(id.hotkey()), Some(id));
        }
        assert_eq!(PanelId::from_hotkey('9'), None);
    }

    #[test]
    fn hit_regions() {
        let panel = Panel::new(PanelId::Player); // at (4,2), 44x16
        assert_eq!(panel.hit(Point::new(3, 2)), None);
        assert_eq!(panel.hit(Point::new(4, 2)), Some(PanelHit::Handle));
        assert_eq!(panel.hit(Point::new(4 + 43, 2)), Some(PanelHit::Close));
        assert_eq!(panel.hit(Point::new(4 + 40, 2)), Some(PanelHit::Close));
        assert_eq!(panel.hit(Point::new(4 + 39, 2)), Some(PanelHit::Handle));
        assert_eq!(
            panel.hit(Point::new(10, 5)),
            Some(PanelHit::Body(Point::new(6, 3)))
        );
        assert_eq!(panel.hit(Point::new(4, 2 + 16)), None);
    }

    #[test]
    fn drag_keeps_anchor_offset() {
        let mut panel = Panel::new(PanelId::History); // at (14,6)
        let session = panel.begin_drag(Point::new(20, 6));
        assert_eq!(session.anchor, Point::new(6, 0));

        panel.drag_to(&session, Point::new(30, 10));
        assert_eq!(panel.position, Point::new(24, 10));

        // Dragging past the desktop origin is allowed.
        panel.drag_to(&session, Point::new(2, 0));
        assert_eq!(panel.position, Point::new(-4, 0));
    }

    #[test]
    fn drag_session_only_moves_its_panel() {
        let mut player = Panel::new(PanelId::Player);
        let history = Panel::new(PanelId::History);
        let session = history.begin_drag(Point::new(15, 6));
        player.drag_to(&session, Point::new(40, 40));
        assert_eq!(player.position, PanelId::Player.default_position());
    }
}
