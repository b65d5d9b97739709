//! PanelContent: what every floating panel draws inside its frame.
//!
//! - Contents own their local state (selection, search text, notices).
//! - They read shared state through `DeskView` and never mutate it.
//! - Keys and clicks turn into `Vec<Action>` for the App to dispatch.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{buffer::Buffer, layout::Rect};

use crate::action::Action;
use crate::app_state::DeskView;
use crate::panel::{PanelId, Point};

pub trait PanelContent {
    fn id(&self) -> PanelId;

    /// Only called while this panel is the top open one.
    fn handle_key(&mut self, _key: KeyEvent, _view: &DeskView) -> Vec<Action> {
        Vec::new()
    }

    /// `local` is relative to the panel's top-left corner, frame included.
    fn click(&mut self, _local: Point, _view: &DeskView) -> Vec<Action> {
        Vec::new()
    }

    /// True while the content wants every key, global shortcuts included.
    fn captures_input(&self) -> bool {
        false
    }

    /// Render into the inner area of the panel frame. `buf` covers exactly
    /// the panel; the app clips it onto the desktop afterwards.
    fn draw(&mut self, buf: &mut Buffer, area: Rect, focused: bool, view: &DeskView);

    /// Text cursor in panel buffer coordinates, as of the last draw.
    fn cursor(&self) -> Option<(u16, u16)> {
        None
    }

    /// Extra text for the title bar, right-aligned before the close button.
    fn badge(&self, _view: &DeskView) -> Option<String> {
        None
    }
}
