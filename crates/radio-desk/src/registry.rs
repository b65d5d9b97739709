//! WindowRegistry: open/closed state, stacking order and positions of the
//! four desktop panels.
//!
//! Stacking invariant: z-indices are pairwise distinct at all times, so the
//! top panel is always unambiguous. Opening or focusing a panel gives it
//! `max + 1`; closing leaves its z-index alone.

use crate::panel::{Panel, PanelId, Point};

/// Once any z-index reaches this, all of them are re-ranked from 1.
pub const RENORMALIZE_THRESHOLD: u32 = 1 << 20;

/// Side effects the caller must carry out after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleEffect {
    pub opened: bool,
    /// The primary panel was closed: playback must stop.
    pub stop_playback: bool,
}

#[derive(Debug, Clone)]
pub struct WindowRegistry {
    panels: [Panel; 4],
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self {
            panels: PanelId::ALL.map(Panel::new),
        }
    }

    pub fn panel(&self, id: PanelId) -> &Panel {
        &self.panels[id.index()]
    }

    pub fn panel_mut(&mut self, id: PanelId) -> &mut Panel {
        &mut self.panels[id.index()]
    }

    pub fn is_open(&self, id: PanelId) -> bool {
        self.panel(id).is_open
    }

    pub fn toggle(&mut self, id: PanelId) -> ToggleEffect {
        let was_open = self.panel(id).is_open;
        if was_open {
            self.panel_mut(id).is_open = false;
        } else {
            let z = self.max_z_excluding(id) + 1;
            let panel = self.panel_mut(id);
            panel.is_open = true;
            panel.z_index = z;
            self.renormalize_if_needed();
        }
        ToggleEffect {
            opened: !was_open,
            stop_playback: was_open && id.is_primary(),
        }
    }

    /// Raise `id` above every other panel. Returns false when it already
    /// holds the top z-index and nothing changed.
    pub fn focus(&mut self, id: PanelId) -> bool {
        if self.top() == Some(id) {
            return false;
        }
        let z = self.max_z() + 1;
        self.panel_mut(id).z_index = z;
        self.renormalize_if_needed();
        true
    }

    /// Holder of the highest z-index, open or not.
    pub fn top(&self) -> Option<PanelId> {
        self.panels.iter().max_by_key(|p| p.z_index).map(|p| p.id)
    }

    /// The open panel drawn last, i.e. the one keyboard input goes to.
    pub fn top_open(&self) -> Option<PanelId> {
        self.panels
            .iter()
            .filter(|p| p.is_open)
            .max_by_key(|p| p.z_index)
            .map(|p| p.id)
    }

    /// Open panels in paint order, bottom first.
    pub fn open_by_z(&self) -> Vec<PanelId> {
        let mut open: Vec<&Panel> = self.panels.iter().filter(|p| p.is_open).collect();
        open.sort_by_key(|p| p.z_index);
        open.into_iter().map(|p| p.id).collect()
    }

    /// Topmost open panel under `p`.
    pub fn panel_at(&self, p: Point) -> Option<PanelId> {
        self.panels
            .iter()
            .filter(|panel| panel.is_open && panel.contains(p))
            .max_by_key(|panel| panel.z_index)
            .map(|panel| panel.id)
    }

    /// Next open panel after the current top one, in dock order.
    pub fn next_open(&self) -> Option<PanelId> {
        let open: Vec<PanelId> = PanelId::ALL
            .into_iter()
            .filter(|id| self.is_open(*id))
            .collect();
        if open.is_empty() {
            return None;
        }
        let start = self
            .top_open()
            .and_then(|top| open.iter().position(|id| *id == top))
            .map_or(0, |pos| (pos + 1) % open.len());
        Some(open[start])
    }

    /// Reassign z-indices 1..=n by rank, preserving relative order.
    pub fn renormalize(&mut self) {
        let mut order: Vec<usize> = (0..self.panels.len()).collect();
        order.sort_by_key(|&i| self.panels[i].z_index);
        for (rank, i) in order.into_iter().enumerate() {
            self.panels[i].z_index = rank as u32 + 1;
        }
    }

    fn renormalize_if_needed(&mut self) {
        if self.max_z() >= RENORMALIZE_THRESHOLD {
            tracing::debug!("registry: renormalizing z-indices");
            self.renormalize();
        }
    }

    fn max_z(&self) -> u32 {
        self.panels.iter().map(|p| p.z_index).max().unwrap_or(0)
    }

    fn max_z_excluding(&self, id: PanelId) -> u32 {
        self.panels
            .iter()
            .filter(|p| p.id != id)
            .map(|p| p.z_index)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn z(reg: &WindowRegistry, id: PanelId) -> u32 {
        reg.panel(id).z_index
    }

    fn assert_distinct(reg: &WindowRegistry) {
        let mut zs: Vec<u32> = PanelId::ALL.iter().map(|id| z(reg, *id)).collect();
        zs.sort_unstable();
        zs.dedup();
        assert_eq!(zs.len(), 4, "z-indices collided: {:?}", reg.panels);
    }

    #[test]
    fn test_initial_state() {
        let reg = WindowRegistry::new();
        assert!(reg.is_open(PanelId::Player));
        assert!(!reg.is_open(PanelId::History));
        assert_eq!(reg.top(), Some(PanelId::Player));
        assert_eq!(reg.open_by_z(), vec![PanelId::Player]);
    }

    #[test]
    fn test_open_raises_then_focus_raises_again() {
        let mut reg = WindowRegistry::new();
        let effect = reg.toggle(PanelId::History);
        assert!(effect.opened);
        assert!(!effect.stop_playback);
        assert_eq!(z(&reg, PanelId::History), 11);
        assert_eq!(reg.top_open(), Some(PanelId::History));

        assert!(reg.focus(PanelId::Player));
        assert_eq!(z(&reg, PanelId::Player), 12);
        assert_eq!(reg.open_by_z(), vec![PanelId::History, PanelId::Player]);
    }

    #[test]
    fn test_close_keeps_z_index() {
        let mut reg = WindowRegistry::new();
        reg.toggle(PanelId::Requests);
        let before = z(&reg, PanelId::Requests);
        let effect = reg.toggle(PanelId::Requests);
        assert!(!effect.opened);
        assert!(!reg.is_open(PanelId::Requests));
        assert_eq!(z(&reg, PanelId::Requests), before);
    }

    #[test]
    fn test_closing_primary_requests_stop() {
        let mut reg = WindowRegistry::new();
        let effect = reg.toggle(PanelId::Player);
        assert!(effect.stop_playback);
        // Reopening does not.
        let effect = reg.toggle(PanelId::Player);
        assert!(effect.opened);
        assert!(!effect.stop_playback);
    }

    #[test]
    fn test_focus_top_is_noop() {
        let mut reg = WindowRegistry::new();
        assert!(!reg.focus(PanelId::Player));
        assert!(!reg.focus(PanelId::Player));
        assert_eq!(z(&reg, PanelId::Player), 10);
    }

    #[test]
    fn test_panel_at_prefers_topmost() {
        let mut reg = WindowRegistry::new();
        reg.toggle(PanelId::History);
        // (20,8) is inside both the player (4,2 44x16) and history (14,6 50x16).
        let p = Point::new(20, 8);
        assert_eq!(reg.panel_at(p), Some(PanelId::History));
        reg.focus(PanelId::Player);
        assert_eq!(reg.panel_at(p), Some(PanelId::Player));
        // Closed panels are never hit.
        reg.toggle(PanelId::Player);
        assert_eq!(reg.panel_at(p), Some(PanelId::History));
        assert_eq!(reg.panel_at(Point::new(0, 0)), None);
    }

    #[test]
    fn test_next_open_cycles() {
        let mut reg = WindowRegistry::new();
        assert_eq!(reg.next_open(), Some(PanelId::Player));
        reg.toggle(PanelId::Requests);
        assert_eq!(reg.next_open(), Some(PanelId::Player));
        reg.focus(PanelId::Player);
        assert_eq!(reg.next_open(), Some(PanelId::Requests));
        reg.toggle(PanelId::Player);
        reg.toggle(PanelId::Requests);
        assert_eq!(reg.next_open(), None);
    }

    #[test]
    fn test_renormalize_preserves_order() {
        let mut reg = WindowRegistry::new();
        reg.toggle(PanelId::PlaylistInfo);
        reg.focus(PanelId::History);
        let before = {
            let mut ids = PanelId::ALL.to_vec();
            ids.sort_by_key(|id| z(&reg, *id));
            ids
        };
        reg.renormalize();
        let after = {
            let mut ids = PanelId::ALL.to_vec();
            ids.sort_by_key(|id| z(&reg, *id));
            ids
        };
        assert_eq!(before, after);
        assert_eq!(z(&reg, after[0]), 1);
        assert_eq!(z(&reg, after[3]), 4);
    }

    #[test]
    fn test_threshold_triggers_renormalize() {
        let mut reg = WindowRegistry::new();
        reg.panel_mut(PanelId::History).z_index = RENORMALIZE_THRESHOLD - 1;
        reg.focus(PanelId::Player);
        assert_eq!(reg.top(), Some(PanelId::Player));
        assert_eq!(z(&reg, PanelId::Player), 4);
        assert_eq!(z(&reg, PanelId::History), 3);
        assert_distinct(&reg);
    }

    #[test]
    fn test_stacking_stays_unambiguous() {
        // Seeded random walk over toggles and focuses.
        let mut rng = StdRng::seed_from_u64(0x2545_f491_4f6c_dd1d);
        let mut reg = WindowRegistry::new();
        let mut last_raised = PanelId::Player;
        for _ in 0..2_000 {
            let id = *PanelId::ALL.choose(&mut rng).unwrap();
            if rng.gen_bool(0.5) {
                if reg.toggle(id).opened {
                    last_raised = id;
                }
            } else if reg.focus(id) || reg.top() == Some(id) {
                last_raised = id;
            }
            assert_distinct(&reg);
            assert_eq!(reg.top(), Some(last_raised));
        }
    }
}
