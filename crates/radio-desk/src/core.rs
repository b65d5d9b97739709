//! DeskCore: single owner of all mutable desk state.
//!
//! The app loop is the only caller: key and mouse input, poll outcomes and
//! the one-second tick all arrive there in sequence, so no operation here
//! ever races another or waits on I/O. Background work (polling, song
//! requests, starting the audio sink) reports back through channels instead
//! of touching this state.
//!
//! Composition:
//!   - `WindowRegistry`: open/closed, stacking, positions
//!   - `PlaybackController`: playing/muted intent driven onto the sink
//!   - `RemoteStatePoller`: last accepted station snapshot
//!   - `ElapsedClock`: extrapolated song position
//!   - the active drag gesture, if any
use tracing::{debug, info};

use crate::app_state::DeskView;
use crate::clock::{self, ElapsedClock};
use crate::panel::{DragSession, PanelHit, PanelId, Point};
use crate::playback::{PlaybackController, SinkHandle, StartReport};
use crate::poller::{PollOutcome, RemoteStatePoller};
use crate::registry::{ToggleEffect, WindowRegistry};
use crate::theme::Theme;

/// A pointer-down that landed in a panel body; the content decides what it
/// means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyClick {
    pub panel: PanelId,
    pub local: Point,
}

pub struct DeskCore {
    registry: WindowRegistry,
    playback: PlaybackController,
    remote: RemoteStatePoller,
    clock: ElapsedClock,
    drag: Option<DragSession>,
    theme: Theme,
}

impl DeskCore {
    pub fn new(sink: SinkHandle, theme: Theme) -> Self {
        Self {
            registry: WindowRegistry::new(),
            playback: PlaybackController::new(sink),
            remote: RemoteStatePoller::new(),
            clock: ElapsedClock::new(),
            drag: None,
            theme,
        }
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn remote(&self) -> &RemoteStatePoller {
        &self.remote
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn elapsed(&self) -> u64 {
        self.clock.elapsed()
    }

    pub fn progress_percentage(&self) -> f64 {
        let duration = self.remote.snapshot().map_or(0, |s| s.reported_duration());
        clock::progress_percentage(self.clock.elapsed(), duration)
    }

    pub fn view(&self) -> DeskView<'_> {
        DeskView {
            snapshot: self.remote.snapshot(),
            loading: self.remote.loading(),
            elapsed: self.clock.elapsed(),
            progress: self.progress_percentage(),
            intent: self.playback.intent(),
            start_error: self.playback.start_error(),
            theme: self.theme,
            focused: self.registry.top_open(),
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────────

    pub fn toggle_panel(&mut self, id: PanelId) -> ToggleEffect {
        let effect = self.registry.toggle(id);
        debug!("core: toggle {:?} -> open={}", id, effect.opened);
        if !effect.opened && self.drag.is_some_and(|d| d.panel == id) {
            self.drag = None;
        }
        // Any reopen resyncs, playing or not; a paused clock is stale too.
        if effect.opened && id.is_primary() {
            self.clock.resync(self.remote.snapshot());
        }
        if effect.stop_playback {
            info!("core: player closed, stopping playback");
            self.playback.stop();
        }
        effect
    }

    pub fn focus_panel(&mut self, id: PanelId) -> bool {
        self.registry.focus(id)
    }

    pub fn focus_next(&mut self) -> Option<PanelId> {
        let next = self.registry.next_open()?;
        self.registry.focus(next);
        Some(next)
    }

    // ── Playback ─────────────────────────────────────────────────────────────

    pub fn toggle_play(&mut self) {
        self.playback.toggle_play();
    }

    pub fn toggle_mute(&mut self) {
        self.playback.toggle_mute();
    }

    /// The sink answered a start attempt. Returns true when it still counts.
    pub fn on_start_report(&mut self, report: StartReport) -> bool {
        self.playback.on_start_report(report)
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    // ── Remote state / clock ─────────────────────────────────────────────────

    pub fn on_poll(&mut self, outcome: PollOutcome) {
        if !self.remote.apply(outcome) {
            debug!(
                "core: keeping last snapshot ({} failed polls in a row)",
                self.remote.consecutive_failures()
            );
            return;
        }
        if self.clock.observe(self.remote.snapshot()) {
            debug!("core: song changed, elapsed={}", self.clock.elapsed());
        }
    }

    pub fn tick(&mut self) {
        self.clock.tick(self.playback.intent().playing);
    }

    // ── Pointer ──────────────────────────────────────────────────────────────

    /// Route a pointer-down in desktop coordinates to the topmost open panel
    /// under it. The close button closes, the title row starts a drag, the
    /// body raises the panel and is handed back to the caller.
    pub fn pointer_down(&mut self, p: Point) -> Option<BodyClick> {
        let id = self.registry.panel_at(p)?;
        match self.registry.panel(id).hit(p)? {
            PanelHit::Close => {
                self.toggle_panel(id);
                None
            }
            PanelHit::Handle => {
                self.drag = Some(self.registry.panel(id).begin_drag(p));
                self.focus_panel(id);
                None
            }
            PanelHit::Body(local) => {
                self.focus_panel(id);
                Some(BodyClick { panel: id, local })
            }
        }
    }

    /// Returns true when a panel moved.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        let Some(session) = self.drag else {
            return false;
        };
        self.registry.panel_mut(session.panel).drag_to(&session, p);
        true
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Release everything that outlives a frame: the drag gesture and the
    /// audio output.
    pub async fn shutdown(&mut self) {
        self.drag = None;
        self.playback.stop();
        self.playback.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::spawn_sink;
    use crate::playback::test_sink::{RecordingSink, SinkCall};
    use station_proto::protocol::{NowPlaying, Song};
    use station_proto::StationSnapshot;
    use tokio::sync::mpsc;

    fn snapshot(title: &str, elapsed: u64, duration: u64) -> PollOutcome {
        PollOutcome::Snapshot(StationSnapshot::new(
            Some(NowPlaying {
                song: Some(Song {
                    title: title.into(),
                    artist: "Cesaria Evora".into(),
                    ..Default::default()
                }),
                elapsed,
                duration,
                ..Default::default()
            }),
            vec![],
        ))
    }

    fn core_with(sink: &RecordingSink) -> (DeskCore, mpsc::Receiver<StartReport>) {
        let (tx, rx) = mpsc::channel(16);
        (DeskCore::new(spawn_sink(sink.clone(), tx), Theme::Dark), rx)
    }

    fn core() -> DeskCore {
        core_with(&RecordingSink::default()).0
    }

    #[tokio::test]
    async fn test_open_focus_close_scenario() {
        let mut core = core();
        core.toggle_play();
        assert!(core.view().intent.playing);

        core.toggle_panel(PanelId::History);
        assert_eq!(core.registry().panel(PanelId::History).z_index, 11);
        assert!(core.focus_panel(PanelId::Player));
        assert_eq!(core.registry().panel(PanelId::Player).z_index, 12);

        let effect = core.toggle_panel(PanelId::Player);
        assert!(effect.stop_playback);
        assert!(!core.view().intent.playing);
    }

    #[tokio::test]
    async fn test_clock_follows_polls_and_ticks() {
        let mut core = core();
        core.on_poll(snapshot("X", 42, 200));
        assert_eq!(core.elapsed(), 42);

        core.tick(); // not playing
        assert_eq!(core.elapsed(), 42);

        core.toggle_play();
        for _ in 0..3 {
            core.tick();
        }
        assert_eq!(core.elapsed(), 45);

        core.on_poll(snapshot("X", 50, 200));
        assert_eq!(core.elapsed(), 45);

        core.on_poll(snapshot("Y", 3, 200));
        assert_eq!(core.elapsed(), 3);
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_state() {
        let mut core = core();
        core.on_poll(snapshot("X", 42, 200));
        core.on_poll(PollOutcome::Failed("503".into()));
        let view = core.view();
        assert!(!view.loading);
        assert_eq!(
            view.snapshot.and_then(|s| s.current_song()).map(|s| s.title.as_str()),
            Some("X")
        );
        assert_eq!(view.elapsed, 42);
    }

    #[tokio::test]
    async fn test_reopening_player_resyncs_clock() {
        let mut core = core();
        core.on_poll(snapshot("X", 42, 200));
        core.toggle_play();
        for _ in 0..5 {
            core.tick();
        }
        core.toggle_panel(PanelId::Player); // close, stops playback
        core.on_poll(snapshot("X", 90, 200));
        assert_eq!(core.elapsed(), 47);
        core.toggle_panel(PanelId::Player);
        assert_eq!(core.elapsed(), 90);
    }

    #[tokio::test]
    async fn test_progress_percentage() {
        let mut core = core();
        assert_eq!(core.progress_percentage(), 0.0);
        core.on_poll(snapshot("X", 50, 0));
        assert_eq!(core.progress_percentage(), 0.0);
        core.on_poll(snapshot("Y", 50, 200));
        assert_eq!(core.progress_percentage(), 25.0);
        core.on_poll(snapshot("Z", 500, 200));
        assert_eq!(core.progress_percentage(), 100.0);
    }

    #[tokio::test]
    async fn test_refused_start_leaves_intent_playing() {
        let (mut core, mut rx) = core_with(&RecordingSink::refusing());
        core.toggle_play();
        assert!(core.view().start_error.is_none());
        assert!(core.on_start_report(rx.recv().await.unwrap()));
        let view = core.view();
        assert!(view.intent.playing);
        assert!(view.start_error.is_some());
    }

    #[tokio::test]
    async fn test_drag_by_title_row() {
        let mut core = core();
        // Player sits at (4,2); grab its title row 6 cells in.
        assert_eq!(core.pointer_down(Point::new(10, 2)), None);
        assert_eq!(core.drag().map(|d| d.anchor), Some(Point::new(6, 0)));

        assert!(core.pointer_move(Point::new(30, 12)));
        assert_eq!(
            core.registry().panel(PanelId::Player).position,
            Point::new(24, 12)
        );

        core.pointer_up();
        assert!(core.drag().is_none());
        assert!(!core.pointer_move(Point::new(0, 0)));
        assert_eq!(
            core.registry().panel(PanelId::Player).position,
            Point::new(24, 12)
        );
    }

    #[tokio::test]
    async fn test_pointer_move_without_drag_is_noop() {
        let mut core = core();
        assert!(!core.pointer_move(Point::new(40, 40)));
        assert_eq!(
            core.registry().panel(PanelId::Player).position,
            PanelId::Player.default_position()
        );
    }

    #[tokio::test]
    async fn test_close_button_closes_and_stops() {
        let mut core = core();
        core.toggle_play();
        // Player is 44 wide at x=4: the close button covers x 44..48 on row 2.
        assert_eq!(core.pointer_down(Point::new(46, 2)), None);
        assert!(!core.registry().is_open(PanelId::Player));
        assert!(!core.view().intent.playing);
        assert!(core.drag().is_none());
    }

    #[tokio::test]
    async fn test_body_click_raises_and_reports() {
        let mut core = core();
        core.toggle_panel(PanelId::History);
        // Inside the player but not the history panel.
        let click = core.pointer_down(Point::new(6, 5));
        assert_eq!(
            click,
            Some(BodyClick {
                panel: PanelId::Player,
                local: Point::new(2, 3),
            })
        );
        assert_eq!(core.registry().top(), Some(PanelId::Player));
        assert!(core.pointer_down(Point::new(200, 200)).is_none());
    }

    #[tokio::test]
    async fn test_closing_dragged_panel_ends_drag() {
        let mut core = core();
        core.toggle_panel(PanelId::History);
        core.pointer_down(Point::new(20, 6));
        assert_eq!(core.drag().map(|d| d.panel), Some(PanelId::History));
        core.toggle_panel(PanelId::History);
        assert!(core.drag().is_none());
    }

    #[tokio::test]
    async fn test_shutdown_pauses_sink() {
        let sink = RecordingSink::default();
        let (mut core, mut rx) = core_with(&sink);
        core.toggle_play();
        rx.recv().await.unwrap();
        core.shutdown().await;
        assert!(!core.view().intent.playing);
        assert_eq!(sink.calls().last(), Some(&SinkCall::Pause));
    }
}
