//! App: terminal event loop around `DeskCore`.
//!
//! Architecture:
//! - `App` owns the core, the panel contents and the dock.
//! - Terminal input and background task results arrive on one mpsc channel;
//!   poll outcomes arrive on the poller's own channel.
//! - Each loop turn draws if something changed, then awaits the next event.
//! - Contents return `Vec<Action>`; `dispatch` applies them to the core.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Layout, Position, Rect},
    style::Style,
    widgets::{Block, Widget},
    Frame, Terminal,
};
use station_proto::StationService;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{
    action::{Action, TaskResult},
    component::PanelContent,
    components::{
        dock::{Dock, DOCK_WIDTH},
        history::HistoryPanel,
        player::PlayerPanel,
        playlist_info::PlaylistInfoPanel,
        requests::RequestsPanel,
        splash,
    },
    core::DeskCore,
    panel::{PanelId, Point},
    playback::{self, AudioSink, StartReport},
    poller::{self, PollOutcome},
    theme::{Palette, Theme},
    widgets::{
        status_bar::{draw_keys_bar, InputMode},
        window_chrome::window_chrome,
    },
};

/// Messages flowing into the app loop from background tasks.
#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
    Task(TaskResult),
}

impl From<StartReport> for AppMessage {
    fn from(report: StartReport) -> Self {
        AppMessage::Task(TaskResult::PlaybackStarted(report))
    }
}

/// The four panel contents, addressable by id.
struct Contents {
    player: PlayerPanel,
    history: HistoryPanel,
    requests: RequestsPanel,
    playlist_info: PlaylistInfoPanel,
}

impl Contents {
    fn new() -> Self {
        Self {
            player: PlayerPanel::new(),
            history: HistoryPanel::new(),
            requests: RequestsPanel::new(),
            playlist_info: PlaylistInfoPanel::new(),
        }
    }

    fn get(&self, id: PanelId) -> &dyn PanelContent {
        match id {
            PanelId::Player => &self.player,
            PanelId::History => &self.history,
            PanelId::Requests => &self.requests,
            PanelId::PlaylistInfo => &self.playlist_info,
        }
    }

    fn get_mut(&mut self, id: PanelId) -> &mut dyn PanelContent {
        match id {
            PanelId::Player => &mut self.player,
            PanelId::History => &mut self.history,
            PanelId::Requests => &mut self.requests,
            PanelId::PlaylistInfo => &mut self.playlist_info,
        }
    }
}

pub struct App<S> {
    core: DeskCore,
    service: Arc<S>,
    poll_interval: Duration,

    contents: Contents,
    dock: Dock,

    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,

    /// Desktop area as of the last draw; pointer input is relative to it.
    desktop: Rect,

    /// Whether to quit on next iteration.
    should_quit: bool,
}

impl<S: StationService> App<S> {
    /// Must be called inside a tokio runtime: the sink moves onto its own
    /// task here, answering on the app channel.
    pub fn new<A: AudioSink>(
        sink: A,
        theme: Theme,
        service: Arc<S>,
        poll_interval: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(256);
        let sink = playback::spawn_sink(sink, tx.clone());
        Self {
            core: DeskCore::new(sink, theme),
            service,
            poll_interval,
            contents: Contents::new(),
            dock: Dock::new(),
            tx,
            rx: Some(rx),
            desktop: Rect::default(),
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut rx = self
            .rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("app event channel already taken"))?;

        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard/mouse events ────────────────────────────
        // Polls with a timeout so the thread notices when the loop is gone.
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            while !event_tx.is_closed() {
                match event::poll(Duration::from_millis(250)) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                let Ok(ev) = event::read() else { break };
                if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                    break;
                }
            }
        });

        // ── Background task: now-playing poller ───────────────────────────────
        let (poll_tx, mut poll_rx) = mpsc::channel::<PollOutcome>(16);
        let poller = poller::spawn(self.service.clone(), self.poll_interval, poll_tx);

        let result = self.event_loop(&mut terminal, &mut rx, &mut poll_rx).await;
        drop(rx);

        // ── Teardown ──────────────────────────────────────────────────────────
        poller.shutdown().await;
        self.core.shutdown().await;
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("radio-desk stopped");

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        rx: &mut mpsc::Receiver<AppMessage>,
        poll_rx: &mut mpsc::Receiver<PollOutcome>,
    ) -> anyhow::Result<()> {
        // Elapsed-time clock: first tick one second in.
        let second = Duration::from_secs(1);
        let mut clock_tick = tokio::time::interval_at(Instant::now() + second, second);
        clock_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg);
                }

                Some(outcome) = poll_rx.recv() => {
                    self.core.on_poll(outcome);
                    needs_redraw = true;
                }

                _ = clock_tick.tick() => {
                    self.core.tick();
                    needs_redraw = true;
                }
            }
        }
        Ok(())
    }

    /// Returns true when the screen needs a redraw. Never waits: anything
    /// slow runs on a task and comes back as a `TaskResult`.
    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
                true
            }
            AppMessage::Event(Event::Mouse(mouse)) => self.handle_mouse(mouse),
            AppMessage::Event(Event::Resize(..)) => true,
            AppMessage::Event(_) => false,
            AppMessage::Task(TaskResult::RequestsLoaded(result)) => {
                self.contents.requests.on_loaded(result);
                true
            }
            AppMessage::Task(TaskResult::RequestSubmitted(result)) => {
                match &result {
                    Ok(outcome) => info!("request answered: success={}", outcome.success),
                    Err(e) => warn!("request failed: {}", e),
                }
                self.contents.requests.on_submitted(result);
                true
            }
            AppMessage::Task(TaskResult::PlaybackStarted(report)) => {
                self.core.on_start_report(report)
            }
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    fn input_mode(&self) -> InputMode {
        match self.core.registry().top_open() {
            Some(id) if self.contents.get(id).captures_input() => InputMode::Search,
            _ => InputMode::Desk,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind != KeyEventKind::Press {
            return vec![];
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }

        let view = self.core.view();
        if view.loading {
            return match key.code {
                KeyCode::Char('q') => vec![Action::Quit],
                _ => vec![],
            };
        }

        // A content with an active text field sees every key.
        if let Some(id) = view.focused {
            let content = self.contents.get_mut(id);
            if content.captures_input() {
                return content.handle_key(key, &view);
            }
        }

        match key.code {
            KeyCode::Char('q') => vec![Action::Quit],
            KeyCode::Char(c @ '1'..='4') => PanelId::from_hotkey(c)
                .map(Action::TogglePanel)
                .into_iter()
                .collect(),
            KeyCode::Char('t') => vec![Action::ToggleTheme],
            KeyCode::Char(' ') => vec![Action::TogglePlay],
            KeyCode::Char('m') => vec![Action::ToggleMute],
            KeyCode::Tab => vec![Action::FocusNext],
            _ => match view.focused {
                Some(id) => self.contents.get_mut(id).handle_key(key, &view),
                None => vec![],
            },
        }
    }

    /// Returns true when the screen needs a redraw.
    fn handle_mouse(&mut self, event: MouseEvent) -> bool {
        // Panels are hidden behind the splash until the first poll lands.
        if self.core.remote().loading() {
            return false;
        }

        let col = event.column;
        let row = event.row;
        let p = Point::new(
            i32::from(col) - i32::from(self.desktop.x),
            i32::from(row) - i32::from(self.desktop.y),
        );

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(action) = self.dock.hit(col, row) {
                    self.dispatch(action);
                    return true;
                }
                if !self.desktop.contains(Position::new(col, row)) {
                    return false;
                }
                let Some(click) = self.core.pointer_down(p) else {
                    return true;
                };
                let view = self.core.view();
                let actions = self.contents.get_mut(click.panel).click(click.local, &view);
                for action in actions {
                    self.dispatch(action);
                }
                true
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                self.core.pointer_move(p)
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let was_dragging = self.core.drag().is_some();
                self.core.pointer_up();
                was_dragging
            }
            _ => false,
        }
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        debug!("dispatch: {:?}", action);
        match action {
            Action::TogglePanel(id) => {
                let effect = self.core.toggle_panel(id);
                if effect.opened && id == PanelId::Requests {
                    self.load_requests();
                }
            }
            Action::FocusNext => {
                self.core.focus_next();
            }
            Action::TogglePlay => self.core.toggle_play(),
            Action::ToggleMute => self.core.toggle_mute(),
            Action::LoadRequests => self.load_requests(),
            Action::SubmitRequest(request_id) => self.submit_request(request_id),
            Action::ToggleTheme => {
                let theme = self.core.toggle_theme();
                info!("theme: {}", theme.label());
            }
            Action::Quit => self.should_quit = true,
        }
    }

    fn load_requests(&mut self) {
        if !self.contents.requests.begin_load() {
            return;
        }
        let service = self.service.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service.requestable_songs().await.map_err(|e| {
                warn!("requests: catalogue fetch failed: {}", e);
                e.to_string()
            });
            let _ = tx
                .send(AppMessage::Task(TaskResult::RequestsLoaded(result)))
                .await;
        });
    }

    fn submit_request(&mut self, request_id: String) {
        info!("requests: submitting {}", request_id);
        let service = self.service.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service
                .submit_request(&request_id)
                .await
                .map_err(|e| e.to_string());
            let _ = tx
                .send(AppMessage::Task(TaskResult::RequestSubmitted(result)))
                .await;
        });
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let mode = self.input_mode();
        let area = frame.area();
        let [body, bar] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
        let [dock_area, desktop] =
            Layout::horizontal([Constraint::Length(DOCK_WIDTH), Constraint::Min(1)]).areas(body);
        self.desktop = desktop;

        let view = self.core.view();
        let palette = view.palette();
        draw_desktop(frame.buffer_mut(), desktop, palette);

        if view.loading {
            splash::draw_loading(frame, desktop, &view);
        } else {
            let registry = self.core.registry();
            for id in registry.open_by_z() {
                let panel = registry.panel(id);
                let size = panel.size();
                let frame_area = Rect::new(0, 0, size.width, size.height);
                let mut buf = Buffer::empty(frame_area);
                let focused = view.focused == Some(id);

                let content = self.contents.get_mut(id);
                let badge = content.badge(&view);
                let chrome = window_chrome(id.title(), id.hotkey(), focused, badge, palette);
                let inner = chrome.inner(frame_area);
                chrome.render(frame_area, &mut buf);
                content.draw(&mut buf, inner, focused, &view);
                blit(frame.buffer_mut(), &buf, panel.position, desktop);

                if focused && content.captures_input() {
                    if let Some(pos) = content
                        .cursor()
                        .and_then(|c| to_screen(c, panel.position, desktop))
                    {
                        frame.set_cursor_position(pos);
                    }
                }
            }
        }

        self.dock.draw(frame, dock_area, self.core.registry(), &view);
        draw_keys_bar(frame, bar, mode, &view);
    }
}

/// Background of the desktop: a sparse dot grid.
fn draw_desktop(buf: &mut Buffer, area: Rect, palette: &Palette) {
    Block::default()
        .style(Style::default().bg(palette.desktop_bg))
        .render(area, buf);
    let dot = Style::default().fg(palette.desktop_pattern);
    for y in (area.top()..area.bottom()).step_by(2) {
        for x in (area.left() + 2..area.right()).step_by(4) {
            buf[(x, y)].set_symbol("·").set_style(dot);
        }
    }
}

/// Panel-buffer cell to screen position, if it lands on the desktop.
fn to_screen(cell: (u16, u16), origin: Point, clip: Rect) -> Option<Position> {
    let x = i32::from(clip.x) + origin.x + i32::from(cell.0);
    let y = i32::from(clip.y) + origin.y + i32::from(cell.1);
    let inside = x >= i32::from(clip.left())
        && x < i32::from(clip.right())
        && y >= i32::from(clip.top())
        && y < i32::from(clip.bottom());
    inside.then(|| Position::new(x as u16, y as u16))
}

/// Copy a panel's offscreen buffer onto the frame at `origin`
/// (desktop-relative), dropping every cell that falls outside `clip`.
fn blit(dst: &mut Buffer, src: &Buffer, origin: Point, clip: Rect) {
    for y in 0..src.area.height {
        for x in 0..src.area.width {
            if let Some(pos) = to_screen((x, y), origin, clip) {
                dst[pos] = src[(x, y)].clone();
            }
        }
    }
}
