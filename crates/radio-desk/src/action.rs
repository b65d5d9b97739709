//! Action enum: everything a key, a click or a background task can ask the
//! app to do.

use station_proto::protocol::{RequestOutcome, RequestableSong};

use crate::panel::PanelId;
use crate::playback::StartReport;

/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Panels ───────────────────────────────────────────────────────────────
    TogglePanel(PanelId),
    FocusNext,

    // ── Playback ─────────────────────────────────────────────────────────────
    TogglePlay,
    ToggleMute,

    // ── Song requests ────────────────────────────────────────────────────────
    LoadRequests,
    SubmitRequest(String),

    // ── App ──────────────────────────────────────────────────────────────────
    ToggleTheme,
    Quit,
}

/// Results of background work, delivered back to the app loop.
#[derive(Debug)]
pub enum TaskResult {
    RequestsLoaded(Result<Vec<RequestableSong>, String>),
    RequestSubmitted(Result<RequestOutcome, String>),
    PlaybackStarted(StartReport),
}
