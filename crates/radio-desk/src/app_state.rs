//! DeskView: read-only data handed to panel contents while they render or
//! react to input. Built fresh from `DeskCore` for every frame.

use station_proto::StationSnapshot;

use crate::panel::PanelId;
use crate::playback::PlaybackIntent;
use crate::theme::{Palette, Theme};

#[derive(Debug, Clone, Copy)]
pub struct DeskView<'a> {
    pub snapshot: Option<&'a StationSnapshot>,
    pub loading: bool,
    /// Locally extrapolated seconds into the current song.
    pub elapsed: u64,
    /// 0..=100
    pub progress: f64,
    pub intent: PlaybackIntent,
    pub start_error: Option<&'a str>,
    pub theme: Theme,
    /// Open panel receiving keyboard input.
    pub focused: Option<PanelId>,
}

impl DeskView<'_> {
    pub fn palette(&self) -> &'static Palette {
        self.theme.palette()
    }

    pub fn duration(&self) -> u64 {
        self.snapshot.map_or(0, StationSnapshot::reported_duration)
    }
}
