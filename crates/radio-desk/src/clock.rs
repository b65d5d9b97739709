use station_proto::protocol::SongKey;
use station_proto::StationSnapshot;

/// Locally extrapolated position within the current song.
///
/// The station reports `elapsed` only once per poll; between polls the clock
/// advances one second per tick while playback is on. It snaps back to the
/// reported value when the song changes or the player is reopened, never on a
/// same-song poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElapsedClock {
    elapsed: u64,
    song: Option<SongKey>,
}

impl ElapsedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Feed a freshly accepted snapshot. Returns true if the clock was reset.
    pub fn observe(&mut self, snapshot: Option<&StationSnapshot>) -> bool {
        let key = snapshot.and_then(StationSnapshot::current_song_key);
        if key == self.song {
            return false;
        }
        self.song = key;
        self.elapsed = snapshot.map_or(0, StationSnapshot::reported_elapsed);
        true
    }

    /// Force a resync to the snapshot's reported position (player reopened).
    /// Without a known song there is nothing to sync to.
    pub fn resync(&mut self, snapshot: Option<&StationSnapshot>) {
        let Some(snapshot) = snapshot else { return };
        if let Some(key) = snapshot.current_song_key() {
            self.song = Some(key);
            self.elapsed = snapshot.reported_elapsed();
        }
    }

    pub fn tick(&mut self, playing: bool) {
        if playing {
            self.elapsed = self.elapsed.saturating_add(1);
        }
    }
}

/// Song progress in percent, clamped to `0..=100`. A zero duration (live
/// input, unknown length) reads as 0.
pub fn progress_percentage(elapsed: u64, duration: u64) -> f64 {
    if duration == 0 {
        return 0.0;
    }
    (elapsed as f64 / duration as f64 * 100.0).clamp(0.0, 100.0)
}
