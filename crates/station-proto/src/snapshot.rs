use crate::protocol::{HistoryEntry, NowPlaying, NowPlayingResponse, Song, SongKey};

/// Read-only copy of the remote station state, replaced wholesale on every
/// successful poll and never merged field by field.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSnapshot {
    pub now_playing: Option<NowPlaying>,
    /// Most recent first.
    pub history: Vec<HistoryEntry>,
    pub fetched_at: chrono::DateTime<chrono::Local>,
}

impl StationSnapshot {
    pub fn new(now_playing: Option<NowPlaying>, history: Vec<HistoryEntry>) -> Self {
        Self {
            now_playing,
            history,
            fetched_at: chrono::Local::now(),
        }
    }

    /// The song currently on air, if the station reported one.
    pub fn current_song(&self) -> Option<&Song> {
        self.now_playing.as_ref().and_then(|np| np.song.as_ref())
    }

    pub fn current_song_key(&self) -> Option<SongKey> {
        self.current_song().map(Song::key)
    }

    /// Elapsed seconds reported for the current song (0 when absent).
    pub fn reported_elapsed(&self) -> u64 {
        self.now_playing.as_ref().map_or(0, |np| np.elapsed)
    }

    /// Duration reported for the current song (0 when absent or unknown).
    pub fn reported_duration(&self) -> u64 {
        self.now_playing.as_ref().map_or(0, |np| np.duration)
    }

    pub fn playlist_name(&self) -> Option<&str> {
        self.now_playing
            .as_ref()
            .and_then(|np| np.playlist.as_deref())
            .filter(|p| !p.is_empty())
    }

    pub fn next_song(&self) -> Option<&Song> {
        self.now_playing.as_ref().and_then(NowPlaying::next_song)
    }
}

impl From<NowPlayingResponse> for StationSnapshot {
    fn from(resp: NowPlayingResponse) -> Self {
        Self::new(resp.now_playing, resp.song_history.unwrap_or_default())
    }
}
