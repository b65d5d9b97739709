//! Wire types of the station service (AzuraCast-style JSON API).
//!
//! Everything here is deserialized leniently: missing fields default, numeric
//! fields accept integers, floats or `null`, so one odd field never throws
//! away a whole now-playing payload.

use serde::{Deserialize, Deserializer, Serialize};

/// A song as the station service describes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Service-side song hash. May be empty on some endpoints.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub album: String,
    /// Cover art URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub art: String,
}

/// Stable identity used to tell "same song, fresh numbers" from "new song".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SongKey {
    Hash(String),
    Tags {
        title: String,
        artist: String,
        album: String,
    },
}

impl Song {
    pub fn key(&self) -> SongKey {
        if self.id.is_empty() {
            SongKey::Tags {
                title: self.title.clone(),
                artist: self.artist.clone(),
                album: self.album.clone(),
            }
        } else {
            SongKey::Hash(self.id.clone())
        }
    }

    /// "Artist – Title", or whichever half is known.
    pub fn display(&self) -> String {
        match (self.artist.is_empty(), self.title.is_empty()) {
            (false, false) => format!("{} – {}", self.artist, self.title),
            (true, false) => self.title.clone(),
            (false, true) => self.artist.clone(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NextSong {
    #[serde(default)]
    pub song: Option<Song>,
    #[serde(default)]
    pub playlist: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    #[serde(default)]
    pub song: Option<Song>,
    /// Seconds into the current song, as of the fetch.
    #[serde(default, deserialize_with = "lenient_secs")]
    pub elapsed: u64,
    /// Song length in seconds; 0 when unknown.
    #[serde(default, deserialize_with = "lenient_secs")]
    pub duration: u64,
    #[serde(default)]
    pub playlist: Option<String>,
    #[serde(default)]
    pub playing_next: Option<NextSong>,
}

impl NowPlaying {
    pub fn next_song(&self) -> Option<&Song> {
        self.playing_next.as_ref().and_then(|n| n.song.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "lenient_secs")]
    pub sh_id: u64,
    /// Unix timestamp of when the song started.
    #[serde(default)]
    pub played_at: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub song: Song,
}

/// `GET /nowplaying/{station}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingResponse {
    #[serde(default)]
    pub now_playing: Option<NowPlaying>,
    /// Most recent first.
    #[serde(default)]
    pub song_history: Option<Vec<HistoryEntry>>,
}

/// One entry of `GET /station/{station}/requests`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestableSong {
    #[serde(deserialize_with = "string_or_number")]
    pub request_id: String,
    #[serde(default)]
    pub song: Song,
}

/// Body of `POST /station/{station}/request/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

fn lenient_secs<'de, D>(de: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(de)?;
    Ok(match v {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|f| f.max(0.0) as u64)
            .unwrap_or(0),
        _ => 0,
    })
}

fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
