use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Where the station service lives and which station to follow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// API root, without trailing slash (e.g. `https://radio.example/api`).
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Station shortcode used in every endpoint path.
    #[serde(default = "default_shortcode")]
    pub shortcode: String,
    /// Audio stream handed to the player.
    #[serde(default = "default_stream_url")]
    pub stream_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds between now-playing fetches.
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: ThemeChoice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Explicit mpv binary; when unset mpv is looked up beside the exe and on PATH.
    #[serde(default)]
    pub mpv_binary: Option<PathBuf>,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            shortcode: default_shortcode(),
            stream_url: default_stream_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            mpv_binary: None,
            volume: default_volume(),
        }
    }
}

fn default_api_base() -> String {
    "https://radio.bandito.site/api".to_string()
}

fn default_shortcode() -> String {
    "cesaria".to_string()
}

fn default_stream_url() -> String {
    "https://radio.bandito.site/listen/cesaria/radio.mp3".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_secs() -> u64 {
    15
}

fn default_volume() -> f32 {
    0.8
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.polling.interval_secs = config.polling.interval_secs.max(1);
        config.audio.volume = config.audio.volume.clamp(0.0, 1.0);
        config.station.api_base = config.station.api_base.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
