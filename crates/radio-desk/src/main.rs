mod action;
mod app;
mod app_state;
mod clock;
mod component;
mod components;
mod core;
mod mpv;
mod panel;
mod playback;
mod poller;
mod registry;
mod theme;
mod widgets;

use std::sync::Arc;
use std::time::Duration;

use station_proto::config::Config;
use station_proto::{platform, StationClient};

use crate::mpv::MpvSink;
use crate::theme::Theme;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("desk.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG wins; otherwise debug for our code and quiet HTTP internals.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("radio-desk log: {}", log_path.display());

    tracing::info!("radio-desk starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(
            "config {} unusable, using defaults: {}",
            Config::config_path().display(),
            e
        );
        Config::default()
    });

    // ── Station client + audio sink ──────────────────────────────────────────
    let service = Arc::new(StationClient::new(&config.station)?);
    let sink = MpvSink::new(
        config.station.stream_url.clone(),
        config.audio.mpv_binary.clone(),
        config.audio.volume,
    );

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(
        sink,
        Theme::from(config.ui.theme),
        service,
        Duration::from_secs(config.polling.interval_secs),
    );
    app.run().await?;

    Ok(())
}
