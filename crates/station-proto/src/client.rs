//! HTTP client for the station service.
//!
//! `StationService` is the seam the desk polls through; `StationClient` is
//! the reqwest-backed implementation used in production, tests substitute
//! their own.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::StationConfig;
use crate::protocol::{NowPlayingResponse, RequestOutcome, RequestableSong};
use crate::snapshot::StationSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum StationError {
    #[error("station request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("station service answered HTTP {0}")]
    Status(u16),
    #[error("malformed station payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The remote station contract.
pub trait StationService: Send + Sync + 'static {
    /// `GET /nowplaying/{station}`, turned into a snapshot.
    fn now_playing(&self) -> impl Future<Output = Result<StationSnapshot, StationError>> + Send;

    /// `GET /station/{station}/requests`
    fn requestable_songs(
        &self,
    ) -> impl Future<Output = Result<Vec<RequestableSong>, StationError>> + Send;

    /// `POST /station/{station}/request/{id}`
    fn submit_request(
        &self,
        request_id: &str,
    ) -> impl Future<Output = Result<RequestOutcome, StationError>> + Send;
}

#[derive(Clone)]
pub struct StationClient {
    http: reqwest::Client,
    api_base: String,
    shortcode: String,
}

impl StationClient {
    pub fn new(cfg: &StationConfig) -> Result<Self, StationError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("radio-desk/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(cfg.request_timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            shortcode: cfg.shortcode.clone(),
        })
    }

    fn now_playing_url(&self) -> String {
        format!("{}/nowplaying/{}", self.api_base, self.shortcode)
    }

    fn requests_url(&self) -> String {
        format!("{}/station/{}/requests", self.api_base, self.shortcode)
    }

    fn request_url(&self, request_id: &str) -> String {
        format!(
            "{}/station/{}/request/{}",
            self.api_base, self.shortcode, request_id
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, StationError> {
        debug!("station: GET {}", url);
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StationError::Status(status.as_u16()));
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl StationService for StationClient {
    async fn now_playing(&self) -> Result<StationSnapshot, StationError> {
        let resp: NowPlayingResponse = self.get_json(&self.now_playing_url()).await?;
        Ok(StationSnapshot::from(resp))
    }

    async fn requestable_songs(&self) -> Result<Vec<RequestableSong>, StationError> {
        let songs: Option<Vec<RequestableSong>> = self.get_json(&self.requests_url()).await?;
        Ok(songs.unwrap_or_default())
    }

    async fn submit_request(&self, request_id: &str) -> Result<RequestOutcome, StationError> {
        let url = self.request_url(request_id);
        debug!("station: POST {}", url);
        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        // The service reports refusals (already requested, too soon, …) as a
        // JSON body on a 4xx status; that is an answer, not a transport error.
        match serde_json::from_slice::<RequestOutcome>(&body) {
            Ok(outcome) => Ok(outcome),
            Err(_) if !status.is_success() => Err(StationError::Status(status.as_u16())),
            Err(e) => Err(StationError::Decode(e)),
        }
    }
}
