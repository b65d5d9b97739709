//! Remote-state polling.
//!
//! `spawn` runs the fetch loop on its own task: one fetch immediately, then
//! one per interval. Outcomes are sent back over a channel so that the app
//! loop is the only place that ever mutates `RemoteStatePoller`. Cancelling
//! the handle stops the loop; a fetch still in flight is dropped and never
//! delivered.

use std::sync::Arc;
use std::time::Duration;

use station_proto::{StationService, StationSnapshot};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub enum PollOutcome {
    Snapshot(StationSnapshot),
    Failed(String),
}

/// Latest accepted snapshot plus the loading flag.
#[derive(Debug)]
pub struct RemoteStatePoller {
    snapshot: Option<StationSnapshot>,
    loading: bool,
    consecutive_failures: u32,
}

impl Default for RemoteStatePoller {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStatePoller {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            loading: true,
            consecutive_failures: 0,
        }
    }

    pub fn snapshot(&self) -> Option<&StationSnapshot> {
        self.snapshot.as_ref()
    }

    /// True until the first fetch completes, whatever its result.
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Returns true when the snapshot was replaced.
    pub fn apply(&mut self, outcome: PollOutcome) -> bool {
        self.loading = false;
        match outcome {
            PollOutcome::Snapshot(snapshot) => {
                self.snapshot = Some(snapshot);
                self.consecutive_failures = 0;
                true
            }
            PollOutcome::Failed(_) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                false
            }
        }
    }
}

pub struct PollerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancel and wait for the loop to wind down.
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Err(e) = (&mut self.task).await {
            warn!("poller: task ended abnormally: {}", e);
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub fn spawn<S: StationService>(
    service: Arc<S>,
    interval: Duration,
    tx: mpsc::Sender<PollOutcome>,
) -> PollerHandle {
    let token = CancellationToken::new();
    let task = tokio::spawn(poll_loop(service, interval, tx, token.clone()));
    PollerHandle { token, task }
}

async fn poll_loop<S: StationService>(
    service: Arc<S>,
    interval: Duration,
    tx: mpsc::Sender<PollOutcome>,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let outcome = tokio::select! {
            _ = token.cancelled() => break,
            res = service.now_playing() => match res {
                Ok(snapshot) => PollOutcome::Snapshot(snapshot),
                Err(e) => {
                    warn!("poller: now-playing fetch failed: {}", e);
                    PollOutcome::Failed(e.to_string())
                }
            },
        };

        if token.is_cancelled() || tx.send(outcome).await.is_err() {
            break;
        }
    }
    debug!("poller: stopped");
}

#[cfg(test)]
pub(crate) mod test_service {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use station_proto::protocol::{RequestOutcome, RequestableSong};
    use station_proto::{StationError, StationService, StationSnapshot};

    /// Serves scripted now-playing results, then repeats the fallback.
    pub struct ScriptedService {
        script: Mutex<VecDeque<Result<StationSnapshot, u16>>>,
        latency: Option<Duration>,
        pub fetches: AtomicUsize,
    }

    impl ScriptedService {
        pub fn new(script: Vec<Result<StationSnapshot, u16>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                latency: None,
                fetches: AtomicUsize::new(0),
            }
        }

        /// Every now-playing fetch takes `latency` to answer.
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        pub fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl StationService for ScriptedService {
        async fn now_playing(&self) -> Result<StationSnapshot, StationError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(snapshot)) => Ok(snapshot),
                Some(Err(status)) => Err(StationError::Status(status)),
                None => Ok(StationSnapshot::new(None, vec![])),
            }
        }

        async fn requestable_songs(&self) -> Result<Vec<RequestableSong>, StationError> {
            Ok(vec![])
        }

        async fn submit_request(&self, _request_id: &str) -> Result<RequestOutcome, StationError> {
            Ok(RequestOutcome {
                success: true,
                message: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_service::ScriptedService;
    use super::*;
    use station_proto::protocol::{NowPlaying, Song};

    fn snapshot(title: &str) -> StationSnapshot {
        StationSnapshot::new(
            Some(NowPlaying {
                song: Some(Song {
                    title: title.into(),
                    ..Default::default()
                }),
                elapsed: 10,
                duration: 100,
                ..Default::default()
            }),
            vec![],
        )
    }

    #[test]
    fn test_failure_keeps_last_snapshot() {
        let mut state = RemoteStatePoller::new();
        assert!(state.loading());
        assert!(state.apply(PollOutcome::Snapshot(snapshot("A"))));
        assert!(!state.loading());

        assert!(!state.apply(PollOutcome::Failed("503".into())));
        assert!(!state.loading());
        assert_eq!(state.consecutive_failures(), 1);
        let kept = state.snapshot().and_then(|s| s.current_song()).unwrap();
        assert_eq!(kept.title, "A");
    }

    #[test]
    fn test_first_failure_ends_loading() {
        let mut state = RemoteStatePoller::new();
        state.apply(PollOutcome::Failed("timeout".into()));
        assert!(!state.loading());
        assert!(state.snapshot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_on_interval() {
        let service = Arc::new(ScriptedService::new(vec![
            Ok(snapshot("A")),
            Err(503),
            Ok(snapshot("B")),
        ]));
        let (tx, mut rx) = mpsc::channel(4);
        let start = tokio::time::Instant::now();
        let _handle = spawn(service.clone(), Duration::from_secs(15), tx);

        assert!(matches!(rx.recv().await, Some(PollOutcome::Snapshot(_))));
        assert!(start.elapsed() < Duration::from_secs(1));

        assert!(matches!(rx.recv().await, Some(PollOutcome::Failed(_))));
        assert!(start.elapsed() >= Duration::from_secs(15));

        match rx.recv().await {
            Some(PollOutcome::Snapshot(s)) => {
                assert_eq!(s.current_song().map(|s| s.title.as_str()), Some("B"))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(start.elapsed() >= Duration::from_secs(30));
        assert_eq!(service.fetches(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_fetching() {
        let service = Arc::new(ScriptedService::new(vec![]));
        let (tx, mut rx) = mpsc::channel(4);
        let handle = spawn(service.clone(), Duration::from_secs(15), tx);

        assert!(rx.recv().await.is_some());
        handle.cancel();
        // The loop exits and drops its sender.
        assert!(rx.recv().await.is_none());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(service.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_in_flight_at_shutdown_is_dropped() {
        let service =
            Arc::new(ScriptedService::new(vec![]).with_latency(Duration::from_secs(10)));
        let (tx, mut rx) = mpsc::channel(4);
        let handle = spawn(service.clone(), Duration::from_secs(15), tx);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(service.fetches(), 1);
        handle.shutdown().await;

        assert!(rx.recv().await.is_none());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(service.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let service = Arc::new(ScriptedService::new(vec![]));
        let (tx, mut rx) = mpsc::channel(4);
        drop(spawn(service.clone(), Duration::from_secs(15), tx));
        while rx.recv().await.is_some() {}
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(service.fetches() <= 1);
    }
}
