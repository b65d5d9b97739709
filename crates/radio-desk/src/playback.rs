//! Playback intent and its reconciliation onto an audio sink.
//!
//! The intent (`playing`, `muted`) is the user's wish; the sink is whatever
//! actually makes sound. After every change the intent is queued for a worker
//! task that owns the sink, and the caller moves on. A sink refusing to start
//! is reported back, logged, and the intent stays as the user set it.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long teardown waits for the sink to settle before dropping it.
const CLOSE_GRACE: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackIntent {
    pub playing: bool,
    pub muted: bool,
}

/// Output side of playback. `set_muted` and `pause` are fire-and-forget;
/// starting may fail (device busy, stream unreachable, autoplay refused).
/// A sink lives on its own task, so a slow start never holds up input.
pub trait AudioSink: Send + 'static {
    fn set_muted(&mut self, muted: bool);
    fn pause(&mut self);
    fn play(&mut self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Answer to one start attempt, tagged with the intent generation that
/// asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReport {
    pub seq: u64,
    pub result: Result<(), String>,
}

#[derive(Debug)]
struct SinkCommand {
    seq: u64,
    intent: PlaybackIntent,
}

/// Sending side of the sink worker. Sends never wait.
pub struct SinkHandle {
    tx: Option<mpsc::UnboundedSender<SinkCommand>>,
    task: Option<JoinHandle<()>>,
}

impl SinkHandle {
    fn apply(&self, seq: u64, intent: PlaybackIntent) {
        let Some(tx) = &self.tx else {
            debug!("playback: sink already closed, dropping seq={}", seq);
            return;
        };
        if tx.send(SinkCommand { seq, intent }).is_err() {
            warn!("playback: sink worker gone");
        }
    }

    /// Let the worker finish what is queued, then drop the sink.
    pub async fn close(&mut self) {
        self.tx = None;
        let Some(mut task) = self.task.take() else {
            return;
        };
        match tokio::time::timeout(CLOSE_GRACE, &mut task).await {
            Ok(Ok(())) => debug!("playback: sink worker finished"),
            Ok(Err(e)) => warn!("playback: sink worker failed: {}", e),
            Err(_) => {
                warn!("playback: sink did not settle in time, dropping it");
                task.abort();
            }
        }
    }
}

impl Drop for SinkHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Move `sink` onto a worker task. Each start attempt is answered on
/// `reports`; pause and mute are not.
pub fn spawn_sink<A, M>(sink: A, reports: mpsc::Sender<M>) -> SinkHandle
where
    A: AudioSink,
    M: From<StartReport> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(sink_worker(sink, rx, reports));
    SinkHandle {
        tx: Some(tx),
        task: Some(task),
    }
}

async fn sink_worker<A, M>(
    mut sink: A,
    mut rx: mpsc::UnboundedReceiver<SinkCommand>,
    reports: mpsc::Sender<M>,
) where
    A: AudioSink,
    M: From<StartReport>,
{
    while let Some(mut cmd) = rx.recv().await {
        // Only the newest intent matters; skip whatever it superseded.
        while let Ok(next) = rx.try_recv() {
            cmd = next;
        }
        let SinkCommand { seq, intent } = cmd;
        debug!(
            "playback: apply seq={} playing={} muted={}",
            seq, intent.playing, intent.muted
        );
        sink.set_muted(intent.muted);
        if !intent.playing {
            sink.pause();
            continue;
        }
        let result = sink.play().await.map_err(|e| format!("{:#}", e));
        if reports.send(StartReport { seq, result }.into()).await.is_err() {
            debug!("playback: nobody listening for start reports");
        }
    }
    debug!("playback: sink worker exiting");
}

pub struct PlaybackController {
    intent: PlaybackIntent,
    seq: u64,
    sink: SinkHandle,
    start_error: Option<String>,
}

impl PlaybackController {
    pub fn new(sink: SinkHandle) -> Self {
        Self {
            intent: PlaybackIntent::default(),
            seq: 0,
            sink,
            start_error: None,
        }
    }

    pub fn intent(&self) -> PlaybackIntent {
        self.intent
    }

    /// Why the sink last refused to start, cleared on the next good start.
    pub fn start_error(&self) -> Option<&str> {
        self.start_error.as_deref()
    }

    pub fn toggle_play(&mut self) {
        self.intent.playing = !self.intent.playing;
        self.reconcile();
    }

    pub fn toggle_mute(&mut self) {
        self.intent.muted = !self.intent.muted;
        self.reconcile();
    }

    /// Force playback off. No-op when already stopped.
    pub fn stop(&mut self) {
        if !self.intent.playing {
            return;
        }
        self.intent.playing = false;
        self.reconcile();
    }

    /// Queue the current intent for the sink. Returns at once.
    pub fn reconcile(&mut self) {
        self.seq += 1;
        debug!(
            "playback: reconcile seq={} playing={} muted={}",
            self.seq, self.intent.playing, self.intent.muted
        );
        self.sink.apply(self.seq, self.intent);
    }

    /// Record the sink's answer. Answers to an intent that has since changed
    /// are dropped. Returns true when the answer was taken.
    pub fn on_start_report(&mut self, report: StartReport) -> bool {
        if report.seq != self.seq || !self.intent.playing {
            debug!(
                "playback: stale start report seq={} (now {})",
                report.seq, self.seq
            );
            return false;
        }
        match report.result {
            Ok(()) => self.start_error = None,
            Err(e) => {
                warn!("playback: sink refused to start: {}", e);
                self.start_error = Some(e);
            }
        }
        true
    }

    pub async fn close(&mut self) {
        self.sink.close().await;
    }
}
