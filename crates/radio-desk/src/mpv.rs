//! mpv-backed audio sink.
//!
//! ```text
//!   MpvSink::play()
//!         │  (first call, or mpv died)
//!         ├── MpvDriver::spawn_and_connect()
//!         │         ├── writer_task   ← PendingRequest via mpsc → socket
//!         │         └── reader_task   ← JSON lines → matched oneshot by request_id
//!         └── loadfile <stream_url>   (once per process)
//! ```
//!
//! `pause` and `set_muted` go out without waiting for mpv's answer; `play`
//! waits so a dead binary or unreachable stream surfaces as an error. The
//! sink runs on the playback worker task, never on the UI loop.
//!
//! Platform notes:
//! - Unix:   Unix domain sockets
//! - Windows: Named pipes  \\.\pipe\<name>
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use station_proto::platform;

use crate::playback::AudioSink;

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<anyhow::Result<Value>>>>>;
type ReplyReceiver = oneshot::Receiver<anyhow::Result<Value>>;

struct PendingRequest {
    req_id: u64,
    payload: String, // serialised JSON line, '\n' included
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

// ── handle ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<PendingRequest>,
}

impl MpvHandle {
    fn request(command: Value) -> anyhow::Result<(PendingRequest, ReplyReceiver)> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let msg = json!({ "command": command, "request_id": req_id });
        let mut payload = serde_json::to_string(&msg)?;
        payload.push('\n');
        let (reply, reply_rx) = oneshot::channel();
        Ok((
            PendingRequest {
                req_id,
                payload,
                reply,
            },
            reply_rx,
        ))
    }

    pub async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let (req, reply_rx) = Self::request(command)?;
        let req_id = req.req_id;
        self.tx
            .send(req)
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(tokio::time::Duration::from_secs(5), reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }

    /// Queue a command and forget about its answer.
    pub fn fire(&self, command: Value) {
        match Self::request(command) {
            Ok((req, _)) => {
                if let Err(e) = self.tx.try_send(req) {
                    debug!("mpv: dropped fire-and-forget command: {}", e);
                }
            }
            Err(e) => warn!("mpv: could not encode command: {}", e),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ── driver ────────────────────────────────────────────────────────────────────

/// Owns the mpv child process. The child is killed when the driver drops.
pub struct MpvDriver {
    socket_name: String,
    binary_override: Option<PathBuf>,
    volume: f32,
    process: Option<tokio::process::Child>,
}

impl MpvDriver {
    pub fn new(binary_override: Option<PathBuf>, volume: f32) -> Self {
        Self {
            socket_name: platform::mpv_socket_name(),
            binary_override,
            volume,
            process: None,
        }
    }

    pub fn process_alive(&mut self) -> bool {
        let Some(child) = self.process.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                match status.code() {
                    Some(code) => warn!("mpv process exited with code: {}", code),
                    None => warn!("mpv process terminated by signal"),
                }
                false
            }
            Err(e) => {
                warn!("mpv process_alive check failed: {}", e);
                false
            }
        }
    }

    fn spawn_process(&mut self) -> anyhow::Result<()> {
        let binary = platform::find_mpv_binary(self.binary_override.as_deref())
            .ok_or_else(|| anyhow::anyhow!("mpv binary not found"))?;
        let vol_arg = format!(
            "--volume={}",
            (self.volume * 100.0).clamp(0.0, 100.0).round() as i64
        );

        info!("mpv: spawning {:?}", binary);
        let child = tokio::process::Command::new(&binary)
            .arg("--no-video")
            .arg("--idle=yes")
            .arg("--quiet")
            .arg(platform::mpv_socket_arg(&self.socket_name))
            .arg(vol_arg)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        info!("mpv: spawned process with pid {:?}", child.id());
        self.process = Some(child);
        Ok(())
    }

    #[cfg(unix)]
    pub async fn spawn_and_connect(&mut self) -> anyhow::Result<MpvHandle> {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }

        let socket_path = PathBuf::from(&self.socket_name);
        let _ = tokio::fs::remove_file(&socket_path).await;

        self.spawn_process()?;

        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if socket_path.exists() {
                break;
            }
        }
        if !socket_path.exists() {
            anyhow::bail!("mpv IPC socket did not appear");
        }

        let stream = UnixStream::connect(&socket_path).await?;
        info!("mpv: connected to IPC socket");
        let (read_half, write_half) = stream.into_split();
        Ok(start_io_tasks(BufReader::new(read_half), write_half))
    }

    #[cfg(windows)]
    pub async fn spawn_and_connect(&mut self) -> anyhow::Result<MpvHandle> {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }

        self.spawn_process()?;

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if let Ok(client) = ClientOptions::new().open(&pipe_path) {
                info!("mpv: connected to named pipe");
                let (read_half, write_half) = tokio::io::split(client);
                return Ok(start_io_tasks(BufReader::new(read_half), write_half));
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }
}

#[cfg(unix)]
impl Drop for MpvDriver {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_name);
    }
}

fn start_io_tasks<R, W>(reader: BufReader<R>, writer: W) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<PendingRequest>(64);
    tokio::spawn(writer_task(writer, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(reader, pending));
    MpvHandle { tx: cmd_tx }
}

async fn reader_task<R>(mut reader: BufReader<R>, pending: PendingMap)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                fail_all(&pending, "mpv IPC connection closed").await;
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                        continue;
                    }
                };
                let Some(req_id) = val.get("request_id").and_then(Value::as_u64) else {
                    // Events and property changes are not used.
                    continue;
                };
                let Some(tx) = pending.lock().await.remove(&req_id) else {
                    continue;
                };
                let result = if val["error"].as_str() == Some("success") {
                    Ok(val)
                } else {
                    let err = val["error"].as_str().unwrap_or("unknown error").to_string();
                    debug!("mpv reader: req={} err={}", req_id, err);
                    Err(anyhow::anyhow!("mpv error: {}", err))
                };
                let _ = tx.send(result);
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                fail_all(&pending, "mpv IPC read error").await;
                break;
            }
        }
    }
}

async fn fail_all(pending: &PendingMap, reason: &str) {
    for (_, tx) in pending.lock().await.drain() {
        let _ = tx.send(Err(anyhow::anyhow!("{}", reason)));
    }
}

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<PendingRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Register before writing so the reader can always match the reply.
        pending.lock().await.insert(req.req_id, req.reply);
        debug!("mpv writer: req={} {}", req.req_id, req.payload.trim());
        if let Err(e) = writer.write_all(req.payload.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            if let Some(tx) = pending.lock().await.remove(&req.req_id) {
                let _ = tx.send(Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}

// ── sink ──────────────────────────────────────────────────────────────────────

pub struct MpvSink {
    stream_url: String,
    driver: MpvDriver,
    handle: Option<MpvHandle>,
    stream_loaded: bool,
    muted: bool,
}

impl MpvSink {
    pub fn new(stream_url: String, binary_override: Option<PathBuf>, volume: f32) -> Self {
        Self {
            stream_url,
            driver: MpvDriver::new(binary_override, volume),
            handle: None,
            stream_loaded: false,
            muted: false,
        }
    }

    async fn connected(&mut self) -> anyhow::Result<MpvHandle> {
        if let Some(handle) = &self.handle {
            if !handle.is_closed() && self.driver.process_alive() {
                return Ok(handle.clone());
            }
            warn!("mpv: connection lost, respawning");
        }
        self.handle = None;
        self.stream_loaded = false;
        let handle = self.driver.spawn_and_connect().await?;
        self.handle = Some(handle.clone());
        Ok(handle)
    }
}

impl AudioSink for MpvSink {
    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(handle) = &self.handle {
            handle.fire(json!(["set_property", "mute", muted]));
        }
    }

    fn pause(&mut self) {
        if let Some(handle) = &self.handle {
            handle.fire(json!(["set_property", "pause", true]));
        }
    }

    async fn play(&mut self) -> anyhow::Result<()> {
        let handle = self.connected().await?;
        handle
            .send(json!(["set_property", "mute", self.muted]))
            .await?;
        if !self.stream_loaded {
            debug!("mpv: loadfile {}", self.stream_url);
            handle
                .send(json!(["loadfile", self.stream_url.as_str()]))
                .await?;
            self.stream_loaded = true;
        }
        handle.send(json!(["set_property", "pause", false])).await?;
        Ok(())
    }
}
