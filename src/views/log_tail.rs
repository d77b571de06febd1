//! Live tail of the backend's operational log stream.

use std::{collections::VecDeque, sync::Arc};

use futures::StreamExt;
use tokio::{
    sync::{RwLock, broadcast, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::LogTailConfig,
    models::LogEntry,
    transport::{LogFrames, LogSource},
};

/// Connection state of the tail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TailState {
    /// No subscription is open.
    #[default]
    Disconnected,
    /// A subscription is being opened.
    Connecting,
    /// Messages are being received.
    Streaming,
}

/// Bounded, insertion-ordered buffer that evicts its oldest entry when full.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    capacity: usize,
    entries: VecDeque<LogEntry>,
}

impl LogBuffer {
    /// Creates an empty buffer holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: VecDeque::with_capacity(capacity) }
    }

    /// Appends an entry and returns the one evicted to make room, if any.
    pub fn push(&mut self, entry: LogEntry) -> Option<LogEntry> {
        if self.capacity == 0 {
            return Some(entry);
        }
        let evicted = if self.entries.len() >= self.capacity { self.entries.pop_front() } else { None };
        self.entries.push_back(entry);
        evicted
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}

/// Entry point for mounting a tail.
pub struct LogTail;

impl LogTail {
    /// Subscribes to `source` in a background task and returns the handle
    /// that owns the subscription. Must be called within a tokio runtime.
    pub fn mount(source: Arc<dyn LogSource>, config: LogTailConfig) -> LogTailHandle {
        let buffer = Arc::new(RwLock::new(LogBuffer::new(config.capacity)));
        let (state_tx, state_rx) = watch::channel(TailState::Disconnected);
        let (entries_tx, _) = broadcast::channel(config.capacity.max(1));
        let cancel = CancellationToken::new();

        let worker = TailWorker {
            source,
            config,
            buffer: buffer.clone(),
            state: state_tx,
            entries: entries_tx.clone(),
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(worker.run());

        LogTailHandle { buffer, state: state_rx, entries: entries_tx, cancel, task: Some(task) }
    }
}

/// Owner of a mounted tail. Closing or dropping it cancels the subscription.
pub struct LogTailHandle {
    buffer: Arc<RwLock<LogBuffer>>,
    state: watch::Receiver<TailState>,
    entries: broadcast::Sender<LogEntry>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LogTailHandle {
    /// Buffered entries from oldest to newest.
    pub async fn snapshot(&self) -> Vec<LogEntry> {
        self.buffer.read().await.iter().cloned().collect()
    }

    /// Current connection state.
    pub fn state(&self) -> TailState {
        *self.state.borrow()
    }

    /// A receiver notified on every state transition.
    pub fn state_changes(&self) -> watch::Receiver<TailState> {
        self.state.clone()
    }

    /// A receiver of entries appended from now on.
    pub fn entries(&self) -> broadcast::Receiver<LogEntry> {
        self.entries.subscribe()
    }

    /// Whether the background task has stopped, either after `close` or
    /// because reconnect attempts ran out.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancels the subscription and waits for the background task to stop.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Log tail task ended abnormally");
            }
        }
    }
}

impl Drop for LogTailHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Skips the history the backend resends at the start of a reconnection.
///
/// Replayed messages are matched in order against what was buffered before
/// the drop. The first message with no match ends the replay, and it and
/// everything after it are treated as new.
#[derive(Debug)]
struct ReplayFilter {
    previous: Vec<LogEntry>,
    cursor: usize,
}

impl ReplayFilter {
    fn new(previous: Vec<LogEntry>) -> Self {
        Self { previous, cursor: 0 }
    }

    fn is_replayed(&mut self, entry: &LogEntry) -> bool {
        let found = self.previous[self.cursor..].iter().position(|seen| seen == entry);
        match found {
            Some(offset) => {
                self.cursor += offset + 1;
                true
            }
            None => {
                self.previous.clear();
                self.cursor = 0;
                false
            }
        }
    }
}

struct TailWorker {
    source: Arc<dyn LogSource>,
    config: LogTailConfig,
    buffer: Arc<RwLock<LogBuffer>>,
    state: watch::Sender<TailState>,
    entries: broadcast::Sender<LogEntry>,
    cancel: CancellationToken,
}

impl TailWorker {
    async fn run(self) {
        let mut attempt = 0u32;
        loop {
            self.state.send_replace(TailState::Connecting);
            let subscribed = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                subscribed = self.source.subscribe() => subscribed,
            };

            match subscribed {
                Ok(frames) => {
                    let replay =
                        ReplayFilter::new(self.buffer.read().await.iter().cloned().collect());
                    self.state.send_replace(TailState::Streaming);
                    attempt = 0;
                    tracing::info!("Log stream connected");
                    if !self.consume(frames, replay).await {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Failed to open log stream"),
            }

            self.state.send_replace(TailState::Disconnected);
            attempt += 1;
            let Some(delay) = self.config.reconnect.backoff_for(attempt) else {
                tracing::info!(attempts = attempt - 1, "Log stream disconnected; not reconnecting");
                break;
            };
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Reconnecting to log stream");
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        self.state.send_replace(TailState::Disconnected);
    }

    /// Drains one subscription. Returns `false` if the tail was cancelled.
    async fn consume(&self, mut frames: LogFrames, mut replay: ReplayFilter) -> bool {
        loop {
            let frame = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return false,
                frame = frames.next() => frame,
            };
            match frame {
                Some(Ok(payload)) => self.append(&payload, &mut replay).await,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Log stream dropped");
                    return true;
                }
                None => {
                    tracing::warn!("Log stream closed by backend");
                    return true;
                }
            }
        }
    }

    async fn append(&self, payload: &str, replay: &mut ReplayFilter) {
        let entry = match LogEntry::parse(payload) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::trace!(error = %e, "Dropping malformed log payload");
                return;
            }
        };
        if replay.is_replayed(&entry) {
            tracing::trace!("Skipping replayed log entry");
            return;
        }
        self.buffer.write().await.push(entry.clone());
        // No live subscribers is fine.
        let _ = self.entries.send(entry);
    }
}
