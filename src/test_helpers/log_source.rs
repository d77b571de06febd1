//! A scripted `LogSource` driven through channels.

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use tokio::sync::mpsc;

use crate::transport::{LogFrames, LogSource, TransportError};

type FrameSender = mpsc::UnboundedSender<Result<String, TransportError>>;
type FrameReceiver = mpsc::UnboundedReceiver<Result<String, TransportError>>;

/// Hands out queued connections in order. Each connection is a channel; the
/// test holds the sender, and dropping it ends the stream. Subscribing with
/// no queued connection fails.
#[derive(Default)]
pub struct ChannelLogSource {
    connections: Mutex<VecDeque<FrameReceiver>>,
    subscriptions: AtomicUsize,
}

impl ChannelLogSource {
    /// Creates a source with no queued connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a connection and returns the sender feeding it.
    pub fn push_connection(&self) -> FrameSender {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.lock().unwrap().push_back(rx);
        tx
    }

    /// Number of `subscribe` calls so far, successful or not.
    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogSource for ChannelLogSource {
    async fn subscribe(&self) -> Result<LogFrames, TransportError> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let Some(rx) = self.connections.lock().unwrap().pop_front() else {
            return Err(TransportError::Stream("no connection available".to_string()));
        };
        let frames = stream::unfold(rx, |mut rx| async move {
            let frame = rx.recv().await?;
            Some((frame, rx))
        });
        Ok(frames.boxed())
    }
}
