//! In-process snapshot transport over a `tokio::sync::watch` channel.
//!
//! Used when producer and consumer share one process. The channel only
//! ever holds the latest envelope, so a slow consumer never builds a queue.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::{SnapshotReadError, SnapshotWriteError};
use crate::store::{SnapshotSink, SnapshotSource};
use crate::types::SnapshotEnvelope;

/// Producer half of the in-process channel.
pub struct WatchSnapshotSink {
    tx: watch::Sender<Option<SnapshotEnvelope>>,
}

/// Consumer half of the in-process channel.
pub struct WatchSnapshotSource {
    rx: watch::Receiver<Option<SnapshotEnvelope>>,
}

/// Creates a connected sink/source pair with nothing published yet.
pub fn snapshot_channel() -> (WatchSnapshotSink, WatchSnapshotSource) {
    let (tx, rx) = watch::channel(None);
    (WatchSnapshotSink { tx }, WatchSnapshotSource { rx })
}

#[async_trait]
impl SnapshotSink for WatchSnapshotSink {
    async fn publish(&self, envelope: &SnapshotEnvelope) -> Result<(), SnapshotWriteError> {
        self.tx
            .send(Some(envelope.clone()))
            .map_err(|_| SnapshotWriteError::ChannelClosed)
    }
}

#[async_trait]
impl SnapshotSource for WatchSnapshotSource {
    async fn latest(&self) -> Result<SnapshotEnvelope, SnapshotReadError> {
        match self.rx.borrow().as_ref() {
            Some(envelope) => Ok(envelope.clone()),
            None => Err(SnapshotReadError::NotReady),
        }
    }
}
