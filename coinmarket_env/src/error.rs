//! Error types for the snapshot artifact.

use thiserror::Error;

/// Errors seen by the consumer when reading the artifact.
///
/// Every variant is recoverable: the consumer retries on its next tick and
/// keeps showing the last good render in the meantime.
#[derive(Debug, Error)]
pub enum SnapshotReadError {
    /// Nothing has been published yet
    #[error("Snapshot not ready")]
    NotReady,

    /// The artifact exists but could not be parsed or failed validation
    #[error("Snapshot corrupt: {0}")]
    Corrupt(String),

    /// Reading the artifact failed for another I/O reason
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SnapshotReadError {
    /// Creates a corrupt-snapshot error.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

/// Errors seen by the producer when publishing the artifact.
///
/// A failed publish never replaces the previously published artifact.
#[derive(Debug, Error)]
pub enum SnapshotWriteError {
    /// Writing or renaming the artifact failed
    #[error("Snapshot write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The envelope could not be serialized
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The in-process reader is gone
    #[error("Snapshot channel closed")]
    ChannelClosed,
}
