//! Snapshot transport abstraction between producer and consumer.

use async_trait::async_trait;
use crate::error::{SnapshotReadError, SnapshotWriteError};
use crate::types::SnapshotEnvelope;

/// Producer side of the snapshot artifact.
///
/// # Implementations
///
/// - **Cross-process**: `FileSnapshotStore` (temp file + atomic rename)
/// - **In-process**: `WatchSnapshotSink` (latest-value channel)
///
/// # Atomicity
///
/// ```text
/// before publish      during publish        after publish
///   [v1 visible]  ->   [v1 visible]    ->    [v2 visible]
///                      (v2 being built)
/// ```
///
/// A reader never observes a partially written envelope through a
/// conforming implementation.
#[async_trait]
pub trait SnapshotSink: Send + Sync + 'static {
    /// Replaces the published artifact with `envelope`.
    ///
    /// # Returns
    /// * `Ok(())` - The new envelope is now visible to the reader
    /// * `Err(_)` - Nothing changed; the previous envelope is still visible
    async fn publish(&self, envelope: &SnapshotEnvelope) -> Result<(), SnapshotWriteError>;
}

/// Consumer side of the snapshot artifact.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    /// Reads the latest published envelope.
    ///
    /// # Returns
    /// * `Ok(envelope)` - A valid envelope
    /// * `Err(SnapshotReadError::NotReady)` - Nothing published yet
    /// * `Err(SnapshotReadError::Corrupt)` - Unparsable or invalid artifact
    /// * `Err(SnapshotReadError::Io)` - Any other read failure
    async fn latest(&self) -> Result<SnapshotEnvelope, SnapshotReadError>;
}
