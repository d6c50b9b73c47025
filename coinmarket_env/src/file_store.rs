//! File-backed snapshot artifact shared between two processes.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{SnapshotReadError, SnapshotWriteError};
use crate::store::{SnapshotSink, SnapshotSource};
use crate::types::SnapshotEnvelope;

/// Snapshot artifact stored as a single JSON file.
///
/// Publishing writes a hidden sibling temp file and renames it over the
/// artifact. On POSIX filesystems the rename is atomic, so the reader sees
/// either the old envelope or the new one, never a mix.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    /// Artifact path
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store for the artifact at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Writes `bytes` to `path` through a temp file and an atomic rename.
///
/// On failure the temp file is removed and `path` is left untouched.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = temp_path(path);

    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

#[async_trait]
impl SnapshotSink for FileSnapshotStore {
    async fn publish(&self, envelope: &SnapshotEnvelope) -> Result<(), SnapshotWriteError> {
        let bytes = envelope.to_json()?;
        write_atomic(&self.path, &bytes).await?;

        debug!(
            "Published snapshot v{} ({} bytes) to {}",
            envelope.version,
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotStore {
    async fn latest(&self) -> Result<SnapshotEnvelope, SnapshotReadError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(SnapshotReadError::NotReady),
            Err(e) => return Err(SnapshotReadError::Io(e)),
        };
        if bytes.is_empty() {
            return Err(SnapshotReadError::corrupt("empty artifact"));
        }
        SnapshotEnvelope::from_json(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SnapshotState;
    use tempfile::TempDir;

    fn envelope(version: u64, len: usize) -> SnapshotEnvelope {
        let mut paths = SnapshotState::new();
        paths.insert("BTC".to_string(), (0..len).map(|i| 100.0 + i as f64).collect());
        SnapshotEnvelope::new(version, len as u64 - 1, 60, paths)
    }

    #[tokio::test]
    async fn test_missing_artifact_is_not_ready() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("coin_brownian.json"));

        let err = store.latest().await.unwrap_err();
        assert!(matches!(err, SnapshotReadError::NotReady));
    }

    #[tokio::test]
    async fn test_publish_then_read() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("coin_brownian.json"));

        store.publish(&envelope(1, 1)).await.unwrap();
        store.publish(&envelope(2, 2)).await.unwrap();

        let read = store.latest().await.unwrap();
        assert_eq!(read, envelope(2, 2));
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("coin_brownian.json"));

        store.publish(&envelope(1, 3)).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_torn_artifact_is_corrupt_then_recovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coin_brownian.json");
        let store = FileSnapshotStore::new(&path);

        // Simulate a non-atomic writer caught mid-write
        let bytes = envelope(1, 4).to_json().unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();
        assert!(matches!(store.latest().await, Err(SnapshotReadError::Corrupt(_))));

        store.publish(&envelope(2, 5)).await.unwrap();
        assert_eq!(store.latest().await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_failed_publish_keeps_previous_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coin_brownian.json");
        let store = FileSnapshotStore::new(&path);
        store.publish(&envelope(1, 2)).await.unwrap();

        // A directory squatting on the temp path makes the write fail
        std::fs::create_dir(temp_path(&path)).unwrap();
        assert!(store.publish(&envelope(2, 3)).await.is_err());

        assert_eq!(store.latest().await.unwrap(), envelope(1, 2));
    }
}
