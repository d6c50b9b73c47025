//! Common types exchanged between producer and consumer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SnapshotReadError;

/// Ordered price sequence for one entity. Every value is strictly positive.
pub type PricePath = Vec<f64>;

/// Per-round mapping `entity name -> price path`.
///
/// A `BTreeMap` keeps serialization order stable across rounds.
pub type SnapshotState = BTreeMap<String, PricePath>;

/// Envelope around a published [`SnapshotState`].
///
/// The envelope is the unit that gets serialized to the artifact. It is
/// replaced as a whole on every publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    /// Monotonic publish counter, starting at 1 for each producer run
    pub version: u64,

    /// 0-based round index that produced this state
    pub round: u64,

    /// Horizon (and round count) the producer was configured with
    pub max_round: u64,

    /// The price paths themselves
    pub paths: SnapshotState,
}

impl SnapshotEnvelope {
    /// Creates a new envelope.
    pub fn new(version: u64, round: u64, max_round: u64, paths: SnapshotState) -> Self {
        Self {
            version,
            round,
            max_round,
            paths,
        }
    }

    /// Returns the number of entities in the snapshot.
    pub fn entity_count(&self) -> usize {
        self.paths.len()
    }

    /// Returns the longest path length (the visible round length).
    pub fn path_len(&self) -> usize {
        self.paths.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Checks the invariants a reader relies on.
    ///
    /// Every path must be non-empty and every value finite and strictly
    /// positive. Anything else is treated as a corrupt artifact.
    pub fn validate(&self) -> Result<(), SnapshotReadError> {
        for (name, path) in &self.paths {
            if path.is_empty() {
                return Err(SnapshotReadError::corrupt(format!(
                    "empty path for '{}'",
                    name
                )));
            }
            if let Some(bad) = path.iter().find(|p| !p.is_finite() || **p <= 0.0) {
                return Err(SnapshotReadError::corrupt(format!(
                    "non-positive price {} for '{}'",
                    bad, name
                )));
            }
        }
        Ok(())
    }

    /// Serializes the envelope to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses and validates an envelope from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SnapshotReadError> {
        let envelope: SnapshotEnvelope = serde_json::from_slice(bytes)
            .map_err(|e| SnapshotReadError::corrupt(e.to_string()))?;
        envelope.validate()?;
        Ok(envelope)
    }
}
