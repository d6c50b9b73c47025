//! Assembly of one producer round.

use coinmarket_env::SnapshotState;

use crate::brownian::GbmParams;
use crate::error::PathError;
use crate::roster::Roster;

/// Result of computing one round.
#[derive(Debug, Clone, Default)]
pub struct RoundOutput {
    /// Truncated paths of every entity that computed cleanly
    pub paths: SnapshotState,
    /// Entities left out of this round, with the reason
    pub failures: Vec<(String, PathError)>,
}

/// Computes the snapshot for `round` (0-based).
///
/// Every entity's path is recomputed over the full `max_round` horizon and
/// then cut to its first `round + 1` values. Nothing is carried over from
/// earlier rounds.
pub fn compute_round(roster: &Roster, params: &GbmParams, max_round: u64, round: u64) -> RoundOutput {
    let visible = (round + 1) as usize;
    let mut output = RoundOutput::default();

    for entity in roster.entities() {
        match params.entity_path(&entity.name, max_round as f64) {
            Ok(mut path) => {
                path.truncate(visible);
                output.paths.insert(entity.name.clone(), path);
            }
            Err(e) => output.failures.push((entity.name.clone(), e)),
        }
    }

    output
}
