//! Snapshot producer: one GBM round per interval, published atomically.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use coinmarket_core::{compute_round, Roster};
use coinmarket_env::{MarketContext, SnapshotEnvelope, SnapshotSink};

use crate::config::{ConfigError, ProducerConfig};

/// Summary of a finished producer run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProducerReport {
    /// Rounds whose snapshot became visible
    pub rounds_published: u64,
    /// Rounds dropped after exhausting retries
    pub rounds_skipped: u64,
    /// Entity paths left out across all rounds
    pub entity_failures: u64,
    /// Version of the last published envelope
    pub last_version: Option<u64>,
}

/// Drives rounds `0..max_round` and publishes each one to a sink.
///
/// Generic over the context so the same loop runs against wall-clock
/// `TokioContext` in production and the virtual clock of `SimContext` in
/// tests.
pub struct SnapshotProducer<C: MarketContext, S: SnapshotSink> {
    context: Arc<C>,
    sink: Arc<S>,
    roster: Roster,
    config: ProducerConfig,
    version: u64,
}

impl<C: MarketContext, S: SnapshotSink> SnapshotProducer<C, S> {
    /// Creates a producer after validating `config`.
    pub fn new(
        context: Arc<C>,
        sink: Arc<S>,
        roster: Roster,
        config: ProducerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            context,
            sink,
            roster,
            config,
            version: 0,
        })
    }

    /// Runs every round to completion. Never fails: publish errors are
    /// retried, then the round is skipped.
    pub async fn run(&mut self) -> ProducerReport {
        let mut report = ProducerReport::default();
        let max_round = self.config.max_round;

        info!(
            entities = self.roster.len(),
            max_round,
            interval_secs = self.config.round_interval.as_secs_f64(),
            "Producer starting"
        );

        for round in 0..max_round {
            let output = compute_round(&self.roster, &self.config.gbm, max_round, round);
            for (name, e) in &output.failures {
                warn!(round, coin = %name, error = %e, "Path omitted from round");
            }
            report.entity_failures += output.failures.len() as u64;

            let envelope = SnapshotEnvelope::new(self.version + 1, round, max_round, output.paths);

            if self.publish_with_retry(&envelope).await {
                self.version = envelope.version;
                report.rounds_published += 1;
                report.last_version = Some(self.version);
                info!(
                    round,
                    version = self.version,
                    entities = envelope.entity_count(),
                    path_len = envelope.path_len(),
                    "Published round"
                );
            } else {
                report.rounds_skipped += 1;
                warn!(round, "Skipped round after exhausting publish retries");
            }

            if round > 0 && round + 1 < max_round {
                debug!(round, "Pausing before next round");
                self.context.sleep(self.config.round_interval).await;
            }
        }

        info!(
            published = report.rounds_published,
            skipped = report.rounds_skipped,
            elapsed_secs = self.context.now().as_secs_f64(),
            "Producer finished"
        );
        report
    }

    async fn publish_with_retry(&self, envelope: &SnapshotEnvelope) -> bool {
        let attempts = self.config.write_retries + 1;
        for attempt in 1..=attempts {
            match self.sink.publish(envelope).await {
                Ok(()) => return true,
                Err(e) => {
                    warn!(
                        round = envelope.round,
                        attempt,
                        attempts,
                        error = %e,
                        "Snapshot publish failed"
                    );
                    if attempt < attempts {
                        self.context.sleep(self.config.retry_backoff).await;
                    }
                }
            }
        }
        false
    }
}
