//! Snapshot consumer: polls the artifact on a timer and renders each tick.
//!
//! # State machine
//!
//! ```text
//!                      first successful read
//! WaitingForFirstSnapshot ─────────────────────► Rendering
//!        │  ▲                                     │  ▲
//!        └──┘ NotReady / Corrupt / Io             └──┘ any tick
//! ```
//!
//! There is no terminal state; the loop ends only on shutdown. A failed
//! read never touches the render state, so the last good render stays on
//! screen.

use std::future::Future;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use coinmarket_core::{render_tick, RenderPayload, RenderState, Roster};
use coinmarket_env::{SnapshotEnvelope, SnapshotReadError, SnapshotSource};

use crate::config::{ConfigError, ConsumerConfig};
use crate::sink::RenderSink;

/// Where the consumer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerPhase {
    WaitingForFirstSnapshot,
    Rendering,
}

/// Tick counters from a finished `run`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumerReport {
    pub ticks: u64,
    pub rendered: u64,
    pub not_ready: u64,
    pub corrupt: u64,
    pub io_errors: u64,
    pub sink_errors: u64,
}

/// Reads snapshots and turns them into render payloads.
pub struct SnapshotConsumer<S: SnapshotSource> {
    source: Arc<S>,
    config: ConsumerConfig,
    phase: ConsumerPhase,
    state: RenderState,
    last_version: Option<u64>,
    horizon_checked: bool,
}

impl<S: SnapshotSource> SnapshotConsumer<S> {
    /// Creates a consumer in `WaitingForFirstSnapshot` with the roster at
    /// baseline prices.
    pub fn new(source: Arc<S>, roster: &Roster, config: ConsumerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = RenderState::new(roster, &config.mode);
        Ok(Self {
            source,
            config,
            phase: ConsumerPhase::WaitingForFirstSnapshot,
            state,
            last_version: None,
            horizon_checked: false,
        })
    }

    pub fn phase(&self) -> ConsumerPhase {
        self.phase
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Version of the last envelope rendered.
    pub fn last_version(&self) -> Option<u64> {
        self.last_version
    }

    /// Handles timer tick `n`.
    ///
    /// # Errors
    /// Any [`SnapshotReadError`]; the phase and render state are unchanged.
    pub async fn tick(&mut self, n: u64) -> Result<RenderPayload, SnapshotReadError> {
        let envelope = self.source.latest().await?;
        self.observe_envelope(&envelope);

        let (next, payload) = render_tick(&self.state, &envelope.paths, n, &self.config.mode);
        self.state = next;

        if self.phase == ConsumerPhase::WaitingForFirstSnapshot {
            info!(tick = n, version = envelope.version, "First snapshot received, rendering");
            self.phase = ConsumerPhase::Rendering;
        }
        Ok(payload)
    }

    fn observe_envelope(&mut self, envelope: &SnapshotEnvelope) {
        if let Some(prev) = self.last_version {
            if envelope.version < prev {
                warn!(
                    previous = prev,
                    current = envelope.version,
                    "Snapshot version went backwards, producer restarted"
                );
            }
        }
        self.last_version = Some(envelope.version);

        if !self.horizon_checked {
            self.horizon_checked = true;
            if envelope.max_round != self.config.max_round {
                warn!(
                    expected = self.config.max_round,
                    actual = envelope.max_round,
                    "Producer horizon differs from configured max_round"
                );
            }
        }
    }

    /// Ticks every `poll_interval` until `shutdown` completes.
    ///
    /// Ticks run one at a time on `&mut self`; a slow tick delays the next
    /// one rather than overlapping it.
    pub async fn run<K, F>(&mut self, sink: &mut K, shutdown: F) -> ConsumerReport
    where
        K: RenderSink + ?Sized,
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut report = ConsumerReport::default();
        let mut n: u64 = 0;

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {}
            }

            report.ticks += 1;
            match self.tick(n).await {
                Ok(payload) => {
                    report.rendered += 1;
                    if let Err(e) = sink.render(&payload).await {
                        report.sink_errors += 1;
                        warn!(tick = n, error = %e, "Render sink failed");
                    }
                }
                Err(SnapshotReadError::NotReady) => {
                    report.not_ready += 1;
                    debug!(tick = n, "Snapshot not ready");
                }
                Err(e @ SnapshotReadError::Corrupt(_)) => {
                    report.corrupt += 1;
                    warn!(tick = n, error = %e, "Skipping tick");
                }
                Err(e @ SnapshotReadError::Io(_)) => {
                    report.io_errors += 1;
                    warn!(tick = n, error = %e, "Skipping tick");
                }
            }
            n += 1;
        }

        info!(ticks = report.ticks, rendered = report.rendered, "Consumer stopped");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkError;
    use async_trait::async_trait;
    use coinmarket_core::{Entity, RankingMode, Standing};
    use coinmarket_env::{snapshot_channel, FileSnapshotStore, SnapshotSink, SnapshotState};
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingRender {
        payloads: Vec<RenderPayload>,
    }

    #[async_trait]
    impl RenderSink for RecordingRender {
        async fn render(&mut self, payload: &RenderPayload) -> Result<(), SinkError> {
            self.payloads.push(payload.clone());
            Ok(())
        }
    }

    fn roster() -> Roster {
        Roster::new(vec![
            Entity::new("A", 400.0),
            Entity::new("B", 300.0),
            Entity::new("C", 500.0),
        ])
        .unwrap()
    }

    fn envelope(version: u64, prices: &[(&str, Vec<f64>)]) -> SnapshotEnvelope {
        let paths: SnapshotState = prices
            .iter()
            .map(|(name, path)| (name.to_string(), path.clone()))
            .collect();
        let round = paths.values().map(Vec::len).max().unwrap_or(1) as u64 - 1;
        SnapshotEnvelope::new(version, round, 60, paths)
    }

    fn config(mode: RankingMode) -> ConsumerConfig {
        ConsumerConfig::default()
            .with_poll_interval(Duration::from_millis(1000))
            .with_mode(mode)
    }

    #[tokio::test]
    async fn test_first_tick_without_artifact_is_not_ready() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(FileSnapshotStore::new(dir.path().join("coin_brownian.json")));
        let mut consumer = SnapshotConsumer::new(source, &roster(), config(RankingMode::Dense)).unwrap();

        let result = consumer.tick(0).await;

        assert!(matches!(result, Err(SnapshotReadError::NotReady)));
        assert_eq!(consumer.phase(), ConsumerPhase::WaitingForFirstSnapshot);
    }

    #[tokio::test]
    async fn test_first_read_moves_to_rendering() {
        let (tx, rx) = snapshot_channel();
        let mut consumer = SnapshotConsumer::new(Arc::new(rx), &roster(), config(RankingMode::Dense)).unwrap();

        assert!(consumer.tick(0).await.is_err());
        tx.publish(&envelope(1, &[("A", vec![100.0, 105.0]), ("B", vec![100.0, 103.0]), ("C", vec![100.0, 110.0])]))
            .await
            .unwrap();

        let payload = consumer.tick(1).await.unwrap();

        assert_eq!(consumer.phase(), ConsumerPhase::Rendering);
        assert_eq!(consumer.last_version(), Some(1));
        let order: Vec<&str> = payload.table.iter().map(|r| r.coin.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(payload.table[2].standing, Standing::Rank(3));
    }

    #[tokio::test]
    async fn test_corrupt_read_keeps_previous_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coin_brownian.json");
        let store = Arc::new(FileSnapshotStore::new(&path));
        let mode = RankingMode::Budget { total_budget: 650.0 };
        let mut consumer = SnapshotConsumer::new(store.clone(), &roster(), config(mode)).unwrap();

        store
            .publish(&envelope(1, &[("A", vec![100.0, 120.0]), ("B", vec![100.0, 90.0])]))
            .await
            .unwrap();
        consumer.tick(1).await.unwrap();
        let before = consumer.state().clone();

        std::fs::write(&path, b"{\"version\":2,\"round\":").unwrap();
        let result = consumer.tick(2).await;

        assert!(matches!(result, Err(SnapshotReadError::Corrupt(_))));
        assert_eq!(consumer.state(), &before);
        assert_eq!(consumer.phase(), ConsumerPhase::Rendering);
    }

    #[tokio::test]
    async fn test_producer_restart_is_accepted() {
        let (tx, rx) = snapshot_channel();
        let mut consumer = SnapshotConsumer::new(Arc::new(rx), &roster(), config(RankingMode::Dense)).unwrap();

        tx.publish(&envelope(7, &[("A", vec![100.0, 101.0, 102.0])])).await.unwrap();
        consumer.tick(2).await.unwrap();
        tx.publish(&envelope(1, &[("A", vec![100.0])])).await.unwrap();
        let payload = consumer.tick(3).await.unwrap();

        assert_eq!(consumer.last_version(), Some(1));
        assert_eq!(payload.series[0].y, vec![100.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_renders_each_tick_until_shutdown() {
        let (tx, rx) = snapshot_channel();
        tx.publish(&envelope(1, &[("A", vec![100.0, 101.0, 99.0, 104.0, 98.0, 97.0])]))
            .await
            .unwrap();
        let mut consumer = SnapshotConsumer::new(Arc::new(rx), &roster(), config(RankingMode::Dense)).unwrap();
        let mut sink = RecordingRender::default();

        // Ticks at 0, 1000, 2000, 3000 and 4000 ms
        let report = consumer
            .run(&mut sink, tokio::time::sleep(Duration::from_millis(4500)))
            .await;

        assert_eq!(report.ticks, 5);
        assert_eq!(report.rendered, 5);
        let visible: Vec<usize> = sink.payloads.iter().map(|p| p.series[0].y.len()).collect();
        assert_eq!(visible, vec![1, 2, 3, 4, 5]);
        assert_eq!(sink.payloads[4].x_domain, [0, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_skips_torn_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coin_brownian.json");
        std::fs::write(&path, b"{\"version\":1,\"round\":0,\"paths\":{\"A\":[100.0,").unwrap();
        let source = Arc::new(FileSnapshotStore::new(&path));
        let mut consumer = SnapshotConsumer::new(source, &roster(), config(RankingMode::Dense)).unwrap();
        let mut sink = RecordingRender::default();

        let report = consumer
            .run(&mut sink, tokio::time::sleep(Duration::from_millis(2500)))
            .await;

        assert_eq!(report.ticks, 3);
        assert_eq!(report.corrupt, 3);
        assert_eq!(report.rendered, 0);
        assert!(sink.payloads.is_empty());
        assert_eq!(consumer.phase(), ConsumerPhase::WaitingForFirstSnapshot);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_skips_unreadable_artifact() {
        let dir = TempDir::new().unwrap();
        // A directory where the artifact should be fails with an I/O error
        let path = dir.path().join("coin_brownian.json");
        std::fs::create_dir(&path).unwrap();
        let source = Arc::new(FileSnapshotStore::new(&path));
        let mut consumer = SnapshotConsumer::new(source, &roster(), config(RankingMode::Dense)).unwrap();
        let mut sink = RecordingRender::default();

        let report = consumer
            .run(&mut sink, tokio::time::sleep(Duration::from_millis(1500)))
            .await;

        assert_eq!(report.ticks, 2);
        assert_eq!(report.io_errors, 2);
        assert_eq!(report.corrupt, 0);
        assert!(sink.payloads.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_without_producer_only_counts_not_ready() {
        let (_tx, rx) = snapshot_channel();
        let mut consumer = SnapshotConsumer::new(Arc::new(rx), &roster(), config(RankingMode::Dense)).unwrap();
        let mut sink = RecordingRender::default();

        let report = consumer
            .run(&mut sink, tokio::time::sleep(Duration::from_millis(2500)))
            .await;

        assert_eq!(report.ticks, 3);
        assert_eq!(report.not_ready, 3);
        assert!(sink.payloads.is_empty());
        assert_eq!(consumer.phase(), ConsumerPhase::WaitingForFirstSnapshot);
    }
}
