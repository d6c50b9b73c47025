//! Coin Market Runtime - Snapshot Producer and Consumer
//!
//! This crate wires the pure pieces of `coinmarket_core` to the environment
//! of `coinmarket_env` and runs them:
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐                     ┌──────────────────────────┐
//! │   SnapshotProducer   │                     │     SnapshotConsumer     │
//! │                      │   publish(env)      │                          │
//! │  round 0..max_round  │ ──────────────────► │  timer tick n = 0, 1, .. │
//! │  compute_round()     │   SnapshotSink /    │  latest() -> render_tick │
//! │  sleep(interval)     │   SnapshotSource    │          │               │
//! └──────────────────────┘                     └──────────┼───────────────┘
//!                                                         ▼
//!                                                   RenderSink
//!                                              (log / JSON for a chart)
//! ```
//!
//! Producer and consumer never share memory other than the artifact, so a
//! dead producer shows up to the consumer only as a stale or missing
//! snapshot.
//!
//! # Usage
//!
//! ```ignore
//! use coinmarket_sim::{ProducerConfig, SnapshotProducer};
//! use coinmarket_env::{FileSnapshotStore, TokioContext};
//!
//! let sink = Arc::new(FileSnapshotStore::new("coin_brownian.json"));
//! let mut producer = SnapshotProducer::new(TokioContext::shared(), sink, roster, ProducerConfig::default())?;
//! let report = producer.run().await;
//! ```

mod context;
pub mod config;
pub mod producer;
pub mod consumer;
pub mod sink;

pub use context::SimContext;
pub use config::{ConfigError, ConsumerConfig, ProducerConfig};
pub use producer::{ProducerReport, SnapshotProducer};
pub use consumer::{ConsumerPhase, ConsumerReport, SnapshotConsumer};
pub use sink::{JsonFileSink, LogSink, RenderSink, SinkError};
