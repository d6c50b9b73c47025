//! Coin Market Environment Abstraction Layer
//!
//! This crate isolates everything the simulator does *to the outside world*
//! so that the producer and consumer can run against real resources in
//! production and against controlled ones in tests:
//! - Time (`now()`, `sleep()`)
//! - The snapshot artifact (`publish()`, `latest()`)
//!
//! # The Snapshot Artifact
//!
//! A single [`SnapshotEnvelope`] is exchanged between one producer and one
//! consumer. It is always overwritten wholesale, never appended to:
//!
//! ```text
//! Producer                     Artifact                     Consumer
//!    |                            |                            |
//!    |-- publish(envelope) ------>|  (atomic replace)          |
//!    |                            |<-------- latest() ---------|
//!    |                            |-- envelope / NotReady ---->|
//! ```
//!
//! Two transports are provided:
//! - [`FileSnapshotStore`]: cross-process, temp file + atomic rename
//! - [`snapshot_channel`]: in-process, `tokio::sync::watch` latest-value channel
//!
//! # Example
//!
//! ```ignore
//! use coinmarket_env::{MarketContext, SnapshotReadError, SnapshotSource};
//!
//! async fn poll<Ctx: MarketContext, Src: SnapshotSource>(ctx: &Ctx, src: &Src) {
//!     loop {
//!         match src.latest().await {
//!             Ok(envelope) => render(envelope),
//!             // Every read error is retried on the next poll
//!             Err(SnapshotReadError::NotReady) => {}
//!             Err(e) => eprintln!("{e}"),
//!         }
//!         ctx.sleep(Duration::from_secs(2)).await;
//!     }
//! }
//! ```

mod context;
mod store;
mod types;
mod error;
mod tokio_impl;
mod file_store;
mod channel_store;

pub use context::MarketContext;
pub use store::{SnapshotSink, SnapshotSource};
pub use types::{PricePath, SnapshotEnvelope, SnapshotState};
pub use error::{SnapshotReadError, SnapshotWriteError};
pub use tokio_impl::TokioContext;
pub use file_store::{write_atomic, FileSnapshotStore};
pub use channel_store::{snapshot_channel, WatchSnapshotSink, WatchSnapshotSource};
