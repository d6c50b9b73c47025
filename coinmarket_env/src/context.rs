//! Core environment context trait for the producer and consumer.

use async_trait::async_trait;
use std::time::Duration;

/// The central interface for time.
///
/// This trait abstracts the wall clock so that the round loop can run
/// in both production (tokio) and simulation (virtual clock) environments.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`
/// - **Simulation**: `SimContext` (in `coinmarket_sim`) - manual virtual clock
///
/// # Determinism
///
/// Nothing random flows through the context: every price path is derived
/// from the entity name alone. Only pacing is controlled here.
#[async_trait]
pub trait MarketContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances virtual clock and returns immediately
    async fn sleep(&self, duration: Duration);
}
