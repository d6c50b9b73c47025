//! Simulation context implementing MarketContext for deterministic testing.

use async_trait::async_trait;
use coinmarket_env::MarketContext;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Simulation context backed by a virtual clock.
///
/// This implements `MarketContext` using:
/// - A virtual clock that can be advanced manually
/// - Simulated sleep that advances virtual time and returns immediately
///
/// A full producer run with twenty-second pauses completes instantly, and
/// the elapsed virtual time tells a test exactly how long it paused.
pub struct SimContext {
    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,

    /// Number of sleep calls so far
    sleep_count: Arc<Mutex<u64>>,
}

impl SimContext {
    /// Creates a new SimContext at virtual time zero.
    pub fn new() -> Self {
        Self {
            virtual_time_ns: Arc::new(Mutex::new(0)),
            sleep_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap();
        *time += duration.as_nanos() as u64;
    }

    /// Returns how many times `sleep` has been called.
    pub fn sleep_count(&self) -> u64 {
        *self.sleep_count.lock().unwrap()
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            sleep_count: Arc::clone(&self.sleep_count),
        }
    }
}

#[async_trait]
impl MarketContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(*self.virtual_time_ns.lock().unwrap())
    }

    async fn sleep(&self, duration: Duration) {
        *self.sleep_count.lock().unwrap() += 1;
        self.advance_time(duration);
    }
}
