//! Render sinks: where a finished tick goes.
//!
//! The chart itself lives outside this workspace. `JsonFileSink` dumps each
//! payload for an external chart process to pick up; `LogSink` summarizes
//! it through `tracing`.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use coinmarket_core::{RenderPayload, Standing};
use coinmarket_env::write_atomic;

/// Errors while handing a payload to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Render output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Destination for render payloads.
#[async_trait]
pub trait RenderSink: Send {
    /// Presents one tick.
    async fn render(&mut self, payload: &RenderPayload) -> Result<(), SinkError>;
}

/// Logs a one-line summary of each tick.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl RenderSink for LogSink {
    async fn render(&mut self, payload: &RenderPayload) -> Result<(), SinkError> {
        let leader = payload.leader().map(|r| r.coin.as_str()).unwrap_or("-");
        let leader_price = payload.leader().map(|r| r.coin_price).unwrap_or(0.0);
        let granted = payload
            .table
            .iter()
            .filter(|r| r.standing == Standing::Prize(1))
            .count();

        info!(
            tick = payload.tick,
            series = payload.series.len(),
            leader,
            leader_price,
            min_y = payload.y_domain[0],
            max_y = payload.y_domain[1],
            granted,
            total_expense = payload.total_expense,
            "Rendered tick"
        );
        Ok(())
    }
}

/// Overwrites a JSON file with the latest payload.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Creates a sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RenderSink for JsonFileSink {
    async fn render(&mut self, payload: &RenderPayload) -> Result<(), SinkError> {
        let json = serde_json::to_vec_pretty(payload)?;
        write_atomic(&self.path, &json).await?;
        Ok(())
    }
}

/// Fans a payload out to several sinks, stopping at the first failure.
#[async_trait]
impl RenderSink for Vec<Box<dyn RenderSink>> {
    async fn render(&mut self, payload: &RenderPayload) -> Result<(), SinkError> {
        for sink in self.iter_mut() {
            sink.render(payload).await?;
        }
        Ok(())
    }
}
