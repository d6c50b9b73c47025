//! Producer and consumer configuration.

use std::time::Duration;
use thiserror::Error;

use coinmarket_core::{GbmParams, RankingMode, SimulationParamError};

/// Invalid runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// max_round must be positive
    #[error("max_round must be at least 1")]
    ZeroRounds,

    /// A timer period of zero
    #[error("{0} interval must be non-zero")]
    ZeroInterval(&'static str),

    /// Budget negative or not finite
    #[error("total budget must be a non-negative number, got {0}")]
    InvalidBudget(f64),

    /// GBM parameters cannot produce a path
    #[error("invalid price model: {0}")]
    Gbm(#[from] SimulationParamError),
}

/// Configuration for a producer run.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Number of rounds, and the horizon every path is computed over
    pub max_round: u64,

    /// Pause between rounds (none after round 0)
    pub round_interval: Duration,

    /// Price model
    pub gbm: GbmParams,

    /// Extra publish attempts before a round is skipped
    pub write_retries: u32,

    /// Pause between publish attempts
    pub retry_backoff: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            max_round: 60,
            round_interval: Duration::from_secs(20),
            gbm: GbmParams::default(),
            write_retries: 3,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

impl ProducerConfig {
    /// Sets the round count and horizon.
    pub fn with_max_round(mut self, max_round: u64) -> Self {
        self.max_round = max_round;
        self
    }

    /// Sets the pause between rounds.
    pub fn with_round_interval(mut self, interval: Duration) -> Self {
        self.round_interval = interval;
        self
    }

    /// Sets the price model.
    pub fn with_gbm(mut self, gbm: GbmParams) -> Self {
        self.gbm = gbm;
        self
    }

    /// Sets retry count and backoff for failed publishes.
    pub fn with_write_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.write_retries = retries;
        self.retry_backoff = backoff;
        self
    }

    /// Checks the configuration before any round runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_round == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        self.gbm.validate()?;
        Ok(())
    }
}

/// Configuration for the live-view consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Horizon the consumer expects the producer to use
    pub max_round: u64,

    /// Timer period between ticks
    pub poll_interval: Duration,

    /// Dense ranks or budget allocation
    pub mode: RankingMode,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            max_round: 60,
            poll_interval: Duration::from_millis(2000),
            mode: RankingMode::Budget {
                total_budget: 1_000_000.0,
            },
        }
    }
}

impl ConsumerConfig {
    /// Sets the expected horizon.
    pub fn with_max_round(mut self, max_round: u64) -> Self {
        self.max_round = max_round;
        self
    }

    /// Sets the timer period.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the ranking mode.
    pub fn with_mode(mut self, mode: RankingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Checks the configuration before the timer starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_round == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("poll"));
        }
        if let RankingMode::Budget { total_budget } = self.mode {
            if !total_budget.is_finite() || total_budget < 0.0 {
                return Err(ConfigError::InvalidBudget(total_budget));
            }
        }
        Ok(())
    }
}
