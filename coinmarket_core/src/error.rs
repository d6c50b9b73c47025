//! Error types for path computation and roster loading.

use thiserror::Error;

/// The entity name cannot be turned into a seed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Seed input error: entity name must be non-empty")]
pub struct SeedInputError;

/// Invalid simulation parameters.
///
/// Raised instead of producing a degenerate (zero-division, NaN) path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationParamError {
    /// Step count below one
    #[error("n_step must be at least 1, got {0}")]
    NonPositiveSteps(usize),

    /// Horizon not finite or too short to yield one step
    #[error("deltaT must be finite and >= 1, got {0}")]
    InvalidHorizon(f64),

    /// Start price not finite or not positive
    #[error("s0 must be finite and > 0, got {0}")]
    InvalidStartPrice(f64),

    /// Drift or volatility not finite
    #[error("mu and sigma must be finite, got mu={mu} sigma={sigma}")]
    NonFiniteCoefficients { mu: f64, sigma: f64 },

    /// The exponential under- or overflowed
    #[error("price path degenerates at index {index}")]
    Degenerate { index: usize },
}

/// Failure computing one entity's price path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error(transparent)]
    Seed(#[from] SeedInputError),

    #[error(transparent)]
    Params(#[from] SimulationParamError),
}

/// Failure loading the entity roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Reading the roster file failed
    #[error("Roster I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header row absent or lacking a required column
    #[error("Roster header is missing column '{0}'")]
    MissingColumn(&'static str),

    /// A data row is malformed
    #[error("Roster line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },

    /// An entity failed validation outside of CSV parsing
    #[error("Roster entry '{coin}': {reason}")]
    InvalidEntity { coin: String, reason: String },

    /// Two rows share a coin name
    #[error("Roster has duplicate coin '{0}'")]
    DuplicateCoin(String),

    /// No data rows at all
    #[error("Roster is empty")]
    Empty,
}

impl RosterError {
    /// Creates an invalid-row error.
    pub fn invalid_row(line: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRow {
            line,
            reason: reason.into(),
        }
    }

    /// Creates an invalid-entity error.
    pub fn invalid_entity(coin: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEntity {
            coin: coin.to_string(),
            reason: reason.into(),
        }
    }
}
