//! Error types for the statistics engine.

use thiserror::Error;

/// Errors that can occur while configuring the statistics engine.
///
/// Statistical insufficiency (too few samples for an estimate) is
/// deliberately *not* an error: [`crate::Statistics::compute`] returns
/// `None` and the display layer shows the estimate as unavailable.
#[derive(Debug, Clone, Error)]
pub enum StatsError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl StatsError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

/// A specialized `Result` type for statistics operations.
pub type StatsResult<T> = Result<T, StatsError>;
