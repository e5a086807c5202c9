//! Engine error types.

use thiserror::Error;

use opengeiger_math::MathError;
use opengeiger_stats::StatsError;
use opengeiger_sync::ReadRetryExhausted;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failure of a main-loop engine operation.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Fixed-point rendering rejected a value.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Statistics configuration was rejected.
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// A synchronized read never stabilized.
    #[error(transparent)]
    TornRead(#[from] ReadRetryExhausted),
}
