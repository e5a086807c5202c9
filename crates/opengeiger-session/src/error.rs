//! Session error types.
//!
//! Every variant here is terminal for the session: the caller routes it
//! into the `ERROR` state and the device restarts. There is no partial
//! recovery because residual session state cannot be trusted.

use thiserror::Error;

use crate::state::SessionState;

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// A condition that forces the session into `ERROR`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A `MEASURE` payload did not match the personality's parameter size.
    #[error("measure payload length {actual} does not match parameter size {expected}")]
    InvalidPayloadLength {
        /// Parameter block size the personality declares.
        expected: usize,
        /// Payload length that arrived.
        actual: usize,
    },

    /// The "measurement finished" event fired outside `MEASURING`.
    #[error("measurement finished event in state {state}")]
    UnexpectedFinishedEvent {
        /// State the session was in when the event fired.
        state: SessionState,
    },

    /// The persistence backend failed to load or store parameters.
    #[error("parameter persistence failed: {reason}")]
    Persistence {
        /// Backend-reported failure description.
        reason: String,
    },
}

impl SessionError {
    /// Builds a [`SessionError::InvalidPayloadLength`].
    #[must_use]
    pub fn invalid_payload_length(expected: usize, actual: usize) -> Self {
        Self::InvalidPayloadLength { expected, actual }
    }

    /// Builds a [`SessionError::UnexpectedFinishedEvent`].
    #[must_use]
    pub fn unexpected_finished_event(state: SessionState) -> Self {
        Self::UnexpectedFinishedEvent { state }
    }

    /// Builds a [`SessionError::Persistence`].
    #[must_use]
    pub fn persistence(reason: impl Into<String>) -> Self {
        Self::Persistence { reason: reason.into() }
    }
}
