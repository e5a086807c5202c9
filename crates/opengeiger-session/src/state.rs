//! Session lifecycle states.

/// Lifecycle state of a measurement session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Idle, waiting for a `MEASURE` command.
    #[default]
    Ready,
    /// Measurement running; accumulation live.
    Measuring,
    /// Measurement finalized; final table held for resending.
    Done,
    /// Invalid situation reached; the only exit is a restart.
    Error,
}

impl SessionState {
    /// ASCII tag used in state announcement frames.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Measuring => "MEASURING",
            Self::Done => "DONE",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
