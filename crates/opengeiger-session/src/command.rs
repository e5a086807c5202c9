//! Command codes accepted from the host.

/// A command frame's command byte, decoded.
///
/// The wire bytes are printable ASCII so that captured traffic stays
/// legible in a plain hex dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Start a measurement; payload carries the timer parameter.
    Measure = b'M',
    /// Abort the running measurement and finalize.
    Abort = b'A',
    /// Transmit a snapshot of the partial table without pausing.
    Intermediate = b'I',
    /// Re-announce the current session state.
    State = b'S',
    /// Restart the device back into `READY`.
    Reset = b'R',
    /// Persist the payload as the new stored parameter block.
    ParamsToPersist = b'E',
    /// Read back the stored parameter block.
    ParamsFromPersist = b'F',
    /// Announce the firmware personality.
    PersonalityInfo = b'P',
}

impl Command {
    /// Decodes a wire byte; unknown bytes yield `None` and are treated
    /// by the session as a no-op re-announcing the current state.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'M' => Some(Self::Measure),
            b'A' => Some(Self::Abort),
            b'I' => Some(Self::Intermediate),
            b'S' => Some(Self::State),
            b'R' => Some(Self::Reset),
            b'E' => Some(Self::ParamsToPersist),
            b'F' => Some(Self::ParamsFromPersist),
            b'P' => Some(Self::PersonalityInfo),
            _ => None,
        }
    }

    /// Wire byte for this command.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}
