//! Frame protocol error types.
//!
//! Only violations inside an already-recognized frame are errors; garbage
//! before the magic is silent resynchronization and never surfaces here.

use thiserror::Error;

/// Result alias for frame parsing operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// A protocol violation detected mid-frame.
///
/// Every variant here is a hard fault: the byte stream can no longer be
/// trusted, and the caller is expected to abandon the session and restart
/// the device rather than try to limp along.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The length byte fell outside the admissible payload range.
    #[error("payload length {len} outside admissible range {min}..{max}")]
    LengthOutOfRange {
        /// Length announced by the frame header.
        len: u8,
        /// Smallest nonzero length the parser accepts.
        min: u8,
        /// Exclusive upper bound on the payload length.
        max: u8,
    },

    /// The trailing checksum byte did not match the running checksum.
    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch {
        /// Checksum computed over the received header and payload.
        expected: u8,
        /// Checksum byte that arrived on the wire.
        actual: u8,
    },
}

impl FrameError {
    /// Builds a [`FrameError::LengthOutOfRange`].
    #[must_use]
    pub fn length_out_of_range(len: u8, min: u8, max: u8) -> Self {
        Self::LengthOutOfRange { len, min, max }
    }

    /// Builds a [`FrameError::ChecksumMismatch`].
    #[must_use]
    pub fn checksum_mismatch(expected: u8, actual: u8) -> Self {
        Self::ChecksumMismatch { expected, actual }
    }
}
