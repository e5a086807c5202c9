//! Byte-at-a-time command frame parser.
//!
//! The parser is a five-state machine fed one byte per call. It never
//! blocks and never buffers more than the frame currently in flight, so
//! the caller can interleave it freely with other main-loop work.
//!
//! Two failure modes are deliberately asymmetric:
//!
//! - A byte that breaks the magic sequence is treated as line noise or a
//!   mid-stream hot-plug: the parser resynchronizes silently, re-checking
//!   whether the offending byte could itself start a new magic sequence.
//! - A bad length or checksum *after* the magic matched means a peer that
//!   speaks the protocol sent something broken. That is unrecoverable at
//!   this layer and surfaces as a [`FrameError`].

use tracing::{debug, trace};

use crate::error::{FrameError, FrameResult};
use crate::{COMMAND_MAGIC, MAX_PAYLOAD};

/// A fully received and checksum-verified command frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw command byte as it arrived on the wire.
    pub command: u8,
    /// Command payload; empty for parameterless commands.
    pub payload: Vec<u8>,
}

/// Internal position of the parser within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Matching the fixed magic sequence; `usize` is the next index.
    Magic(usize),
    /// Expecting the command byte.
    Command,
    /// Expecting the payload length byte.
    Length,
    /// Collecting payload bytes until the announced length is reached.
    Payload,
    /// Expecting the trailing checksum byte.
    Checksum,
}

/// Incremental command frame parser.
#[derive(Debug)]
pub struct FrameParser {
    state: ParserState,
    checksum: crate::Checksum,
    command: u8,
    length: usize,
    payload: Vec<u8>,
    min_payload: u8,
    resyncs: u64,
}

impl FrameParser {
    /// Creates a parser waiting for the start of a frame.
    ///
    /// `min_payload` is the smallest nonzero payload length the protocol
    /// admits; a length byte of zero is always valid (parameterless
    /// command), anything between zero and `min_payload` is a violation.
    #[must_use]
    pub fn new(min_payload: u8) -> Self {
        Self {
            state: ParserState::Magic(0),
            checksum: crate::Checksum::new(),
            command: 0,
            length: 0,
            payload: Vec::new(),
            min_payload,
            resyncs: 0,
        }
    }

    /// Current parser state, for diagnostics.
    #[must_use]
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Number of silent resynchronizations since construction.
    #[must_use]
    pub fn resyncs(&self) -> u64 {
        self.resyncs
    }

    /// Feeds one byte to the parser.
    ///
    /// Returns `Ok(Some(frame))` when the byte completed a frame whose
    /// checksum verified, `Ok(None)` while a frame is still in flight (or
    /// the byte was discarded during resynchronization), and `Err` on a
    /// protocol violation. After an error the parser has already reset
    /// itself, but the stream should be considered compromised.
    pub fn push_byte(&mut self, byte: u8) -> FrameResult<Option<Frame>> {
        match self.state {
            ParserState::Magic(idx) => {
                if byte == COMMAND_MAGIC[idx] {
                    self.state = if idx + 1 == COMMAND_MAGIC.len() {
                        ParserState::Command
                    } else {
                        ParserState::Magic(idx + 1)
                    };
                } else {
                    self.resyncs += 1;
                    trace!(byte, at = idx, "magic mismatch, resynchronizing");
                    // The offending byte may itself open a new frame.
                    self.state = if byte == COMMAND_MAGIC[0] {
                        ParserState::Magic(1)
                    } else {
                        ParserState::Magic(0)
                    };
                }
                Ok(None)
            }
            ParserState::Command => {
                self.command = byte;
                self.checksum = crate::Checksum::new();
                self.checksum.update(byte);
                self.state = ParserState::Length;
                Ok(None)
            }
            ParserState::Length => {
                self.checksum.update(byte);
                let len = usize::from(byte);
                let valid =
                    len == 0 || (len >= usize::from(self.min_payload) && len < MAX_PAYLOAD);
                if !valid {
                    debug!(len, "rejecting frame with out-of-range length");
                    let err = FrameError::length_out_of_range(
                        byte,
                        self.min_payload,
                        MAX_PAYLOAD as u8,
                    );
                    self.reset();
                    return Err(err);
                }
                self.length = len;
                self.payload.clear();
                self.state = if len == 0 {
                    ParserState::Checksum
                } else {
                    ParserState::Payload
                };
                Ok(None)
            }
            ParserState::Payload => {
                self.checksum.update(byte);
                self.payload.push(byte);
                if self.payload.len() == self.length {
                    self.state = ParserState::Checksum;
                }
                Ok(None)
            }
            ParserState::Checksum => {
                let expected = self.checksum.value();
                if byte != expected {
                    debug!(
                        expected,
                        actual = byte,
                        "rejecting frame with checksum mismatch"
                    );
                    let err = FrameError::checksum_mismatch(expected, byte);
                    self.reset();
                    return Err(err);
                }
                let frame = Frame {
                    command: self.command,
                    payload: std::mem::take(&mut self.payload),
                };
                trace!(command = frame.command, len = frame.payload.len(), "frame complete");
                self.reset();
                Ok(Some(frame))
            }
        }
    }

    fn reset(&mut self) {
        self.state = ParserState::Magic(0);
        self.payload.clear();
        self.length = 0;
    }
}
