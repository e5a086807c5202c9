//! Response frame encoding (device -> host).
//!
//! Responses are built in one pass into a `Vec<u8>` the caller hands to
//! its transport. Unlike command frames, the length field is two bytes
//! little-endian because value tables run to several kilobytes.

use crate::{Checksum, RESPONSE_MAGIC};

/// Discriminator byte identifying the kind of a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseKind {
    /// Session state announcement (ASCII state name).
    State = b'S',
    /// Free-form diagnostic text.
    Text = b'T',
    /// Firmware personality description.
    PersonalityInfo = b'P',
    /// Sample value table with its header.
    ValueTable = b'V',
    /// Parameter block readback.
    Params = b'E',
}

impl ResponseKind {
    /// Wire byte for this kind.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Builder for device -> host response frames.
///
/// Stateless; each call produces one complete, checksummed frame.
#[derive(Debug, Default)]
pub struct FrameWriter;

impl FrameWriter {
    /// Creates a writer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Encodes one response frame around `payload`.
    ///
    /// The announced length covers the payload only, not the kind byte or
    /// the checksum. Payloads longer than `u16::MAX` are truncated; no
    /// response in this protocol approaches that bound.
    #[must_use]
    pub fn encode(&self, kind: ResponseKind, payload: &[u8]) -> Vec<u8> {
        let len = payload.len().min(usize::from(u16::MAX));
        let payload = &payload[..len];
        let len16 = len as u16;

        let mut out = Vec::with_capacity(RESPONSE_MAGIC.len() + 2 + 1 + len + 1);
        out.extend_from_slice(&RESPONSE_MAGIC);
        out.extend_from_slice(&len16.to_le_bytes());
        out.push(kind.as_byte());
        out.extend_from_slice(payload);

        let mut ck = Checksum::new();
        ck.update(kind.as_byte());
        ck.update_slice(&len16.to_le_bytes());
        ck.update_slice(payload);
        out.push(ck.value());
        out
    }

    /// Encodes a state announcement frame.
    #[must_use]
    pub fn state(&self, name: &str) -> Vec<u8> {
        self.encode(ResponseKind::State, name.as_bytes())
    }

    /// Encodes a diagnostic text frame.
    #[must_use]
    pub fn text(&self, message: &str) -> Vec<u8> {
        self.encode(ResponseKind::Text, message.as_bytes())
    }
}
