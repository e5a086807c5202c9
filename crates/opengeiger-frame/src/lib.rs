//! # opengeiger-frame
//!
//! The serial frame protocol of the OpenGeiger counting core.
//!
//! The device and the host exchange frames over a point-to-point byte
//! stream, one frame per direction at a time. This crate is I/O-free: it
//! parses bytes the caller feeds in and produces byte vectors the caller
//! transmits.
//!
//! Command frames (host -> device):
//!
//! ```text
//! [4 bytes magic "OGFC"][1 command][1 length][length bytes payload][1 checksum]
//! ```
//!
//! Response frames (device -> host) carry larger payloads (multi-kilobyte
//! value tables), so their length field is two bytes:
//!
//! ```text
//! [4 bytes magic "OGFR"][2 bytes length LE][1 kind][payload][1 checksum]
//! ```
//!
//! Parsing is a five-state machine ([`FrameParser`]); a magic mismatch is
//! silent stream resynchronization, while a bad length or checksum is a
//! protocol violation the caller must answer with a full device restart.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod checksum;
pub mod error;
pub mod parser;
pub mod writer;

pub use checksum::Checksum;
pub use error::{FrameError, FrameResult};
pub use parser::{Frame, FrameParser, ParserState};
pub use writer::{FrameWriter, ResponseKind};

/// Fixed magic sequence opening every host -> device command frame.
pub const COMMAND_MAGIC: [u8; 4] = *b"OGFC";

/// Fixed magic sequence opening every device -> host response frame.
pub const RESPONSE_MAGIC: [u8; 4] = *b"OGFR";

/// Exclusive upper bound on the command payload length.
pub const MAX_PAYLOAD: usize = 64;
