//! Deterministic integer math primitives for OpenGeiger.
//!
//! The counting core runs float-free: count rates, statistical tolerances and
//! display strings are all derived with integer arithmetic at a fixed internal
//! resolution. This crate provides the two primitives everything else leans on:
//!
//! - [`integer_sqrt`] - bit-exact `floor(sqrt(q))` over the full `u32` domain
//! - [`format_fixed_point`] - fixed-point decimal rendering with space padding
//!
//! Both are deterministic and bounded-time, which matters because they are
//! called from the display cycle of a device that must never stall pulse
//! accumulation.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod format;
pub mod sqrt;

pub use format::format_fixed_point;
pub use sqrt::integer_sqrt;

use thiserror::Error;

/// Errors from the formatting primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// `digit_count` outside the supported `1..=6` range.
    #[error("digit count {0} outside supported range 1..=6")]
    DigitCountOutOfRange(u8),

    /// `decimal_pos` outside the supported `0..=6` range or past the rendered digits.
    #[error("decimal position {pos} invalid for {digits} digits")]
    DecimalPosOutOfRange {
        /// Requested decimal point position.
        pos: u8,
        /// Requested total digit count.
        digits: u8,
    },

    /// The value does not fit into the requested number of digits.
    #[error("value {value} does not fit into {digits} decimal digits")]
    ValueTooWide {
        /// Value that was to be rendered.
        value: u32,
        /// Requested total digit count.
        digits: u8,
    },
}

/// A specialized `Result` type for integer math operations.
pub type MathResult<T> = core::result::Result<T, MathError>;
