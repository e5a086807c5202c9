//! # opengeiger-sync
//!
//! Interrupt-safe shared cells for the OpenGeiger counting core.
//!
//! The firmware runs a single cooperative main loop preempted by non-nested
//! hardware interrupts. Every variable an interrupt handler mutates is owned
//! by one of the cells in this crate, which expose only the accessors that
//! are safe under that discipline:
//!
//! - [`PulseCounter`] - incremented from the pulse interrupt, drained by the
//!   main loop with a single atomic read-and-reset
//! - [`CountdownTimer`] - decremented from the tick interrupt, read from the
//!   main loop with the shadow-value retry protocol
//! - [`InterruptGate`] - the enable/disable primitive with a scoped
//!   disable-and-restore combinator
//! - [`read_consistent_pair`] / [`read_stable`] - the bounded retry-until-
//!   stable read protocols, with injectable readers for testing
//!
//! Raw unsynchronized access to any multi-byte shared field is deliberately
//! not part of the API.
//!
//! ## ISR Safety
//!
//! All interrupt-side operations are a single atomic instruction: no
//! allocation, no blocking, no retry. The retry loops live exclusively on
//! the main-loop side, where a bounded number of extra reads is cheap and
//! disabling interrupts for a read would stall pulse counting.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod consistent;
pub mod counter;
pub mod gate;
pub mod prelude;
pub mod timer;

pub use consistent::{MAX_READ_RETRIES, ReadRetryExhausted, read_consistent_pair, read_stable};
pub use counter::PulseCounter;
pub use gate::InterruptGate;
pub use timer::CountdownTimer;
