//! # opengeiger-engine
//!
//! The part of OpenGeiger that ties the pieces together: the acquisition
//! state touched from interrupt context ([`Acquisition`]), the main-loop
//! protocol driver feeding frames into the session ([`Driver`]), and the
//! display cycle that turns ring-buffer history into rate, tolerance and
//! dose-rate readouts ([`DisplayController`]).
//!
//! The split mirrors the interrupt/main-loop boundary of the device:
//! everything on [`Acquisition`] is callable from "interrupt" context
//! (lock-free, `&self`), while the driver and display run cooperatively
//! in the main loop and only ever observe acquisition state through the
//! synchronized-read primitives of `opengeiger-sync`.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod acquisition;
pub mod display;
pub mod driver;
pub mod error;
pub mod wire;

pub use acquisition::{
    Acquisition, AcquisitionHandle, EngineConfig, PulseFeedback, SilentFeedback, TimerMode,
};
pub use display::{DisplayController, DisplayPort};
pub use driver::{ByteSource, Driver, DriverStep, SourceStatus};
pub use error::{EngineError, EngineResult};
