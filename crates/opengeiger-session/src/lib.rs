//! # opengeiger-session
//!
//! The measurement session state machine of the OpenGeiger counting core.
//!
//! A session moves through four states: `READY` accepts a `MEASURE`
//! command and starts accumulation; `MEASURING` serves intermediate
//! results and waits for the countdown (or an `ABORT`) to finalize;
//! `DONE` resends the final table on request until a `RESET`; `ERROR` is
//! terminal and converges on a device restart.
//!
//! The crate is transport-free. Commands arrive as already-verified
//! frames (see `opengeiger-frame`); responses, acquisition control and
//! parameter persistence go through the traits in [`ports`], so the
//! machine tests the same way on a workstation as it runs on a device.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod command;
pub mod error;
pub mod personality;
pub mod ports;
pub mod session;
pub mod state;

pub use command::Command;
pub use error::{SessionError, SessionResult};
pub use personality::Personality;
pub use ports::{MeasurementPort, ParamStore, ResponsePort, TableReason, TableSnapshot};
pub use session::{RestartReason, Session, SessionOutcome};
pub use state::SessionState;
