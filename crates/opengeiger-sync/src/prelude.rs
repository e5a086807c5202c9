//! Prelude for the sync crate.
//!
//! Re-exports the cells and read protocols most callers need.

pub use crate::consistent::{
    MAX_READ_RETRIES, ReadRetryExhausted, read_consistent_pair, read_stable,
};
pub use crate::counter::PulseCounter;
pub use crate::gate::InterruptGate;
pub use crate::timer::CountdownTimer;
