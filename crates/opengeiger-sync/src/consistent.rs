//! Bounded retry-until-stable read protocols.
//!
//! A multi-byte variable written by an interrupt handler cannot be read in
//! one indivisible step on the original hardware. Rather than masking
//! interrupts around every read (stalling pulse counting), the main loop
//! re-reads until it observes a stable value. The interrupt fires at most
//! once per tick and ticks are far apart relative to instruction count, so
//! the loops terminate in a small bounded number of iterations; the bound is
//! part of the contract, and the readers are injectable closures so tests
//! can exercise the retry path with a fake concurrent writer.

use core::fmt;

/// Retry bound for the stable-read protocols.
///
/// The writer perturbs the value at most once per tick, so in practice two
/// reads suffice; the bound only exists to make a wedged reader detectable
/// instead of spinning forever.
pub const MAX_READ_RETRIES: usize = 16;

/// The value never stabilized within [`MAX_READ_RETRIES`] reads.
///
/// Seeing this means the paired writer violated its once-per-tick contract;
/// callers treat it like any other unrecoverable condition and restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRetryExhausted {
    /// Number of read attempts performed.
    pub retries: usize,
}

impl fmt::Display for ReadRetryExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shared read did not stabilize after {} retries", self.retries)
    }
}

impl core::error::Error for ReadRetryExhausted {}

/// Read a `(live, shadow)` countdown pair until it is consistent.
///
/// The tick interrupt writes the shadow copy immediately before decrementing
/// the live countdown, so `shadow - live == 1` (wrapping) holds whenever no
/// interrupt straddles the two reads. The loop re-reads until that invariant
/// holds and returns the live value.
///
/// # Errors
///
/// Returns [`ReadRetryExhausted`] if the pair never becomes consistent
/// within [`MAX_READ_RETRIES`] iterations.
pub fn read_consistent_pair<L, S>(mut live: L, mut shadow: S) -> Result<u16, ReadRetryExhausted>
where
    L: FnMut() -> u16,
    S: FnMut() -> u16,
{
    for _ in 0..MAX_READ_RETRIES {
        let s = shadow();
        let l = live();
        if s.wrapping_sub(l) == 1 {
            return Ok(l);
        }
    }
    Err(ReadRetryExhausted {
        retries: MAX_READ_RETRIES,
    })
}

/// Read a value twice until two consecutive reads agree.
///
/// The double-read protocol for interrupt-shared values without a shadow
/// copy (total counts, elapsed duration): a torn read cannot produce two
/// identical wrong values in a row because the writer only moves the value
/// once per tick.
///
/// # Errors
///
/// Returns [`ReadRetryExhausted`] if no two consecutive reads agree within
/// [`MAX_READ_RETRIES`] iterations.
pub fn read_stable<T, F>(mut load: F) -> Result<T, ReadRetryExhausted>
where
    T: Copy + PartialEq,
    F: FnMut() -> T,
{
    let mut prev = load();
    for _ in 0..MAX_READ_RETRIES {
        let current = load();
        if current == prev {
            return Ok(current);
        }
        prev = current;
    }
    Err(ReadRetryExhausted {
        retries: MAX_READ_RETRIES,
    })
}
