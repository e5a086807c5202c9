//! The interval countdown timer with its shadow copy.

use core::sync::atomic::{AtomicU16, Ordering};

use crate::consistent::{ReadRetryExhausted, read_consistent_pair};

/// Countdown timer decremented once per tick from interrupt context.
///
/// The owning tick interrupt calls [`tick`](Self::tick); reaching zero
/// signals that the interval (or, in total-duration mode, the whole
/// measurement) has elapsed. The main loop treats the countdown as
/// read-only and reads it through [`remaining`](Self::remaining), which uses
/// the shadow-value protocol from [`crate::consistent`]:
///
/// - the interrupt stores the pre-decrement value into `shadow`, then
///   decrements `live`
/// - between ticks, `shadow - live == 1` (wrapping) always holds
/// - a reader observing anything else caught the interrupt mid-update and
///   simply reads again
///
/// This gives a race-free multi-byte read without ever masking interrupts.
#[derive(Debug)]
pub struct CountdownTimer {
    live: AtomicU16,
    shadow: AtomicU16,
    period: AtomicU16,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownTimer {
    /// Create a disarmed timer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            live: AtomicU16::new(0),
            shadow: AtomicU16::new(1),
            period: AtomicU16::new(0),
        }
    }

    /// Arm the countdown with `ticks` to go.
    ///
    /// Must be called before the tick interrupt is enabled. The shadow is
    /// seeded one above the live value so the consistency invariant holds
    /// from the first read on.
    pub fn arm(&self, ticks: u16) {
        self.period.store(ticks, Ordering::Relaxed);
        self.shadow.store(ticks.wrapping_add(1), Ordering::Relaxed);
        self.live.store(ticks, Ordering::Relaxed);
    }

    /// Re-arm with the period from the previous [`arm`](Self::arm) call.
    ///
    /// Interrupt-context entry point, used at interval rotation.
    #[inline]
    pub fn rearm(&self) {
        let period = self.period.load(Ordering::Relaxed);
        self.shadow.store(period.wrapping_add(1), Ordering::Relaxed);
        self.live.store(period, Ordering::Relaxed);
    }

    /// The period this timer was last armed with.
    #[inline]
    #[must_use]
    pub fn period(&self) -> u16 {
        self.period.load(Ordering::Relaxed)
    }

    /// Decrement the countdown by one tick. Interrupt-context entry point.
    ///
    /// Returns `true` when the countdown reaches zero with this tick. Must
    /// only be called while armed with a nonzero remaining count; the owning
    /// interrupt guarantees this by disarming (or re-arming) at zero.
    #[inline]
    pub fn tick(&self) -> bool {
        let live = self.live.load(Ordering::Relaxed);
        // Shadow first, then the decrement: the reader-side invariant
        // depends on exactly this order.
        self.shadow.store(live, Ordering::Relaxed);
        let next = live.wrapping_sub(1);
        self.live.store(next, Ordering::Relaxed);
        next == 0
    }

    /// Read the remaining tick count via the shadow-consistency protocol.
    ///
    /// # Errors
    ///
    /// Returns [`ReadRetryExhausted`] if the pair never stabilizes, which
    /// means the tick source violated its once-per-tick contract.
    pub fn remaining(&self) -> Result<u16, ReadRetryExhausted> {
        read_consistent_pair(
            || self.live.load(Ordering::Relaxed),
            || self.shadow.load(Ordering::Relaxed),
        )
    }
}
