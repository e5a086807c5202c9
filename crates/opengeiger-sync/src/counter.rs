//! The pulse counter shared between interrupt and main loop.

use core::sync::atomic::{AtomicU32, Ordering};

/// Pulse counter incremented once per qualifying hardware edge.
///
/// The tube interrupt increments, the main loop drains one ring-buffer
/// interval at a time with [`read_and_reset`](Self::read_and_reset). The
/// combination "read current value and reset to zero" must be indivisible
/// with respect to the interrupt; a single atomic swap provides exactly that
/// without masking interrupts, so pulse counting is never paused for the
/// drain.
///
/// # ISR Safety
///
/// [`record_pulse`](Self::record_pulse) is a single atomic fetch-add and is
/// safe to call from interrupt context.
#[derive(Debug, Default)]
pub struct PulseCounter {
    pulses: AtomicU32,
}

impl PulseCounter {
    /// Create a counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pulses: AtomicU32::new(0),
        }
    }

    /// Count one pulse. Interrupt-context entry point.
    #[inline]
    pub fn record_pulse(&self) {
        self.pulses.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current accumulated count without disturbing it.
    #[inline]
    #[must_use]
    pub fn read(&self) -> u32 {
        self.pulses.load(Ordering::Relaxed)
    }

    /// Atomically read the accumulated count and reset it to zero.
    ///
    /// Pulses arriving concurrently land either in the returned value or in
    /// the next interval; none are lost and none are double-counted.
    #[inline]
    #[must_use]
    pub fn read_and_reset(&self) -> u32 {
        self.pulses.swap(0, Ordering::Relaxed)
    }
}
