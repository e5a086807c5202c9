//! The interrupt enable/disable gate.

use core::sync::atomic::{AtomicBool, Ordering};

/// Global interrupt enable flag with a scoped disable-and-restore combinator.
///
/// Interrupt sources consult [`is_enabled`](Self::is_enabled) before
/// delivering an event, mirroring the hardware global interrupt flag. The
/// main loop uses [`with_disabled`](Self::with_disabled) for the two
/// critical sections that genuinely need mutual exclusion: the final table
/// snapshot at measurement end, and the cursor/count copy before a
/// statistics traversal. Everything else uses the lock-free read protocols
/// instead, so accumulation is never stalled.
#[derive(Debug)]
pub struct InterruptGate {
    enabled: AtomicBool,
}

impl Default for InterruptGate {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptGate {
    /// Create a gate with interrupts disabled, the state at reset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
        }
    }

    /// Enable interrupt delivery.
    #[inline]
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Disable interrupt delivery.
    ///
    /// After this returns, no new interrupt-context mutation begins; the
    /// caller may treat shared state as quiescent.
    #[inline]
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// Whether interrupt delivery is currently enabled.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Run `f` with interrupts disabled, restoring the previous state after.
    ///
    /// The scoped form guarantees the restore happens even when the section
    /// is nested inside another disabled region (the prior state, not
    /// unconditionally "enabled", is restored).
    #[inline]
    pub fn with_disabled<T>(&self, f: impl FnOnce() -> T) -> T {
        let was_enabled = self.enabled.swap(false, Ordering::SeqCst);
        let result = f();
        if was_enabled {
            self.enabled.store(true, Ordering::SeqCst);
        }
        result
    }
}
