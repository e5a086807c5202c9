//! Fixed-capacity ring buffer of per-interval counts.

use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

/// Copied-out cursor state for a traversal.
///
/// Taken once before a statistics pass (under whatever exclusion the caller
/// chooses); the traversal then proceeds on the copy so accumulation is
/// never stalled for the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingCursor {
    /// Index of the most recently written slot.
    pub head: usize,
    /// Number of valid entries, saturated at capacity.
    pub count: usize,
}

/// Circular buffer of per-interval pulse counts.
///
/// Written once per interval from the tick interrupt via
/// [`push`](Self::push); read by the display cycle under a copy-then-process
/// discipline: copy the cursor with [`cursor`](Self::cursor), then traverse
/// on the copy. Entries are atomic cells so the interrupt-side write never
/// blocks; a traversal racing a push can observe at most one freshly
/// rotated slot, which is display-only inaccuracy and accepted.
///
/// Capacity is fixed at construction; the buffer never grows. Once full,
/// entries are overwritten oldest-first.
#[derive(Debug)]
pub struct RingBuffer {
    slots: Box<[AtomicU16]>,
    head: AtomicUsize,
    count: AtomicUsize,
}

impl RingBuffer {
    /// Create a buffer of `capacity` slots, all zero, with no valid entries.
    ///
    /// `capacity` must be nonzero; a zero capacity is clamped to one slot
    /// rather than panicking in device code.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || AtomicU16::new(0));
        Self {
            slots: slots.into_boxed_slice(),
            head: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
        }
    }

    /// Total slot capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Write one interval count into the next slot. Interrupt-context entry
    /// point; advances the head and saturates the valid-entry counter.
    pub fn push(&self, sample: u16) {
        let head = self.head.load(Ordering::Relaxed);
        let next = if head + 1 < self.slots.len() { head + 1 } else { 0 };
        if let Some(slot) = self.slots.get(next) {
            slot.store(sample, Ordering::Relaxed);
        }
        self.head.store(next, Ordering::Relaxed);
        let count = self.count.load(Ordering::Relaxed);
        if count < self.slots.len() {
            self.count.store(count + 1, Ordering::Relaxed);
        }
    }

    /// Copy out the current head and valid-entry count.
    #[must_use]
    pub fn cursor(&self) -> RingCursor {
        RingCursor {
            head: self.head.load(Ordering::Relaxed),
            count: self.count.load(Ordering::Relaxed),
        }
    }

    /// Read the slot at `index` (wrapped into capacity).
    #[must_use]
    pub fn entry(&self, index: usize) -> u16 {
        self.slots
            .get(index % self.slots.len())
            .map_or(0, |slot| slot.load(Ordering::Relaxed))
    }

    /// Forcibly shrink the number of valid entries to `n`.
    ///
    /// Called when a change detector fires: discarding the stale history
    /// makes the next window selection react immediately to the new rate.
    /// Only shrinks; a concurrent rotation may bump the count back up by
    /// one, which is accepted display-only imprecision.
    pub fn shrink_valid(&self, n: usize) {
        let count = self.count.load(Ordering::Relaxed);
        if n < count {
            self.count.store(n, Ordering::Relaxed);
        }
    }

    /// Reset to the empty state (head parked at slot 0, no valid entries).
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.store(0, Ordering::Relaxed);
        }
        self.head.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}
