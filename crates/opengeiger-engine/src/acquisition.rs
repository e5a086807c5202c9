//! Interrupt-side acquisition state.
//!
//! [`Acquisition`] is the set of cells an interrupt handler is allowed to
//! touch: the pulse counter, the countdown timer, the statistics ring and
//! the sample table. Every method takes `&self` and is lock-free, so the
//! "interrupt" entry points ([`Acquisition::on_pulse`],
//! [`Acquisition::on_tick`]) can be driven from a second thread standing
//! in for the hardware while the main loop reads concurrently.
//!
//! The accumulation gate plays the role of the interrupt-enable bit:
//! while it is off, pulses and ticks fall on the floor, and once a
//! measurement finishes the tick path disables it and never touches
//! shared state again.

use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use opengeiger_session::{MeasurementPort, TableSnapshot};
use opengeiger_stats::{RingBuffer, StatsConfig};
use opengeiger_sync::{
    read_stable, CountdownTimer, InterruptGate, PulseCounter, ReadRetryExhausted,
};

/// What a countdown expiry means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerMode {
    /// Expiry rotates the ring and sample table, then rearms; the
    /// measurement finishes when the sample table is full.
    #[default]
    IntervalRotation,
    /// Expiry finishes the measurement outright (single total duration).
    TotalDuration,
}

/// Construction-time geometry of the acquisition engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Statistics engine configuration.
    pub stats: StatsConfig,
    /// Capacity of the per-measurement sample table, in intervals.
    pub table_capacity: usize,
    /// Countdown expiry policy.
    pub mode: TimerMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stats: StatsConfig::default(),
            table_capacity: 600,
            mode: TimerMode::IntervalRotation,
        }
    }
}

/// Immediate per-pulse hardware reaction (indicator flash, click).
///
/// Invoked from the pulse interrupt path, once per qualifying pulse, so
/// implementations must be cheap and lock-free.
pub trait PulseFeedback: Send + Sync {
    /// One qualifying pulse was counted.
    fn pulse(&self);
}

/// No feedback hardware attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl PulseFeedback for SilentFeedback {
    fn pulse(&self) {}
}

/// Acquisition state shared between interrupt context and the main loop.
pub struct Acquisition {
    gate: InterruptGate,
    pulses: PulseCounter,
    timer: CountdownTimer,
    ring: RingBuffer,
    table: Box<[AtomicU16]>,
    table_len: AtomicUsize,
    elapsed_intervals: AtomicU16,
    total_counts: AtomicU32,
    finished: AtomicBool,
    mode: TimerMode,
    feedback: Box<dyn PulseFeedback>,
}

impl std::fmt::Debug for Acquisition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Acquisition")
            .field("running", &self.gate.is_enabled())
            .field("elapsed_intervals", &self.elapsed_intervals)
            .field("total_counts", &self.total_counts)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Acquisition {
    /// Creates an idle engine; nothing accumulates until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_feedback(config, Box::new(SilentFeedback))
    }

    /// Like [`new`](Self::new), with a pulse feedback collaborator.
    #[must_use]
    pub fn with_feedback(config: &EngineConfig, feedback: Box<dyn PulseFeedback>) -> Self {
        let table = (0..config.table_capacity)
            .map(|_| AtomicU16::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            gate: InterruptGate::new(),
            pulses: PulseCounter::new(),
            timer: CountdownTimer::new(),
            ring: RingBuffer::new(config.stats.capacity),
            table,
            table_len: AtomicUsize::new(0),
            elapsed_intervals: AtomicU16::new(0),
            total_counts: AtomicU32::new(0),
            finished: AtomicBool::new(false),
            mode: config.mode,
            feedback,
        }
    }

    /// Interrupt entry point: one Geiger pulse edge.
    pub fn on_pulse(&self) {
        if !self.gate.is_enabled() {
            return;
        }
        self.pulses.record_pulse();
        self.total_counts.fetch_add(1, Ordering::Relaxed);
        self.feedback.pulse();
    }

    /// Interrupt entry point: one timer tick.
    ///
    /// Decrements the countdown; on expiry either rotates (interval mode)
    /// or finishes (total-duration mode). After finishing, the gate is off
    /// and this method no longer touches shared state.
    pub fn on_tick(&self) {
        if !self.gate.is_enabled() {
            return;
        }
        if !self.timer.tick() {
            return;
        }
        match self.mode {
            TimerMode::IntervalRotation => self.rotate(),
            TimerMode::TotalDuration => self.finish(),
        }
    }

    /// One interval elapsed: move the accumulated pulse count into the
    /// ring and the sample table, then rearm the countdown.
    fn rotate(&self) {
        let count = self.pulses.read_and_reset();
        let sample = u16::try_from(count).unwrap_or(u16::MAX);
        self.ring.push(sample);

        let slot = self.table_len.load(Ordering::Relaxed);
        if let Some(cell) = self.table.get(slot) {
            cell.store(sample, Ordering::Relaxed);
            self.table_len.store(slot + 1, Ordering::Relaxed);
        }
        self.elapsed_intervals.fetch_add(1, Ordering::Relaxed);

        if self.table_len.load(Ordering::Relaxed) == self.table.len() {
            self.finish();
        } else {
            self.timer.rearm();
        }
    }

    fn finish(&self) {
        self.gate.disable();
        self.finished.store(true, Ordering::SeqCst);
        debug!("measurement finished, accumulation gated off");
    }

    /// Arms the timer and opens the gate for a fresh measurement.
    pub fn start(&self, ticks_per_interval: u16) {
        let _ = self.pulses.read_and_reset();
        self.ring.clear();
        self.table_len.store(0, Ordering::Relaxed);
        self.elapsed_intervals.store(0, Ordering::Relaxed);
        self.total_counts.store(0, Ordering::Relaxed);
        self.finished.store(false, Ordering::SeqCst);
        self.timer.arm(ticks_per_interval);
        self.gate.enable();
    }

    /// Closes the gate; the table is tear-free from here on.
    pub fn finalize(&self) {
        self.gate.disable();
    }

    /// Whether a measurement is currently accumulating.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.gate.is_enabled()
    }

    /// Consumes the finished flag (poll-and-clear).
    pub fn take_finished(&self) -> bool {
        self.finished.swap(false, Ordering::SeqCst)
    }

    /// Statistics ring for the display cycle.
    #[must_use]
    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    /// Copies the ring cursor and valid-count out under the gate.
    ///
    /// The traversal that follows runs on the copies with accumulation
    /// re-enabled, so statistics never stall counting.
    #[must_use]
    pub fn stats_cursor(&self) -> opengeiger_stats::RingCursor {
        self.gate.with_disabled(|| self.ring.cursor())
    }

    /// Lifetime pulse count of the running measurement.
    #[must_use]
    pub fn total_counts(&self) -> u32 {
        self.total_counts.load(Ordering::Relaxed)
    }

    /// Completed intervals so far.
    #[must_use]
    pub fn elapsed_intervals(&self) -> u16 {
        self.elapsed_intervals.load(Ordering::Relaxed)
    }

    /// Elapsed measurement duration in timer ticks.
    ///
    /// Combines completed intervals with the progress of the current
    /// countdown. Both figures are read race-free against a concurrently
    /// ticking timer: the countdown through its shadow pair, the interval
    /// count through the double-read protocol.
    pub fn elapsed_ticks(&self) -> Result<u32, ReadRetryExhausted> {
        let period = u32::from(self.timer.period());
        let remaining = u32::from(self.timer.remaining()?);
        let intervals = read_stable(|| self.elapsed_intervals.load(Ordering::Relaxed))?;
        let within = period.saturating_sub(remaining);
        Ok(u32::from(intervals) * period + within)
    }

    /// Copies the sample table out.
    fn snapshot(&self) -> TableSnapshot {
        let len = self.table_len.load(Ordering::Relaxed).min(self.table.len());
        let values = self.table[..len]
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .collect();
        TableSnapshot {
            elapsed_intervals: self.elapsed_intervals(),
            ticks_per_interval: self.timer.period(),
            values,
        }
    }
}

/// Shared handle wiring an [`Acquisition`] into the session machine.
#[derive(Debug, Clone)]
pub struct AcquisitionHandle {
    inner: Arc<Acquisition>,
}

impl AcquisitionHandle {
    /// Wraps a shared acquisition engine.
    #[must_use]
    pub fn new(inner: Arc<Acquisition>) -> Self {
        Self { inner }
    }

    /// The shared engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<Acquisition> {
        &self.inner
    }
}

impl MeasurementPort for AcquisitionHandle {
    fn start(&mut self, ticks_per_interval: u16) {
        self.inner.start(ticks_per_interval);
    }

    fn finalize(&mut self) {
        self.inner.finalize();
    }

    fn table(&self) -> TableSnapshot {
        self.inner.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_engine(table_capacity: usize, mode: TimerMode) -> Acquisition {
        let config = EngineConfig {
            table_capacity,
            mode,
            ..EngineConfig::default()
        };
        Acquisition::new(&config)
    }

    fn run_interval(acq: &Acquisition, pulses: u32, ticks: u16) {
        for _ in 0..pulses {
            acq.on_pulse();
        }
        for _ in 0..ticks {
            acq.on_tick();
        }
    }

    #[test]
    fn pulses_are_ignored_before_start() {
        let acq = small_engine(4, TimerMode::IntervalRotation);
        acq.on_pulse();
        acq.on_tick();
        assert_eq!(acq.total_counts(), 0);
    }

    #[test]
    fn each_expiry_rotates_one_sample_into_ring_and_table() {
        let acq = small_engine(4, TimerMode::IntervalRotation);
        acq.start(3);
        run_interval(&acq, 5, 3);
        run_interval(&acq, 7, 3);

        assert_eq!(acq.elapsed_intervals(), 2);
        assert_eq!(acq.total_counts(), 12);
        let cursor = acq.ring().cursor();
        assert_eq!(cursor.count, 2);
        assert_eq!(acq.ring().entry(cursor.head), 7);
    }

    #[test]
    fn measurement_finishes_when_table_fills() {
        let acq = small_engine(3, TimerMode::IntervalRotation);
        acq.start(2);
        for i in 0..3 {
            run_interval(&acq, i + 1, 2);
        }
        assert!(acq.take_finished());
        assert!(!acq.take_finished(), "finished flag is consume-once");

        // Gate is off: further pulses and ticks change nothing.
        run_interval(&acq, 10, 2);
        assert_eq!(acq.total_counts(), 6);
        assert_eq!(acq.elapsed_intervals(), 3);
    }

    #[test]
    fn total_duration_mode_finishes_without_rotation() {
        let acq = small_engine(8, TimerMode::TotalDuration);
        acq.start(5);
        run_interval(&acq, 9, 5);
        assert!(acq.take_finished());
        assert_eq!(acq.elapsed_intervals(), 0);
        // The pulse counter still holds the accumulated total.
        assert_eq!(acq.total_counts(), 9);
    }

    #[test]
    fn elapsed_ticks_tracks_partial_intervals() {
        let acq = small_engine(8, TimerMode::IntervalRotation);
        acq.start(10);
        run_interval(&acq, 0, 10); // one full interval
        acq.on_tick();
        acq.on_tick();
        acq.on_tick(); // 3 ticks into the second
        assert_eq!(acq.elapsed_ticks().unwrap(), 13);
    }

    #[test]
    fn oversized_interval_count_saturates_the_sample() {
        let acq = small_engine(4, TimerMode::IntervalRotation);
        acq.start(1);
        for _ in 0..(u32::from(u16::MAX) + 10) {
            acq.on_pulse();
        }
        acq.on_tick();
        let cursor = acq.ring().cursor();
        assert_eq!(acq.ring().entry(cursor.head), u16::MAX);
    }

    #[test]
    fn handle_snapshot_matches_rotated_samples() {
        let acq = Arc::new(small_engine(4, TimerMode::IntervalRotation));
        let mut handle = AcquisitionHandle::new(Arc::clone(&acq));
        handle.start(2);
        run_interval(&acq, 3, 2);
        run_interval(&acq, 8, 2);

        let table = handle.table();
        assert_eq!(table.elapsed_intervals, 2);
        assert_eq!(table.ticks_per_interval, 2);
        assert_eq!(table.values, vec![3, 8]);
    }

    #[test]
    fn feedback_fires_once_per_counted_pulse() {
        #[derive(Default)]
        struct CountingFeedback(AtomicU32);
        impl PulseFeedback for CountingFeedback {
            fn pulse(&self) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let feedback = Arc::new(CountingFeedback::default());
        struct Shared(Arc<CountingFeedback>);
        impl PulseFeedback for Shared {
            fn pulse(&self) {
                self.0.pulse();
            }
        }

        let config = EngineConfig {
            table_capacity: 4,
            ..EngineConfig::default()
        };
        let acq = Acquisition::with_feedback(&config, Box::new(Shared(Arc::clone(&feedback))));
        acq.on_pulse(); // gated off, no feedback
        acq.start(2);
        acq.on_pulse();
        acq.on_pulse();
        assert_eq!(feedback.0.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn start_clears_previous_measurement_state() {
        let acq = small_engine(2, TimerMode::IntervalRotation);
        acq.start(1);
        run_interval(&acq, 4, 1);
        run_interval(&acq, 4, 1);
        assert!(acq.take_finished());

        acq.start(1);
        assert_eq!(acq.total_counts(), 0);
        assert_eq!(acq.elapsed_intervals(), 0);
        assert_eq!(acq.ring().cursor().count, 0);
    }
}
