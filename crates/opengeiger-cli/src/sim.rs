//! Simulated radiation source and hardware interrupt thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::trace;

use opengeiger_engine::{Acquisition, PulseFeedback};

/// Feedback stand-in for the indicator LED: one trace event per pulse.
#[derive(Debug, Default)]
pub struct ClickFeedback;

impl PulseFeedback for ClickFeedback {
    fn pulse(&self) {
        trace!("click");
    }
}

/// Micro-probability denominator for the per-tick pulse draw.
const MICRO: u64 = 1_000_000;

/// Pseudo-random pulse source with a fixed mean rate.
///
/// Each tick draws a pulse count whose expectation is
/// `rate_cpm / (60 * ticks_per_interval)`, one interval being one
/// simulated second. Whole expected pulses are emitted deterministically,
/// the fractional remainder as a Bernoulli draw from a 64-bit LCG, which
/// is plenty for exercising the counting path.
#[derive(Debug)]
pub struct RadiationSource {
    state: u64,
    micro_pulses_per_tick: u64,
}

impl RadiationSource {
    /// Creates a source emitting `rate_cpm` on average.
    #[must_use]
    pub fn new(rate_cpm: u32, ticks_per_interval: u16, seed: u64) -> Self {
        let ticks_per_minute = 60 * u64::from(ticks_per_interval.max(1));
        Self {
            state: seed,
            micro_pulses_per_tick: u64::from(rate_cpm) * MICRO / ticks_per_minute,
        }
    }

    fn next_raw(&mut self) -> u64 {
        // Knuth MMIX LCG constants.
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state >> 11
    }

    /// Number of pulses arriving within one tick.
    pub fn pulses_this_tick(&mut self) -> u32 {
        let whole = self.micro_pulses_per_tick / MICRO;
        let fraction = self.micro_pulses_per_tick % MICRO;
        let extra = u64::from(self.next_raw() % MICRO < fraction);
        u32::try_from(whole + extra).unwrap_or(u32::MAX)
    }
}

/// Spawns the thread standing in for the pulse and timer interrupts.
///
/// While no measurement is running the gate drops everything, so the
/// thread just idles; once the session arms the engine, each loop pass is
/// one timer tick with its pulses delivered first, the order the hardware
/// produces them in.
pub fn spawn_hardware(
    acquisition: Arc<Acquisition>,
    stop: Arc<AtomicBool>,
    mut source: RadiationSource,
    tick: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while !stop.load(Ordering::SeqCst) {
            if !acquisition.is_running() {
                thread::sleep(Duration::from_millis(1));
                continue;
            }
            for _ in 0..source.pulses_this_tick() {
                acquisition.on_pulse();
            }
            acquisition.on_tick();
            thread::sleep(tick);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_rate_is_close_to_requested() {
        // 600 CPM at 10 ticks/s = 1 pulse per tick on average.
        let mut source = RadiationSource::new(600, 10, 42);
        let total: u32 = (0..10_000).map(|_| source.pulses_this_tick()).sum();
        assert!((9_000..=11_000).contains(&total), "total was {total}");
    }

    #[test]
    fn high_rates_emit_multiple_pulses_per_tick() {
        // 6000 CPM at 10 ticks/s = 10 pulses per tick.
        let mut source = RadiationSource::new(6_000, 10, 42);
        assert_eq!(source.pulses_this_tick(), 10);
    }

    #[test]
    fn identical_seeds_reproduce_the_sequence() {
        let mut a = RadiationSource::new(90, 10, 7);
        let mut b = RadiationSource::new(90, 10, 7);
        for _ in 0..100 {
            assert_eq!(a.pulses_this_tick(), b.pulses_this_tick());
        }
    }
}
