//! The statistics snapshot and its change detectors.

use opengeiger_math::integer_sqrt;

use crate::ring::{RingBuffer, RingCursor};
use crate::{RES_COUNT_RATE, TICKS_PER_MINUTE};

/// Confidence multiplier of the excursion test.
///
/// The threshold comparison is `diff^2 > 20 * var`, i.e. a sqrt(20) ~ 4.47
/// sigma detector folded into one integer compare. Calibrated value.
const EXCURSION_CONFIDENCE_SQ: u64 = 20;

/// Confidence multiplier of the drift test: k = 2.65 ~ 99.2%, k^2 = 7.
/// Calibrated value.
const DRIFT_CONFIDENCE_SQ: u64 = 7;

/// Derived statistics over one averaging window.
///
/// Recomputed from scratch every display cycle by a single backward
/// traversal; never persisted. All rates are in internal resolution
/// (tenths of CPM), the tolerance in tenths of a percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    /// Sum over the newer half of the window.
    pub sum_new_half: u32,
    /// Sum over the older half of the window.
    pub sum_old_half: u32,
    /// Sum over the newest `short_window` entries.
    pub sum_short: u32,
    /// Sum over the full window.
    pub sum_total: u32,
    /// Long-term count rate estimate over the full window.
    pub rate_long: u32,
    /// Short-term count rate estimate over the short sub-window.
    pub rate_short: u32,
    /// Relative statistical tolerance of the long-term estimate,
    /// `100 / sqrt(N)` percent expressed in tenths of a percent.
    pub reltol: u32,
    /// Short sub-window length the short-term figures refer to.
    pub short_window: usize,
    /// Window length the long-term figures refer to.
    pub window: usize,
}

impl Statistics {
    /// Compute the snapshot over the `window` newest entries.
    ///
    /// One backward traversal from the cursor accumulates the running total
    /// and captures checkpoint sums at `window / 2` (newer half), at
    /// `2 * (window / 2)` (both halves; the older half follows by
    /// subtraction) and at `short_window`.
    ///
    /// Returns `None` when fewer than `short_window` entries are valid:
    /// with a too-small denominator the estimate is statistically
    /// meaningless, so it is reported as unavailable rather than computed.
    #[must_use]
    pub fn compute(
        ring: &RingBuffer,
        cursor: RingCursor,
        window: usize,
        short_window: usize,
    ) -> Option<Self> {
        if short_window == 0 || cursor.count < short_window {
            return None;
        }
        let window = window.clamp(short_window, cursor.count);
        let half = window / 2;

        let mut sum_total: u32 = 0;
        let mut sum_new_half: u32 = 0;
        let mut sum_both_halves: u32 = 0;
        let mut sum_short: u32 = 0;

        let mut pos = cursor.head;
        for taken in 1..=window {
            sum_total += u32::from(ring.entry(pos));
            pos = if pos == 0 { ring.capacity() - 1 } else { pos - 1 };
            if taken == half {
                sum_new_half = sum_total;
            }
            if taken == 2 * half {
                sum_both_halves = sum_total;
            }
            if taken == short_window {
                sum_short = sum_total;
            }
        }
        let sum_old_half = sum_both_halves - sum_new_half;

        // Widened: the scaled sum exceeds u32 once the window grows past
        // roughly 110 full intervals.
        let scale = u64::from(RES_COUNT_RATE * TICKS_PER_MINUTE);
        let rate_long =
            u32::try_from(scale * u64::from(sum_total) / window as u64).unwrap_or(u32::MAX);
        let rate_short = u32::try_from(scale * u64::from(sum_short) / short_window as u64)
            .unwrap_or(u32::MAX);

        // reltol = 100 / sqrt(N) percent in tenths; computed as
        // (100 * 60 * 10) / sqrt(3600 * N) to spend extra accuracy on low
        // counts.
        let reltol = if sum_total == 0 {
            0
        } else {
            let scaled = 3600u32.saturating_mul(sum_total);
            (100 * 60 * RES_COUNT_RATE) / u32::from(integer_sqrt(scaled))
        };

        Some(Self {
            sum_new_half,
            sum_old_half,
            sum_short,
            sum_total,
            rate_long,
            rate_short,
            reltol,
            short_window,
            window,
        })
    }

    /// Short-term excursion test.
    ///
    /// Fires when the newest `short_window` samples deviate from the
    /// long-term estimate by more than ~4.47 standard deviations. The
    /// expected variance of a count measurement over the short window is
    /// `rate_long * scale / short_window`; the squared rate difference is
    /// compared against the confidence multiple of that in one integer
    /// comparison. Good while the long window dominates, blind in the
    /// transition region where both windows see the same fluctuations.
    #[must_use]
    pub fn excursion_test(&self) -> bool {
        let scale = u64::from(RES_COUNT_RATE * TICKS_PER_MINUTE);
        let threshold = u64::from(self.rate_long) * scale / self.short_window as u64;
        let diff = i64::from(self.rate_long) - i64::from(self.rate_short);
        let diff_sq = diff.unsigned_abs().pow(2);
        diff_sq > EXCURSION_CONFIDENCE_SQ * threshold
    }

    /// Half-window drift test.
    ///
    /// The two halves of the window are equal-duration measurements, so the
    /// time term cancels: `k * sqrt(N1 + N2) > |N1 - N2|` becomes
    /// `k^2 * (N1 + N2) > (N1 - N2)^2` in pure integers. Fires on a
    /// sustained trend across the window.
    #[must_use]
    pub fn drift_test(&self) -> bool {
        let threshold =
            DRIFT_CONFIDENCE_SQ * (u64::from(self.sum_old_half) + u64::from(self.sum_new_half));
        let diff = i64::from(self.sum_new_half) - i64::from(self.sum_old_half);
        let diff_sq = diff.unsigned_abs().pow(2);
        diff_sq > threshold
    }

    /// Run both change detectors and, if either fires, shrink the valid
    /// history to the short sub-window so the next selection reacts
    /// immediately instead of averaging over stale samples.
    ///
    /// Returns `true` when a detector fired.
    pub fn apply_change_detectors(&self, ring: &RingBuffer) -> bool {
        let fired = self.excursion_test() || self.drift_test();
        if fired {
            ring.shrink_valid(self.short_window);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_from(samples: &[u16]) -> RingBuffer {
        let ring = RingBuffer::new(samples.len().max(2));
        for &s in samples {
            ring.push(s);
        }
        ring
    }

    #[test]
    fn unavailable_below_short_window() {
        let ring = ring_from(&[5, 5, 5]);
        let stats = Statistics::compute(&ring, ring.cursor(), 8, 4);
        assert!(stats.is_none());
    }

    #[test]
    fn steady_rate_sums_and_estimates() {
        // 8 equal entries of 10 counts, window 8, short window 4.
        let ring = ring_from(&[10; 8]);
        let stats = Statistics::compute(&ring, ring.cursor(), 8, 4);
        let Some(stats) = stats else {
            unreachable!("8 valid entries, short window 4");
        };
        assert_eq!(stats.sum_total, 80);
        assert_eq!(stats.sum_new_half, 40);
        assert_eq!(stats.sum_old_half, 40);
        assert_eq!(stats.sum_short, 40);
        // 80 counts over 8 ticks = 600 CPM = 6000 tenths.
        assert_eq!(stats.rate_long, 6000);
        assert_eq!(stats.rate_short, 6000);
        // 100/sqrt(80) ~ 11.1%; 60000/sqrt(288000) = 60000/536 = 111 tenths.
        assert_eq!(stats.reltol, 111);
    }

    #[test]
    fn saturated_wide_window_does_not_overflow_the_rate() {
        // 200 intervals at the sample ceiling: 600 * sum no longer fits
        // in 32 bits, but the per-interval rate does.
        let ring = ring_from(&[u16::MAX; 200]);
        let stats = Statistics::compute(&ring, ring.cursor(), 200, 8);
        let Some(stats) = stats else {
            unreachable!("200 valid entries, short window 8");
        };
        assert_eq!(stats.rate_long, 600 * u32::from(u16::MAX));
        assert_eq!(stats.rate_short, 600 * u32::from(u16::MAX));
    }

    #[test]
    fn zero_counts_give_zero_rate_and_tolerance() {
        let ring = ring_from(&[0; 8]);
        let stats = Statistics::compute(&ring, ring.cursor(), 8, 4);
        let Some(stats) = stats else {
            unreachable!("8 valid entries, short window 4");
        };
        assert_eq!(stats.rate_long, 0);
        assert_eq!(stats.reltol, 0);
    }

    #[test]
    fn drift_test_balanced_halves_do_not_fire() {
        let ring = ring_from(&[10, 10, 10, 10, 10, 10, 10, 10]);
        let stats = Statistics::compute(&ring, ring.cursor(), 8, 4);
        assert!(matches!(stats, Some(s) if !s.drift_test()));
    }

    #[test]
    fn drift_test_clear_imbalance_fires() {
        // Older half all 1s, newer half all 10s.
        let ring = ring_from(&[1, 1, 1, 1, 10, 10, 10, 10]);
        let stats = Statistics::compute(&ring, ring.cursor(), 8, 4);
        let Some(stats) = stats else {
            unreachable!("8 valid entries");
        };
        assert_eq!(stats.sum_new_half, 40);
        assert_eq!(stats.sum_old_half, 4);
        // (40-4)^2 = 1296 > 7 * 44 = 308
        assert!(stats.drift_test());
    }

    #[test]
    fn excursion_test_steady_rate_does_not_fire() {
        let ring = ring_from(&[10; 80]);
        let stats = Statistics::compute(&ring, ring.cursor(), 80, 8);
        assert!(matches!(stats, Some(s) if !s.excursion_test()));
    }

    #[test]
    fn excursion_test_burst_fires() {
        // 72 quiet intervals then a burst in the newest 8.
        let mut samples = vec![1u16; 72];
        samples.extend_from_slice(&[50; 8]);
        let ring = ring_from(&samples);
        let stats = Statistics::compute(&ring, ring.cursor(), 80, 8);
        let Some(stats) = stats else {
            unreachable!("80 valid entries");
        };
        assert!(stats.excursion_test());
    }

    #[test]
    fn detector_firing_shrinks_history() {
        let ring = ring_from(&[1, 1, 1, 1, 10, 10, 10, 10]);
        let cursor = ring.cursor();
        let Some(stats) = Statistics::compute(&ring, cursor, 8, 4) else {
            unreachable!("8 valid entries");
        };
        assert!(stats.apply_change_detectors(&ring));
        assert_eq!(ring.cursor().count, 4);
    }
}
