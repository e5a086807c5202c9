//! Property-based tests for the ring buffer and the statistics engine.

use opengeiger_stats::{RES_COUNT_RATE, RingBuffer, Statistics, StatsConfig, RangeSelector};
use proptest::prelude::*;

proptest! {
    #[test]
    fn ring_keeps_exactly_the_newest_capacity_entries(
        capacity in 2usize..64,
        extra in 1usize..50,
        seed in any::<u16>(),
    ) {
        let ring = RingBuffer::new(capacity);
        let total = capacity + extra;
        let values: Vec<u16> = (0..total)
            .map(|i| seed.wrapping_add(i as u16))
            .collect();
        for &v in &values {
            ring.push(v);
        }

        let cursor = ring.cursor();
        prop_assert_eq!(cursor.count, capacity);

        // Backward traversal from the head yields the last `capacity`
        // pushed values in reverse order.
        let mut pos = cursor.head;
        for expected in values.iter().rev().take(capacity) {
            prop_assert_eq!(ring.entry(pos), *expected);
            pos = if pos == 0 { capacity - 1 } else { pos - 1 };
        }
    }

    #[test]
    fn hysteresis_band_never_flaps(
        in_band_rates in prop::collection::vec(701u32..1049, 1..100),
    ) {
        let config = StatsConfig::default();
        let mut sel = RangeSelector::new(&config);
        // Rates strictly inside the band must never switch range, whatever
        // order they arrive in.
        for cpm in in_band_rates {
            let selection = sel.select_window(cpm * RES_COUNT_RATE, 80);
            prop_assert_eq!(selection.switched, None);
        }
    }

    #[test]
    fn drift_never_fires_on_mirrored_halves(
        half in prop::collection::vec(0u16..1000, 1..40),
    ) {
        // Build a window whose halves are element-wise identical.
        let mut samples = half.clone();
        samples.extend_from_slice(&half);
        let ring = RingBuffer::new(samples.len());
        for &s in &samples {
            ring.push(s);
        }
        let window = samples.len();
        let short = 2.min(window);
        if let Some(stats) = Statistics::compute(&ring, ring.cursor(), window, short) {
            prop_assert_eq!(stats.sum_new_half, stats.sum_old_half);
            prop_assert!(!stats.drift_test());
        }
    }

    #[test]
    fn snapshot_sums_are_consistent(
        samples in prop::collection::vec(0u16..500, 8..80),
        short in 2usize..8,
    ) {
        let short = short - short % 2; // even, 2..=6
        let ring = RingBuffer::new(samples.len());
        for &s in &samples {
            ring.push(s);
        }
        let window = samples.len();
        let Some(stats) = Statistics::compute(&ring, ring.cursor(), window, short) else {
            return Err(TestCaseError::fail("enough entries but compute refused"));
        };

        let total: u32 = samples.iter().map(|&s| u32::from(s)).sum();
        prop_assert_eq!(stats.sum_total, total);
        prop_assert!(stats.sum_short <= stats.sum_total);
        prop_assert!(stats.sum_new_half + stats.sum_old_half <= stats.sum_total);

        // Rate definition: scale * sum / window.
        prop_assert_eq!(stats.rate_long, 600 * total / window as u32);
    }
}
