//! # opengeiger-stats
//!
//! Ring-buffer time series and the adaptive count-rate statistics engine.
//!
//! Once per interval the acquisition layer pushes the interval's pulse count
//! into a fixed-capacity [`RingBuffer`]. Each display cycle the engine:
//!
//! 1. selects an averaging window from the current rate estimate
//!    ([`RangeSelector`], autoranging with hysteresis),
//! 2. traverses the newest `window` entries once, capturing checkpoint sums
//!    ([`Statistics::compute`]),
//! 3. derives long- and short-term rate estimates and the Poisson relative
//!    tolerance, all in integer arithmetic at a fixed internal resolution,
//! 4. runs two change detectors - a short-term [excursion
//!    test](Statistics::excursion_test) and a half-window [drift
//!    test](Statistics::drift_test) - and, when either fires, shrinks the
//!    valid history so the next cycle reacts immediately instead of being
//!    smoothed by stale samples.
//!
//! The statistical constants are calibrated, not derived; see the constants
//! on [`Statistics`] and [`StatsConfig`] before "simplifying" any of them.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod dose;
pub mod error;
pub mod range;
pub mod ring;
pub mod snapshot;

pub use config::{StatsConfig, StatsConfigBuilder};
pub use dose::cpm_to_dose_rate;
pub use error::{StatsError, StatsResult};
pub use range::{RangeSelector, RangeState, WindowSelection};
pub use ring::{RingBuffer, RingCursor};
pub use snapshot::Statistics;

/// Internal resolution of all count-rate values: tenths of CPM.
pub const RES_COUNT_RATE: u32 = 10;

/// Ticks per minute at the 1 Hz interval tick.
pub const TICKS_PER_MINUTE: u32 = 60;
