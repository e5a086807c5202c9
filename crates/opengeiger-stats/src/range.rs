//! Autoranging window selection with hysteresis.

use tracing::debug;

use crate::RES_COUNT_RATE;
use crate::config::StatsConfig;

/// Current averaging range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeState {
    /// Low count rate: average over the full buffer for accuracy.
    #[default]
    LowRate,
    /// High count rate: short window, more responsive, noisier.
    HighRate,
}

/// A range transition that just occurred, for the display arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSwitch {
    /// LOW -> HIGH: the window just shortened.
    Up,
    /// HIGH -> LOW: the window just lengthened.
    Down,
}

/// Result of one window selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSelection {
    /// Number of entries to average over, capped by the valid history.
    pub window: usize,
    /// Set when this selection crossed a hysteresis threshold.
    pub switched: Option<RangeSwitch>,
}

/// Autoranging state machine.
///
/// Longer averaging gives better accuracy; at high rates the statistics are
/// good enough sooner and a short window reacts faster. The two switching
/// thresholds deliberately do not meet: a rate estimate wandering inside the
/// hysteresis band keeps the current range, so the window length cannot flap
/// on every sample at a single shared boundary.
#[derive(Debug)]
pub struct RangeSelector {
    state: RangeState,
    /// LOW -> HIGH threshold, internal resolution (tenths of CPM).
    rate_low_high: u32,
    /// HIGH -> LOW threshold, internal resolution (tenths of CPM).
    rate_high_low: u32,
    low_rate_window: usize,
    high_rate_window: usize,
}

impl RangeSelector {
    /// Create a selector in the low-rate range.
    #[must_use]
    pub fn new(config: &StatsConfig) -> Self {
        Self {
            state: RangeState::LowRate,
            rate_low_high: config.low_to_high_cpm * RES_COUNT_RATE,
            rate_high_low: config.high_to_low_cpm * RES_COUNT_RATE,
            low_rate_window: config.capacity,
            high_rate_window: config.high_rate_window,
        }
    }

    /// Current range.
    #[must_use]
    pub fn state(&self) -> RangeState {
        self.state
    }

    /// Select the averaging window for the given rate estimate.
    ///
    /// `rate_estimate` is in internal resolution (tenths of CPM); `valid`
    /// is the number of valid ring entries, which caps the returned window
    /// (important at startup, before the buffer has filled).
    pub fn select_window(&mut self, rate_estimate: u32, valid: usize) -> WindowSelection {
        let (window, switched) = match self.state {
            RangeState::LowRate => {
                if rate_estimate > self.rate_low_high {
                    self.state = RangeState::HighRate;
                    debug!(rate = rate_estimate, "range LOW -> HIGH");
                    (self.high_rate_window, Some(RangeSwitch::Up))
                } else {
                    (self.low_rate_window, None)
                }
            }
            RangeState::HighRate => {
                if rate_estimate < self.rate_high_low {
                    self.state = RangeState::LowRate;
                    debug!(rate = rate_estimate, "range HIGH -> LOW");
                    (self.low_rate_window, Some(RangeSwitch::Down))
                } else {
                    (self.high_rate_window, None)
                }
            }
        };
        WindowSelection {
            window: window.min(valid),
            switched,
        }
    }
}
