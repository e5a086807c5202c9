//! Statistics engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// Configuration for the ring buffer and the adaptive window selection.
///
/// The defaults are the calibrated values for an SI8B-class tube at a 1 s
/// interval tick; they are not arbitrary and the validation rules encode the
/// assumptions the traversal math relies on (even windows, short window
/// inside every selectable window, non-overlapping hysteresis band).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Ring buffer capacity in intervals; the low-rate averaging window.
    pub capacity: usize,
    /// Short sub-window length for the excursion test, in intervals.
    pub short_window: usize,
    /// Averaging window in the high-rate range, in intervals.
    pub high_rate_window: usize,
    /// Rate (whole CPM) above which the range switches LOW -> HIGH.
    pub low_to_high_cpm: u32,
    /// Rate (whole CPM) below which the range switches HIGH -> LOW.
    ///
    /// Strictly lower than [`low_to_high_cpm`](Self::low_to_high_cpm); the
    /// gap is the hysteresis band that keeps the range from flapping.
    pub high_to_low_cpm: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            capacity: 80,
            short_window: 8,
            high_rate_window: 30,
            low_to_high_cpm: 1050,
            high_to_low_cpm: 700,
        }
    }
}

impl StatsConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidConfiguration`] if any value breaks the
    /// assumptions of the traversal or the autoranging hysteresis.
    pub fn validate(&self) -> StatsResult<()> {
        if self.capacity == 0 || self.capacity % 2 != 0 {
            return Err(StatsError::invalid_configuration(
                "capacity must be a positive even number of intervals",
            ));
        }
        if self.short_window == 0 || self.short_window % 2 != 0 {
            return Err(StatsError::invalid_configuration(
                "short_window must be a positive even number of intervals",
            ));
        }
        if self.short_window > self.high_rate_window {
            return Err(StatsError::invalid_configuration(
                "short_window must not exceed high_rate_window",
            ));
        }
        if self.high_rate_window > self.capacity {
            return Err(StatsError::invalid_configuration(
                "high_rate_window must not exceed capacity",
            ));
        }
        if self.high_to_low_cpm >= self.low_to_high_cpm {
            return Err(StatsError::invalid_configuration(
                "hysteresis thresholds must satisfy high_to_low < low_to_high",
            ));
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> StatsConfigBuilder {
        StatsConfigBuilder::default()
    }
}

/// Builder for [`StatsConfig`].
#[derive(Debug, Default)]
pub struct StatsConfigBuilder {
    config: StatsConfig,
}

impl StatsConfigBuilder {
    /// Set the ring buffer capacity in intervals.
    #[must_use]
    pub fn capacity(mut self, intervals: usize) -> Self {
        self.config.capacity = intervals;
        self
    }

    /// Set the short sub-window length in intervals.
    #[must_use]
    pub fn short_window(mut self, intervals: usize) -> Self {
        self.config.short_window = intervals;
        self
    }

    /// Set the high-rate averaging window in intervals.
    #[must_use]
    pub fn high_rate_window(mut self, intervals: usize) -> Self {
        self.config.high_rate_window = intervals;
        self
    }

    /// Set the LOW -> HIGH switching threshold in whole CPM.
    #[must_use]
    pub fn low_to_high_cpm(mut self, cpm: u32) -> Self {
        self.config.low_to_high_cpm = cpm;
        self
    }

    /// Set the HIGH -> LOW switching threshold in whole CPM.
    #[must_use]
    pub fn high_to_low_cpm(mut self, cpm: u32) -> Self {
        self.config.high_to_low_cpm = cpm;
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidConfiguration`] if the assembled
    /// configuration fails [`StatsConfig::validate`].
    pub fn build(self) -> StatsResult<StatsConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
