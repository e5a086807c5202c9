//! Firmware personality description.
//!
//! A personality names the measurement flavor the device runs and the
//! parameters the host must account for when talking to it: parameter
//! block size, sample table geometry, and the per-value bit width. Hosts
//! use this to size buffers and validate commands before sending them.

/// Static description of the firmware personality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Personality {
    /// Human-readable personality name.
    pub name: &'static str,
    /// Personality version, bumped on wire-visible changes.
    pub version: u8,
    /// Size in bytes of the `MEASURE` parameter block.
    pub param_size: usize,
    /// Number of entries the sample table can hold.
    pub table_capacity: usize,
    /// Bits per sample table value.
    pub bits_per_value: u8,
}

impl Personality {
    /// The Geiger time-series personality: one 16-bit pulse count per
    /// timer interval, measurement parameterized by ticks per interval.
    #[must_use]
    pub fn geiger_time_series(table_capacity: usize) -> Self {
        Self {
            name: "geiger-time-series",
            version: 1,
            param_size: 2,
            table_capacity,
            bits_per_value: 16,
        }
    }
}
