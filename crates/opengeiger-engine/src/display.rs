//! Display cycle: ring history in, two readout lines out.
//!
//! Line 0 carries the count rate in CPM, a range marker (`>` while the
//! short high-rate window is active) and an activity spinner advanced by
//! the lifetime pulse count. Line 1 carries the relative statistical
//! tolerance and the equivalent dose rate for the configured tube.
//!
//! All figures come out of the integer statistics pipeline; the only
//! formatting primitive is fixed-point rendering, so the display layer
//! never touches floating point either.

use tracing::{debug, trace};

use opengeiger_math::format_fixed_point;
use opengeiger_stats::{cpm_to_dose_rate, RangeSelector, RangeState, StatsConfig, Statistics};

use crate::acquisition::Acquisition;
use crate::error::EngineResult;

/// Activity spinner frames, advanced one step per pulse.
const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Fire-and-forget character display.
///
/// Mirrors a small character LCD: the core writes lines and never reads
/// anything back.
pub trait DisplayPort {
    /// Renders `text` starting at (`row`, `col`).
    fn render_line(&mut self, row: usize, col: usize, text: &str);
}

/// Per-display-cycle state: the autoranging selector and the previous
/// rate estimate it feeds on.
#[derive(Debug)]
pub struct DisplayController {
    config: StatsConfig,
    range: RangeSelector,
    last_rate: u32,
}

impl DisplayController {
    /// Creates a controller in the low-rate range with no history.
    #[must_use]
    pub fn new(config: StatsConfig) -> Self {
        let range = RangeSelector::new(&config);
        Self {
            config,
            range,
            last_rate: 0,
        }
    }

    /// Runs one display cycle against the live acquisition state.
    ///
    /// # Errors
    ///
    /// Fails when the measurement progress never reads consistently
    /// (the tick source broke its once-per-tick contract) or a figure
    /// exceeds its display field.
    pub fn update<D: DisplayPort>(&mut self, acq: &Acquisition, out: &mut D) -> EngineResult<()> {
        let elapsed_ticks = acq.elapsed_ticks()?;
        let cursor = acq.stats_cursor();
        trace!(elapsed_ticks, valid = cursor.count, "display cycle");
        let selection = self.range.select_window(self.last_rate, cursor.count);
        if let Some(switch) = selection.switched {
            debug!(?switch, window = selection.window, "averaging range switched");
        }

        let Some(stats) = Statistics::compute(
            acq.ring(),
            cursor,
            selection.window,
            self.config.short_window,
        ) else {
            // Too little history for a meaningful estimate.
            out.render_line(0, 0, "    --- cpm    ");
            out.render_line(1, 0, "               ");
            return Ok(());
        };

        if stats.apply_change_detectors(acq.ring()) {
            debug!(
                rate_long = stats.rate_long,
                rate_short = stats.rate_short,
                "rate change detected, history shrunk"
            );
        }
        self.last_rate = stats.rate_long;

        let rate = format_fixed_point(stats.rate_long.min(999_999), 1, 6)?;
        let marker = match self.range.state() {
            RangeState::HighRate => '>',
            RangeState::LowRate => ' ',
        };
        let spinner = SPINNER[acq.total_counts() as usize % SPINNER.len()];
        out.render_line(0, 0, &format!("{rate} cpm {marker}{spinner}"));

        let tolerance = format_fixed_point(stats.reltol.min(999), 1, 3)?;
        let dose = format_fixed_point(cpm_to_dose_rate(stats.rate_long).min(99_999), 3, 5)?;
        out.render_line(1, 0, &format!("\u{b1}{tolerance}% {dose}uS/h"));
        Ok(())
    }
}
