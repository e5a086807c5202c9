//! Count rate to equivalent dose rate conversion.

use crate::RES_COUNT_RATE;

/// Tube sensitivity in hundredths of CPM per uSv/h.
///
/// SI8B pancake tube: 694.44 CPM/(uSv/h). Other supported tubes for
/// reference: ZP1320 80.257, ZP1401 149.99, 44-2 18234.86.
pub const TUBE_CPM_PER_USV_X100: u32 = 69_444;

/// Dose output scale: the result is in thousandths of uSv/h.
pub const RES_DOSE: u32 = 1000;

/// Convert a count rate in internal resolution (tenths of CPM) into an
/// equivalent dose rate in thousandths of uSv/h, integer arithmetic only.
///
/// Folds the fractional tube sensitivity into the divisor once:
/// `dose = RES_DOSE * rate / (sensitivity * RES_COUNT_RATE)`, with the
/// sensitivity carried at x100 precision.
#[must_use]
pub fn cpm_to_dose_rate(rate: u32) -> u32 {
    let divisor = TUBE_CPM_PER_USV_X100 * RES_COUNT_RATE / 100;
    RES_DOSE.saturating_mul(rate) / divisor
}
