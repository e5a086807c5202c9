//! Fixed-point decimal rendering.
//!
//! Values in the counting core are integers scaled by an implied power of ten
//! (for example count rate in tenths of CPM). For display they are rendered
//! with a literal decimal point inserted at the implied position, leading
//! spaces for insignificant digits and at most six digit characters - the
//! width of one number field on a 16-character panel line.

use crate::{MathError, MathResult};

/// Decade table for digit extraction without division.
const BASE_10: [u32; 5] = [100_000, 10_000, 1_000, 100, 10];

/// Number of entries in [`BASE_10`] plus the ones digit.
const MAX_DIGITS: u8 = 6;

/// Render `value` as a fixed-point decimal string.
///
/// `decimal_pos` is the position of the decimal point counted from the right:
/// `0` renders no point, `1` renders one digit behind the point, and so on.
/// `digit_count` is the exact number of digit characters emitted (1..=6).
/// Digits above the most significant nonzero digit are emitted as spaces,
/// except for zeros that sit at or behind the decimal point, which are
/// emitted as `'0'`. The ones digit is always emitted.
///
/// Examples of the padding rules with `digit_count = 3`:
///
/// ```
/// use opengeiger_math::format_fixed_point;
///
/// assert_eq!(format_fixed_point(905, 1, 3).as_deref(), Ok("90.5"));
/// assert_eq!(format_fixed_point(9, 1, 3).as_deref(), Ok(" 0.9"));
/// assert_eq!(format_fixed_point(9, 0, 3).as_deref(), Ok("  9"));
/// assert_eq!(format_fixed_point(9, 2, 3).as_deref(), Ok("0.09"));
/// ```
///
/// # Errors
///
/// Returns [`MathError`] when `digit_count` is outside `1..=6`, when
/// `decimal_pos` exceeds `digit_count`, or when `value` has more than
/// `digit_count` significant digits.
pub fn format_fixed_point(value: u32, decimal_pos: u8, digit_count: u8) -> MathResult<String> {
    if digit_count == 0 || digit_count > MAX_DIGITS {
        return Err(MathError::DigitCountOutOfRange(digit_count));
    }
    if decimal_pos > digit_count {
        return Err(MathError::DecimalPosOutOfRange {
            pos: decimal_pos,
            digits: digit_count,
        });
    }
    if value >= 10u32.pow(u32::from(digit_count)) {
        return Err(MathError::ValueTooWide {
            value,
            digits: digit_count,
        });
    }

    let digits = MAX_DIGITS - 1; // entries in BASE_10
    let mut rest = value;
    let mut out = String::with_capacity(usize::from(MAX_DIGITS) + 1);
    let mut significant = false;

    for i in (digits + 1 - digit_count)..digits {
        let decade = BASE_10[usize::from(i)];
        let mut num: u8 = 0;
        while rest >= decade {
            rest -= decade;
            num += 1;
        }
        if num > 0 {
            significant = true;
        }
        // The point lands in front of the digit `decimal_pos` places from the right.
        if decimal_pos > 1 && i + decimal_pos == digits + 1 {
            out.push('.');
        }
        if significant {
            out.push(char::from(b'0' + num));
        } else if i + decimal_pos < digits {
            out.push(' ');
        } else {
            out.push('0');
        }
    }
    if decimal_pos == 1 {
        out.push('.');
    }
    debug_assert!(rest <= 9);
    out.push(char::from(b'0' + rest as u8));
    Ok(out)
}
