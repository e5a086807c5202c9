//! Bit-exact integer square root.

/// Compute `floor(sqrt(q))` for the full 32-bit domain.
///
/// Non-restoring bit-trial algorithm: starting from the most significant bit
/// of the 16-bit result, keep a candidate `r` and accept or reject each bit by
/// testing `r * r` against `q`. Exactly 16 trial steps plus one correction,
/// no division, no floating point.
///
/// The result is exact: `integer_sqrt(n * n) == n` for every `n: u16`, and
/// perfect squares follow `floor` semantics (`integer_sqrt(n * n - 1) == n - 1`
/// for `n > 0`).
#[inline]
#[must_use]
pub fn integer_sqrt(q: u32) -> u16 {
    let mut r: u16 = 1 << 15;
    let mut mask: u16 = 1 << 15;
    for _ in 0..15 {
        mask >>= 1;
        let sq = u32::from(r) * u32::from(r);
        if q < sq {
            r -= mask;
        } else {
            r += mask;
        }
    }
    if q < u32::from(r) * u32::from(r) {
        r -= 1;
    }
    r
}
