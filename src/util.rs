//! Small numeric helpers shared across the alignment core.

#[cfg(test)]
mod tests;

use std::cmp::{max, min};

/// Sample type stored in a [`crate::plane::Plane`].
///
/// The spec fixes the depth at build time; this crate builds for 16-bit
/// samples (`MAX_VAL = 2^16 - 1`), which is large enough that the
/// `width * height * MAX_VAL` worst case for [`crate::plane::Plane::diff`]
/// still fits in a `u64` accumulator.
pub type Sample = u16;

/// Maximum representable sample value for [`Sample`].
pub const MAX_VAL: u32 = Sample::MAX as u32;

/// Rounds half-away-from-zero, i.e. `2.5 -> 3`, `-2.5 -> -3`.
///
/// The hierarchical search (spec.md §4.3 step 4c) requires this exact
/// rounding rule; the standard library's `f64::round` already rounds
/// half-away-from-zero, but `round_ties_even`-style behavior must never be
/// substituted here or offset rounding for even candidate grids will
/// disagree with the reference algorithm.
#[must_use]
pub fn round_half_away_from_zero(x: f64) -> i64 {
    if x < 0.0 {
        (x - 0.5).ceil() as i64
    } else {
        (x + 0.5).floor() as i64
    }
}

/// Finds the median of three orderable values.
#[must_use]
pub fn median<T: Ord + Copy>(a: T, b: T, c: T) -> T {
    max(min(a, b), min(max(a, b), c))
}
