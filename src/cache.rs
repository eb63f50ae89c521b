//! Per-search memoization of previously computed diffs (spec.md §4.2).

#[cfg(test)]
mod tests;

use std::collections::HashMap;

/// A single memoized diff result: the precision it was computed at, and the
/// value itself.
#[derive(Debug, Clone, Copy)]
struct Cached {
    diff: f64,
    precision: u32,
}

/// Process-local map from `(x, y)` to the finest-precision diff seen for
/// that coordinate during one top-level alignment call.
///
/// Owned exclusively by the search that creates it; never shared across
/// top-level [`crate::search::best_round_sub`] calls. A lookup at
/// `(x, y, precision)` succeeds whenever the cached entry's precision is at
/// least as accurate (numerically `<=`) as requested.
#[derive(Debug, Default)]
pub struct DiffCache {
    entries: HashMap<(i64, i64), Cached>,
}

impl DiffCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached diff at `(x, y)` if an entry exists whose stored
    /// precision is `<= precision`, otherwise `None`.
    #[must_use]
    pub fn lookup(&self, x: i64, y: i64, precision: u32) -> Option<f64> {
        self.entries
            .get(&(x, y))
            .filter(|c| c.precision <= precision)
            .map(|c| c.diff)
    }

    /// Records `diff` for `(x, y)` at `precision`, keeping whichever entry
    /// (new or existing) has the smaller (more accurate) precision.
    pub fn store(&mut self, x: i64, y: i64, diff: f64, precision: u32) {
        self.entries
            .entry((x, y))
            .and_modify(|c| {
                if precision < c.precision {
                    c.diff = diff;
                    c.precision = precision;
                }
            })
            .or_insert(Cached { diff, precision });
    }
}
