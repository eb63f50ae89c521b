//! The pairwise comparator facade (spec.md §4.4).
//!
//! [`Comparator`] turns a method/axis constraint and the two planes'
//! dimensions into the initial search rectangle, then escalates the
//! hierarchical search's level until the result satisfies a quality
//! threshold (or the level budget is exhausted).


use crate::{
    cache::DiffCache,
    plane::{DiffVariant, Plane, overlap_rect},
    search::best_round_sub,
};

/// Which axes of translation a search is allowed to explore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignMethod {
    /// Both axes.
    Free,
    /// Horizontal only.
    Hor,
    /// Vertical only.
    Ver,
}

/// An integer translation, its diff error, and the fraction of `img1`'s
/// pixels that overlap `img2` at that offset (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageOffset {
    pub x: i64,
    pub y: i64,
    pub error: f64,
    pub overlap: f64,
}

/// Drives [`best_round_sub`] with method-specific movement constraints,
/// escalating the search level until the error drops at or below
/// `max_difference` or `max_level` is reached.
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    pub method: AlignMethod,
    /// Fraction of the full search window to use, in `[0, 1]`. `1.0` is
    /// unconstrained; smaller values shrink the initial rectangle.
    pub movement: f64,
    pub start_level: i64,
    pub max_level: i64,
    pub max_difference: f64,
    pub variant: DiffVariant,
}

impl Comparator {
    #[must_use]
    pub fn new(method: AlignMethod) -> Self {
        Self {
            method,
            movement: 1.0,
            start_level: 0,
            max_level: 4,
            max_difference: 0.0,
            variant: DiffVariant::Plain,
        }
    }

    /// Finds the best translation aligning `img2` onto `img1`.
    pub fn find_offset(&self, img1: &Plane, img2: &Plane) -> ImageOffset {
        let move_x = if self.method == AlignMethod::Ver { 0.0 } else { self.movement };
        let move_y = if self.method == AlignMethod::Hor { 0.0 } else { self.movement };

        // Truncates toward zero, matching the original's implicit double->int
        // conversion (GradientComparator.cpp), not half-away-from-zero
        // rounding: spec.md §4.4 gives this arithmetic with no rounding step
        // of its own, unlike §4.3 step 4c's explicit rounding rule.
        let left = ((1 - img2.width() as i64) as f64 * move_x) as i64;
        let right = ((img1.width() as i64 - 1) as f64 * move_x) as i64;
        let top = ((1 - img2.height() as i64) as f64 * move_y) as i64;
        let bottom = ((img1.height() as i64 - 1) as f64 * move_y) as i64;

        let mut cache = DiffCache::new();
        let mut level = self.start_level;
        let mut result = best_round_sub(img1, img2, level, left, right, top, bottom, &mut cache, self.variant);

        while result.error > self.max_difference && level < self.max_level {
            level += 1;
            result = best_round_sub(img1, img2, level, left, right, top, bottom, &mut cache, self.variant);
        }

        let overlap = overlap_rect(
            img1.width(),
            img1.height(),
            img2.width(),
            img2.height(),
            result.offset.0,
            result.offset.1,
        )
        .map_or(0.0, |o| (o.width * o.height) as f64 / (img1.width() * img1.height()) as f64);

        ImageOffset {
            x: result.offset.0,
            y: result.offset.1,
            error: result.error,
            overlap,
        }
    }
}
