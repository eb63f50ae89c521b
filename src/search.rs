//! The hierarchical translation search (spec.md §4.3).
//!
//! Given two planes and a bounding offset rectangle, [`best_round_sub`]
//! recursively subdivides the rectangle to locate the minimum-diff
//! translation, dispatching each level's diff candidates to a [`rayon`]
//! parallel batch before serially recursing into the single best candidate.


use rayon::prelude::*;

use crate::{
    cache::DiffCache,
    plane::{DiffVariant, Plane, overlap_rect},
    util::round_half_away_from_zero,
};

/// The result of one [`best_round_sub`] call: the best integer offset found
/// and its diff value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeResult {
    pub offset: (i64, i64),
    pub error: f64,
}

/// One search candidate considered at a given subdivision level.
struct ImgComp {
    h_middle: i64,
    v_middle: i64,
    level: i64,
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
    precision: f64,
    diff: Option<f64>,
}

impl ImgComp {
    fn leaf(h_middle: i64, v_middle: i64) -> Self {
        Self {
            h_middle,
            v_middle,
            level: 0,
            left: 0,
            right: 0,
            top: 0,
            bottom: 0,
            precision: 1.0,
            diff: None,
        }
    }

    fn overlap_count(&self, img1: &Plane, img2: &Plane) -> usize {
        overlap_rect(
            img1.width(),
            img1.height(),
            img2.width(),
            img2.height(),
            self.h_middle,
            self.v_middle,
        )
        .map_or(0, |o| o.width * o.height)
    }
}

/// Recursively subdivides `[left, right] x [top, bottom]` to find the
/// integer translation minimizing [`Plane::diff`].
///
/// `cache` memoizes diffs within this single top-level call; it must not be
/// reused across unrelated alignment calls (spec.md §4.2).
#[must_use]
pub fn best_round_sub(
    img1: &Plane,
    img2: &Plane,
    level: i64,
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
    cache: &mut DiffCache,
    variant: DiffVariant,
) -> MergeResult {
    let amount = level * 2 + 2;
    let h_offset = (right - left) as f64 / amount as f64;
    let v_offset = (bottom - top) as f64 / amount as f64;
    let child_level = if level > 1 { level - 1 } else { 1 };

    let mut comps: Vec<ImgComp> = Vec::new();

    if h_offset < 1.0 && v_offset < 1.0 {
        // Trivial base: every integer offset in the remaining rectangle.
        // Enumerated y-major so ties resolve to smallest y, then smallest x
        // (spec.md §8 property 7).
        for y in top..=bottom {
            for x in left..=right {
                let mut c = ImgComp::leaf(x, y);
                if let Some(d) = cache.lookup(x, y, 1) {
                    c.diff = Some(d);
                }
                comps.push(c);
            }
        }
    } else {
        let h_add = if h_offset < 1.0 { 1.0 } else { h_offset };
        let v_add = if v_offset < 1.0 { 1.0 } else { v_offset };
        let precision = h_offset.min(v_offset).sqrt();

        let mut iy = top as f64 + v_offset;
        while iy <= bottom as f64 {
            let mut ix = left as f64 + h_offset;
            while ix <= right as f64 {
                let x = round_half_away_from_zero(ix);
                let y = round_half_away_from_zero(iy);

                if !((x == right && x != left) || (y == bottom && y != top)) {
                    let child_left = (ix - h_offset).floor() as i64;
                    let child_right = (ix + h_offset).ceil() as i64;
                    let child_top = (iy - v_offset).floor() as i64;
                    let child_bottom = (iy + v_offset).ceil() as i64;

                    let mut c = ImgComp {
                        h_middle: x,
                        v_middle: y,
                        level: child_level,
                        left: child_left,
                        right: child_right,
                        top: child_top,
                        bottom: child_bottom,
                        precision,
                        diff: None,
                    };
                    if let Some(d) = cache.lookup(x, y, precision.round().max(1.0) as u32) {
                        c.diff = Some(d);
                    }
                    comps.push(c);
                }

                ix += h_add;
            }
            iy += v_add;
        }
    }

    if comps.is_empty() {
        tracing::warn!("hierarchical search: no candidates in [{left},{right}] x [{top},{bottom}]");
        return MergeResult {
            offset: (0, 0),
            error: f64::INFINITY,
        };
    }

    // Re-balance precision so low-overlap candidates sample at a finer
    // stride, compensating the mean-divisor bias in `Plane::diff`.
    let max_checked = comps
        .iter()
        .map(|c| c.overlap_count(img1, img2))
        .max()
        .unwrap_or(0);
    for c in &mut comps {
        let checked = c.overlap_count(img1, img2);
        if checked > 0 && checked < max_checked {
            c.precision = (c.precision / (max_checked as f64 / checked as f64)).max(1.0);
        }
    }

    // Dispatch uncomputed candidates as one parallel batch.
    let diffs: Vec<f64> = comps
        .par_iter()
        .map(|c| {
            c.diff.unwrap_or_else(|| {
                let stride = c.precision.round().max(1.0) as usize;
                img1.diff(img2, c.h_middle, c.v_middle, stride, variant)
            })
        })
        .collect();

    let mut best_idx = 0;
    let mut best_diff = f64::INFINITY;
    for (i, &d) in diffs.iter().enumerate() {
        if d < best_diff {
            best_diff = d;
            best_idx = i;
        }
        if comps[i].diff.is_none() {
            cache.store(comps[i].h_middle, comps[i].v_middle, d, comps[i].precision.round().max(1.0) as u32);
        }
    }

    let best = &comps[best_idx];
    if best.level > 0 {
        best_round_sub(
            img1, img2, best.level, best.left, best.right, best.top, best.bottom, cache, variant,
        )
    } else {
        MergeResult {
            offset: (best.h_middle, best.v_middle),
            error: best_diff,
        }
    }
}
