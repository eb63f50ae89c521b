//! A single-channel sample buffer and its primitive operations.
//!
//! [`Plane`] is the unit of image data the rest of the alignment core
//! operates on: a windowed, strided absolute-difference metric ([`Plane::diff`])
//! and a pair of resamplers ([`Plane::scale_nearest`], [`Plane::scale_generic`]).
//! Decoding image files into planes, and combining planes back into a
//! rendered output, are both external concerns (spec.md §1) — this module
//! only owns the buffer and the arithmetic the search needs.

#[cfg(test)]
mod tests;

use rayon::prelude::*;

use crate::{
    error::AlignError,
    util::{MAX_VAL, Sample, round_half_away_from_zero},
};

/// Which absolute-difference accumulation rule [`Plane::diff`] uses.
///
/// Two variants are observed in the source this spec was distilled from:
/// `Plain` accumulates every absolute difference, `Thresholded` drops
/// differences below a dead-zone (suppressing sensor noise). `Plain` is the
/// default and the one callers should reach for unless they have measured
/// noisy input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffVariant {
    #[default]
    Plain,
    Thresholded,
}

impl DiffVariant {
    /// `10/255 * MAX_VAL`, the dead-zone threshold used by
    /// [`DiffVariant::Thresholded`]. Compared against the raw `f64` product,
    /// not its ceiling: `Plane-diff.cpp`'s `diff_2_line` compares
    /// `diff > (10 / 255.0 * color::WHITE)` with no rounding at all, and
    /// ceiling the product would suppress one more count as noise than the
    /// original does.
    fn dead_zone_threshold() -> f64 {
        10.0 / 255.0 * f64::from(MAX_VAL)
    }
}

/// A 1D resampling kernel for [`Plane::scale_generic`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    /// `f(x) = max(0, 1 - |x|)`. Use with a window radius of `1.0`.
    Linear,
    /// The Mitchell-Netravali piecewise-cubic family. Use with a window
    /// radius of `2.0`.
    Cubic { b: f64, c: f64 },
}

impl Filter {
    #[must_use]
    pub fn eval(self, x: f64) -> f64 {
        match self {
            Filter::Linear => {
                let x = x.abs();
                (1.0 - x).max(0.0)
            }
            Filter::Cubic { b, c } => cubic(b, c, x),
        }
    }
}

/// The Mitchell-Netravali piecewise-cubic filter.
#[must_use]
pub fn cubic(b: f64, c: f64, x: f64) -> f64 {
    let x = x.abs();
    if x < 1.0 {
        (12.0 - 9.0 * b - 6.0 * c) / 6.0 * x * x * x
            + (-18.0 + 12.0 * b + 6.0 * c) / 6.0 * x * x
            + (6.0 - 2.0 * b) / 6.0
    } else if x < 2.0 {
        (-b - 6.0 * c) / 6.0 * x * x * x
            + (6.0 * b + 30.0 * c) / 6.0 * x * x
            + (-12.0 * b - 48.0 * c) / 6.0 * x
            + (8.0 * b + 24.0 * c) / 6.0
    } else {
        0.0
    }
}

/// A two-dimensional grid of fixed-depth samples.
///
/// `width`/`height` are the logical, valid extent; `stride` is the row
/// length in samples and may exceed `width` (padded rows). Out-of-range
/// access is a programmer error and is only checked in debug builds.
#[derive(Debug, Clone)]
pub struct Plane {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<Sample>,
}

/// The overlap rectangle between two planes translated by `(dx, dy)`, shared
/// by [`Plane::diff`], the hierarchical search's checked-percentage
/// computation, and the comparator's overlap ratio (spec.md §4.1, §4.3, §4.4).
#[derive(Debug, Clone, Copy)]
pub struct Overlap {
    pub self_top: usize,
    pub self_left: usize,
    pub other_top: usize,
    pub other_left: usize,
    pub width: usize,
    pub height: usize,
}

/// Computes the overlap rectangle of two `width x height` rectangles when
/// the second is translated by `(dx, dy)` relative to the first. Returns
/// `None` when the overlap is empty.
#[must_use]
pub fn overlap_rect(
    self_w: usize,
    self_h: usize,
    other_w: usize,
    other_h: usize,
    dx: i64,
    dy: i64,
) -> Option<Overlap> {
    let self_top = dy.max(0) as usize;
    let other_top = (-dy).max(0) as usize;
    let self_left = dx.max(0) as usize;
    let other_left = (-dx).max(0) as usize;

    let width = (self_w.saturating_sub(self_left)).min(other_w.saturating_sub(other_left));
    let height = (self_h.saturating_sub(self_top)).min(other_h.saturating_sub(other_top));

    if width == 0 || height == 0 {
        return None;
    }

    Some(Overlap {
        self_top,
        self_left,
        other_top,
        other_left,
        width,
        height,
    })
}

impl Plane {
    /// Creates a new `width x height` plane with no padding (`stride ==
    /// width`) and zero-initialized contents.
    ///
    /// # Panics
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_stride(width, height, width)
    }

    /// Creates a new plane with an explicit stride (`stride >= width`),
    /// allowing padded rows.
    ///
    /// # Panics
    /// Panics if `width` or `height` is zero, or if `stride < width`.
    #[must_use]
    pub fn with_stride(width: usize, height: usize, stride: usize) -> Self {
        assert!(width > 0, "Plane width must be non-zero");
        assert!(height > 0, "Plane height must be non-zero");
        assert!(stride >= width, "stride must be >= width");
        Self {
            width,
            height,
            stride,
            data: vec![0; stride * height],
        }
    }

    /// Like [`Plane::with_stride`], but reports an allocation failure as
    /// [`AlignError::AllocationFailure`] instead of aborting the process.
    /// Used by the resamplers (spec.md §4.1's "Failure semantics": they
    /// "return a null/empty result on allocation failure; callers must
    /// handle it").
    fn try_with_stride(width: usize, height: usize, stride: usize) -> Result<Self, AlignError> {
        debug_assert!(width > 0 && height > 0 && stride >= width);
        let mut data = Vec::new();
        data.try_reserve_exact(stride * height)
            .map_err(|_| AlignError::AllocationFailure { width, height })?;
        data.resize(stride * height, 0);
        Ok(Self { width, height, stride, data })
    }

    /// Builds a plane from existing row-major, `stride`-padded sample data.
    ///
    /// # Panics
    /// Panics if `data.len() != stride * height` or the usual dimension
    /// invariants are violated.
    #[must_use]
    pub fn from_samples(width: usize, height: usize, stride: usize, data: Vec<Sample>) -> Self {
        assert!(width > 0, "Plane width must be non-zero");
        assert!(height > 0, "Plane height must be non-zero");
        assert!(stride >= width, "stride must be >= width");
        assert_eq!(data.len(), stride * height, "data length must match stride * height");
        Self {
            width,
            height,
            stride,
            data,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the full (possibly padded) row at `y`.
    #[must_use]
    pub fn scan_line(&self, y: usize) -> &[Sample] {
        debug_assert!(y < self.height, "scan_line: y out of range");
        &self.data[y * self.stride..][..self.stride]
    }

    /// Returns the full (possibly padded) row at `y`, mutably.
    #[must_use]
    pub fn scan_line_mut(&mut self, y: usize) -> &mut [Sample] {
        debug_assert!(y < self.height, "scan_line_mut: y out of range");
        let stride = self.stride;
        &mut self.data[y * stride..][..stride]
    }

    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Sample {
        debug_assert!(x < self.width && y < self.height, "pixel: out of range");
        self.data[y * self.stride + x]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: Sample) {
        debug_assert!(x < self.width && y < self.height, "set_pixel: out of range");
        self.data[y * self.stride + x] = value;
    }

    /// Replaces every other row of `self` with the matching row from `p`
    /// (interlace line replacement). `top` selects whether even or odd rows
    /// are replaced. Not used by the alignment search itself — a Plane-level
    /// utility carried over for parity with the original.
    pub fn replace_line(&mut self, p: &Plane, top: bool) {
        if self.width != p.width || self.height != p.height {
            tracing::warn!("replace_line: planes not equally sized");
            return;
        }
        let start = if top { 0 } else { 1 };
        for y in (start..self.height).step_by(2) {
            let src_row = p.scan_line(y)[..self.width].to_vec();
            self.scan_line_mut(y)[..self.width].copy_from_slice(&src_row);
        }
    }

    /// Averages every other row of `self` with the matching row from `p`.
    /// Not used by the alignment search itself.
    pub fn combine_line(&mut self, p: &Plane, top: bool) {
        if self.width != p.width || self.height != p.height {
            tracing::warn!("combine_line: planes not equally sized");
            return;
        }
        let start = if top { 0 } else { 1 };
        let width = self.width;
        for y in (start..self.height).step_by(2) {
            let src_row = p.scan_line(y)[..width].to_vec();
            let dest_row = &mut self.scan_line_mut(y)[..width];
            for x in 0..width {
                dest_row[x] = ((u32::from(dest_row[x]) + u32::from(src_row[x])) / 2) as Sample;
            }
        }
    }

    /// A rough heuristic for whether this plane is interlaced, based on the
    /// mean squared difference between adjacent row pairs. Not reliable (the
    /// threshold was tuned by observation, not derivation) and not used by
    /// the alignment search itself.
    #[must_use]
    pub fn is_interlaced(&self) -> bool {
        let pairs = self.height / 2;
        if pairs == 0 {
            return false;
        }
        let mut avg2 = 0.0f64;
        for pair in 0..pairs {
            let row1 = self.scan_line(pair * 2);
            let row2 = self.scan_line(pair * 2 + 1);
            let mut line_avg: u64 = 0;
            for x in 0..self.width {
                let diff = i64::from(row2[x]) - i64::from(row1[x]);
                line_avg += (diff * diff) as u64;
            }
            avg2 += line_avg as f64 / self.width as f64;
        }
        avg2 /= pairs as f64;
        avg2 /= f64::from(MAX_VAL);
        avg2 /= f64::from(MAX_VAL);
        avg2 > 0.0015
    }

    /// The mean absolute sample difference over the overlap of `self` and
    /// `other` when `other` is translated by `(dx, dy)`, sampled every
    /// `stride`-th row and column. Returns `+inf` when there is no overlap
    /// (spec.md §4.1).
    ///
    /// Rows are diffed independently and reduced by commutative 64-bit
    /// integer addition, so the result does not depend on how the reduction
    /// is scheduled across threads.
    #[must_use]
    pub fn diff(&self, other: &Plane, dx: i64, dy: i64, stride: usize, variant: DiffVariant) -> f64 {
        let stride = stride.max(1);
        let Some(overlap) = overlap_rect(self.width, self.height, other.width, other.height, dx, dy)
        else {
            return f64::INFINITY;
        };

        let threshold = DiffVariant::dead_zone_threshold();

        let total: u64 = (0..overlap.height)
            .step_by(stride)
            .collect::<Vec<_>>()
            .par_iter()
            .map(|&i| {
                let self_row = self.scan_line(overlap.self_top + i);
                let other_row = other.scan_line(overlap.other_top + i);
                let mut sum = 0u64;
                let mut j = 0;
                while j < overlap.width {
                    let a = u32::from(self_row[overlap.self_left + j]);
                    let b = u32::from(other_row[overlap.other_left + j]);
                    let d = a.abs_diff(b);
                    match variant {
                        DiffVariant::Plain => sum += u64::from(d),
                        DiffVariant::Thresholded => {
                            if f64::from(d) > threshold {
                                sum += u64::from(d);
                            }
                        }
                    }
                    j += stride;
                }
                sum
            })
            .sum();

        let sampled_count = (overlap.height / stride) * (overlap.width / stride);
        if sampled_count == 0 {
            return f64::INFINITY;
        }
        total as f64 / sampled_count as f64
    }

    /// Nearest-neighbor resample to `wanted_width x wanted_height`.
    ///
    /// # Errors
    /// Returns [`AlignError::DegenerateScaleTarget`] if either target
    /// dimension is below 2 (spec.md §4.1 leaves this undefined; this crate
    /// turns it into a checked error instead), or
    /// [`AlignError::AllocationFailure`] if the destination buffer cannot
    /// be allocated (spec.md §4.1's "Failure semantics").
    pub fn scale_nearest(&self, wanted_width: usize, wanted_height: usize) -> Result<Plane, AlignError> {
        if wanted_width < 2 || wanted_height < 2 {
            return Err(AlignError::DegenerateScaleTarget {
                width: wanted_width,
                height: wanted_height,
            });
        }

        let mut scaled = Plane::try_with_stride(wanted_width, wanted_height, wanted_width)?;
        for iy in 0..wanted_height {
            let pos_y = (iy as f64 / (wanted_height - 1) as f64) * (self.height - 1) as f64;
            let sy = round_half_away_from_zero(pos_y).clamp(0, self.height as i64 - 1) as usize;
            for ix in 0..wanted_width {
                let pos_x = (ix as f64 / (wanted_width - 1) as f64) * (self.width - 1) as f64;
                let sx = round_half_away_from_zero(pos_x).clamp(0, self.width as i64 - 1) as usize;
                scaled.set_pixel(ix, iy, self.pixel(sx, sy));
            }
        }
        Ok(scaled)
    }

    /// Separable filter-kernel resample to `wanted_width x wanted_height`
    /// using `filter` with the given source-pixel-unit `window` radius
    /// (spec.md §4.1).
    ///
    /// # Errors
    /// Returns [`AlignError::DegenerateScaleTarget`] or
    /// [`AlignError::AllocationFailure`] under the same conditions as
    /// [`Plane::scale_nearest`].
    pub fn scale_generic(
        &self,
        wanted_width: usize,
        wanted_height: usize,
        window: f64,
        filter: Filter,
    ) -> Result<Plane, AlignError> {
        if wanted_width < 2 || wanted_height < 2 {
            return Err(AlignError::DegenerateScaleTarget {
                width: wanted_width,
                height: wanted_height,
            });
        }

        let x_points: Vec<ScalePoint> = (0..wanted_width)
            .map(|ix| ScalePoint::new(ix, self.width, wanted_width, window, filter))
            .collect();

        let mut scaled = Plane::try_with_stride(wanted_width, wanted_height, wanted_width)?;
        let src = self;
        let dest_rows: Vec<Vec<Sample>> = (0..wanted_height)
            .collect::<Vec<_>>()
            .par_iter()
            .map(|&iy| {
                let y_point = ScalePoint::new(iy, src.height, wanted_height, window, filter);
                let mut out = vec![0 as Sample; wanted_width];
                for (ix, point) in x_points.iter().enumerate() {
                    let mut sum = 0.0f64;
                    let mut weight_sum = 0.0f64;
                    for (wy_idx, &wy) in y_point.weights.iter().enumerate() {
                        let sy = y_point.start + wy_idx;
                        let row = src.scan_line(sy);
                        for (wx_idx, &wx) in point.weights.iter().enumerate() {
                            let sx = point.start + wx_idx;
                            let weight = wy * wx;
                            sum += f64::from(row[sx]) * weight;
                            weight_sum += weight;
                        }
                    }
                    out[ix] = if weight_sum != 0.0 {
                        (sum / weight_sum + 0.5).clamp(0.0, f64::from(MAX_VAL)) as Sample
                    } else {
                        0
                    };
                }
                out
            })
            .collect();

        for (iy, row) in dest_rows.into_iter().enumerate() {
            scaled.scan_line_mut(iy)[..wanted_width].copy_from_slice(&row);
        }

        Ok(scaled)
    }
}

/// Precomputed sampling range and weights for one destination coordinate
/// along a single axis of [`Plane::scale_generic`].
struct ScalePoint {
    start: usize,
    weights: Vec<f64>,
}

impl ScalePoint {
    fn new(index: usize, width: usize, wanted: usize, window: f64, filter: Filter) -> Self {
        let pos = (index as f64 / (wanted - 1) as f64) * (width - 1) as f64;
        let start = (pos - window).ceil().max(0.0) as usize;
        let end = ((pos + window).floor() as usize).min(width - 1);
        let weights = (start..=end).map(|j| filter.eval(pos - j as f64)).collect();
        Self { start, weights }
    }
}
