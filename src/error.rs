//! Error kinds surfaced by the alignment core (spec.md §7).
//!
//! Diff itself never fails: an empty overlap surfaces as a sentinel
//! `f64::INFINITY`, not an `Err`, and the hierarchical search logs and
//! recovers from an empty candidate rectangle rather than propagating. This
//! enum covers the three surfaces that do fail outright: a degenerate
//! resample target, a failed resampler allocation, and an empty image
//! container. `NoOverlap` is deliberately absent: spec.md §4.1 and §4.4
//! both model "no overlap" as a sentinel value (`f64::INFINITY` from
//! `Plane::diff`, `0.0` overlap ratio from `Comparator::find_offset`), not
//! as an error, so this enum has no variant that would never be
//! constructed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("scale target must be at least 2x2, got {width}x{height}")]
    DegenerateScaleTarget { width: usize, height: usize },

    #[error("plane allocation failed for {width}x{height} buffer")]
    AllocationFailure { width: usize, height: usize },

    #[error("container has no images to align")]
    EmptyContainer,
}
