//! External interfaces and the running-average aligner (spec.md §4.5, §6).
//!
//! [`ImageContainer`], [`Renderer`], and [`ProcessWatcher`] are the seams
//! between this crate and whatever owns image decoding, compositing, and UI
//! progress reporting; callers implement them, this crate only depends on
//! the traits. Rendering the running mean of already-placed frames is out
//! of scope for this crate (spec.md §1) — [`AverageAligner`] only calls
//! through [`Renderer`], it never builds the mean itself.


use crate::{
    comparator::{Comparator, ImageOffset},
    error::AlignError,
    plane::Plane,
};

/// An ordered, mutable sequence of decoded planes with a position and phase
/// tag per frame (spec.md §3's `ImageContainer`/`ImageGroup`/`ImageItem`
/// collaborator, flattened to the one index space the core actually
/// touches). Implemented by the caller; decoding image files and tracking
/// groups is out of scope for this crate (spec.md §1).
pub trait ImageContainer {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn image(&self, index: usize) -> &Plane;

    fn pos(&self, index: usize) -> (i64, i64);

    fn set_pos(&mut self, index: usize, pos: (i64, i64));

    fn set_frame(&mut self, index: usize, phase: usize);

    /// Pairwise alignment offset between frames `i` and `j`. The default
    /// implementation just calls `comparator`; a container may override
    /// this to memoize pairwise offsets, per spec.md §6 ("the container is
    /// expected to memoize pairwise offsets if it chooses").
    fn find_offset(&self, i: usize, j: usize, comparator: &Comparator) -> ImageOffset {
        comparator.find_offset(self.image(i), self.image(j))
    }
}

/// Renders the running mean of the frames placed so far. Implemented by
/// the caller; compositing aligned frames into an output image is out of
/// scope for this crate (spec.md §1) — this trait is the only seam the
/// alignment core has into that process.
pub trait Renderer {
    /// Produces the mean of `container`'s frames `0..up_to_index_exclusive`
    /// placed at their currently recorded [`ImageContainer::pos`].
    fn render(&self, container: &dyn ImageContainer, up_to_index_exclusive: usize) -> Plane;
}

/// Progress reporting hook, polled between frames of a long alignment run
/// (spec.md §6: `set_total`/`set_current`/`add` collapse to a single
/// `on_progress(done, total)` call here; `shouldCancel` is kept verbatim as
/// [`ProcessWatcher::should_cancel`]).
///
/// Cancellation is cooperative and coarse-grained: [`AverageAligner::align`]
/// and [`crate::animation::AnimationSeparator::separate`] only poll it at
/// their top-level suspension points (between frames / between phase
/// iterations), never inside an in-flight parallel diff batch (spec.md §5).
pub trait ProcessWatcher {
    fn on_progress(&self, done: usize, total: usize);

    /// Polled between frames/iterations; `true` stops the loop early,
    /// leaving everything already written in place (spec.md §4.5, §4.6).
    /// Defaults to never cancelling.
    fn should_cancel(&self) -> bool {
        false
    }
}

/// One frame's place in the aligned mosaic, as read back from
/// [`ImageContainer::pos`] after [`AverageAligner::align`] runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedFrame {
    pub index: usize,
    pub x: i64,
    pub y: i64,
}

/// Aligns every frame of a container against a running mean of the frames
/// placed so far, rather than against a single fixed reference frame.
///
/// Grounded on the source's average-reference aligner
/// (`original_source/src/aligners/AverageAligner.cpp`): frame 0 is fixed at
/// the origin; each later frame is searched against `renderer`'s running
/// mean of everything placed before it, and its position is recorded as
/// the found offset plus the *current* minimum position over the whole
/// container (spec.md §4.5, §9's min-point rebasing note) — not a single
/// rebase at the end. That running minimum is order-dependent and must be
/// reproduced exactly as described for output compatibility.
#[derive(Debug, Clone, Copy)]
pub struct AverageAligner {
    pub comparator: Comparator,
}

impl AverageAligner {
    #[must_use]
    pub fn new(comparator: Comparator) -> Self {
        Self { comparator }
    }

    /// Aligns every frame in `container` against `renderer`'s running mean,
    /// writing each frame's position via [`ImageContainer::set_pos`] and
    /// reporting progress to `watcher` if given. If `watcher` requests
    /// cancellation before a later frame starts, the loop stops there and
    /// returns `Ok` with whatever positions were already set (spec.md §4.5).
    ///
    /// # Errors
    /// Returns [`AlignError::EmptyContainer`] if the container holds no
    /// frames.
    pub fn align(
        &self,
        container: &mut dyn ImageContainer,
        renderer: &dyn Renderer,
        watcher: Option<&dyn ProcessWatcher>,
    ) -> Result<Vec<AlignedFrame>, AlignError> {
        let count = container.len();
        if count == 0 {
            return Err(AlignError::EmptyContainer);
        }

        container.set_pos(0, (0, 0));
        if let Some(w) = watcher {
            w.on_progress(1, count);
        }

        for index in 1..count {
            if let Some(w) = watcher {
                if w.should_cancel() {
                    break;
                }
            }

            let reference = renderer.render(container, index);
            let offset = self.comparator.find_offset(&reference, container.image(index));
            let min = min_point(container);
            container.set_pos(index, (offset.x + min.0, offset.y + min.1));

            if let Some(w) = watcher {
                w.on_progress(index + 1, count);
            }
        }

        Ok((0..count)
            .map(|index| {
                let (x, y) = container.pos(index);
                AlignedFrame { index, x, y }
            })
            .collect())
    }
}

/// The minimum `x` and minimum `y` over every position currently recorded
/// in `container` (spec.md §4.5's `min_point()`). Not yet-placed frames
/// retain whatever position the container initialized them to, which is
/// why this running minimum drifts as the loop in [`AverageAligner::align`]
/// progresses (spec.md §9).
fn min_point(container: &dyn ImageContainer) -> (i64, i64) {
    let mut min_x = i64::MAX;
    let mut min_y = i64::MAX;
    for i in 0..container.len() {
        let (x, y) = container.pos(i);
        min_x = min_x.min(x);
        min_y = min_y.min(y);
    }
    (min_x, min_y)
}
