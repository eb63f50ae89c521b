//! Animation-phase separation (spec.md §4.6).
//!
//! [`AnimationSeparator`] treats a container as a sequence of frames drawn
//! from an unknown number of animation phases, distinguished by a jump in
//! pairwise alignment error between phases. The threshold separating
//! "same phase" from "phase boundary" is chosen automatically rather than
//! supplied by the caller.


use std::path::Path;

use crate::{
    aligner::{ImageContainer, ProcessWatcher},
    comparator::Comparator,
    error::AlignError,
};

/// The per-frame phase assignment and the chosen threshold. Each index's
/// phase is also written into the container via
/// [`ImageContainer::set_frame`] (spec.md §4.6, §6).
#[derive(Debug, Clone, PartialEq)]
pub struct SeparationResult {
    /// `phases[i]` is the phase index of frame `i`.
    pub phases: Vec<usize>,
    pub threshold: f64,
}

/// Partitions a container's frames into animation phases.
#[derive(Debug, Clone, Copy)]
pub struct AnimationSeparator {
    pub comparator: Comparator,
    /// Multiplies the automatically chosen threshold before phase
    /// assignment. `1.0` (the default via [`AnimationSeparator::new`])
    /// leaves it unmodified.
    pub threshold_factor: f64,
}

impl AnimationSeparator {
    #[must_use]
    pub fn new(comparator: Comparator) -> Self {
        Self {
            comparator,
            threshold_factor: 1.0,
        }
    }

    /// Picks a threshold from consecutive-frame alignment errors, then
    /// greedily assigns every frame to a phase, recording each assignment
    /// into `container` via [`ImageContainer::set_frame`] as it goes.
    ///
    /// When `debug_csv` is given, writes an `errors_raw,errors_sorted,
    /// threshold` trace there; a write failure is logged and does not fail
    /// the call.
    ///
    /// `watcher`, if given, is polled between phase-assignment iterations;
    /// a cancelling watcher stops the greedy assignment early, leaving
    /// remaining indices at whatever phase tag the container already had
    /// for them (spec.md §4.6 step 4).
    ///
    /// # Errors
    /// Returns [`AlignError::EmptyContainer`] if the container holds no
    /// frames.
    pub fn separate(
        &self,
        container: &mut dyn ImageContainer,
        debug_csv: Option<&Path>,
        watcher: Option<&dyn ProcessWatcher>,
    ) -> Result<SeparationResult, AlignError> {
        let count = container.len();
        if count == 0 {
            return Err(AlignError::EmptyContainer);
        }
        if count == 1 {
            container.set_frame(0, 0);
            return Ok(SeparationResult {
                phases: vec![0],
                threshold: 0.0,
            });
        }

        // Sequential: `container` is borrowed mutably for the duration of
        // `separate`, and each pairwise `find_offset` already parallelizes
        // internally (spec.md §5).
        let errors_raw: Vec<f64> = (0..count - 1)
            .map(|i| container.find_offset(i, i + 1, &self.comparator).error)
            .collect();

        let threshold = auto_threshold(&errors_raw) * self.threshold_factor;
        let phases = assign_phases(container, &self.comparator, threshold, watcher);

        tracing::info!(
            frames = count,
            phases = phases.last().map_or(1, |p| p + 1),
            threshold,
            "animation phases assigned"
        );

        if let Some(path) = debug_csv {
            write_csv_trace(path, &errors_raw, threshold);
        }

        Ok(SeparationResult { phases, threshold })
    }
}

/// Sorts `errors_raw` ascending and, for each adjacent pair, considers the
/// candidate threshold `(errors[i] + errors[i-1]) / 2 + errors[i-1]`; the
/// candidate maximizing the number of above/below-threshold transitions in
/// the *original* order wins, ties going to the larger candidate (spec.md
/// §4.6 step 2 — the doubled `errors[i-1]` term is the literal formula, not
/// a simplified midpoint).
fn auto_threshold(errors_raw: &[f64]) -> f64 {
    let mut sorted = errors_raw.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut best_threshold = sorted[0];
    let mut best_count = 0usize;
    for i in 1..sorted.len() {
        let candidate = (sorted[i] + sorted[i - 1]) / 2.0 + sorted[i - 1];
        let count = sign_changes(errors_raw, candidate);
        if count >= best_count {
            best_count = count;
            best_threshold = candidate;
        }
    }
    best_threshold
}

fn sign_changes(errors_raw: &[f64], threshold: f64) -> usize {
    errors_raw
        .iter()
        .map(|&e| e > threshold)
        .collect::<Vec<_>>()
        .windows(2)
        .filter(|w| w[0] != w[1])
        .count()
}

/// Greedily groups frames into phases: each phase starts at the first
/// unassigned index and pulls in every later unassigned index whose error
/// against the *last index pulled into this phase* (not necessarily its
/// immediate predecessor) is below `threshold`, per spec.md §4.6 step 4.
/// Every included index's phase is written back via
/// [`ImageContainer::set_frame`] as it is assigned. Stops early if `watcher`
/// requests cancellation, leaving remaining indices untagged.
fn assign_phases(
    container: &mut dyn ImageContainer,
    comparator: &Comparator,
    threshold: f64,
    watcher: Option<&dyn ProcessWatcher>,
) -> Vec<usize> {
    let count = container.len();
    let mut phases: Vec<Option<usize>> = vec![None; count];
    let mut iteration = 0usize;

    loop {
        if let Some(w) = watcher {
            if w.should_cancel() {
                break;
            }
        }

        let remaining: Vec<usize> = (0..count).filter(|&i| phases[i].is_none()).collect();
        let Some(&first) = remaining.first() else {
            break;
        };

        phases[first] = Some(iteration);
        container.set_frame(first, iteration);
        let mut previous_included = first;

        for &idx in &remaining[1..] {
            let error = container.find_offset(previous_included, idx, comparator).error;
            if error < threshold {
                phases[idx] = Some(iteration);
                container.set_frame(idx, iteration);
                previous_included = idx;
            }
        }

        iteration += 1;
    }

    phases.into_iter().map(|p| p.unwrap_or(0)).collect()
}

fn write_csv_trace(path: &Path, errors_raw: &[f64], threshold: f64) {
    use std::io::Write;

    let file = match std::fs::File::create(path) {
        Ok(f) => f,
        Err(err) => {
            tracing::warn!(?err, path = %path.display(), "failed to create animation debug trace");
            return;
        }
    };
    let mut writer = std::io::BufWriter::new(file);

    let mut sorted = errors_raw.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut write_all = || -> std::io::Result<()> {
        writeln!(writer, "errors_raw,errors_sorted,threshold")?;
        for i in 0..errors_raw.len() {
            writeln!(writer, "{},{},{threshold}", errors_raw[i], sorted[i])?;
        }
        Ok(())
    };

    if let Err(err) = write_all() {
        tracing::warn!(?err, path = %path.display(), "failed to write animation debug trace");
    }
}
