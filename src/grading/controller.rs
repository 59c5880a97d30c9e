//! Interaction controller: the single owner of the mutable boundary set.
//!
//! Three input channels reach the boundaries through here:
//!
//! - drag steps (`drag_to`, `drag_by`), whose summary recomputation is
//!   debounced, followed by `release`, which always recomputes synchronously
//! - typed values (`type_value`), parsed then clamped like a drag
//! - bulk resets (`reset`, `reset_defaults`)
//!
//! Every committed move also refreshes the nearest-score feedback readout.
//! Readers only ever see snapshots (`boundaries()`, `summary()`).

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::Variant;
use crate::error::AppError;
use crate::grading::boundary::BoundarySet;
use crate::grading::debounce::Debouncer;
use crate::grading::summary::{DistributionSummary, summarize};

/// Scores on either side of a trial boundary value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Feedback {
    /// Highest score at or below the value.
    pub below: f64,
    /// Lowest score above the value.
    pub above: f64,
    pub difference: f64,
}

/// A boundary edit, as produced by a front-end.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    DragTo { index: usize, value: f64 },
    DragBy { index: usize, delta: f64 },
    Release,
    Type { index: usize, text: String },
    Reset(Vec<f64>),
    ResetDefaults,
}

#[derive(Debug, Clone)]
pub struct Controller {
    boundaries: BoundarySet,
    scores: Vec<f64>,
    /// `scores` sorted high to low, for the feedback lookup.
    sorted_desc: Vec<f64>,
    summary: DistributionSummary,
    feedback: Option<Feedback>,
    debouncer: Debouncer,
    recomputations: u64,
}

impl Controller {
    pub fn new(boundaries: BoundarySet, scores: Vec<f64>, debounce: Duration) -> Self {
        let summary = summarize(&scores, &boundaries);
        let sorted_desc = sorted_desc(&scores);
        Self {
            boundaries,
            scores,
            sorted_desc,
            summary,
            feedback: None,
            debouncer: Debouncer::new(debounce),
            recomputations: 1,
        }
    }

    pub fn boundaries(&self) -> &BoundarySet {
        &self.boundaries
    }

    pub fn summary(&self) -> &DistributionSummary {
        &self.summary
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    /// Number of full summary recomputations so far.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Whether a debounced recomputation is waiting.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Whether the summary lags behind the boundaries.
    pub fn is_stale(&self) -> bool {
        self.summary.boundary_version != self.boundaries.version()
    }

    /// Replace the score collection and recompute everything.
    pub fn load_scores(&mut self, scores: Vec<f64>) {
        info!(n = scores.len(), "scores loaded");
        self.sorted_desc = sorted_desc(&scores);
        self.scores = scores;
        self.feedback = None;
        self.debouncer.cancel();
        self.recompute();
    }

    /// Swap to another layout, starting from its defaults.
    pub fn switch_variant(&mut self, variant: Variant) {
        let range = self.boundaries.range();
        self.boundaries = BoundarySet::with_defaults(variant, range);
        info!(variant = variant.display_name(), "layout switched");
        self.feedback = None;
        self.debouncer.cancel();
        self.recompute();
    }

    /// Move a handle to an absolute position as part of a drag.
    ///
    /// The summary is recomputed once the drag goes quiet (see [`Self::tick`])
    /// or on [`Self::release`].
    pub fn drag_to(&mut self, index: usize, value: f64, now: Instant) -> Result<f64, AppError> {
        let before = self.boundaries.version();
        let applied = self.boundaries.propose_move(index, value)?;
        self.feedback = nearest_difference(&self.sorted_desc, applied);
        if self.boundaries.version() != before {
            self.debouncer.schedule(now, self.boundaries.version());
        }
        Ok(applied)
    }

    /// Nudge a handle by `delta` as part of a drag.
    pub fn drag_by(&mut self, index: usize, delta: f64, now: Instant) -> Result<f64, AppError> {
        let current = self.boundaries.get(index).ok_or_else(|| {
            AppError::invalid_input(format!("Boundary index {index} out of range."))
        })?;
        self.drag_to(index, current + delta, now)
    }

    /// End a drag. Any waiting recomputation runs now.
    ///
    /// Returns whether a recomputation ran.
    pub fn release(&mut self) -> bool {
        let had_pending = self.debouncer.cancel();
        if had_pending || self.is_stale() {
            self.recompute();
            return true;
        }
        false
    }

    /// Run the debounced recomputation if it is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(version) = self.debouncer.take_due(now) {
            debug!(version, "debounced recompute");
            self.recompute();
            return true;
        }
        false
    }

    /// Commit a typed value for one handle.
    ///
    /// Non-numeric text fails with `InvalidInput` and changes nothing.
    pub fn type_value(&mut self, index: usize, text: &str) -> Result<f64, AppError> {
        let trimmed = text.trim();
        let value = trimmed.parse::<f64>().map_err(|_| {
            warn!(index, text = trimmed, "rejected boundary entry");
            AppError::invalid_input(format!("'{trimmed}' is not a valid number."))
        })?;
        let applied = self.boundaries.propose_move(index, value)?;
        // The readout describes the entered value, even when the handle is clamped.
        self.feedback = nearest_difference(&self.sorted_desc, value);
        self.debouncer.cancel();
        self.recompute();
        info!(index, requested = value, applied, "boundary entered");
        Ok(applied)
    }

    /// Replace every boundary at once.
    pub fn reset(&mut self, values: &[f64]) -> Result<(), AppError> {
        if let Err(err) = self.boundaries.reset(values) {
            warn!(error = %err, "rejected boundary reset");
            return Err(err);
        }
        info!(values = ?values, "boundaries reset");
        self.feedback = None;
        self.debouncer.cancel();
        self.recompute();
        Ok(())
    }

    pub fn reset_defaults(&mut self) -> Result<(), AppError> {
        let defaults = self.boundaries.defaults();
        self.reset(&defaults)
    }

    /// Apply any edit. Returns the committed value for single-handle edits.
    pub fn apply(&mut self, edit: Edit, now: Instant) -> Result<Option<f64>, AppError> {
        match edit {
            Edit::DragTo { index, value } => self.drag_to(index, value, now).map(Some),
            Edit::DragBy { index, delta } => self.drag_by(index, delta, now).map(Some),
            Edit::Release => {
                self.release();
                Ok(None)
            }
            Edit::Type { index, text } => self.type_value(index, &text).map(Some),
            Edit::Reset(values) => self.reset(&values).map(|()| None),
            Edit::ResetDefaults => self.reset_defaults().map(|()| None),
        }
    }

    fn recompute(&mut self) {
        self.summary = summarize(&self.scores, &self.boundaries);
        self.recomputations += 1;
        debug!(
            version = self.boundaries.version(),
            total = self.summary.total,
            "summary recomputed"
        );
    }
}

/// Gap between the scores straddling `value`.
///
/// `sorted_desc` must be ordered high to low. Returns `None` when either side
/// has no score.
pub fn nearest_difference(sorted_desc: &[f64], value: f64) -> Option<Feedback> {
    let below = sorted_desc.iter().copied().find(|&s| s <= value)?;
    let above = sorted_desc.iter().rev().copied().find(|&s| s > value)?;
    Some(Feedback {
        below,
        above,
        difference: above - below,
    })
}

fn sorted_desc(scores: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted
}
