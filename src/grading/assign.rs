//! Score → label mapping.
//!
//! Both layouts are pure functions of a score and a boundary-set snapshot.

use crate::domain::{NO_GRADE, Variant};
use crate::grading::boundary::BoundarySet;

/// Index (into `variant.band_labels()`) of the band containing `score`.
///
/// Returns `None` for non-finite or out-of-range scores.
pub fn band_index(score: f64, set: &BoundarySet) -> Option<usize> {
    if !score.is_finite() || !set.range().contains(score) {
        return None;
    }
    let b = set.values();

    match set.variant() {
        Variant::Nine => {
            if score <= b[0] {
                return Some(0);
            }
            let top = b.len() - 1;
            let hit = b
                .windows(2)
                .position(|w| w[0] < score && score <= w[1])
                .map(|i| i + 1);
            // Past the highest cut point the top band runs up to the range max.
            Some(hit.unwrap_or(top))
        }
        Variant::Four => {
            // Thresholds are stored lowest first; check from the top down.
            let reached = b.iter().rposition(|&threshold| score >= threshold);
            Some(reached.map_or(0, |i| i + 1))
        }
    }
}

/// Grade label for `score`, or [`NO_GRADE`] if no band contains it.
pub fn assign(score: f64, set: &BoundarySet) -> &'static str {
    band_index(score, set)
        .and_then(|i| set.variant().band_labels().get(i).copied())
        .unwrap_or(NO_GRADE)
}

/// Grade every score against one snapshot.
pub fn assign_all(scores: &[f64], set: &BoundarySet) -> Vec<&'static str> {
    scores.iter().map(|&s| assign(s, set)).collect()
}
