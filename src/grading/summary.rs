//! Per-band counts and percentages.
//!
//! A summary is always rebuilt from the full score list and a boundary-set
//! snapshot; nothing is patched incrementally.

use serde::Serialize;

use crate::domain::Variant;
use crate::error::AppError;
use crate::grading::assign::band_index;
use crate::grading::boundary::BoundarySet;

/// One row of the distribution table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandSummary {
    pub label: &'static str,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// `100 × count / total`, or `0` for an empty dataset.
    pub percentage: f64,
    /// Combined percentage of this band's display group.
    ///
    /// Only the lowest band of a group carries the figure; the others are `None`.
    /// Layouts without grouping leave every row `None`.
    pub grouped_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub variant: Variant,
    pub total: usize,
    pub rows: Vec<BandSummary>,
    /// Scores outside the range, counted in `total` but in no band.
    pub unbanded: usize,
    pub average: Option<f64>,
    /// Version of the boundary set this summary was computed from.
    pub boundary_version: u64,
}

impl DistributionSummary {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Fail with `EmptyDataset` when there is nothing to report on.
    pub fn require_scores(&self) -> Result<&Self, AppError> {
        if self.is_empty() {
            return Err(AppError::empty_dataset("No scores to grade."));
        }
        Ok(self)
    }

    pub fn counted(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).max().unwrap_or(0)
    }
}

/// Histogram `scores` into the bands of `set`.
pub fn summarize(scores: &[f64], set: &BoundarySet) -> DistributionSummary {
    let bands = set.bands();
    let mut counts = vec![0usize; bands.len()];
    let mut unbanded = 0usize;

    for &score in scores {
        match band_index(score, set) {
            Some(i) => counts[i] += 1,
            None => unbanded += 1,
        }
    }

    let total = scores.len();
    let percentages: Vec<f64> = counts
        .iter()
        .map(|&c| if total == 0 { 0.0 } else { 100.0 * c as f64 / total as f64 })
        .collect();
    let grouped = grouped_percentages(set.variant(), &percentages);

    let rows = bands
        .iter()
        .enumerate()
        .map(|(i, band)| BandSummary {
            label: band.label,
            lower: band.lower,
            upper: band.upper,
            count: counts[i],
            percentage: percentages[i],
            grouped_percentage: grouped[i],
        })
        .collect();

    DistributionSummary {
        variant: set.variant(),
        total,
        rows,
        unbanded,
        average: mean(scores),
        boundary_version: set.version(),
    }
}

fn grouped_percentages(variant: Variant, percentages: &[f64]) -> Vec<Option<f64>> {
    let mut out = vec![None; percentages.len()];
    let Some(groups) = variant.percentage_groups() else {
        return out;
    };
    for group in groups {
        let Some(&first) = group.first() else { continue };
        let sum = group.iter().filter_map(|&i| percentages.get(i)).sum();
        if let Some(slot) = out.get_mut(first) {
            *slot = Some(sum);
        }
    }
    out
}

fn mean(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScoreRange;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn nine() -> BoundarySet {
        BoundarySet::with_defaults(Variant::Nine, ScoreRange::default())
    }

    #[test]
    fn counts_sum_to_total() {
        let summary = summarize(&[10.0, 45.0, 46.0, 70.0, 99.0], &nine());
        assert_eq!(summary.total, 5);
        assert_eq!(summary.counted(), 5);

        let c = summary.rows.iter().find(|r| r.label == "C").unwrap();
        assert_eq!(c.count, 2);
        assert!((c.percentage - 40.0).abs() < 1e-9);
        assert!((summary.average.unwrap() - 54.0).abs() < 1e-9);
    }

    #[test]
    fn grouped_percentages_follow_fixed_pairs() {
        // One score per band.
        let scores = [0.0, 10.0, 20.0, 30.0, 45.0, 60.0, 70.0, 80.0, 90.0];
        let summary = summarize(&scores, &nine());
        let grouped: Vec<_> = summary.rows.iter().map(|r| r.grouped_percentage).collect();

        let pair = 200.0 / 9.0;
        let single = 100.0 / 9.0;
        let expect = [Some(pair), None, Some(single), Some(pair), None, Some(pair), None, Some(pair), None];
        for (got, want) in grouped.iter().zip(expect) {
            match (got, want) {
                (Some(g), Some(w)) => assert!((g - w).abs() < 1e-9),
                (None, None) => {}
                other => panic!("unexpected grouping {other:?}"),
            }
        }
    }

    #[test]
    fn four_band_has_no_grouping() {
        let set = BoundarySet::new(Variant::Four, ScoreRange::default(), &[50.0, 60.0, 75.0, 85.0]).unwrap();
        let summary = summarize(&[49.0, 60.0, 90.0], &set);
        assert_eq!(summary.rows.len(), 5);
        assert!(summary.rows.iter().all(|r| r.grouped_percentage.is_none()));
        assert_eq!(summary.rows[0].count, 1);
        assert_eq!(summary.rows[2].count, 1);
        assert_eq!(summary.rows[4].count, 1);
    }

    #[test]
    fn empty_scores_give_zero_rows() {
        let summary = summarize(&[], &nine());
        assert!(summary.is_empty());
        assert!(summary.rows.iter().all(|r| r.count == 0 && r.percentage == 0.0));
        assert_eq!(summary.average, None);
        assert_eq!(summary.require_scores().unwrap_err().kind(), ErrorKind::EmptyDataset);
    }

    #[test]
    fn out_of_range_scores_are_unbanded() {
        let summary = summarize(&[50.0, 120.0], &nine());
        assert_eq!(summary.unbanded, 1);
        assert_eq!(summary.counted(), 1);
    }

    #[test]
    fn summary_tracks_boundary_version() {
        let mut set = nine();
        set.propose_move(4, 55.0).unwrap();
        assert_eq!(summarize(&[1.0], &set).boundary_version, 1);
    }

    proptest! {
        /// Property: counts sum to the number of scores and percentages to 100.
        #[test]
        fn totals_are_conserved(
            scores in prop::collection::vec(0.0f64..=100.0, 1..200),
            moves in prop::collection::vec((0usize..9, 0.0f64..=100.0), 0..16),
        ) {
            let mut set = nine();
            for (index, value) in moves {
                set.propose_move(index, value).unwrap();
            }
            let summary = summarize(&scores, &set);
            prop_assert_eq!(summary.counted(), scores.len());
            let pct: f64 = summary.rows.iter().map(|r| r.percentage).sum();
            prop_assert!((pct - 100.0).abs() < 1e-6);
            let grouped: f64 = summary.rows.iter().filter_map(|r| r.grouped_percentage).sum();
            prop_assert!((grouped - 100.0).abs() < 1e-6);
        }
    }
}
