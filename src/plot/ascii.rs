//! ASCII histogram for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Each column covers an equal slice of the score range, so bands keep
//! their proportional widths. Plot elements:
//! - bars: `#`
//! - average marks: `:` (only where no bar is drawn)

use crate::domain::ScoreRange;
use crate::grading::DistributionSummary;

/// Render the per-band histogram over the score range.
pub fn render_histogram(summary: &DistributionSummary, range: ScoreRange, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(2);

    let max_count = summary.max_count();
    let column_heights: Vec<usize> = (0..width)
        .map(|c| {
            let x = column_center(range, width, c);
            let count = band_at(summary, x).map_or(0, |i| summary.rows[i].count);
            if max_count == 0 {
                0
            } else {
                ((count as f64 / max_count as f64) * height as f64).round() as usize
            }
        })
        .collect();

    let avg_col = summary.average.map(|avg| column_of(range, width, avg));

    let mut out = String::new();
    out.push_str(&format!(
        "Histogram: n={} | average={} | marks=[{:.2}, {:.2}]\n",
        summary.total,
        summary.average.map_or_else(|| "-".to_string(), |a| format!("{a:.2}")),
        range.min,
        range.max,
    ));

    for level in (1..=height).rev() {
        let line: String = column_heights
            .iter()
            .enumerate()
            .map(|(c, &h)| {
                if h >= level {
                    '#'
                } else if avg_col == Some(c) {
                    ':'
                } else {
                    ' '
                }
            })
            .collect();
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&"-".repeat(width));
    out.push('\n');
    out.push_str(&label_row(summary, range, width));
    out.push('\n');
    out
}

fn label_row(summary: &DistributionSummary, range: ScoreRange, width: usize) -> String {
    let mut cells = vec![' '; width];
    for row in &summary.rows {
        if row.upper <= row.lower {
            continue;
        }
        let start = column_of(range, width, (row.lower + row.upper) / 2.0);
        let chars: Vec<char> = row.label.chars().collect();
        let end = start + chars.len();
        if end > width || cells[start..end].iter().any(|&ch| ch != ' ') {
            continue;
        }
        cells[start..end].copy_from_slice(&chars);
    }
    cells.into_iter().collect()
}

fn column_center(range: ScoreRange, width: usize, c: usize) -> f64 {
    range.min + (c as f64 + 0.5) / width as f64 * range.span()
}

fn column_of(range: ScoreRange, width: usize, x: f64) -> usize {
    let u = ((x - range.min) / range.span()).clamp(0.0, 1.0);
    ((u * width as f64).floor() as usize).min(width - 1)
}

/// Row whose `[lower, upper)` holds `x`; the last row also takes its upper edge.
fn band_at(summary: &DistributionSummary, x: f64) -> Option<usize> {
    let last = summary.rows.len().checked_sub(1)?;
    summary
        .rows
        .iter()
        .position(|r| x >= r.lower && x < r.upper)
        .or_else(|| {
            let top = &summary.rows[last];
            (x >= top.lower && x <= top.upper).then_some(last)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Variant;
    use crate::grading::{BoundarySet, summarize};

    #[test]
    fn histogram_golden_snapshot_small() {
        let range = ScoreRange::default();
        let set = BoundarySet::with_defaults(Variant::Four, range);
        let summary = summarize(&[49.0, 60.0, 60.0, 90.0], &set);

        let txt = render_histogram(&summary, range, 10, 2);
        let expected = concat!(
            "Histogram: n=4 | average=64.75 | marks=[0.00, 100.00]\n",
            "      #   \n",
            "##### # ##\n",
            "----------\n",
            "  F  DC BA\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn average_marker_shows_in_gaps() {
        let range = ScoreRange::default();
        let set = BoundarySet::with_defaults(Variant::Four, range);
        // Average 55 falls in the empty D band.
        let summary = summarize(&[20.0, 90.0], &set);
        let txt = render_histogram(&summary, range, 20, 3);
        assert!(txt.lines().nth(1).unwrap().contains(':'));
    }

    #[test]
    fn empty_summary_draws_no_bars() {
        let range = ScoreRange::default();
        let set = BoundarySet::with_defaults(Variant::Nine, range);
        let txt = render_histogram(&summarize(&[], &set), range, 12, 3);
        assert!(!txt.contains('#'));
        assert!(txt.starts_with("Histogram: n=0 | average=-"));
    }
}
