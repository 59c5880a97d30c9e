//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the boundary model and the summarizer
//! - exported to JSON/CSV
//! - rendered by the CLI and the TUI without conversion

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Sentinel label for scores that no band contains.
///
/// With a valid boundary set every in-range score has a band, so this only
/// shows up for rows whose marks were rejected at ingest.
pub const NO_GRADE: &str = "No Grade";

const NINE_LABELS: [&str; 9] = ["F", "E", "D", "C-", "C", "B-", "B", "A-", "A"];
const NINE_DEFAULTS: [f64; 9] = [0.0, 15.0, 25.0, 40.0, 50.0, 65.0, 75.0, 85.0, 95.0];

const FOUR_HANDLE_LABELS: [&str; 4] = ["D", "C", "B", "A"];
const FOUR_BAND_LABELS: [&str; 5] = ["F", "D", "C", "B", "A"];
const FOUR_DEFAULTS: [f64; 4] = [50.0, 60.0, 75.0, 85.0];

/// Adjacent band pairs whose percentages are displayed as one figure.
///
/// Band 2 (`D`) stands alone. This is a fixed display policy.
const NINE_GROUPS: [&[usize]; 5] = [&[0, 1], &[2], &[3, 4], &[5, 6], &[7, 8]];

/// Closed score range `[min, max]` every score and boundary lives in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self { min: 0.0, max: 100.0 }
    }
}

impl ScoreRange {
    pub fn new(min: f64, max: f64) -> Result<Self, AppError> {
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err(AppError::invalid_configuration(format!(
                "Invalid score range [{min}, {max}]: expected finite values with min < max."
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Which grading layout a boundary set uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Nine cut points, nine bands `F, E, D, C-, C, B-, B, A-, A`.
    ///
    /// Bands are lower-exclusive/upper-inclusive: `(b[i-1], b[i]]` carries
    /// label `i`. Scores at or below `b[0]` are `F`; scores above the top
    /// cut point stay in the top band, which closes at the range maximum.
    Nine,
    /// Four thresholds `D ≤ C ≤ B ≤ A`, five bands `F, D, C, B, A`.
    ///
    /// A score earns the highest label whose threshold it reaches
    /// (`score >= threshold`), otherwise `F`.
    Four,
}

impl Variant {
    pub fn display_name(self) -> &'static str {
        match self {
            Variant::Nine => "nine-band",
            Variant::Four => "four-band",
        }
    }

    /// Number of cut points in the layout.
    pub fn boundary_count(self) -> usize {
        self.handle_labels().len()
    }

    /// Label attached to each cut point, lowest first.
    pub fn handle_labels(self) -> &'static [&'static str] {
        match self {
            Variant::Nine => &NINE_LABELS,
            Variant::Four => &FOUR_HANDLE_LABELS,
        }
    }

    /// Labels of the derived bands, lowest first.
    pub fn band_labels(self) -> &'static [&'static str] {
        match self {
            Variant::Nine => &NINE_LABELS,
            Variant::Four => &FOUR_BAND_LABELS,
        }
    }

    pub fn default_boundaries(self) -> &'static [f64] {
        match self {
            Variant::Nine => &NINE_DEFAULTS,
            Variant::Four => &FOUR_DEFAULTS,
        }
    }

    /// Band groups for the combined percentage column, if the layout has one.
    pub fn percentage_groups(self) -> Option<&'static [&'static [usize]]> {
        match self {
            Variant::Nine => Some(&NINE_GROUPS),
            Variant::Four => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Variant::Nine => Variant::Four,
            Variant::Four => Variant::Nine,
        }
    }
}

/// A derived sub-interval of the score range carrying one label.
///
/// Bands are never stored; they are recomputed from the boundary set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub label: &'static str,
    pub lower: f64,
    pub upper: f64,
    pub lower_closed: bool,
    pub upper_closed: bool,
}

impl Band {
    pub fn contains(&self, v: f64) -> bool {
        let above = if self.lower_closed { v >= self.lower } else { v > self.lower };
        let below = if self.upper_closed { v <= self.upper } else { v < self.upper };
        above && below
    }
}

/// Session configuration assembled from CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingConfig {
    pub variant: Variant,
    pub range: ScoreRange,
    /// Seed values for the handles; `None` means the layout defaults.
    pub boundaries: Option<Vec<f64>>,
    /// Quiet period before a drag recomputes the distribution.
    pub debounce: Duration,

    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub sort_output: bool,

    /// Synthetic score count used when no input sheet is given.
    pub demo_count: Option<usize>,
    pub demo_seed: u64,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub top_n: usize,
    pub export_json: Option<PathBuf>,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Nine,
            range: ScoreRange::default(),
            boundaries: None,
            debounce: Duration::from_millis(40),
            input: None,
            output: None,
            sort_output: false,
            demo_count: None,
            demo_seed: 42,
            plot: false,
            plot_width: 80,
            plot_height: 12,
            top_n: 0,
            export_json: None,
        }
    }
}
