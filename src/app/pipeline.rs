//! Shared "load and grade" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! config -> boundary set -> roster (sheet or demo) -> summary
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::{Path, PathBuf};

use tracing::info;

use crate::data::{SampleConfig, generate_scores};
use crate::domain::GradingConfig;
use crate::error::AppError;
use crate::grading::{BoundarySet, DistributionSummary, summarize};
use crate::io::ingest::{Roster, load_roster};

/// Where the session's scores came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreSource {
    Sheet(PathBuf),
    Demo { count: usize, seed: u64 },
    /// Nothing loaded yet; the TUI opens its sheet dialog.
    Unloaded,
}

impl ScoreSource {
    pub fn describe(&self) -> String {
        match self {
            ScoreSource::Sheet(path) => path.display().to_string(),
            ScoreSource::Demo { count, seed } => format!("demo ({count} scores, seed {seed})"),
            ScoreSource::Unloaded => "no sheet loaded".to_string(),
        }
    }
}

/// A loaded roster plus the boundaries it will be graded with.
#[derive(Debug, Clone)]
pub struct Session {
    pub source: ScoreSource,
    pub roster: Roster,
    pub boundaries: BoundarySet,
}

/// All computed outputs of a single `grades grade` / `grades summary` run.
#[derive(Debug, Clone)]
pub struct GradeRun {
    pub roster: Roster,
    pub boundaries: BoundarySet,
    pub summary: DistributionSummary,
}

/// Initial boundary set: explicit `--boundaries` or the layout defaults.
pub fn build_boundaries(config: &GradingConfig) -> Result<BoundarySet, AppError> {
    match &config.boundaries {
        Some(values) => BoundarySet::new(config.variant, config.range, values),
        None => Ok(BoundarySet::with_defaults(config.variant, config.range)),
    }
}

/// Load the session roster for the TUI.
///
/// Precedence: `--input`, then `--demo`; with neither the roster starts empty.
pub fn load_session(config: &GradingConfig) -> Result<Session, AppError> {
    let boundaries = build_boundaries(config)?;

    let (source, roster) = match (&config.input, config.demo_count) {
        (Some(path), _) => (ScoreSource::Sheet(path.clone()), load_roster(path, config.range)?),
        (None, Some(count)) => {
            let sample = SampleConfig {
                count,
                seed: config.demo_seed,
                ..SampleConfig::default()
            };
            let scores = generate_scores(&sample, config.range)?;
            let source = ScoreSource::Demo {
                count,
                seed: config.demo_seed,
            };
            (source, Roster::from_scores(&scores))
        }
        (None, None) => (ScoreSource::Unloaded, Roster::from_scores(&[])),
    };

    info!(
        source = %source.describe(),
        variant = boundaries.variant().display_name(),
        scores = roster.rows_used(),
        "session loaded"
    );

    Ok(Session {
        source,
        roster,
        boundaries,
    })
}

/// Load `path`, grade it with the configured boundaries and summarize.
///
/// Fails with `EmptyDataset` when the sheet has no usable marks.
pub fn run_grade(config: &GradingConfig, path: &Path) -> Result<GradeRun, AppError> {
    let boundaries = build_boundaries(config)?;
    let roster = load_roster(path, config.range)?;
    let summary = summarize(&roster.scores(), &boundaries);
    summary.require_scores()?;

    Ok(GradeRun {
        roster,
        boundaries,
        summary,
    })
}
