//! Write the distribution summary as JSON.
//!
//! This is a report for downstream tools: a timestamp, the boundaries the
//! summary was computed from, and the per-band rows. It is not read back.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ScoreRange, Variant};
use crate::error::AppError;
use crate::grading::{BoundarySet, DistributionSummary};

#[derive(Debug, Clone, Serialize)]
pub struct BoundaryEntry {
    pub label: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryFile<'a> {
    pub tool: &'static str,
    pub generated_at: DateTime<Utc>,
    pub variant: Variant,
    pub range: ScoreRange,
    pub boundaries: Vec<BoundaryEntry>,
    pub summary: &'a DistributionSummary,
}

impl<'a> SummaryFile<'a> {
    pub fn new(boundaries: &BoundarySet, summary: &'a DistributionSummary) -> Self {
        let entries = boundaries
            .variant()
            .handle_labels()
            .iter()
            .zip(boundaries.values())
            .map(|(&label, &value)| BoundaryEntry { label, value })
            .collect();
        Self {
            tool: "grades",
            generated_at: Utc::now(),
            variant: boundaries.variant(),
            range: boundaries.range(),
            boundaries: entries,
            summary,
        }
    }
}

pub fn write_summary_json(
    path: &Path,
    boundaries: &BoundarySet,
    summary: &DistributionSummary,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::file_io(format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &SummaryFile::new(boundaries, summary))
        .map_err(|e| AppError::file_io(format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}
