//! Command-line parsing for the grading tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the grading code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Variant;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "grades", version, about = "Assign letter grades from adjustable boundaries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive boundary editor.
    ///
    /// Handles can be dragged with the mouse, nudged with the arrow keys or
    /// typed in; the histogram and table follow every change.
    Tui(TuiArgs),
    /// Grade a marks sheet and write it back with a `Grade` column.
    Grade(GradeArgs),
    /// Print the grade distribution for a marks sheet.
    Summary(SummaryArgs),
}

/// Options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct BoundaryArgs {
    /// Grading layout.
    #[arg(long, value_enum, default_value_t = Variant::Nine)]
    pub variant: Variant,

    /// Initial boundaries, comma-separated, lowest first (defaults per layout).
    #[arg(long, value_name = "V1,V2,...")]
    pub boundaries: Option<String>,

    /// Lowest possible score.
    #[arg(long, default_value_t = 0.0)]
    pub min: f64,

    /// Highest possible score.
    #[arg(long, default_value_t = 100.0)]
    pub max: f64,
}

#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    /// Marks sheet (CSV or workbook with a `Marks` column). Without it, and
    /// without `--demo`, the TUI starts in its open dialog.
    #[arg(short, long, value_name = "SHEET")]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub bounds: BoundaryArgs,

    /// Where `e` exports the graded sheet (default: graded_<timestamp> in the
    /// input's format). A `.xlsx` path writes a workbook.
    #[arg(short, long, value_name = "SHEET")]
    pub output: Option<PathBuf>,

    /// Quiet period before a drag recomputes the distribution.
    #[arg(long, default_value_t = 40)]
    pub debounce_ms: u64,

    /// Generate this many synthetic scores when no input is given.
    #[arg(long, value_name = "N")]
    pub demo: Option<usize>,

    /// Seed for synthetic scores.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Parser, Clone)]
pub struct GradeArgs {
    /// Marks sheet (CSV or workbook with a `Marks` column).
    #[arg(short, long, value_name = "SHEET")]
    pub input: PathBuf,

    /// Graded output sheet; `.xlsx` writes a workbook, anything else CSV.
    #[arg(short, long, value_name = "SHEET")]
    pub output: PathBuf,

    #[command(flatten)]
    pub bounds: BoundaryArgs,

    /// Order rows by marks, high to low.
    #[arg(long)]
    pub sort: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// Marks sheet (CSV or workbook with a `Marks` column).
    #[arg(short, long, value_name = "SHEET")]
    pub input: PathBuf,

    #[command(flatten)]
    pub bounds: BoundaryArgs,

    /// Render an ASCII histogram below the table.
    #[arg(long)]
    pub plot: bool,

    /// Histogram width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Histogram height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,

    /// List the top-N rows by marks (0 lists none).
    #[arg(long, default_value_t = 0)]
    pub top: usize,

    /// Also write the summary as JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}
