//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments into a `GradingConfig`
//! - dispatches to the TUI or the batch commands
//! - prints tables/plots and writes exports

use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use crate::cli::{BoundaryArgs, Command, GradeArgs, SummaryArgs, TuiArgs};
use crate::domain::{GradingConfig, ScoreRange};
use crate::error::AppError;
use crate::grading::parse_boundary_list;
use crate::logging::LogMode;

pub mod pipeline;

/// Entry point for the `grades` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `grades` and `grades -i marks.csv` to behave like `grades tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let mode = match cli.command {
        Command::Tui(_) => LogMode::Interactive,
        Command::Grade(_) | Command::Summary(_) => LogMode::Batch,
    };
    let _log_guard = crate::logging::init(mode);

    let result = match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Grade(args) => handle_grade(args),
        Command::Summary(args) => handle_summary(args),
    };

    if let Err(err) = &result {
        error!(kind = ?err.kind(), exit_code = err.exit_code(), "{}", err.message());
    }
    result
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let mut config = base_config(&args.bounds)?;
    config.input = args.input;
    config.output = args.output;
    config.debounce = Duration::from_millis(args.debounce_ms);
    config.demo_count = args.demo;
    config.demo_seed = args.seed;

    let session = pipeline::load_session(&config)?;
    crate::tui::run(config, session)
}

fn handle_grade(args: GradeArgs) -> Result<(), AppError> {
    let config = grade_config_from_args(&args)?;
    let run = pipeline::run_grade(&config, &args.input)?;

    let written =
        crate::io::export::write_graded_sheet(&args.output, &run.roster, &run.boundaries, config.sort_output)?;

    println!("{}", crate::report::format_boundaries(&run.boundaries));
    println!("{}", crate::report::format_summary_table(&run.summary));
    if !run.roster.row_errors.is_empty() {
        eprintln!(
            "{} row(s) without a usable mark (exported as \"{}\"):",
            run.roster.row_errors.len(),
            crate::domain::NO_GRADE
        );
        eprint!("{}", crate::report::format_row_errors(&run.roster));
    }
    println!("Wrote {written} rows to {}", args.output.display());

    Ok(())
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let config = summary_config_from_args(&args)?;
    let run = pipeline::run_grade(&config, &args.input)?;

    println!("{}", crate::report::format_boundaries(&run.boundaries));
    println!("{}", crate::report::format_summary_table(&run.summary));

    if config.plot {
        let plot = crate::plot::render_histogram(
            &run.summary,
            run.boundaries.range(),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if config.top_n > 0 {
        println!(
            "{}",
            crate::report::format_roster(&run.roster, &run.boundaries, Some(config.top_n))
        );
    }

    if !run.roster.row_errors.is_empty() {
        eprint!("{}", crate::report::format_row_errors(&run.roster));
    }

    if let Some(path) = &config.export_json {
        crate::io::summary_json::write_summary_json(path, &run.boundaries, &run.summary)?;
        info!(path = %path.display(), "summary exported");
    }

    Ok(())
}

/// Fold the shared boundary flags into a config.
pub fn base_config(args: &BoundaryArgs) -> Result<GradingConfig, AppError> {
    let range = ScoreRange::new(args.min, args.max)?;
    let boundaries = args
        .boundaries
        .as_deref()
        .map(parse_boundary_list)
        .transpose()?;

    Ok(GradingConfig {
        variant: args.variant,
        range,
        boundaries,
        ..GradingConfig::default()
    })
}

pub fn grade_config_from_args(args: &GradeArgs) -> Result<GradingConfig, AppError> {
    Ok(GradingConfig {
        input: Some(args.input.clone()),
        output: Some(args.output.clone()),
        sort_output: args.sort,
        ..base_config(&args.bounds)?
    })
}

pub fn summary_config_from_args(args: &SummaryArgs) -> Result<GradingConfig, AppError> {
    Ok(GradingConfig {
        input: Some(args.input.clone()),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        top_n: args.top,
        export_json: args.export_json.clone(),
        ..base_config(&args.bounds)?
    })
}

/// Rewrite argv so `grades` defaults to `grades tui`.
///
/// Rules:
/// - `grades`                       -> `grades tui`
/// - `grades -i marks.csv ...`      -> `grades tui -i marks.csv ...`
/// - `grades --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "grade" | "summary");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
