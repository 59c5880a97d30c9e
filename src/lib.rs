//! `grade-bands` library crate.
//!
//! The binary (`grades`) is a thin wrapper around this library so that:
//!
//! - the boundary model, assigner and summarizer are testable without a terminal
//! - the CLI and the TUI share one grading pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod grading;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
