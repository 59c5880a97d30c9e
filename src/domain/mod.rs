//! Domain types used throughout the grading pipeline.
//!
//! This module defines:
//!
//! - the score range and grading layouts (`ScoreRange`, `Variant`)
//! - derived bands (`Band`) and the `NO_GRADE` sentinel

pub mod types;

pub use types::*;
