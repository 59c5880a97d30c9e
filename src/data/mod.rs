//! Score sources other than a marks sheet.

pub mod sample;

pub use sample::{SampleConfig, generate_scores};
