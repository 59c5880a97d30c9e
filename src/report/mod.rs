//! Reporting utilities: formatted tables and roster listings.

pub mod format;

pub use format::*;
