//! Input/output helpers.
//!
//! - marks sheet ingest + validation, CSV or workbook (`ingest`)
//! - graded roster export, CSV or `.xlsx` (`export`)
//! - finding gradeable sheets for the open dialog (`discover`)
//! - distribution summary JSON (`summary_json`)

pub mod discover;
pub mod export;
pub mod ingest;
pub mod summary_json;

pub use export::*;
pub use ingest::*;
pub use summary_json::*;
