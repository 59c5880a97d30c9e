//! The grading core: boundary model, assigner, summarizer and the
//! interaction controller that mediates edits.

pub mod assign;
pub mod boundary;
pub mod controller;
pub mod debounce;
pub mod summary;

pub use assign::{assign, assign_all, band_index};
pub use boundary::{BoundarySet, parse_boundary_list};
pub use controller::{Controller, Edit, Feedback, nearest_difference};
pub use summary::{BandSummary, DistributionSummary, summarize};
