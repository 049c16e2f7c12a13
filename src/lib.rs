//! Checklist parsing and compliance statistics for shift leader handoffs.
//!
//! Submissions come from a spreadsheet export (see [`loader`]); every
//! statistic is computed by pure functions over that snapshot.

pub mod loader;
pub mod models;
pub mod report;
pub mod stats;
pub mod status;
pub mod taxonomy;
pub mod trends;
