//! Per-column, per-group feature statistics for the visualization overview.
//!
//! Each column kind has a dedicated collector (`new` → `process_value` →
//! `finish`); [`summary::build_statistics`] runs them over a grouped table
//! and produces the wire-format [`defs::FeatureStatisticsList`].

pub mod boolean;
pub mod categorical;
pub mod defs;
pub mod numeric;
pub mod summary;

pub use summary::build_statistics;
