//! In-memory tabular data model for the visualization pipeline: typed values,
//! per-column kind inference, CSV ingestion, row filtering through a small
//! predicate language, and group-by partitioning.

pub mod query;
pub mod read;
pub mod table;
pub mod value;

pub use table::{Column, Table};
pub use value::{ColumnKind, Value};
