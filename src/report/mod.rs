//! Reports: tabular data with filtering, sorting and column pruning

pub mod multi;
pub mod options;
pub mod table;

pub use multi::MultiReport;
pub use options::{ReportOptions, SortKey};
pub use table::Report;
