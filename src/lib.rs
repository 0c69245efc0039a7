//! sat-report - a filter query language and tabular report engine
//!
//! Records are collected into a [`Report`] with fixed headings. At render
//! time the report sorts, filters and projects its rows, prunes columns that
//! carry no information, and prints them as a table, JSON or YAML.
//!
//! Filters use a small query language:
//!
//! ```text
//! state=Ready and memory>=256 or role=Service*
//! ```
//!
//! `and` binds tighter than `or`. Keys may be abbreviated; `mem_cap`
//! resolves to `memory_capacity`. String values are case-insensitive
//! wildcard patterns.
//!
//! # Example
//!
//! ```
//! use sat_report::{OutputFormat, Report, ReportOptions};
//!
//! let options = ReportOptions {
//!     filter_strings: vec!["place=m*".to_string()],
//!     ..Default::default()
//! };
//! let mut report = Report::new(["name", "place"], options).unwrap();
//! report.add_rows([["alice", "mars"], ["bob", "venus"]]).unwrap();
//! assert_eq!(
//!     report.render(OutputFormat::Json),
//!     "[\n  {\n    \"name\": \"alice\",\n    \"place\": \"mars\"\n  }\n]"
//! );
//! ```

pub mod cli;
pub mod engine;
pub mod error;
pub mod input;
pub mod output;
pub mod parser;
pub mod report;
pub mod value;

pub use engine::{resolve_key, Comparison, CompareOp, CustomFilter, FilterExpression};
pub use error::{ReportError, Result};
pub use output::OutputFormat;
pub use parser::{filter_rows, parse_filter, parse_multiple};
pub use report::{MultiReport, Report, ReportOptions, SortKey};
pub use value::{Row, RowData, Value, EMPTY, MISSING};
