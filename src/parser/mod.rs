//! Parser for the filter query language

pub mod grammar;

pub use grammar::{filter_rows, parse_filter, parse_multiple, FilterParser};
