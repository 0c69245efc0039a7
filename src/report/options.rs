//! Report configuration

use std::fmt;
use std::str::FromStr;

use crate::engine::filter::CustomFilter;
use crate::output::{OutputFormat, TableStyle};

/// Column to sort by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Column name or abbreviation, resolved like filter keys
    Name(String),
    /// Zero-based heading index
    Index(usize),
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SortKey::from(s))
    }
}

/// Digits name an index, anything else a column.
impl From<&str> for SortKey {
    fn from(s: &str) -> Self {
        match s.trim().parse::<usize>() {
            Ok(index) => SortKey::Index(index),
            Err(_) => SortKey::Name(s.to_string()),
        }
    }
}

impl From<usize> for SortKey {
    fn from(index: usize) -> Self {
        SortKey::Index(index)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Name(name) => write!(f, "{}", name),
            SortKey::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// Everything a Report needs to know besides its headings and rows
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub title: Option<String>,
    pub sort_by: Option<SortKey>,
    pub reverse: bool,
    pub no_headings: bool,
    pub no_borders: bool,
    /// Keep columns that are `EMPTY` in every row
    pub show_empty: bool,
    /// Keep columns that are `MISSING` in every row
    pub show_missing: bool,
    /// Columns never pruned, whatever their contents
    pub force_columns: Vec<String>,
    /// Filter queries, combined with AND
    pub filter_strings: Vec<String>,
    /// Predicates from outside the query language, combined with AND
    pub filter_predicates: Vec<CustomFilter>,
    /// Subset of headings to show; `None` shows all of them
    pub display_headings: Option<Vec<String>>,
    pub print_format: OutputFormat,
}

impl ReportOptions {
    pub fn table_style(&self) -> TableStyle {
        TableStyle {
            no_headings: self.no_headings,
            no_borders: self.no_borders,
        }
    }

    /// Title to print, honoring `no_headings`
    pub fn printed_title(&self) -> Option<&str> {
        if self.no_headings {
            None
        } else {
            self.title.as_deref()
        }
    }
}
