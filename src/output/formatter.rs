//! Output formatting

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{ReportError, Result};
use crate::output::human::{format_table, TableStyle};
use crate::output::json::format_json;
use crate::output::yaml::format_yaml;
use crate::value::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" | "pretty" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(ReportError::InvalidInput(format!(
                "Unknown output format: {}",
                other
            ))),
        }
    }
}

/// Root of a structured (JSON/YAML) document
#[derive(Debug)]
pub enum Document<'a> {
    /// A bare list of rows
    Rows(&'a [Row]),
    /// Row lists keyed by title, in insertion order
    Sections(Vec<(&'a str, Vec<&'a Row>)>),
}

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Document::Rows(rows) => serializer.collect_seq(rows.iter()),
            Document::Sections(sections) => {
                let mut map = serializer.serialize_map(Some(sections.len()))?;
                for (title, rows) in sections {
                    map.serialize_entry(title, rows)?;
                }
                map.end()
            }
        }
    }
}

/// Render a document in a structured format. Tables are rendered per
/// section by the report itself, so `Table` is not accepted here.
pub fn format_document(document: &Document<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => format_json(document),
        OutputFormat::Yaml => format_yaml(document),
        OutputFormat::Table => Err(ReportError::Serialization(
            "tables are not a structured document format".to_string(),
        )),
    }
}

/// Render rows with an optional title in any format.
pub fn format_rows(
    title: Option<&str>,
    rows: &[Row],
    format: OutputFormat,
    style: &TableStyle,
) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(title, rows, style)),
        structured => {
            let document = match title {
                Some(title) => Document::Sections(vec![(title, rows.iter().collect())]),
                None => Document::Rows(rows),
            };
            format_document(&document, structured)
        }
    }
}
