//! Loading report data from JSON or YAML documents
//!
//! Both formats are read into a `serde_json::Value` tree, so the shape
//! rules below apply to either:
//!
//! - a list of mappings becomes one report; headings are the union of the
//!   keys in first-seen order, and rows lacking a key get `MISSING`
//! - a list of lists becomes one report with caller-supplied headings
//! - a mapping of title to list becomes one report per title

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value as Json};

use crate::error::{ReportError, Result};
use crate::output::OutputFormat;
use crate::report::{MultiReport, Report, ReportOptions};
use crate::value::Value;

/// Encoding of an input document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    /// JSON for a `.json` path or content opening with a bracket or brace,
    /// YAML otherwise.
    pub fn detect(path: Option<&Path>, content: &str) -> Self {
        let by_extension = path
            .and_then(Path::extension)
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let by_content = matches!(content.trim_start().chars().next(), Some('[' | '{'));
        if by_extension || by_content {
            InputFormat::Json
        } else {
            InputFormat::Yaml
        }
    }
}

/// Parse a document into a generic tree.
pub fn parse_document(content: &str, format: InputFormat) -> Result<Json> {
    match format {
        InputFormat::Json => serde_json::from_str(content)
            .map_err(|e| ReportError::InvalidInput(format!("invalid JSON: {}", e))),
        InputFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| ReportError::InvalidInput(format!("invalid YAML: {}", e))),
    }
}

/// Headings and rows extracted from a list
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headings: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from a list of mappings or, given headings, a list of
    /// lists.
    pub fn from_list(items: &[Json], headings: Option<&[String]>) -> Result<Self> {
        match headings {
            Some(headings) => Self::from_positional(items, headings),
            None => Self::from_mappings(items),
        }
    }

    fn from_mappings(items: &[Json]) -> Result<Self> {
        let maps: Vec<&Map<String, Json>> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_object().ok_or_else(|| {
                    ReportError::InvalidInput(format!(
                        "item {} is not a mapping; lists of lists need --headings",
                        i
                    ))
                })
            })
            .collect::<Result<_>>()?;

        let mut headings: Vec<String> = Vec::new();
        for map in &maps {
            for key in map.keys() {
                if !headings.contains(key) {
                    headings.push(key.clone());
                }
            }
        }

        let rows = maps
            .iter()
            .map(|map| {
                headings
                    .iter()
                    .map(|h| map.get(h).map(Value::from_json).unwrap_or(Value::Missing))
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(Self { headings, rows })
    }

    fn from_positional(items: &[Json], headings: &[String]) -> Result<Self> {
        let rows = items
            .iter()
            .enumerate()
            .map(|(i, item)| -> Result<Vec<Value>> {
                match item {
                    Json::Array(values) => Ok(values.iter().map(Value::from_json).collect()),
                    Json::Object(map) => Ok(headings
                        .iter()
                        .map(|h| map.get(h).map(Value::from_json).unwrap_or(Value::Missing))
                        .collect()),
                    _ => Err(ReportError::InvalidInput(format!(
                        "item {} is neither a list nor a mapping",
                        i
                    ))),
                }
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            headings: headings.to_vec(),
            rows,
        })
    }

    pub fn into_report(self, options: ReportOptions) -> Result<Report> {
        let mut report = Report::new(self.headings, options)?;
        report.add_rows(self.rows)?;
        Ok(report)
    }
}

/// The contents of an input document
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Single(Table),
    Titled(Vec<(String, Table)>),
}

impl Dataset {
    pub fn from_document(document: &Json, headings: Option<&[String]>) -> Result<Self> {
        match document {
            Json::Array(items) => Ok(Dataset::Single(Table::from_list(items, headings)?)),
            Json::Object(sections) => sections
                .iter()
                .map(|(title, section)| match section {
                    Json::Array(items) => Ok((title.clone(), Table::from_list(items, headings)?)),
                    _ => Err(ReportError::InvalidInput(format!(
                        "section '{}' is not a list",
                        title
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Dataset::Titled),
            _ => Err(ReportError::InvalidInput(
                "expected a list of rows or a mapping of titled lists".to_string(),
            )),
        }
    }

    pub fn load(content: &str, format: InputFormat, headings: Option<&[String]>) -> Result<Self> {
        let document = parse_document(content, format)?;
        Self::from_document(&document, headings)
    }

    /// Build the report(s) this data describes.
    pub fn into_output(self, options: ReportOptions) -> Result<LoadedReport> {
        match self {
            Dataset::Single(table) => Ok(LoadedReport::Single(table.into_report(options)?)),
            Dataset::Titled(sections) => {
                let mut multi = MultiReport::new(options);
                for (title, table) in sections {
                    multi.add_report(title, table.headings, table.rows)?;
                }
                Ok(LoadedReport::Multi(multi))
            }
        }
    }
}

/// A report or collection of reports ready to print
#[derive(Debug, Clone)]
pub enum LoadedReport {
    Single(Report),
    Multi(MultiReport),
}

impl LoadedReport {
    pub fn try_render(&self, format: OutputFormat) -> Result<String> {
        match self {
            LoadedReport::Single(report) => report.try_render(format),
            LoadedReport::Multi(multi) => multi.try_render(format),
        }
    }
}

impl fmt::Display for LoadedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadedReport::Single(report) => write!(f, "{}", report),
            LoadedReport::Multi(multi) => write!(f, "{}", multi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            InputFormat::detect(Some(Path::new("nodes.JSON")), "a: 1"),
            InputFormat::Json
        );
        assert_eq!(InputFormat::detect(None, "  [1, 2]"), InputFormat::Json);
        assert_eq!(InputFormat::detect(None, "- a: 1"), InputFormat::Yaml);
        assert_eq!(
            InputFormat::detect(Some(Path::new("nodes.yaml")), "- a: 1"),
            InputFormat::Yaml
        );
    }

    #[test]
    fn test_headings_are_union_in_first_seen_order() {
        let doc = json!([
            {"name": "x1", "state": "Ready"},
            {"name": "x2", "role": "Compute"},
        ]);
        let dataset = Dataset::from_document(&doc, None).unwrap();
        let table = match dataset {
            Dataset::Single(table) => table,
            other => panic!("unexpected dataset {:?}", other),
        };
        assert_eq!(table.headings, ["name", "state", "role"]);
        assert_eq!(
            table.rows[1],
            [Value::from("x2"), Value::Missing, Value::from("Compute")]
        );
    }

    #[test]
    fn test_positional_rows_need_headings() {
        let doc = json!([["x1", 1], ["x2", 2]]);
        assert!(matches!(
            Dataset::from_document(&doc, None),
            Err(ReportError::InvalidInput(_))
        ));

        let headings = vec!["name".to_string(), "slot".to_string()];
        let dataset = Dataset::from_document(&doc, Some(headings.as_slice())).unwrap();
        assert_eq!(
            dataset,
            Dataset::Single(Table {
                headings: headings.clone(),
                rows: vec![
                    vec![Value::from("x1"), Value::Number(1.0)],
                    vec![Value::from("x2"), Value::Number(2.0)],
                ],
            })
        );
    }

    #[test]
    fn test_yaml_titled_sections() {
        let yaml = "alpha:\n  - node: a1\n    state: up\nbeta:\n  - node: b1\n";
        let dataset = Dataset::load(yaml, InputFormat::Yaml, None).unwrap();
        let sections = match dataset {
            Dataset::Titled(sections) => sections,
            other => panic!("unexpected dataset {:?}", other),
        };
        let titles: Vec<&str> = sections.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(titles, ["alpha", "beta"]);
        assert_eq!(sections[1].1.headings, ["node"]);
    }

    #[test]
    fn test_scalar_document_rejected() {
        assert!(matches!(
            Dataset::load("42", InputFormat::Yaml, None),
            Err(ReportError::InvalidInput(_))
        ));
        assert!(matches!(
            Dataset::load("{\"a\": 1}", InputFormat::Json, None),
            Err(ReportError::InvalidInput(_))
        ));
        assert!(matches!(
            Dataset::load("[1, 2", InputFormat::Json, None),
            Err(ReportError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_wrong_width_positional_row_is_shape_mismatch() {
        let headings = vec!["a".to_string(), "b".to_string()];
        let dataset =
            Dataset::load("[[1, 2], [3]]", InputFormat::Json, Some(headings.as_slice())).unwrap();
        assert!(matches!(
            dataset.into_output(ReportOptions::default()),
            Err(ReportError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_loaded_multi_report_renders_sections() {
        let json = r#"{"alpha": [{"node": "a1"}], "beta": [{"node": "b1"}]}"#;
        let loaded = Dataset::load(json, InputFormat::Json, None)
            .unwrap()
            .into_output(ReportOptions {
                print_format: OutputFormat::Json,
                ..Default::default()
            })
            .unwrap();
        let parsed: Json = serde_json::from_str(&loaded.to_string()).unwrap();
        assert_eq!(
            parsed,
            json!({"alpha": [{"node": "a1"}], "beta": [{"node": "b1"}]})
        );
    }
}
