//! A collection of reports rendered together

use std::fmt;

use crate::error::Result;
use crate::output::formatter::{format_document, Document};
use crate::output::OutputFormat;
use crate::report::options::ReportOptions;
use crate::report::table::Report;
use crate::value::{Row, RowData};

#[derive(Debug, Clone, Default)]
pub struct MultiReport {
    /// Template for every report added
    options: ReportOptions,
    print_format: Option<OutputFormat>,
    reports: Vec<Report>,
}

impl MultiReport {
    pub fn new(options: ReportOptions) -> Self {
        Self {
            options,
            print_format: None,
            reports: Vec::new(),
        }
    }

    /// Fix the format used by `Display`, overriding the child reports.
    pub fn set_print_format(&mut self, format: OutputFormat) {
        self.print_format = Some(format);
    }

    /// Add a titled report built from the shared options and return it for
    /// further configuration.
    pub fn add_report<I, S, R>(
        &mut self,
        title: impl Into<String>,
        headings: I,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<&mut Report>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: Into<RowData>,
    {
        let mut options = self.options.clone();
        options.title = Some(title.into());

        let mut report = Report::new(headings, options)?;
        report.add_rows(rows)?;
        log::debug!(
            "Added report '{}' with {} rows",
            report.title().unwrap_or_default(),
            report.len()
        );

        self.reports.push(report);
        let index = self.reports.len() - 1;
        Ok(&mut self.reports[index])
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// The explicit format if set, otherwise the format every child agrees
    /// on. Disagreement falls back to a table.
    pub fn print_format(&self) -> OutputFormat {
        if let Some(format) = self.print_format {
            return format;
        }

        let mut formats = self.reports.iter().map(Report::print_format);
        let first = match formats.next() {
            Some(first) => first,
            None => return self.options.print_format,
        };
        if formats.all(|f| f == first) {
            first
        } else {
            log::warn!("Reports disagree on output format; rendering as {}", OutputFormat::Table);
            OutputFormat::Table
        }
    }

    pub fn try_render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self
                .reports
                .iter()
                .map(|r| r.render(format))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")),
            structured => {
                let processed: Vec<(&str, Vec<Row>)> = self
                    .reports
                    .iter()
                    .map(|r| (r.title().unwrap_or_default(), r.processed_rows()))
                    .collect();

                // Reports sharing a title merge into one section.
                let mut sections: Vec<(&str, Vec<&Row>)> = Vec::new();
                for (title, rows) in &processed {
                    match sections.iter_mut().find(|(t, _)| *t == *title) {
                        Some((_, merged)) => merged.extend(rows.iter()),
                        None => sections.push((*title, rows.iter().collect())),
                    }
                }

                format_document(&Document::Sections(sections), structured)
            }
        }
    }

    /// Render every report. Failures are logged and render as nothing.
    pub fn render(&self, format: OutputFormat) -> String {
        self.try_render(format).unwrap_or_else(|e| {
            log::error!("Unable to render reports: {}", e);
            String::new()
        })
    }
}

impl fmt::Display for MultiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(self.print_format()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::value::Value;

    fn clusters() -> MultiReport {
        let mut multi = MultiReport::new(ReportOptions::default());
        multi
            .add_report("alpha", ["node", "state"], [["a1", "up"], ["a2", "down"]])
            .unwrap();
        multi.add_report("beta", ["node", "state"], [["b1", "up"]]).unwrap();
        multi
    }

    #[test]
    fn test_tables_joined_by_blank_line() {
        let out = clusters().render(OutputFormat::Table);
        let banner = "#".repeat(80);
        assert_eq!(out.matches(&banner).count(), 4);
        assert!(out.contains("+\n\n#"));
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn test_empty_children_skipped_in_tables() {
        let mut multi = clusters();
        multi
            .add_report("gamma", ["node"], Vec::<Vec<Value>>::new())
            .unwrap();
        let out = multi.render(OutputFormat::Table);
        assert!(!out.contains("gamma"));
        assert!(!out.ends_with("\n\n"));
    }

    #[test]
    fn test_json_keyed_by_title() {
        let out = clusters().render(OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({
                "alpha": [{"node": "a1", "state": "up"}, {"node": "a2", "state": "down"}],
                "beta": [{"node": "b1", "state": "up"}],
            })
        );
    }

    #[test]
    fn test_same_title_sections_merge() {
        let mut multi = clusters();
        multi
            .add_report("alpha", ["node", "state"], [["a3", "up"]])
            .unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&multi.render(OutputFormat::Json)).unwrap();
        assert_eq!(parsed["alpha"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_shared_options_apply_to_children() {
        let mut multi = MultiReport::new(ReportOptions {
            filter_strings: vec!["state=up".to_string()],
            ..Default::default()
        });
        multi
            .add_report("alpha", ["node", "state"], [["a1", "up"], ["a2", "down"]])
            .unwrap();
        let out = multi.render(OutputFormat::Yaml);
        assert_eq!(out, "alpha:\n- node: a1\n  state: up");
    }

    #[test]
    fn test_children_configurable_after_adding() {
        let mut multi = clusters();
        multi
            .add_report("gamma", ["node", "state"], [["g1", "up"], ["g2", "down"]])
            .unwrap()
            .options_mut()
            .filter_strings
            .push("state=down".to_string());
        let parsed: serde_json::Value =
            serde_json::from_str(&multi.render(OutputFormat::Json)).unwrap();
        assert_eq!(parsed["gamma"], serde_json::json!([{"node": "g2", "state": "down"}]));
    }

    #[test]
    fn test_add_report_propagates_errors() {
        let mut multi = MultiReport::new(ReportOptions::default());
        let result = multi.add_report("bad", ["a", "a"], Vec::<Vec<Value>>::new());
        assert!(matches!(result, Err(ReportError::DuplicateHeading(_))));
        let result = multi.add_report("bad", ["a", "b"], [["only"]]);
        assert!(matches!(result, Err(ReportError::ShapeMismatch(_))));
        assert!(multi.is_empty());
    }

    #[test]
    fn test_print_format_resolution() {
        let mut multi = MultiReport::new(ReportOptions {
            print_format: OutputFormat::Json,
            ..Default::default()
        });
        assert_eq!(multi.print_format(), OutputFormat::Json);

        multi.add_report("a", ["x"], [["1"]]).unwrap();
        multi
            .add_report("b", ["x"], [["2"]])
            .unwrap()
            .options_mut()
            .print_format = OutputFormat::Yaml;
        assert_eq!(multi.print_format(), OutputFormat::Table);

        multi.set_print_format(OutputFormat::Yaml);
        assert_eq!(multi.print_format(), OutputFormat::Yaml);
        assert!(multi.to_string().starts_with("a:"));
    }
}
