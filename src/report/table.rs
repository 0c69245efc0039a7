//! A single report: headings, rows, and the rules for showing them
//!
//! Rows are validated when they are added. Everything else (sorting,
//! filtering, column selection and pruning) is recomputed from the stored
//! rows on every render, so rendering is repeatable and never mutates the
//! report.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::engine::filter::FilterExpression;
use crate::engine::keys::resolve_key;
use crate::error::{ReportError, Result};
use crate::output::{format_rows, OutputFormat};
use crate::parser::parse_multiple;
use crate::report::options::{ReportOptions, SortKey};
use crate::value::{Row, RowData, Value, ValueKind};

#[derive(Debug, Clone)]
pub struct Report {
    headings: Arc<[String]>,
    rows: Vec<Row>,
    options: ReportOptions,
    /// Combined filter, compiled on first use
    filter: OnceLock<Result<Option<FilterExpression>>>,
}

impl Report {
    /// Create an empty report. Headings must be unique.
    pub fn new<I, S>(headings: I, options: ReportOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headings: Vec<String> = headings.into_iter().map(Into::into).collect();

        let mut seen = HashSet::new();
        for heading in &headings {
            if !seen.insert(heading.as_str()) {
                return Err(ReportError::DuplicateHeading(heading.clone()));
            }
        }

        Ok(Self {
            headings: headings.into(),
            rows: Vec::new(),
            options,
            filter: OnceLock::new(),
        })
    }

    pub fn headings(&self) -> &[String] {
        &self.headings
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn title(&self) -> Option<&str> {
        self.options.title.as_deref()
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Mutable access to the options. The compiled filter is discarded.
    pub fn options_mut(&mut self) -> &mut ReportOptions {
        self.filter = OnceLock::new();
        &mut self.options
    }

    pub fn print_format(&self) -> OutputFormat {
        self.options.print_format
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Validate a row against the headings and store it in heading order.
    pub fn add_row(&mut self, row: impl Into<RowData>) -> Result<()> {
        let row = self.normalize_row(row.into())?;
        self.rows.push(row);
        Ok(())
    }

    /// Add several rows. Nothing is stored unless every row is valid.
    pub fn add_rows<I, R>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<RowData>,
    {
        let normalized = rows
            .into_iter()
            .map(|row| self.normalize_row(row.into()))
            .collect::<Result<Vec<_>>>()?;
        self.rows.extend(normalized);
        Ok(())
    }

    fn normalize_row(&self, data: RowData) -> Result<Row> {
        let values = match data {
            RowData::Positional(values) => {
                if values.len() != self.headings.len() {
                    return Err(ReportError::ShapeMismatch(format!(
                        "row has {} values but there are {} headings",
                        values.len(),
                        self.headings.len()
                    )));
                }
                values
            }
            RowData::Keyed(mut map) => {
                let missing: Vec<&str> = self
                    .headings
                    .iter()
                    .filter(|h| !map.contains_key(h.as_str()))
                    .map(String::as_str)
                    .collect();
                if !missing.is_empty() {
                    return Err(ReportError::ShapeMismatch(format!(
                        "row is missing keys: {}",
                        missing.join(", ")
                    )));
                }
                self.headings
                    .iter()
                    .filter_map(|h| map.remove(h.as_str()))
                    .collect()
            }
        };

        Row::new(
            Arc::clone(&self.headings),
            values.into_iter().map(Value::normalized).collect(),
        )
    }

    /// The combined filter from the configured query strings and predicates,
    /// compiled once against the headings.
    pub fn filter(&self) -> Result<Option<&FilterExpression>> {
        self.filter
            .get_or_init(|| {
                parse_multiple(
                    self.options.filter_strings.as_slice(),
                    &self.headings[..],
                    &self.options.filter_predicates,
                )
            })
            .as_ref()
            .map(Option::as_ref)
            .map_err(Clone::clone)
    }

    fn sort_column(&self) -> Option<usize> {
        let key = self.options.sort_by.as_ref()?;
        let column = match key {
            SortKey::Index(index) if *index < self.headings.len() => Some(*index),
            SortKey::Index(_) => None,
            SortKey::Name(name) => resolve_key(name, &self.headings[..])
                .and_then(|h| self.headings.iter().position(|x| *x == h)),
        };
        if column.is_none() {
            log::warn!(
                "Sort key '{}' does not match any heading ({}); rows are left unsorted",
                key,
                self.headings.join(", ")
            );
        }
        column
    }

    /// Row indices in display order
    fn sorted_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        let column = match self.sort_column() {
            Some(column) => column,
            None => return order,
        };

        let reverse = self.options.reverse;
        let directed = |ordering: Ordering| if reverse { ordering.reverse() } else { ordering };
        let values: Vec<&Value> = self.rows.iter().map(|r| &r.values()[column]).collect();

        if mutually_ordered(&values) {
            order.sort_by(|&a, &b| directed(compare_values(values[a], values[b])));
        } else {
            log::warn!(
                "Values of '{}' are not mutually comparable; sorting by their text instead",
                self.headings[column]
            );
            let text: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            order.sort_by(|&a, &b| directed(text[a].cmp(&text[b])));
        }
        order
    }

    /// Sort the stored rows by the configured sort key.
    pub fn sort(&mut self) {
        let order = self.sorted_order();
        let mut rows: Vec<Option<Row>> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(Some)
            .collect();
        self.rows = order.into_iter().filter_map(|i| rows[i].take()).collect();
    }

    /// Heading indices to display, in heading order
    fn display_columns(&self) -> Vec<usize> {
        let requested = match &self.options.display_headings {
            Some(requested) => requested,
            None => return (0..self.headings.len()).collect(),
        };

        let mut selected: Vec<usize> = Vec::with_capacity(requested.len());
        for candidate in requested {
            let index = resolve_key(candidate, &self.headings[..])
                .and_then(|h| self.headings.iter().position(|x| *x == h));
            match index {
                None => log::warn!(
                    "Display field '{}' does not match any heading ({}); ignoring it",
                    candidate,
                    self.headings.join(", ")
                ),
                Some(index) if selected.contains(&index) => log::warn!(
                    "Display field '{}' duplicates '{}'; showing it once",
                    candidate,
                    self.headings[index]
                ),
                Some(index) => selected.push(index),
            }
        }
        selected.sort_unstable();
        selected
    }

    fn describe(&self) -> String {
        match self.title() {
            Some(title) => format!("report '{}'", title),
            None => "report".to_string(),
        }
    }

    /// Sort, filter and project the stored rows onto the display columns.
    /// A filter that fails to compile or evaluate yields no rows.
    pub fn select_and_filter(&self) -> Vec<Row> {
        let columns = self.display_columns();
        let display: Arc<[String]> = columns.iter().map(|&i| self.headings[i].clone()).collect();

        let filter = match self.filter() {
            Ok(filter) => filter,
            Err(e) => {
                log::error!("Unable to filter {}: {}", self.describe(), e);
                return Vec::new();
            }
        };

        let mut selected = Vec::new();
        for index in self.sorted_order() {
            let row = &self.rows[index];
            if let Some(filter) = filter {
                match filter.evaluate(row) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        log::error!("Unable to filter {}: {}", self.describe(), e);
                        return Vec::new();
                    }
                }
            }
            selected.push(row.project(&display, &columns));
        }
        selected
    }

    /// A heading named exactly, or else the heading `name` abbreviates
    fn heading_for(&self, name: &str) -> Option<String> {
        if self.headings.iter().any(|h| h == name) {
            return Some(name.to_string());
        }
        resolve_key(name, &self.headings[..])
    }

    /// Columns exempt from pruning
    fn forced_columns(&self) -> BTreeSet<String> {
        let mut forced: BTreeSet<String> = self
            .options
            .force_columns
            .iter()
            .filter_map(|c| self.heading_for(c))
            .collect();
        if let Ok(Some(filter)) = self.filter() {
            forced.extend(
                filter
                    .dependent_fields()
                    .iter()
                    .filter_map(|f| self.heading_for(f)),
            );
        }
        forced
    }

    /// Drop columns that are `EMPTY` in every row, then those that are
    /// `MISSING` in every row, unless shown or forced. Rows left with no
    /// columns at all are dropped too.
    pub fn prune_constant_columns(&self, rows: Vec<Row>) -> Vec<Row> {
        let columns: Vec<String> = match rows.first() {
            Some(row) => row.columns().to_vec(),
            None => return rows,
        };

        let mut forced = self.forced_columns();
        // Explicitly requested display columns always survive.
        if self.options.display_headings.is_some() {
            forced.extend(columns.iter().cloned());
        }

        let mut keep: Vec<usize> = (0..columns.len()).collect();
        for (shown, sentinel) in [
            (self.options.show_empty, Value::Empty),
            (self.options.show_missing, Value::Missing),
        ] {
            if shown {
                continue;
            }
            keep.retain(|&i| {
                forced.contains(&columns[i]) || rows.iter().any(|r| r.values()[i] != sentinel)
            });
        }

        if keep.is_empty() {
            return Vec::new();
        }
        if keep.len() == columns.len() {
            return rows;
        }

        let pruned: Arc<[String]> = keep.iter().map(|&i| columns[i].clone()).collect();
        rows.iter().map(|r| r.project(&pruned, &keep)).collect()
    }

    /// Rows exactly as they will be rendered
    pub fn processed_rows(&self) -> Vec<Row> {
        self.prune_constant_columns(self.select_and_filter())
    }

    pub fn try_render(&self, format: OutputFormat) -> Result<String> {
        let rows = self.processed_rows();
        format_rows(
            self.options.printed_title(),
            &rows,
            format,
            &self.options.table_style(),
        )
    }

    /// Render in the given format. Failures are logged and render as
    /// nothing.
    pub fn render(&self, format: OutputFormat) -> String {
        self.try_render(format).unwrap_or_else(|e| {
            log::error!("Unable to render {}: {}", self.describe(), e);
            String::new()
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(self.options.print_format))
    }
}

/// True if every value is of one kind, so they can be ordered directly.
fn mutually_ordered(values: &[&Value]) -> bool {
    let mut kinds = values.iter().map(|v| v.kind());
    match kinds.next() {
        Some(first) => kinds.all(|k| k == first) && first != ValueKind::Null,
        None => true,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
