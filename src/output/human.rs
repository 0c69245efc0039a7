//! Human-readable table formatting

use unicode_width::UnicodeWidthStr;

use crate::value::Row;

/// Width of the banner framing a table title
const BANNER_WIDTH: usize = 80;

/// Toggles for table rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStyle {
    /// Omit the title banner and the header row
    pub no_headings: bool,
    /// Omit border lines; separate cells with two spaces
    pub no_borders: bool,
}

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn pad(s: &str, width: usize) -> String {
    let mut padded = s.to_string();
    padded.push_str(&" ".repeat(width.saturating_sub(display_width(s))));
    padded
}

/// Render rows as a fixed-width grid. Zero rows render as nothing.
pub fn format_table(title: Option<&str>, rows: &[Row], style: &TableStyle) -> String {
    let columns = match rows.first() {
        Some(row) => row.columns(),
        None => return String::new(),
    };

    // Each cell may span several lines.
    let mut grid: Vec<Vec<Vec<String>>> = Vec::with_capacity(rows.len() + 1);
    if !style.no_headings {
        grid.push(columns.iter().map(|c| vec![c.clone()]).collect());
    }
    for row in rows {
        grid.push(
            row.values()
                .iter()
                .map(|v| v.to_string().lines().map(str::to_string).collect())
                .collect(),
        );
    }

    let mut widths = vec![0usize; columns.len()];
    for line in &grid {
        for (i, cell) in line.iter().enumerate() {
            for text in cell {
                widths[i] = widths[i].max(display_width(text));
            }
        }
    }

    let mut output = String::new();

    if let Some(title) = title.filter(|_| !style.no_headings) {
        let banner = "#".repeat(BANNER_WIDTH);
        output.push_str(&format!("{}\n{}\n{}\n", banner, title, banner));
    }

    let separator = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    if !style.no_borders {
        output.push_str(&separator);
        output.push('\n');
    }

    for (index, line) in grid.iter().enumerate() {
        let height = line.iter().map(|cell| cell.len().max(1)).max().unwrap_or(1);
        for sub in 0..height {
            let cells: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| pad(cell.get(sub).map(String::as_str).unwrap_or(""), w))
                .collect();
            if style.no_borders {
                output.push_str(cells.join("  ").trim_end());
            } else {
                output.push_str(&format!("| {} |", cells.join(" | ")));
            }
            output.push('\n');
        }

        let is_header = index == 0 && !style.no_headings;
        if is_header && !style.no_borders {
            output.push_str(&separator);
            output.push('\n');
        }
    }

    if !style.no_borders {
        output.push_str(&separator);
        output.push('\n');
    }

    output.trim_end_matches('\n').to_string()
}
