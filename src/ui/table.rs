// JamfLens - ui/table.rs
//
// Plain-text table and bar-chart primitives for terminal output.
// Widths are measured in chars; cells longer than MAX_CELL_WIDTH are
// truncated with a trailing '~'.

use crate::util::constants::MAX_CELL_WIDTH;
use std::fmt::Write as _;

/// Null cells render as an empty string.
pub fn truncate_cell(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
        out.push('~');
        out
    }
}

/// A table built row by row, rendered with left-aligned padded columns.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<S: AsRef<str>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers
                .into_iter()
                .map(|h| truncate_cell(h.as_ref()))
                .collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells.iter().map(|c| truncate_cell(c)).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        write_line(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(&mut out, &rule, &widths);
        for row in &self.rows {
            write_line(&mut out, row, &widths);
        }
        out
    }
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        if i > 0 {
            line.push_str("  ");
        }
        let _ = write!(line, "{cell:<width$}");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Horizontal bar chart of `(label, count)` buckets, scaled to `max_bar`.
pub fn bar_chart(buckets: &[(&str, usize)], max_bar: usize) -> String {
    let label_width = buckets.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let peak = buckets.iter().map(|(_, c)| *c).max().unwrap_or(0);

    let mut out = String::new();
    for (label, count) in buckets {
        let len = if peak == 0 {
            0
        } else {
            // Non-zero buckets always get at least one mark.
            ((count * max_bar) / peak).max(usize::from(*count > 0))
        };
        let line = format!("{label:<label_width$}  {count:>5}  {}", "#".repeat(len));
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
