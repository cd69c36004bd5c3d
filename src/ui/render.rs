// JamfLens - ui/render.rs
//
// Text rendering of the two pages, the filter options and load errors.
// Renders only what the reports already hold; no classification is
// recomputed here.

use crate::core::filter::FilterOptions;
use crate::core::model::{Column, EnrichedBatch, EnrichedRecord};
use crate::core::report::{InventoryReport, WarrantyReport};
use crate::ui::table::{bar_chart, TextTable};
use crate::util::error::IngestError;
use std::fmt::Write as _;

/// Width of the longest bar in summary charts.
const CHART_WIDTH: usize = 40;

/// Marker shown in the first column of a stale inventory row.
const STALE_MARKER: &str = "!";

fn cells(record: &EnrichedRecord, columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .map(|c| record.text(*c).map(|v| v.into_owned()).unwrap_or_default())
        .collect()
}

fn more_rows_note(out: &mut String, shown: usize, total: usize) {
    if total > shown {
        let _ = writeln!(out, "... {} more row(s) not shown", total - shown);
    }
}

fn batch_line(out: &mut String, batch: &EnrichedBatch) {
    let _ = writeln!(
        out,
        "{} record(s), as of {}",
        batch.len(),
        batch.as_of.format("%Y-%m-%d %H:%M UTC")
    );
}

/// Inventory page: check-in chart, then the filtered table with stale rows
/// flagged.
pub fn render_inventory(report: &InventoryReport<'_>, max_rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Inventory ==");
    batch_line(&mut out, report.batch);

    if let Some(counts) = report.check_in {
        let _ = writeln!(out, "\nCheck-in status ({} device(s))", counts.total());
        out.push_str(&bar_chart(&counts.buckets(), CHART_WIDTH));
    }

    let _ = writeln!(
        out,
        "\n{} matching device(s), {} not checked in for 30+ days",
        report.len(),
        report.stale_count()
    );
    if report.is_empty() {
        return out;
    }

    let headers = std::iter::once("").chain(report.display_columns.iter().map(|c| c.header()));
    let mut table = TextTable::new(headers);
    for (record, stale) in report.rows().take(max_rows) {
        let marker = if stale { STALE_MARKER } else { "" };
        let mut row = vec![marker.to_string()];
        row.extend(cells(record, &report.display_columns));
        table.push_row(row);
    }
    out.push_str(&table.render());
    more_rows_note(&mut out, table.len(), report.len());
    out
}

/// Warranty page: status chart for the selected department, then the
/// expired devices.
pub fn render_warranty(report: &WarrantyReport<'_>, department: &str, max_rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Warranty ({department}) ==");
    batch_line(&mut out, report.batch);

    let Some(counts) = report.counts else {
        let _ = writeln!(out, "\nNo warranty information in this batch.");
        return out;
    };

    let _ = writeln!(out, "\nWarranty status ({} device(s))", counts.total());
    out.push_str(&bar_chart(&counts.buckets(), CHART_WIDTH));

    let _ = writeln!(out, "\n{} device(s) with expired warranty", report.expired.len());
    if report.expired.is_empty() {
        return out;
    }

    let mut table = TextTable::new(report.display_columns.iter().map(|c| c.header()));
    for record in report.expired_rows().take(max_rows) {
        table.push_row(cells(record, &report.display_columns));
    }
    out.push_str(&table.render());
    more_rows_note(&mut out, table.len(), report.expired.len());
    out
}

/// The selectable values for each filter control.
pub fn render_options(options: &FilterOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Department:       {}", options.departments.join(", "));
    let _ = writeln!(out, "Managed:          {}", options.managed.join(", "));
    let _ = writeln!(out, "Operating System: {}", options.operating_systems.join(", "));
    out
}

/// One line per dropped file.
pub fn render_load_errors(errors: &[IngestError]) -> String {
    let mut out = String::new();
    for e in errors {
        let _ = writeln!(out, "Skipped {}: {e}", e.source_name());
    }
    out
}
