// JamfLens - core/export.rs
//
// CSV and JSON export of a filtered result set, derived columns included.
// Core layer: writes to any Write trait object; `write_export` is the only
// function that touches the filesystem.
//
// CSV output uses the batch's column layout, so re-ingesting an export yields
// the same source values and, enriched with the same "now", the same derived
// values.

use crate::core::model::EnrichedBatch;
use crate::util::error::ExportError;
use serde_json::{Map, Value};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output format for a result set. Read from config and from `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Export a result set to CSV (UTF-8, header row, empty cell for null).
pub fn export_csv<W: Write>(
    batch: &EnrichedBatch,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    if !batch.columns.is_empty() {
        csv_writer
            .write_record(batch.columns.iter().map(|key| batch.header(*key)))
            .map_err(csv_err)?;
    }

    let mut count = 0;
    for record in &batch.records {
        let row: Vec<String> = batch
            .columns
            .iter()
            .map(|key| record.cell(*key).map(|v| v.into_owned()).unwrap_or_default())
            .collect();
        csv_writer.write_record(&row).map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export a result set to JSON: an array of objects keyed by column header,
/// with `null` for missing values.
pub fn export_json<W: Write>(
    batch: &EnrichedBatch,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let rows: Vec<Value> = batch
        .records
        .iter()
        .map(|record| {
            let mut object = Map::new();
            for key in &batch.columns {
                let value = record
                    .cell(*key)
                    .map(|v| Value::String(v.into_owned()))
                    .unwrap_or(Value::Null);
                object.insert(batch.header(*key).to_string(), value);
            }
            Value::Object(object)
        })
        .collect();

    serde_json::to_writer_pretty(writer, &rows).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(rows.len())
}

/// Write a result set to `path` in the given format.
pub fn write_export(
    batch: &EnrichedBatch,
    path: &Path,
    format: ExportFormat,
) -> Result<usize, ExportError> {
    let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    let count = match format {
        ExportFormat::Csv => export_csv(batch, &mut writer, path)?,
        ExportFormat::Json => export_json(batch, &mut writer, path)?,
    };

    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(
        path = %path.display(),
        format = format.extension(),
        records = count,
        "Export written"
    );
    Ok(count)
}

/// Resolve an export destination: a directory gets the page's default file
/// name, with the extension matching `format`.
pub fn resolve_export_path(target: &Path, default_name: &str, format: ExportFormat) -> PathBuf {
    if target.is_dir() {
        target
            .join(default_name)
            .with_extension(format.extension())
    } else {
        target.to_path_buf()
    }
}
