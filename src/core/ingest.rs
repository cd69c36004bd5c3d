// JamfLens - core/ingest.rs
//
// Delimited-text ingestion: one uploaded file -> `Table`, many tables ->
// one concatenated `Batch`.
//
// Per-file failures (unreadable bytes, malformed CSV, empty file, ragged
// rows) drop only that file; the batch proceeds with whatever succeeded.
// Empty cells and the usual "no value" spellings (NA, N/A, null, NaN...)
// become null. Date cells that cannot be parsed become null.

use crate::core::dates::parse_timestamp;
use crate::core::model::{
    Batch, BatchId, CheckInStatus, Column, ColumnKey, Department, Record, WarrantyStatus,
};
use crate::util::constants::NULL_CELL_TOKENS;
use crate::util::error::IngestError;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Read;

/// One uploaded file: a display name and its raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A parsed file: header-derived schema plus rows of nullable cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub source_name: String,
    pub headers: Vec<String>,
    /// Every row has exactly `headers.len()` cells; short rows are padded.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Parse one delimited file with a header row.
pub fn read_table<R: Read>(reader: R, source_name: &str) -> Result<Table, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let raw_headers = csv_reader
        .headers()
        .map_err(|e| IngestError::Csv {
            source_name: source_name.to_string(),
            source: e,
        })?
        .clone();

    if raw_headers.is_empty() || raw_headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::Empty {
            source_name: source_name.to_string(),
        });
    }

    let headers = dedupe_headers(raw_headers.iter());
    let width = headers.len();
    let mut rows = Vec::new();

    for result in csv_reader.records() {
        let record = result.map_err(|e| IngestError::Csv {
            source_name: source_name.to_string(),
            source: e,
        })?;

        if record.len() > width {
            return Err(IngestError::TooManyFields {
                source_name: source_name.to_string(),
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: width,
                found: record.len(),
            });
        }

        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|cell| (!is_null_cell(cell)).then(|| cell.to_string()))
            .collect();
        row.resize(width, None);
        rows.push(row);
    }

    tracing::debug!(
        file = source_name,
        columns = width,
        rows = rows.len(),
        "Parsed table"
    );

    Ok(Table {
        source_name: source_name.to_string(),
        headers,
        rows,
    })
}

fn is_null_cell(cell: &str) -> bool {
    cell.is_empty() || NULL_CELL_TOKENS.contains(&cell)
}

/// Repeated header names get a `.N` suffix so each column stays addressable.
fn dedupe_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for header in raw {
        let mut candidate = header.to_string();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{header}.{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}

/// Parse and concatenate every upload, in order.
///
/// Returns the batch and one error per file that was dropped. A batch with
/// no readable files is empty, not an error.
pub fn load_batch(uploads: &[Upload]) -> (Batch, Vec<IngestError>) {
    let mut tables = Vec::new();
    let mut errors = Vec::new();

    for upload in uploads {
        match read_table(upload.bytes.as_slice(), &upload.name) {
            Ok(table) => tables.push(table),
            Err(e) => {
                tracing::warn!(file = %upload.name, error = %e, "Dropping unreadable file from batch");
                errors.push(e);
            }
        }
    }

    let mut batch = concat_tables(tables);
    batch.id = batch_identity(uploads);

    tracing::info!(
        batch = %batch.id,
        files = uploads.len(),
        loaded = batch.sources.len(),
        failed = errors.len(),
        records = batch.records.len(),
        "Batch loaded"
    );

    (batch, errors)
}

/// Concatenate parsed tables into one batch, preserving row order.
pub fn concat_tables(tables: Vec<Table>) -> Batch {
    let mut batch = Batch::default();

    for table in tables {
        let keys: Vec<ColumnKey> = table
            .headers
            .iter()
            .map(|h| register_column(&mut batch, h))
            .collect();

        for row in table.rows {
            let mut record = Record::default();
            for (key, value) in keys.iter().zip(row) {
                assign(&mut record, *key, value);
            }
            batch.records.push(record);
        }
        batch.sources.push(table.source_name);
    }

    let extra_width = batch.extra_columns.len();
    for record in &mut batch.records {
        record.extra.resize(extra_width, None);
    }

    batch
}

fn register_column(batch: &mut Batch, header: &str) -> ColumnKey {
    let key = match Column::from_header(header) {
        Some(column) => {
            batch.fields.insert(column);
            ColumnKey::Known(column)
        }
        None => {
            let idx = match batch.extra_columns.iter().position(|h| h == header) {
                Some(idx) => idx,
                None => {
                    batch.extra_columns.push(header.to_string());
                    batch.extra_columns.len() - 1
                }
            };
            ColumnKey::Extra(idx)
        }
    };
    if !batch.columns.contains(&key) {
        batch.columns.push(key);
    }
    key
}

fn assign(record: &mut Record, key: ColumnKey, value: Option<String>) {
    let column = match key {
        ColumnKey::Known(column) => column,
        ColumnKey::Extra(idx) => {
            if record.extra.len() <= idx {
                record.extra.resize(idx + 1, None);
            }
            record.extra[idx] = value;
            return;
        }
    };

    match column {
        Column::ComputerName => record.computer_name = value,
        Column::SerialNumber => record.serial_number = value,
        Column::Username => record.username = value,
        Column::OperatingSystem => record.operating_system = value,
        Column::Managed => record.managed_status = value,
        Column::LastInventoryUpdate => {
            record.last_inventory_update = value.as_deref().and_then(parse_timestamp);
        }
        Column::WarrantyExpiration => {
            record.warranty_expiration = value.as_deref().and_then(parse_timestamp);
        }
        Column::Department => {
            record.carried.department = value.as_deref().and_then(|v| Department::from_code(v.trim()));
        }
        Column::DaysSinceUpdate => {
            record.carried.days_since_update = value.as_deref().and_then(parse_day_count);
        }
        Column::CheckInStatus => {
            record.carried.check_in_status = value.as_deref().and_then(CheckInStatus::from_label);
        }
        Column::DaysUntilExpiration => {
            record.carried.days_until_expiration = value.as_deref().and_then(parse_day_count);
        }
        Column::WarrantyStatus => {
            record.carried.warranty_status = value.as_deref().and_then(WarrantyStatus::from_label);
        }
    }
}

/// Day counts may arrive as `40` or as `40.0` (a float column with gaps).
fn parse_day_count(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}

/// Identity of a batch: names and bytes of every upload, in order.
pub fn batch_identity(uploads: &[Upload]) -> BatchId {
    let mut hasher = DefaultHasher::new();
    uploads.len().hash(&mut hasher);
    for upload in uploads {
        upload.name.hash(&mut hasher);
        upload.bytes.hash(&mut hasher);
    }
    BatchId(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const HEADER: &str = "Computer Name,Serial Number,Username,Operating System,Last Inventory Update,Managed,Warranty Expiration\n";

    #[test]
    fn test_read_table_pads_short_rows_and_nulls_empty_cells() {
        let csv = "a,b,c\n1,,3\n4\n";
        let table = read_table(csv.as_bytes(), "t.csv").unwrap();
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(
            table.rows,
            vec![
                vec![Some("1".into()), None, Some("3".into())],
                vec![Some("4".into()), None, None],
            ]
        );
    }

    #[test]
    fn test_read_table_nulls_missing_value_tokens() {
        let csv = "Computer Name,Managed,Username\nPRO-01,N/A,NA\nSEM-02,null,NaN\nSTU-03,Managed,Nathan\n";
        let table = read_table(csv.as_bytes(), "na.csv").unwrap();
        assert_eq!(
            table.rows,
            vec![
                vec![Some("PRO-01".into()), None, None],
                vec![Some("SEM-02".into()), None, None],
                vec![Some("STU-03".into()), Some("Managed".into()), Some("Nathan".into())],
            ]
        );
        // Only exact spellings count.
        let table = read_table("a,b
 n/a,Null
".as_bytes(), "t.csv").unwrap();
        assert_eq!(table.rows, vec![vec![Some(" n/a".into()), Some("Null".into())]]);
    }

    #[test]
    fn test_read_table_rejects_long_rows() {
        let csv = "a,b\n1,2\n3,4,5\n";
        let err = read_table(csv.as_bytes(), "bad.csv").unwrap_err();
        assert!(
            matches!(err, IngestError::TooManyFields { expected: 2, found: 3, .. }),
            "got {err:?}"
        );
        assert_eq!(err.source_name(), "bad.csv");
    }

    #[test]
    fn test_read_table_empty_file() {
        let err = read_table("".as_bytes(), "empty.csv").unwrap_err();
        assert!(matches!(err, IngestError::Empty { .. }), "got {err:?}");
    }

    #[test]
    fn test_read_table_invalid_utf8() {
        let bytes: &[u8] = b"a,b\n\xff\xfe,1\n";
        let err = read_table(bytes, "bin.csv").unwrap_err();
        assert!(matches!(err, IngestError::Csv { .. }), "got {err:?}");
    }

    #[test]
    fn test_duplicate_headers_are_suffixed() {
        let table = read_table("x,x,x\n1,2,3\n".as_bytes(), "d.csv").unwrap();
        assert_eq!(table.headers, vec!["x", "x.1", "x.2"]);
    }

    #[test]
    fn test_load_batch_concatenates_in_order_and_drops_bad_files() {
        let first = format!("{HEADER}PRO-01,S1,alice,macOS,2024-05-01 10:00:00,Managed,2026-01-01\n");
        let second = format!("{HEADER}STU-02,S2,bob,macOS,not a date,,\n");
        let uploads = vec![
            Upload::new("one.csv", first),
            Upload::new("broken.csv", "a,b\n1,2,3\n"),
            Upload::new("two.csv", second),
        ];

        let (batch, errors) = load_batch(&uploads);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].source_name(), "broken.csv");
        assert_eq!(batch.sources, vec!["one.csv", "two.csv"]);
        assert_eq!(batch.len(), 2);

        let names: Vec<_> = batch
            .records
            .iter()
            .map(|r| r.computer_name.as_deref())
            .collect();
        assert_eq!(names, vec![Some("PRO-01"), Some("STU-02")]);

        assert_eq!(
            batch.records[0].last_inventory_update,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(batch.records[1].last_inventory_update, None);
        assert_eq!(batch.records[1].managed_status, None);
        assert!(batch.fields.contains(Column::WarrantyExpiration));
        assert!(!batch.fields.contains(Column::Department));
    }

    #[test]
    fn test_load_batch_with_no_readable_files_is_empty() {
        let (batch, errors) = load_batch(&[Upload::new("x.csv", "")]);
        assert!(batch.is_empty());
        assert!(batch.fields.is_empty());
        assert_eq!(errors.len(), 1);

        let (batch, errors) = load_batch(&[]);
        assert!(batch.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_extra_columns_union_across_files() {
        let uploads = vec![
            Upload::new("a.csv", "Computer Name,Asset Tag\nPRO-1,A1\n"),
            Upload::new("b.csv", "Building,Computer Name\nNorth,SEM-2\n"),
        ];
        let (batch, _) = load_batch(&uploads);
        assert_eq!(batch.extra_columns, vec!["Asset Tag", "Building"]);
        assert_eq!(
            batch.columns,
            vec![
                ColumnKey::Known(Column::ComputerName),
                ColumnKey::Extra(0),
                ColumnKey::Extra(1),
            ]
        );
        assert_eq!(batch.records[0].extra, vec![Some("A1".into()), None]);
        assert_eq!(batch.records[1].extra, vec![None, Some("North".into())]);
    }

    #[test]
    fn test_derived_columns_are_carried_typed() {
        let csv = "Department,Days Since Update,Check-In Status,Warranty Status\n\
                   SEM,41.0,Not checked in (30+ days),Expired\n\
                   XYZ,,bogus,\n";
        let (batch, _) = load_batch(&[Upload::new("export.csv", csv)]);
        let first = &batch.records[0].carried;
        assert_eq!(first.department, Some(Department::Sem));
        assert_eq!(first.days_since_update, Some(41));
        assert_eq!(first.check_in_status, Some(CheckInStatus::NotCheckedIn));
        assert_eq!(first.warranty_status, Some(WarrantyStatus::Expired));

        let second = &batch.records[1].carried;
        assert_eq!(second.department, None);
        assert_eq!(second.check_in_status, None);
    }

    #[test]
    fn test_batch_identity_tracks_content() {
        let a = vec![Upload::new("a.csv", "x\n1\n")];
        let b = vec![Upload::new("a.csv", "x\n2\n")];
        assert_eq!(batch_identity(&a), batch_identity(&a.clone()));
        assert_ne!(batch_identity(&a), batch_identity(&b));
    }

    #[test]
    fn test_parse_day_count() {
        assert_eq!(parse_day_count("40"), Some(40));
        assert_eq!(parse_day_count("-3.0"), Some(-3));
        assert_eq!(parse_day_count("2.5"), None);
        assert_eq!(parse_day_count("nan"), None);
    }
}
