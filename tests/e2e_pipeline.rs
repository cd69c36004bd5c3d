// JamfLens - tests/e2e_pipeline.rs
//
// End-to-end tests for the load, enrich, filter, report and export pipeline.
//
// These tests read real CSV fixtures from disk, walk real directories with
// walkdir, and parse real timestamps with chrono. No mocks. "Now" is pinned
// so every day count below is exact.

use chrono::{DateTime, TimeZone, Utc};
use jamflens::app::load::{collect_inputs, read_uploads};
use jamflens::app::state::AppState;
use jamflens::core::discovery::DiscoveryConfig;
use jamflens::core::enrich::enrich;
use jamflens::core::export::{resolve_export_path, write_export, ExportFormat};
use jamflens::core::filter::{apply_filters, FilterOptions, FilterSpec};
use jamflens::core::ingest::{load_batch, Upload};
use jamflens::core::model::{CheckInStatus, Column, ColumnKey, EnrichedBatch, WarrantyStatus};
use jamflens::core::report::{InventoryReport, Page, WarrantyReport};
use jamflens::util::error::IngestError;
use std::fs;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

/// Load site_a, broken and site_b in that order and enrich against `now()`.
fn load_fleet() -> (EnrichedBatch, Vec<IngestError>) {
    let paths = [
        fixture("site_a.csv"),
        fixture("broken.csv"),
        fixture("site_b.csv"),
    ];
    let (uploads, read_errors) = read_uploads(&paths);
    assert!(read_errors.is_empty());
    let (batch, errors) = load_batch(&uploads);
    (enrich(&batch, now()), errors)
}

fn names(batch: &EnrichedBatch, indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .map(|&i| {
            batch.records[i]
                .record
                .computer_name
                .clone()
                .unwrap_or_default()
        })
        .collect()
}

// =============================================================================
// Ingest
// =============================================================================

#[test]
fn e2e_malformed_file_is_dropped_and_others_kept_in_order() {
    let (batch, errors) = load_fleet();

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], IngestError::TooManyFields { .. }));
    assert!(errors[0].source_name().ends_with("broken.csv"));

    let all: Vec<usize> = (0..batch.len()).collect();
    assert_eq!(
        names(&batch, &all),
        vec![
            "PRO-MBP-001",
            "SEM-MBA-002",
            "STU-IMAC-003",
            "XYZ-LAB-004",
            "DCE-MBP-101",
            "PRO-MBP-102",
        ]
    );
}

#[test]
fn e2e_column_layout_is_union_by_first_appearance() {
    let (batch, _) = load_fleet();

    let headers: Vec<&str> = batch.columns.iter().map(|k| batch.header(*k)).collect();
    assert_eq!(
        headers,
        vec![
            "Computer Name",
            "Serial Number",
            "Username",
            "Operating System",
            "Last Inventory Update",
            "Managed",
            "Warranty Expiration",
            "Asset Tag",
            "Department",
            "Days Since Update",
            "Check-In Status",
            "Days Until Expiration",
            "Warranty Status",
        ]
    );

    // Rows from the file without the extra column read it as null.
    assert_eq!(batch.records[0].cell(ColumnKey::Extra(0)), None);
    assert_eq!(
        batch.records[5].cell(ColumnKey::Extra(0)).as_deref(),
        Some("AT-9002")
    );
}

// =============================================================================
// Enrichment
// =============================================================================

#[test]
fn e2e_enrichment_values() {
    let (batch, _) = load_fleet();
    let d: Vec<_> = batch.records.iter().map(|r| &r.derived).collect();

    // PRO-MBP-001: seen 4 days ago, warranty ended 60.5 days ago.
    assert_eq!(d[0].department.map(|x| x.code()), Some("PRO"));
    assert_eq!(d[0].days_since_update, Some(4));
    assert_eq!(d[0].check_in_status, Some(CheckInStatus::CheckedIn));
    assert_eq!(d[0].days_until_expiration, Some(-61));
    assert_eq!(d[0].warranty_status, Some(WarrantyStatus::Expired));

    // SEM-MBA-002: exactly 90 whole days since update.
    assert_eq!(d[1].days_since_update, Some(90));
    assert_eq!(d[1].check_in_status, Some(CheckInStatus::NotCheckedIn));
    assert_eq!(d[1].days_until_expiration, Some(44));
    assert_eq!(d[1].warranty_status, Some(WarrantyStatus::ExpiringSoon));

    // STU-IMAC-003: date-only value.
    assert_eq!(d[2].days_since_update, Some(1));
    assert_eq!(d[2].warranty_status, Some(WarrantyStatus::Valid));

    // XYZ-LAB-004: unknown prefix, no dates.
    assert_eq!(d[3].department, None);
    assert_eq!(d[3].days_since_update, None);
    assert_eq!(d[3].check_in_status, Some(CheckInStatus::NotCheckedIn));
    assert_eq!(d[3].warranty_status, None);

    // DCE-MBP-101: month-first date; half a day left counts as 0 days.
    assert_eq!(d[4].days_since_update, Some(45));
    assert_eq!(d[4].days_until_expiration, Some(0));
    assert_eq!(d[4].warranty_status, Some(WarrantyStatus::ExpiringSoon));

    // PRO-MBP-102: RFC 3339 timestamp three hours ago.
    assert_eq!(d[5].days_since_update, Some(0));
    assert_eq!(d[5].check_in_status, Some(CheckInStatus::CheckedIn));
}

#[test]
fn e2e_enrichment_is_idempotent_on_its_own_output() {
    let (batch, _) = load_fleet();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("full.csv");
    write_export(&batch, &path, ExportFormat::Csv).unwrap();

    let (uploads, _) = read_uploads(&[path]);
    let (reloaded, errors) = load_batch(&uploads);
    assert!(errors.is_empty());
    let again = enrich(&reloaded, now());

    assert_eq!(again.columns, batch.columns);
    for (a, b) in again.records.iter().zip(&batch.records) {
        assert_eq!(a.derived, b.derived);
    }
}

// =============================================================================
// Filtering and reports
// =============================================================================

#[test]
fn e2e_inventory_filters() {
    let (batch, _) = load_fleet();

    let by_dept = apply_filters(&batch, &FilterSpec::from_labels("PRO", "All", "All", ""));
    assert_eq!(names(&batch, &by_dept), vec!["PRO-MBP-001", "PRO-MBP-102"]);

    let unmanaged = apply_filters(&batch, &FilterSpec::from_labels("All", "Unmanaged", "All", ""));
    assert_eq!(names(&batch, &unmanaged), vec!["SEM-MBA-002", "STU-IMAC-003"]);

    let by_os = apply_filters(&batch, &FilterSpec::from_labels("All", "All", "macOS 14.4", ""));
    assert_eq!(
        names(&batch, &by_os),
        vec!["PRO-MBP-001", "STU-IMAC-003", "DCE-MBP-101"]
    );

    // Search reaches extra columns and derived labels alike.
    let by_tag = apply_filters(&batch, &FilterSpec::from_labels("All", "All", "All", "at-9002"));
    assert_eq!(names(&batch, &by_tag), vec!["PRO-MBP-102"]);
    let by_label = apply_filters(&batch, &FilterSpec::from_labels("All", "All", "All", "EXPIRED"));
    assert_eq!(names(&batch, &by_label), vec!["PRO-MBP-001"]);

    let combined = apply_filters(
        &batch,
        &FilterSpec::from_labels("PRO", "Managed", "macOS 15.0", "c02bbb"),
    );
    assert_eq!(names(&batch, &combined), vec!["PRO-MBP-102"]);

    let nothing = apply_filters(&batch, &FilterSpec::from_labels("SOE", "All", "All", ""));
    assert!(nothing.is_empty());
}

#[test]
fn e2e_missing_value_spellings_count_as_unmanaged() {
    let csv = "Computer Name,Managed,Operating System,Warranty Expiration\n\
               PRO-01,N/A,macOS 14.4,NA\n\
               SEM-02,Managed,NaN,2025-06-01\n\
               STU-03,null,macOS 14.4,2024-12-01\n";
    let (batch, errors) = load_batch(&[Upload::new("na.csv", csv)]);
    assert!(errors.is_empty());
    let batch = enrich(&batch, now());

    let unmanaged = apply_filters(&batch, &FilterSpec::from_labels("All", "Unmanaged", "All", ""));
    assert_eq!(names(&batch, &unmanaged), vec!["PRO-01", "STU-03"]);

    let options = FilterOptions::from_batch(&batch);
    assert_eq!(options.managed, vec!["All", "Managed", "Unmanaged"]);
    assert_eq!(options.operating_systems, vec!["All", "macOS 14.4"]);

    assert_eq!(batch.records[0].derived.warranty_status, None);
    assert_eq!(
        batch.records[2].derived.warranty_status,
        Some(WarrantyStatus::Expired)
    );
}

#[test]
fn e2e_filter_options() {
    let (batch, _) = load_fleet();
    let options = FilterOptions::from_batch(&batch);
    assert_eq!(options.departments, vec!["All", "DCE", "PRO", "SEM", "STU"]);
    assert_eq!(options.managed, vec!["All", "Managed", "Unmanaged"]);
    assert_eq!(
        options.operating_systems,
        vec!["All", "macOS 12.7", "macOS 13.6", "macOS 14.4", "macOS 15.0"]
    );
}

#[test]
fn e2e_inventory_report_counts_and_stale_rows() {
    let (batch, _) = load_fleet();
    let report = InventoryReport::build(&batch, &FilterSpec::default());

    let counts = report.check_in.unwrap();
    assert_eq!((counts.checked_in, counts.not_checked_in), (3, 3));

    // The device with no update date is "Not checked in" but not flagged.
    assert_eq!(report.stale, vec![false, true, false, false, true, false]);
}

#[test]
fn e2e_warranty_report() {
    let (batch, _) = load_fleet();

    let all = WarrantyReport::build(&batch, "All");
    let counts = all.counts.unwrap();
    assert_eq!(counts.expired, 1);
    assert_eq!(counts.expiring_soon, 2);
    assert_eq!(counts.valid, 2);
    assert_eq!(counts.unclassified, 1);
    assert_eq!(names(&batch, &all.expired), vec!["PRO-MBP-001"]);
    assert_eq!(
        all.display_columns,
        vec![
            Column::ComputerName,
            Column::Username,
            Column::Department,
            Column::WarrantyExpiration,
            Column::DaysUntilExpiration,
        ]
    );

    let dce = WarrantyReport::build(&batch, "DCE");
    assert_eq!(dce.counts.unwrap().expiring_soon, 1);
    assert!(dce.expired.is_empty());
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn e2e_export_filtered_inventory_to_directory() {
    let (batch, _) = load_fleet();
    let report = InventoryReport::build(&batch, &FilterSpec::from_labels("PRO", "All", "All", ""));

    let dir = tempfile::tempdir().unwrap();
    let path = resolve_export_path(dir.path(), Page::Inventory.export_file_name(), ExportFormat::Csv);
    assert_eq!(path, dir.path().join("jamf_filtered_inventory.csv"));

    let count = write_export(&report.to_batch(), &path, ExportFormat::Csv).unwrap();
    assert_eq!(count, 2);

    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert!(lines.next().unwrap().ends_with("Days Until Expiration,Warranty Status"));
    assert!(lines.next().unwrap().starts_with("PRO-MBP-001,C02AAA001,alice,macOS 14.4,2025-02-25 08:15:00,Managed,2024-12-31 00:00:00,,PRO,4,"));
    assert!(lines.next().unwrap().contains(",AT-9002,"));
    assert!(lines.next().is_none());
}

#[test]
fn e2e_export_expired_warranty_as_json() {
    let (batch, _) = load_fleet();
    let report = WarrantyReport::build(&batch, "All");

    let dir = tempfile::tempdir().unwrap();
    let path = resolve_export_path(dir.path(), Page::Warranty.export_file_name(), ExportFormat::Json);
    assert_eq!(path, dir.path().join("jamf_expired_warranty.json"));

    write_export(&report.expired_batch(), &path, ExportFormat::Json).unwrap();
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Computer Name"], "PRO-MBP-001");
    assert_eq!(rows[0]["Warranty Status"], "Expired");
    assert_eq!(rows[0]["Days Until Expiration"], "-61");
    assert_eq!(rows[0]["Asset Tag"], serde_json::Value::Null);
}

// =============================================================================
// Directory input and session state
// =============================================================================

#[test]
fn e2e_directory_input_skips_previous_exports() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::copy(fixture("site_b.csv"), root.join("b_site.csv")).unwrap();
    fs::create_dir(root.join("older")).unwrap();
    fs::copy(fixture("site_a.csv"), root.join("older").join("a_site.csv")).unwrap();
    fs::copy(fixture("site_a.csv"), root.join("jamf_filtered_inventory.csv")).unwrap();
    fs::write(root.join("readme.txt"), "not a csv").unwrap();

    let (paths, warnings) = collect_inputs(&[], Some(root), &DiscoveryConfig::default()).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(
        paths,
        vec![root.join("b_site.csv"), root.join("older").join("a_site.csv")]
    );

    let (uploads, errors) = read_uploads(&paths);
    assert!(errors.is_empty());
    let (batch, errors) = load_batch(&uploads);
    assert!(errors.is_empty());
    assert_eq!(batch.len(), 6);
    assert_eq!(batch.records[0].computer_name.as_deref(), Some("DCE-MBP-101"));
}

#[test]
fn e2e_session_state_reuses_enrichment_across_filter_changes() {
    let (uploads, _) = read_uploads(&[fixture("site_a.csv"), fixture("site_b.csv")]);
    let mut state = AppState::new(now());
    state.load(&uploads);

    assert_eq!(state.inventory_report().len(), 6);
    state.inventory_filter = FilterSpec::from_labels("All", "Unmanaged", "All", "");
    assert!(state.is_cached());
    assert_eq!(state.inventory_report().len(), 2);

    state.page = Page::Warranty;
    state.warranty_department = "PRO".to_string();
    assert_eq!(state.export_batch().len(), 1);

    // An empty upload set is valid and yields empty reports.
    state.load(&[]);
    assert!(state.enriched().is_empty());
    assert!(state.warranty_report().counts.is_none());
}
