// JamfLens - core/enrich.rs
//
// Enrichment stage: a pure function of (batch, now) that adds Department,
// Days Since Update, Check-In Status, Days Until Expiration and Warranty
// Status to every record.
//
// A derived column is computed only when its source column is present in
// the batch. Otherwise any value the input file already carried for that
// column is passed through, and the column is simply unavailable if there
// was none. Source fields are never modified.

use crate::core::dates::whole_days_between;
use crate::core::model::{
    Batch, CheckInStatus, Column, ColumnKey, Department, Derived, EnrichedBatch, EnrichedRecord,
    FieldSet, Record, WarrantyStatus,
};
use crate::util::constants::{CHECK_IN_THRESHOLD_DAYS, EXPIRING_SOON_THRESHOLD_DAYS};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Leading department code of a computer name, if it is one of the known set.
pub fn extract_department(computer_name: &str) -> Option<Department> {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX.get_or_init(|| {
        let codes: Vec<&str> = Department::all().iter().map(|d| d.code()).collect();
        Regex::new(&format!("^({})", codes.join("|"))).expect("department prefix regex")
    });
    re.captures(computer_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Department::from_code(m.as_str()))
}

/// Check-in bucket for a day count. A missing count is not a recent check-in.
pub fn classify_check_in(days_since_update: Option<i64>) -> CheckInStatus {
    match days_since_update {
        Some(days) if days < CHECK_IN_THRESHOLD_DAYS => CheckInStatus::CheckedIn,
        _ => CheckInStatus::NotCheckedIn,
    }
}

/// Warranty bucket for a day count. First match wins: null, then expired,
/// then expiring soon, then valid.
pub fn classify_warranty(days_until_expiration: Option<i64>) -> Option<WarrantyStatus> {
    let days = days_until_expiration?;
    if days < 0 {
        Some(WarrantyStatus::Expired)
    } else if days <= EXPIRING_SOON_THRESHOLD_DAYS {
        Some(WarrantyStatus::ExpiringSoon)
    } else {
        Some(WarrantyStatus::Valid)
    }
}

/// Derived columns available after enriching a batch with `fields`.
pub fn enriched_fields(fields: FieldSet) -> FieldSet {
    let derived: FieldSet = Column::DERIVED
        .into_iter()
        .filter(|c| c.source_of().is_some_and(|src| fields.contains(src)))
        .collect();
    fields.union(derived)
}

/// Derived fields for one record.
pub fn derive(record: &Record, fields: FieldSet, now: DateTime<Utc>) -> Derived {
    let mut derived = Derived::default();

    if fields.contains(Column::ComputerName) {
        derived.department = record.computer_name.as_deref().and_then(extract_department);
    } else {
        derived.department = record.carried.department;
    }

    if fields.contains(Column::LastInventoryUpdate) {
        let days = record
            .last_inventory_update
            .map(|ts| whole_days_between(ts, now));
        derived.days_since_update = days;
        derived.check_in_status = Some(classify_check_in(days));
    } else {
        derived.days_since_update = record.carried.days_since_update;
        derived.check_in_status = record.carried.check_in_status;
    }

    if fields.contains(Column::WarrantyExpiration) {
        let days = record
            .warranty_expiration
            .map(|ts| whole_days_between(now, ts));
        derived.days_until_expiration = days;
        derived.warranty_status = classify_warranty(days);
    } else {
        derived.days_until_expiration = record.carried.days_until_expiration;
        derived.warranty_status = record.carried.warranty_status;
    }

    derived
}

/// Enrich a sequence of records. Output order matches input order.
pub fn enrich_records(
    records: &[Record],
    fields: FieldSet,
    now: DateTime<Utc>,
) -> Vec<EnrichedRecord> {
    records
        .iter()
        .map(|record| EnrichedRecord {
            record: record.clone(),
            derived: derive(record, fields, now),
        })
        .collect()
}

/// Enrich a whole batch against an explicit `now`.
///
/// Empty input yields an empty batch. The input is not modified.
pub fn enrich(batch: &Batch, now: DateTime<Utc>) -> EnrichedBatch {
    let fields = enriched_fields(batch.fields);

    let mut columns = batch.columns.clone();
    for column in Column::DERIVED {
        let key = ColumnKey::Known(column);
        if fields.contains(column) && !columns.contains(&key) {
            columns.push(key);
        }
    }

    let records = enrich_records(&batch.records, batch.fields, now);

    tracing::debug!(
        batch = %batch.id,
        records = records.len(),
        as_of = %now,
        department = fields.contains(Column::Department),
        check_in = fields.contains(Column::CheckInStatus),
        warranty = fields.contains(Column::WarrantyStatus),
        "Batch enriched"
    );

    EnrichedBatch {
        batch_id: batch.id,
        as_of: now,
        columns,
        extra_columns: batch.extra_columns.clone(),
        fields,
        records,
    }
}
