// JamfLens - core/filter.rs
//
// Composable filter engine for enriched device records.
// All active predicates are AND-combined. A predicate whose column is absent
// from the batch is skipped, never excluding anything.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::{CheckInStatus, Column, EnrichedBatch, EnrichedRecord, FieldSet};
use crate::util::constants::{ALL_LABEL, CHECK_IN_THRESHOLD_DAYS, UNMANAGED_LABEL};
use std::collections::BTreeSet;

/// Managed-status constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagedFilter {
    /// Null managed status, or the literal "Unmanaged".
    Unmanaged,
    /// Exact match.
    Exactly(String),
}

impl ManagedFilter {
    /// Build from a selection label. "All" and empty mean no constraint.
    pub fn from_label(label: &str) -> Option<ManagedFilter> {
        match label {
            UNMANAGED_LABEL => Some(ManagedFilter::Unmanaged),
            other => selection(other).map(ManagedFilter::Exactly),
        }
    }

    fn matches(&self, managed_status: Option<&str>) -> bool {
        match self {
            ManagedFilter::Unmanaged => {
                managed_status.map_or(true, |status| status == UNMANAGED_LABEL)
            }
            ManagedFilter::Exactly(want) => managed_status == Some(want.as_str()),
        }
    }
}

/// Complete filter state. All fields are AND-combined when applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Department code to match. None = all.
    pub department: Option<String>,

    /// Managed-status constraint. None = all.
    pub managed: Option<ManagedFilter>,

    /// Operating system to match. None = all.
    pub operating_system: Option<String>,

    /// Case-insensitive substring searched across the whole row. Empty = no filter.
    pub search_text: String,
}

impl FilterSpec {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.department.is_none()
            && self.managed.is_none()
            && self.operating_system.is_none()
            && self.search_text.is_empty()
    }

    /// Build from UI selection labels, treating "All" and empty as unset.
    pub fn from_labels(department: &str, managed: &str, operating_system: &str, search: &str) -> Self {
        Self {
            department: selection(department),
            managed: ManagedFilter::from_label(managed),
            operating_system: selection(operating_system),
            search_text: search.to_string(),
        }
    }

    /// The reduced filter used by the warranty view: department only.
    pub fn department_only(department: &str) -> Self {
        Self {
            department: selection(department),
            ..Default::default()
        }
    }
}

/// Map a selection label to a constraint value. "All" and empty are unset.
pub fn selection(label: &str) -> Option<String> {
    if label.is_empty() || label == ALL_LABEL {
        None
    } else {
        Some(label.to_string())
    }
}

/// Apply filters to a batch, returning indices of matching records in their
/// original order.
pub fn apply_filters(batch: &EnrichedBatch, filter: &FilterSpec) -> Vec<usize> {
    if filter.is_empty() {
        return (0..batch.records.len()).collect();
    }

    let text_lower = filter.search_text.to_lowercase();

    let matched: Vec<usize> = batch
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_all(batch, record, filter, &text_lower))
        .map(|(idx, _)| idx)
        .collect();

    tracing::debug!(
        total = batch.records.len(),
        matched = matched.len(),
        department = ?filter.department,
        managed = ?filter.managed,
        os = ?filter.operating_system,
        search = !filter.search_text.is_empty(),
        "Filters applied"
    );

    matched
}

/// Filter a batch into a new, order-preserving batch.
pub fn filter(batch: &EnrichedBatch, spec: &FilterSpec) -> EnrichedBatch {
    batch.subset(&apply_filters(batch, spec))
}

/// Check if a single record matches all active filters.
fn matches_all(
    batch: &EnrichedBatch,
    record: &EnrichedRecord,
    filter: &FilterSpec,
    text_lower: &str,
) -> bool {
    let fields = batch.fields;

    if let Some(ref want) = filter.department {
        if fields.contains(Column::Department)
            && record.derived.department.map(|d| d.code()) != Some(want.as_str())
        {
            return false;
        }
    }

    if let Some(ref managed) = filter.managed {
        if fields.contains(Column::Managed)
            && !managed.matches(record.record.managed_status.as_deref())
        {
            return false;
        }
    }

    if let Some(ref want) = filter.operating_system {
        if fields.contains(Column::OperatingSystem)
            && record.record.operating_system.as_deref() != Some(want.as_str())
        {
            return false;
        }
    }

    if !text_lower.is_empty() && !searchable_text(batch, record).contains(text_lower) {
        return false;
    }

    true
}

/// Flatten a record to lower-cased searchable text: every cell of the
/// batch layout (source, extra and derived), one per line.
pub fn searchable_text(batch: &EnrichedBatch, record: &EnrichedRecord) -> String {
    let mut text = String::new();
    for key in &batch.columns {
        if let Some(value) = record.cell(*key) {
            text.push_str(&value.to_lowercase());
        }
        text.push('\n');
    }
    text
}

/// Whether a record should be highlighted as stale.
///
/// Uses the day count when that column exists (a null count is not stale),
/// falls back to the check-in status, and is never stale when neither column
/// is available. Presentation only; has no effect on filtering.
pub fn is_stale(record: &EnrichedRecord, fields: FieldSet) -> bool {
    if fields.contains(Column::DaysSinceUpdate) {
        record
            .derived
            .days_since_update
            .is_some_and(|days| days >= CHECK_IN_THRESHOLD_DAYS)
    } else if fields.contains(Column::CheckInStatus) {
        record.derived.check_in_status == Some(CheckInStatus::NotCheckedIn)
    } else {
        false
    }
}

/// Selection lists offered to the user, each starting with "All".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub departments: Vec<String>,
    pub managed: Vec<String>,
    pub operating_systems: Vec<String>,
}

impl FilterOptions {
    /// Distinct, sorted, non-null values present in the batch.
    ///
    /// The managed list always ends with "Unmanaged", listed once.
    pub fn from_batch(batch: &EnrichedBatch) -> Self {
        let mut departments = BTreeSet::new();
        let mut managed = BTreeSet::new();
        let mut operating_systems = BTreeSet::new();

        for record in &batch.records {
            if let Some(d) = record.derived.department {
                departments.insert(d.code().to_string());
            }
            if let Some(ref m) = record.record.managed_status {
                if m != UNMANAGED_LABEL {
                    managed.insert(m.clone());
                }
            }
            if let Some(ref os) = record.record.operating_system {
                operating_systems.insert(os.clone());
            }
        }

        let with_all = |values: BTreeSet<String>| {
            std::iter::once(ALL_LABEL.to_string())
                .chain(values)
                .collect::<Vec<_>>()
        };

        let mut managed = with_all(managed);
        managed.push(UNMANAGED_LABEL.to_string());

        Self {
            departments: with_all(departments),
            managed,
            operating_systems: with_all(operating_systems),
        }
    }
}
