// JamfLens - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// A batch carries a fixed set of nullable, recognised fields per record plus
// a `FieldSet` describing which of those columns were actually present in the
// uploaded files. Filters and derivations consult the `FieldSet` instead of
// inspecting rows at runtime.

use crate::util::constants;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// =============================================================================
// Column
// =============================================================================

/// Every column header the engine recognises.
///
/// Source columns come from the inventory export; derived columns are added
/// by enrichment (or carried through from a re-imported export).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    ComputerName,
    SerialNumber,
    Username,
    OperatingSystem,
    LastInventoryUpdate,
    Managed,
    WarrantyExpiration,
    Department,
    DaysSinceUpdate,
    CheckInStatus,
    DaysUntilExpiration,
    WarrantyStatus,
}

impl Column {
    /// Source columns, in the order a Jamf export usually lists them.
    pub const SOURCE: [Column; 7] = [
        Column::ComputerName,
        Column::SerialNumber,
        Column::Username,
        Column::OperatingSystem,
        Column::LastInventoryUpdate,
        Column::Managed,
        Column::WarrantyExpiration,
    ];

    /// Derived columns in the order enrichment appends them.
    pub const DERIVED: [Column; 5] = [
        Column::Department,
        Column::DaysSinceUpdate,
        Column::CheckInStatus,
        Column::DaysUntilExpiration,
        Column::WarrantyStatus,
    ];

    /// Header text as it appears in the CSV.
    pub fn header(self) -> &'static str {
        match self {
            Column::ComputerName => "Computer Name",
            Column::SerialNumber => "Serial Number",
            Column::Username => "Username",
            Column::OperatingSystem => "Operating System",
            Column::LastInventoryUpdate => "Last Inventory Update",
            Column::Managed => "Managed",
            Column::WarrantyExpiration => "Warranty Expiration",
            Column::Department => "Department",
            Column::DaysSinceUpdate => "Days Since Update",
            Column::CheckInStatus => "Check-In Status",
            Column::DaysUntilExpiration => "Days Until Expiration",
            Column::WarrantyStatus => "Warranty Status",
        }
    }

    /// Map a header to a recognised column. Surrounding whitespace is ignored;
    /// the match is otherwise exact.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::SOURCE
            .iter()
            .chain(Column::DERIVED.iter())
            .copied()
            .find(|c| c.header() == header)
    }

    /// True for columns computed by enrichment.
    pub fn is_derived(self) -> bool {
        Column::DERIVED.contains(&self)
    }

    /// The source column a derived column is computed from.
    pub fn source_of(self) -> Option<Column> {
        match self {
            Column::Department => Some(Column::ComputerName),
            Column::DaysSinceUpdate | Column::CheckInStatus => Some(Column::LastInventoryUpdate),
            Column::DaysUntilExpiration | Column::WarrantyStatus => {
                Some(Column::WarrantyExpiration)
            }
            _ => None,
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

// =============================================================================
// FieldSet
// =============================================================================

/// The set of recognised columns available in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldSet {
    bits: u16,
}

impl FieldSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column.
    pub fn insert(&mut self, column: Column) {
        self.bits |= column.bit();
    }

    /// Whether `column` is available.
    pub fn contains(&self, column: Column) -> bool {
        self.bits & column.bit() != 0
    }

    /// Union of two sets.
    pub fn union(self, other: FieldSet) -> FieldSet {
        FieldSet {
            bits: self.bits | other.bits,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Available columns in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        Column::SOURCE
            .into_iter()
            .chain(Column::DERIVED)
            .filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Column> for FieldSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for column in iter {
            set.insert(column);
        }
        set
    }
}

// =============================================================================
// Department
// =============================================================================

/// Closed set of departments encoded as the leading token of a computer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "PRO")]
    Pro,
    #[serde(rename = "SEM")]
    Sem,
    #[serde(rename = "STU")]
    Stu,
    #[serde(rename = "DCE")]
    Dce,
    #[serde(rename = "SOE")]
    Soe,
}

impl Department {
    pub fn all() -> &'static [Department] {
        &[
            Department::Pro,
            Department::Sem,
            Department::Stu,
            Department::Dce,
            Department::Soe,
        ]
    }

    /// Three-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Department::Pro => "PRO",
            Department::Sem => "SEM",
            Department::Stu => "STU",
            Department::Dce => "DCE",
            Department::Soe => "SOE",
        }
    }

    /// Exact, case-sensitive code lookup.
    pub fn from_code(code: &str) -> Option<Department> {
        Department::all().iter().copied().find(|d| d.code() == code)
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Check-in status
// =============================================================================

/// Check-in recency bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckInStatus {
    #[serde(rename = "Checked in (<30 days)")]
    CheckedIn,
    #[serde(rename = "Not checked in (30+ days)")]
    NotCheckedIn,
}

impl CheckInStatus {
    pub fn all() -> &'static [CheckInStatus] {
        &[CheckInStatus::CheckedIn, CheckInStatus::NotCheckedIn]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckInStatus::CheckedIn => "Checked in (<30 days)",
            CheckInStatus::NotCheckedIn => "Not checked in (30+ days)",
        }
    }

    pub fn from_label(label: &str) -> Option<CheckInStatus> {
        CheckInStatus::all()
            .iter()
            .copied()
            .find(|s| s.label() == label.trim())
    }
}

impl std::fmt::Display for CheckInStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Warranty status
// =============================================================================

/// Warranty lifecycle bucket. A record with no expiration date has no status
/// (`None`), reported as "Unclassified" in aggregate counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WarrantyStatus {
    Expired,
    #[serde(rename = "Expiring Soon (<90 days)")]
    ExpiringSoon,
    Valid,
}

impl WarrantyStatus {
    pub fn all() -> &'static [WarrantyStatus] {
        &[
            WarrantyStatus::Expired,
            WarrantyStatus::ExpiringSoon,
            WarrantyStatus::Valid,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            WarrantyStatus::Expired => "Expired",
            WarrantyStatus::ExpiringSoon => "Expiring Soon (<90 days)",
            WarrantyStatus::Valid => "Valid",
        }
    }

    pub fn from_label(label: &str) -> Option<WarrantyStatus> {
        WarrantyStatus::all()
            .iter()
            .copied()
            .find(|s| s.label() == label.trim())
    }
}

impl std::fmt::Display for WarrantyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket label for records without a warranty status.
pub const UNCLASSIFIED_LABEL: &str = "Unclassified";

// =============================================================================
// Records
// =============================================================================

/// Fields computed by enrichment. All optional: a field is `None` when its
/// source value is null or its source column is absent from the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Derived {
    pub department: Option<Department>,
    pub days_since_update: Option<i64>,
    pub check_in_status: Option<CheckInStatus>,
    pub days_until_expiration: Option<i64>,
    pub warranty_status: Option<WarrantyStatus>,
}

/// One device row as ingested. Recognised columns are typed; anything else
/// is kept verbatim in `extra`, aligned with the batch's `extra_columns`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub computer_name: Option<String>,
    pub serial_number: Option<String>,
    pub username: Option<String>,
    pub operating_system: Option<String>,
    pub managed_status: Option<String>,

    /// `None` when the cell was empty or unparseable.
    pub last_inventory_update: Option<DateTime<Utc>>,

    /// `None` when the cell was empty or unparseable.
    pub warranty_expiration: Option<DateTime<Utc>>,

    /// Derived values already present in the input file (a re-imported
    /// export). Only used when the batch lacks the matching source column.
    pub carried: Derived,

    /// Unrecognised columns, one slot per `Batch::extra_columns` entry.
    pub extra: Vec<Option<String>>,
}

/// Position of a column in a batch's output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Known(Column),
    /// Index into `extra_columns`.
    Extra(usize),
}

/// Identity of an uploaded batch, derived from its files' names and bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BatchId(pub u64);

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// All records from one upload session, files concatenated in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub id: BatchId,

    /// Column layout: union of file headers by first appearance.
    pub columns: Vec<ColumnKey>,

    /// Headers of unrecognised columns.
    pub extra_columns: Vec<String>,

    /// Recognised columns present in at least one file.
    pub fields: FieldSet,

    pub records: Vec<Record>,

    /// Names of the files that contributed rows, in batch order.
    pub sources: Vec<String>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A record together with its derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: Record,
    pub derived: Derived,
}

impl EnrichedRecord {
    /// Textual value of a recognised column, `None` when null.
    ///
    /// Timestamps use the export format so display, search and export agree.
    pub fn text(&self, column: Column) -> Option<Cow<'_, str>> {
        let r = &self.record;
        let d = &self.derived;
        match column {
            Column::ComputerName => r.computer_name.as_deref().map(Cow::Borrowed),
            Column::SerialNumber => r.serial_number.as_deref().map(Cow::Borrowed),
            Column::Username => r.username.as_deref().map(Cow::Borrowed),
            Column::OperatingSystem => r.operating_system.as_deref().map(Cow::Borrowed),
            Column::Managed => r.managed_status.as_deref().map(Cow::Borrowed),
            Column::LastInventoryUpdate => r.last_inventory_update.map(format_timestamp),
            Column::WarrantyExpiration => r.warranty_expiration.map(format_timestamp),
            Column::Department => d.department.map(|v| Cow::Borrowed(v.code())),
            Column::DaysSinceUpdate => d.days_since_update.map(|v| Cow::Owned(v.to_string())),
            Column::CheckInStatus => d.check_in_status.map(|v| Cow::Borrowed(v.label())),
            Column::DaysUntilExpiration => {
                d.days_until_expiration.map(|v| Cow::Owned(v.to_string()))
            }
            Column::WarrantyStatus => d.warranty_status.map(|v| Cow::Borrowed(v.label())),
        }
    }

    /// Textual value at any layout position.
    pub fn cell(&self, key: ColumnKey) -> Option<Cow<'_, str>> {
        match key {
            ColumnKey::Known(column) => self.text(column),
            ColumnKey::Extra(idx) => self
                .record
                .extra
                .get(idx)
                .and_then(|v| v.as_deref())
                .map(Cow::Borrowed),
        }
    }
}

/// Enrichment output: the batch layout extended with derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedBatch {
    pub batch_id: BatchId,

    /// The "now" the day counts were computed against.
    pub as_of: DateTime<Utc>,

    /// Output layout: source layout followed by any newly derived columns.
    pub columns: Vec<ColumnKey>,

    pub extra_columns: Vec<String>,

    /// Source and derived columns available in this batch.
    pub fields: FieldSet,

    pub records: Vec<EnrichedRecord>,
}

impl EnrichedBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header text for a layout position.
    pub fn header(&self, key: ColumnKey) -> &str {
        match key {
            ColumnKey::Known(column) => column.header(),
            ColumnKey::Extra(idx) => self
                .extra_columns
                .get(idx)
                .map(String::as_str)
                .unwrap_or(""),
        }
    }

    /// Copy of this batch restricted to `indices`, in the given order.
    pub fn subset(&self, indices: &[usize]) -> EnrichedBatch {
        EnrichedBatch {
            batch_id: self.batch_id,
            as_of: self.as_of,
            columns: self.columns.clone(),
            extra_columns: self.extra_columns.clone(),
            fields: self.fields,
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }
}

/// Render a timestamp in the export format.
pub fn format_timestamp(ts: DateTime<Utc>) -> Cow<'static, str> {
    Cow::Owned(ts.format(constants::EXPORT_TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip_for_every_column() {
        for column in Column::SOURCE.iter().chain(Column::DERIVED.iter()) {
            assert_eq!(Column::from_header(column.header()), Some(*column));
        }
        assert_eq!(Column::from_header("  Managed "), Some(Column::Managed));
        assert_eq!(Column::from_header("managed"), None);
        assert_eq!(Column::from_header("Asset Tag"), None);
    }

    #[test]
    fn test_field_set_membership() {
        let mut set = FieldSet::new();
        assert!(set.is_empty());
        set.insert(Column::Managed);
        set.insert(Column::WarrantyStatus);
        assert!(set.contains(Column::Managed));
        assert!(set.contains(Column::WarrantyStatus));
        assert!(!set.contains(Column::ComputerName));
        let cols: Vec<_> = set.iter().collect();
        assert_eq!(cols, vec![Column::Managed, Column::WarrantyStatus]);
    }

    #[test]
    fn test_derived_sources() {
        assert_eq!(Column::Department.source_of(), Some(Column::ComputerName));
        assert_eq!(
            Column::CheckInStatus.source_of(),
            Some(Column::LastInventoryUpdate)
        );
        assert_eq!(
            Column::WarrantyStatus.source_of(),
            Some(Column::WarrantyExpiration)
        );
        assert_eq!(Column::Username.source_of(), None);
        assert!(Column::DaysSinceUpdate.is_derived());
        assert!(!Column::SerialNumber.is_derived());
    }

    #[test]
    fn test_status_labels_parse_back() {
        for s in CheckInStatus::all() {
            assert_eq!(CheckInStatus::from_label(s.label()), Some(*s));
        }
        for s in WarrantyStatus::all() {
            assert_eq!(WarrantyStatus::from_label(s.label()), Some(*s));
        }
        assert_eq!(WarrantyStatus::from_label("Unclassified"), None);
        assert_eq!(Department::from_code("SOE"), Some(Department::Soe));
        assert_eq!(Department::from_code("soe"), None);
    }

    #[test]
    fn test_status_serialises_as_label() {
        let json = serde_json::to_string(&WarrantyStatus::ExpiringSoon).unwrap();
        assert_eq!(json, "\"Expiring Soon (<90 days)\"");
        let json = serde_json::to_string(&Department::Dce).unwrap();
        assert_eq!(json, "\"DCE\"");
    }
}
