// JamfLens - core/report.rs
//
// The two reporting contexts built on the filter stage:
//
//   Inventory - full FilterSpec, per-row stale flag, check-in counts.
//   Warranty  - department-only filter, warranty counts, expired sub-view.
//
// Reports borrow the enriched batch and hold indices into it, so building
// one never copies records. `to_batch` materialises a view for export.

use crate::core::filter::{self, FilterSpec};
use crate::core::model::{Column, EnrichedBatch, EnrichedRecord, WarrantyStatus};
use crate::core::summary::{CheckInCounts, WarrantyCounts};
use crate::util::constants;

/// Which reporting context is being shown. Also the `--page` CLI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Page {
    #[default]
    Inventory,
    Warranty,
}

impl Page {
    pub fn label(&self) -> &'static str {
        match self {
            Page::Inventory => "Inventory",
            Page::Warranty => "Warranty",
        }
    }

    /// Default download name for this page's result set.
    pub fn export_file_name(&self) -> &'static str {
        match self {
            Page::Inventory => constants::INVENTORY_EXPORT_FILE_NAME,
            Page::Warranty => constants::WARRANTY_EXPORT_FILE_NAME,
        }
    }
}

const INVENTORY_DISPLAY: [Column; 6] = [
    Column::ComputerName,
    Column::SerialNumber,
    Column::Username,
    Column::OperatingSystem,
    Column::LastInventoryUpdate,
    Column::Managed,
];

const WARRANTY_DISPLAY: [Column; 5] = [
    Column::ComputerName,
    Column::Username,
    Column::Department,
    Column::WarrantyExpiration,
    Column::DaysUntilExpiration,
];

fn present(batch: &EnrichedBatch, wanted: &[Column]) -> Vec<Column> {
    wanted
        .iter()
        .copied()
        .filter(|c| batch.fields.contains(*c))
        .collect()
}

// =============================================================================
// Inventory
// =============================================================================

/// Filtered inventory view.
#[derive(Debug, Clone)]
pub struct InventoryReport<'a> {
    pub batch: &'a EnrichedBatch,

    /// Indices of matching records, in batch order.
    pub indices: Vec<usize>,

    /// Stale flag per entry of `indices`.
    pub stale: Vec<bool>,

    /// None when the batch has no check-in information.
    pub check_in: Option<CheckInCounts>,

    /// Columns to show, limited to those present in the batch.
    pub display_columns: Vec<Column>,
}

impl<'a> InventoryReport<'a> {
    pub fn build(batch: &'a EnrichedBatch, spec: &FilterSpec) -> Self {
        let indices = filter::apply_filters(batch, spec);
        let stale = indices
            .iter()
            .map(|&i| filter::is_stale(&batch.records[i], batch.fields))
            .collect();
        let check_in = batch
            .fields
            .contains(Column::CheckInStatus)
            .then(|| CheckInCounts::tally(indices.iter().map(|&i| &batch.records[i])));

        Self {
            batch,
            indices,
            stale,
            check_in,
            display_columns: present(batch, &INVENTORY_DISPLAY),
        }
    }

    /// Matching records with their stale flag.
    pub fn rows(&self) -> impl Iterator<Item = (&'a EnrichedRecord, bool)> + '_ {
        let batch = self.batch;
        self.indices
            .iter()
            .zip(self.stale.iter())
            .map(move |(&i, &stale)| (&batch.records[i], stale))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn stale_count(&self) -> usize {
        self.stale.iter().filter(|s| **s).count()
    }

    /// The filtered result set as a standalone batch (for export).
    pub fn to_batch(&self) -> EnrichedBatch {
        self.batch.subset(&self.indices)
    }
}

// =============================================================================
// Warranty
// =============================================================================

/// Warranty lifecycle view.
#[derive(Debug, Clone)]
pub struct WarrantyReport<'a> {
    pub batch: &'a EnrichedBatch,

    /// Records passing the department filter.
    pub indices: Vec<usize>,

    /// None when the batch has no warranty information.
    pub counts: Option<WarrantyCounts>,

    /// Subset of `indices` whose warranty has expired.
    pub expired: Vec<usize>,

    /// Columns to show for the expired table, limited to those present.
    pub display_columns: Vec<Column>,
}

impl<'a> WarrantyReport<'a> {
    pub fn build(batch: &'a EnrichedBatch, department: &str) -> Self {
        let spec = FilterSpec::department_only(department);
        let indices = filter::apply_filters(batch, &spec);
        let has_status = batch.fields.contains(Column::WarrantyStatus);

        let counts = has_status
            .then(|| WarrantyCounts::tally(indices.iter().map(|&i| &batch.records[i])));
        let expired = if has_status {
            indices
                .iter()
                .copied()
                .filter(|&i| {
                    batch.records[i].derived.warranty_status == Some(WarrantyStatus::Expired)
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            batch,
            indices,
            counts,
            expired,
            display_columns: present(batch, &WARRANTY_DISPLAY),
        }
    }

    /// Expired records, in batch order.
    pub fn expired_rows(&self) -> impl Iterator<Item = &'a EnrichedRecord> + '_ {
        let batch = self.batch;
        self.expired.iter().map(move |&i| &batch.records[i])
    }

    /// The expired sub-view as a standalone batch (for export).
    pub fn expired_batch(&self) -> EnrichedBatch {
        self.batch.subset(&self.expired)
    }
}
