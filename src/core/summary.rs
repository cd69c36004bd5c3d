// JamfLens - core/summary.rs
//
// Aggregate counts per status bucket, consumed by the chart/summary area of
// the presentation layer. Counts come straight from the derived fields; the
// presentation layer never re-derives a classification.

use crate::core::model::{CheckInStatus, EnrichedRecord, WarrantyStatus, UNCLASSIFIED_LABEL};
use serde::Serialize;

/// Check-in bucket counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckInCounts {
    pub checked_in: usize,
    pub not_checked_in: usize,
}

impl CheckInCounts {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a EnrichedRecord>) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.derived.check_in_status {
                Some(CheckInStatus::CheckedIn) => counts.checked_in += 1,
                Some(CheckInStatus::NotCheckedIn) => counts.not_checked_in += 1,
                None => {}
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.checked_in + self.not_checked_in
    }

    /// `(label, count)` pairs in display order.
    pub fn buckets(&self) -> Vec<(&'static str, usize)> {
        vec![
            (CheckInStatus::CheckedIn.label(), self.checked_in),
            (CheckInStatus::NotCheckedIn.label(), self.not_checked_in),
        ]
    }
}

/// Warranty bucket counts, including records with no expiration date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarrantyCounts {
    pub expired: usize,
    pub expiring_soon: usize,
    pub valid: usize,
    pub unclassified: usize,
}

impl WarrantyCounts {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a EnrichedRecord>) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.derived.warranty_status {
                Some(WarrantyStatus::Expired) => counts.expired += 1,
                Some(WarrantyStatus::ExpiringSoon) => counts.expiring_soon += 1,
                Some(WarrantyStatus::Valid) => counts.valid += 1,
                None => counts.unclassified += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.expired + self.expiring_soon + self.valid + self.unclassified
    }

    /// `(label, count)` pairs in display order.
    pub fn buckets(&self) -> Vec<(&'static str, usize)> {
        vec![
            (WarrantyStatus::Expired.label(), self.expired),
            (WarrantyStatus::ExpiringSoon.label(), self.expiring_soon),
            (WarrantyStatus::Valid.label(), self.valid),
            (UNCLASSIFIED_LABEL, self.unclassified),
        ]
    }
}
