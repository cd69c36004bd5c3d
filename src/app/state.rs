// JamfLens - app/state.rs
//
// Session state: the loaded batch, the current selections for each page,
// and the enrichment cache.
//
// Enrichment is keyed on (batch identity, now). Changing a filter reuses the
// cached enriched batch; only a new upload set or a new reference time
// triggers re-enrichment.

use crate::core::enrich;
use crate::core::filter::{FilterOptions, FilterSpec};
use crate::core::ingest::{self, Upload};
use crate::core::model::{Batch, BatchId, EnrichedBatch};
use crate::core::report::{InventoryReport, Page, WarrantyReport};
use crate::util::constants::ALL_LABEL;
use crate::util::error::IngestError;
use chrono::{DateTime, Utc};

/// Top-level application state.
#[derive(Debug, Default)]
pub struct AppState {
    /// The currently loaded batch.
    pub batch: Batch,

    /// Files dropped from the current batch, with their reasons.
    pub load_errors: Vec<IngestError>,

    /// Reference time for derived day counts.
    pub as_of: DateTime<Utc>,

    /// Selections on the inventory page.
    pub inventory_filter: FilterSpec,

    /// Department selection on the warranty page.
    pub warranty_department: String,

    /// Page being shown.
    pub page: Page,

    cache: Option<(BatchId, DateTime<Utc>, EnrichedBatch)>,
}

impl AppState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            as_of: now,
            warranty_department: ALL_LABEL.to_string(),
            ..Default::default()
        }
    }

    /// Replace the batch with a freshly parsed upload set.
    pub fn load(&mut self, uploads: &[Upload]) {
        let (batch, errors) = ingest::load_batch(uploads);
        self.batch = batch;
        self.load_errors = errors;
    }

    /// Move the reference time. The cache is invalidated lazily.
    pub fn set_as_of(&mut self, now: DateTime<Utc>) {
        self.as_of = now;
    }

    /// The enriched batch for the current (batch, now) key.
    pub fn enriched(&mut self) -> &EnrichedBatch {
        let key = (self.batch.id, self.as_of);
        let stale = !matches!(&self.cache, Some((id, at, _)) if (*id, *at) == key);
        if stale {
            tracing::debug!(batch = %key.0, as_of = %key.1, "Enrichment cache miss");
            self.cache = None;
        }
        let batch = &self.batch;
        let (_, _, enriched) = self
            .cache
            .get_or_insert_with(|| (key.0, key.1, enrich::enrich(batch, key.1)));
        enriched
    }

    /// Whether the cache currently holds the enrichment for this key.
    pub fn is_cached(&self) -> bool {
        matches!(&self.cache, Some((id, at, _)) if *id == self.batch.id && *at == self.as_of)
    }

    pub fn filter_options(&mut self) -> FilterOptions {
        FilterOptions::from_batch(self.enriched())
    }

    pub fn inventory_report(&mut self) -> InventoryReport<'_> {
        let spec = self.inventory_filter.clone();
        InventoryReport::build(self.enriched(), &spec)
    }

    pub fn warranty_report(&mut self) -> WarrantyReport<'_> {
        let department = self.warranty_department.clone();
        WarrantyReport::build(self.enriched(), &department)
    }

    /// The current page's export result set.
    pub fn export_batch(&mut self) -> EnrichedBatch {
        match self.page {
            Page::Inventory => self.inventory_report().to_batch(),
            Page::Warranty => self.warranty_report().expired_batch(),
        }
    }
}
