// JamfLens - core/mod.rs
//
// Core business logic layer: ingest, enrichment, filtering, reporting, export.
// Must NOT depend on: ui, platform, app.

pub mod dates;
pub mod discovery;
pub mod enrich;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod model;
pub mod report;
pub mod summary;
