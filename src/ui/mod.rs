// JamfLens - ui/mod.rs
//
// UI layer: terminal presentation only.
// Dependencies: core (read-only reports and models).
// Must NOT depend on: platform, direct I/O.

pub mod render;
pub mod table;
