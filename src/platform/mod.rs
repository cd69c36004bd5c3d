// JamfLens - platform/mod.rs
//
// Platform abstraction layer: config directory and config.toml.
// Dependencies: standard library, directories crate, core value types.
// Must NOT depend on: app, ui.

pub mod config;
