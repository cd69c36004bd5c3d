// JamfLens - lib.rs
//
// Library entry point. The binary in main.rs is a thin CLI over these
// modules; integration tests drive them directly.

pub mod app;
pub mod core;
pub mod platform;
pub mod ui;
pub mod util;
