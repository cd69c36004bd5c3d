// JamfLens - app/mod.rs
//
// Application layer: input collection and session state.
// Dependencies: core layer.
// Must NOT depend on: ui.

pub mod load;
pub mod state;
