// distress-triage - app/mod.rs
//
// Application layer: import orchestration and triage state.
// Dependencies: core layer, util.
// Must NOT depend on: platform specifics.

pub mod import;
pub mod state;
