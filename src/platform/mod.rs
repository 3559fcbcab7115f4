// distress-triage - platform/mod.rs
//
// Platform abstraction layer: config directories and config.toml.
// Dependencies: core (pipeline settings), util, directories, toml.
// Must NOT depend on: app.

pub mod config;
