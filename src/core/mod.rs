// distress-triage - core/mod.rs
//
// Core business logic layer: column mapping, price parsing, scoring,
// the row pipeline, and querying.
// Must NOT depend on: app, platform, or the filesystem.

pub mod export;
pub mod ingest;
pub mod mapper;
pub mod model;
pub mod pipeline;
pub mod price;
pub mod query;
pub mod scorer;
