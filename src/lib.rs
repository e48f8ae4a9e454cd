//! Pub/sub channel documentation generator.
//!
//! Documents carry `.. asyncapi_channels::` blocks describing topics in an
//! indented outline or in YAML. Processing reduces every block to a
//! `{topic: {operation: spec}}` mapping, fans it out into one channel node
//! per (topic, operation) pair, renders HTML pages with per-operation
//! overview tables and emits a machine-readable `asyncapi.yaml`.

pub mod channel;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod emit;
pub mod fields;
pub mod outline;
pub mod overview;
pub mod registry;
pub mod render;
pub mod session;

pub type Result<T> = anyhow::Result<T>;
