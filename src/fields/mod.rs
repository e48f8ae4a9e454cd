//! Core transforms between the abstract field tree and the canonical
//! nested mapping.

pub mod build;
pub mod extract;
pub mod mapping;

pub use build::build_nodes;
pub use extract::{extract_node, extract_nodes};
pub use mapping::{FieldValue, NestedMapping};
