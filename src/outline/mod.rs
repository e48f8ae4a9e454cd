//! Outline layer: the restricted indentation grammar used by channel
//! blocks, and the field-tree node shapes it parses into.

pub mod node;
pub mod parse;

pub use node::{DefinitionItem, Field, TreeNode};
pub use parse::parse_outline;
