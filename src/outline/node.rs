//! Abstract field-tree node shapes.
//!
//! These are the two structures the extractor understands, plus a plain
//! text leaf for anything unstructured:
//!
//! - a field list: a flat run of `name: value` pairs
//! - a definition list: term/definition pairs where a definition is a
//!   sequence of further nodes
//!
//! The outline parser produces these, the builder reconstructs them from a
//! nested mapping, and the renderer turns them into markup.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    FieldList(Vec<Field>),
    DefinitionList(Vec<DefinitionItem>),
    Text(String),
}

/// One `name: value` pair of a field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// One term with its definition body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionItem {
    pub term: String,
    pub definition: Vec<TreeNode>,
}
