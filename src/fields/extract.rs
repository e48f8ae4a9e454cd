//! Field extraction: walk an abstract field tree back into a nested
//! mapping.
//!
//! The walk is pure: shape conflicts come back as diagnostics next to the
//! mapping instead of going to a logger. Duplicate keys found while
//! merging sibling nodes are last-write-wins, with a warning.

use crate::diagnostics::Diagnostic;
use crate::fields::mapping::{FieldValue, NestedMapping};
use crate::outline::node::{DefinitionItem, TreeNode};

/// Extract the mapping described by one node.
pub fn extract_node(node: &TreeNode) -> (NestedMapping, Vec<Diagnostic>) {
    let mut diags = Vec::new();
    let fields = extract_node_at(node, "", &mut diags);
    (fields, diags)
}

/// Extract and merge a sequence of sibling nodes (a definition body or the
/// whole content of a channel block).
pub fn extract_nodes(nodes: &[TreeNode]) -> (NestedMapping, Vec<Diagnostic>) {
    let mut diags = Vec::new();
    let fields = extract_nodes_at(nodes, "", &mut diags);
    (fields, diags)
}

fn extract_node_at(node: &TreeNode, path: &str, diags: &mut Vec<Diagnostic>) -> NestedMapping {
    let mut fields = NestedMapping::new();
    match node {
        TreeNode::FieldList(list) => {
            // Field names cannot repeat at one level in this grammar.
            for field in list {
                fields.insert(field.name.trim(), FieldValue::leaf(field.value.trim()));
            }
        }
        TreeNode::DefinitionList(items) => {
            for DefinitionItem { term, definition } in items {
                let key = term.trim();
                let child_path = join_path(path, key);
                let value = extract_nodes_at(definition, &child_path, diags);
                fields.insert(key, FieldValue::Node(value));
            }
        }
        // No recognized structure: the recursion bottoms out empty.
        TreeNode::Text(_) => {}
    }
    fields
}

fn extract_nodes_at(nodes: &[TreeNode], path: &str, diags: &mut Vec<Diagnostic>) -> NestedMapping {
    if let [single] = nodes {
        // A lone child stands for the whole definition body.
        return extract_node_at(single, path, diags);
    }

    let mut merged = NestedMapping::new();
    for node in nodes {
        let part = extract_node_at(node, path, diags);
        if part.is_empty() {
            diags.push(Diagnostic::warning("no fields could be extracted").at(path));
            continue;
        }
        for (key, value) in part.iter() {
            if merged.insert(key, value.clone()).is_some() {
                diags.push(
                    Diagnostic::warning(format!(
                        "duplicate field '{key}' overwrites an earlier value"
                    ))
                    .at(path),
                );
            }
        }
    }
    merged
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
