//! Field construction: render a nested mapping back into abstract tree
//! nodes.
//!
//! This is the structural inverse of extraction, except that it always
//! prefers the compact form authors write by hand: consecutive leaf-valued
//! keys batch into one field list, consecutive nested keys batch into one
//! definition list. The round trip through extraction preserves every key
//! and leaf value, not the exact node layout of hand-written input.

use crate::fields::mapping::{FieldValue, NestedMapping};
use crate::outline::node::{DefinitionItem, Field, TreeNode};

/// Build the sibling node sequence that describes `fields`.
pub fn build_nodes(fields: &NestedMapping) -> Vec<TreeNode> {
    let mut nodes: Vec<TreeNode> = Vec::new();
    for (key, value) in fields.iter() {
        match value {
            FieldValue::Leaf(text) => {
                let field = Field {
                    name: key.to_string(),
                    value: text.clone(),
                };
                if let Some(TreeNode::FieldList(list)) = nodes.last_mut() {
                    list.push(field);
                } else {
                    nodes.push(TreeNode::FieldList(vec![field]));
                }
            }
            FieldValue::Node(sub) => {
                let item = DefinitionItem {
                    term: key.to_string(),
                    definition: build_nodes(sub),
                };
                if let Some(TreeNode::DefinitionList(items)) = nodes.last_mut() {
                    items.push(item);
                } else {
                    nodes.push(TreeNode::DefinitionList(vec![item]));
                }
            }
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::extract::extract_nodes;
    use pretty_assertions::assert_eq;

    fn leaf(text: &str) -> FieldValue {
        FieldValue::leaf(text)
    }

    fn mapping(entries: Vec<(&str, FieldValue)>) -> NestedMapping {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn flat_mapping_builds_a_single_field_list() {
        let fields = mapping(vec![("type", leaf("number")), ("format", leaf("epoch"))]);
        let nodes = build_nodes(&fields);
        assert_eq!(
            nodes,
            vec![TreeNode::FieldList(vec![
                Field {
                    name: "type".to_string(),
                    value: "number".to_string(),
                },
                Field {
                    name: "format".to_string(),
                    value: "epoch".to_string(),
                },
            ])]
        );
    }

    #[test]
    fn nested_values_build_definition_items() {
        let fields = mapping(vec![(
            "message",
            FieldValue::Node(mapping(vec![("contentType", leaf("application/json"))])),
        )]);
        let nodes = build_nodes(&fields);
        let [TreeNode::DefinitionList(items)] = nodes.as_slice() else {
            panic!("expected a definition list, got {nodes:?}");
        };
        assert_eq!(items[0].term, "message");
        assert_eq!(
            items[0].definition,
            vec![TreeNode::FieldList(vec![Field {
                name: "contentType".to_string(),
                value: "application/json".to_string(),
            }])]
        );
    }

    #[test]
    fn consecutive_kinds_batch_into_shared_containers() {
        let fields = mapping(vec![
            ("summary", leaf("s")),
            ("description", leaf("d")),
            ("message", FieldValue::Node(mapping(vec![("contentType", leaf("json"))]))),
            ("binding", FieldValue::Node(NestedMapping::new())),
            ("trailer", leaf("t")),
        ]);
        let nodes = build_nodes(&fields);
        assert_eq!(nodes.len(), 3);
        match &nodes[0] {
            TreeNode::FieldList(list) => assert_eq!(list.len(), 2),
            other => panic!("expected field list, got {other:?}"),
        }
        match &nodes[1] {
            TreeNode::DefinitionList(items) => assert_eq!(items.len(), 2),
            other => panic!("expected definition list, got {other:?}"),
        }
        match &nodes[2] {
            TreeNode::FieldList(list) => assert_eq!(list.len(), 1),
            other => panic!("expected field list, got {other:?}"),
        }
    }

    #[test]
    fn flat_round_trip_is_exact() {
        let fields = mapping(vec![
            ("summary", leaf("s")),
            ("contentType", leaf("application/json")),
            ("type", leaf("number")),
        ]);
        let (back, diags) = extract_nodes(&build_nodes(&fields));
        assert_eq!(diags, vec![]);
        assert_eq!(back, fields);
    }

    #[test]
    fn nested_round_trip_preserves_every_key_and_leaf() {
        let properties = mapping(vec![
            (
                "at",
                FieldValue::Node(mapping(vec![
                    ("type", leaf("number")),
                    ("format", leaf("unix epoch in seconds")),
                ])),
            ),
            (
                "temperature",
                FieldValue::Node(mapping(vec![("type", leaf("number"))])),
            ),
        ]);
        let fields = mapping(vec![(
            "crazy_horse/<id>/state",
            FieldValue::Node(mapping(vec![(
                "publish",
                FieldValue::Node(mapping(vec![
                    ("summary", leaf("Current crazy horse status")),
                    (
                        "message",
                        FieldValue::Node(mapping(vec![
                            ("contentType", leaf("application/json")),
                            (
                                "payload",
                                FieldValue::Node(mapping(vec![(
                                    "properties",
                                    FieldValue::Node(properties),
                                )])),
                            ),
                        ])),
                    ),
                ])),
            )])),
        )]);
        let (back, diags) = extract_nodes(&build_nodes(&fields));
        assert_eq!(diags, vec![]);
        assert_eq!(back, fields);
    }

    #[test]
    fn mixed_level_round_trip_survives_batching() {
        // Two consecutive leaves next to a nested key share one field list
        // on the way out and still extract to the same mapping.
        let fields = mapping(vec![
            ("a", leaf("1")),
            ("b", leaf("2")),
            ("m", FieldValue::Node(mapping(vec![("x", leaf("y"))]))),
        ]);
        let (back, diags) = extract_nodes(&build_nodes(&fields));
        assert_eq!(diags, vec![]);
        assert_eq!(back, fields);
    }
}
