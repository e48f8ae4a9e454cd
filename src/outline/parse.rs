//! Parsing for the restricted channel-outline grammar.
//!
//! The grammar is indentation based:
//!
//! crazy_horse/<id>/state
//!   publish
//!     :summary: Current crazy horse status
//!
//!     message
//!       :contentType: application/json
//!
//! A line of the form `:name: value` is a field; consecutive field lines at
//! one depth collapse into a single field list. Any other line opens a
//! definition whose body is the more-indented block below it; consecutive
//! terms at one depth collapse into a single definition list. Blank lines
//! separate blocks and carry no structure of their own.

use crate::Result;
use crate::diagnostics::Diagnostic;
use crate::outline::node::{DefinitionItem, Field, TreeNode};
use regex::Regex;

/// `:name: value` (the value may be empty and may itself contain colons).
const FIELD_LINE_RE: &str = r"^:([^:]+):\s*(.*)$";

struct Line<'a> {
    indent: usize,
    text: &'a str,
    lineno: usize,
}

/// Parse outline text into a sequence of sibling tree nodes.
///
/// Structural oddities (tabs in indentation, over-indented stray lines) are
/// reported as diagnostics; the surrounding structure still parses.
pub fn parse_outline(text: &str) -> Result<(Vec<TreeNode>, Vec<Diagnostic>)> {
    let re = Regex::new(FIELD_LINE_RE)?;

    let mut diags = Vec::new();
    let mut lines = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let trimmed = raw.trim_start();
        let indent = raw.len() - trimmed.len();
        if raw[..indent].contains('\t') {
            // Each tab counts as a single indentation step.
            diags.push(
                Diagnostic::warning("tab in indentation, counted as one space")
                    .at(format!("line {lineno}")),
            );
        }
        lines.push(Line {
            indent,
            text: trimmed.trim_end(),
            lineno,
        });
    }

    let nodes = parse_nodes(&lines, &re, &mut diags);
    Ok((nodes, diags))
}

fn parse_nodes(lines: &[Line<'_>], re: &Regex, diags: &mut Vec<Diagnostic>) -> Vec<TreeNode> {
    let mut nodes: Vec<TreeNode> = Vec::new();
    let Some(base) = lines.iter().map(|line| line.indent).min() else {
        return nodes;
    };

    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        if line.indent > base {
            // Deeper than any sibling seen so far and not owned by a term.
            diags.push(
                Diagnostic::warning("over-indented line skipped")
                    .at(format!("line {}", line.lineno)),
            );
            i += 1;
            continue;
        }

        if let Some(caps) = re.captures(line.text) {
            let name = caps[1].trim().to_string();
            let mut value = caps[2].trim().to_string();
            // Deeper lines continue the field value.
            let mut j = i + 1;
            while j < lines.len() && lines[j].indent > base {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(lines[j].text);
                j += 1;
            }
            let field = Field { name, value };
            if let Some(TreeNode::FieldList(fields)) = nodes.last_mut() {
                fields.push(field);
            } else {
                nodes.push(TreeNode::FieldList(vec![field]));
            }
            i = j;
        } else {
            let term = line.text.to_string();
            let start = i + 1;
            let mut j = start;
            while j < lines.len() && lines[j].indent > base {
                j += 1;
            }
            let definition = parse_nodes(&lines[start..j], re, diags);
            let item = DefinitionItem { term, definition };
            if let Some(TreeNode::DefinitionList(items)) = nodes.last_mut() {
                items.push(item);
            } else {
                nodes.push(TreeNode::DefinitionList(vec![item]));
            }
            i = j;
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(name: &str, value: &str) -> Field {
        Field {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn fields_collapse_into_one_field_list() {
        let (nodes, diags) = parse_outline(":type: number\n:format: unix epoch\n").unwrap();
        assert_eq!(diags, vec![]);
        assert_eq!(
            nodes,
            vec![TreeNode::FieldList(vec![
                field("type", "number"),
                field("format", "unix epoch"),
            ])]
        );
    }

    #[test]
    fn term_owns_its_indented_block() {
        let text = "message\n  :contentType: application/json\n";
        let (nodes, diags) = parse_outline(text).unwrap();
        assert_eq!(diags, vec![]);
        assert_eq!(
            nodes,
            vec![TreeNode::DefinitionList(vec![DefinitionItem {
                term: "message".to_string(),
                definition: vec![TreeNode::FieldList(vec![field(
                    "contentType",
                    "application/json"
                )])],
            }])]
        );
    }

    #[test]
    fn consecutive_terms_coalesce_into_one_definition_list() {
        let text = "at\n  :type: number\n\ntemperature\n  :type: number\n";
        let (nodes, _) = parse_outline(text).unwrap();
        match nodes.as_slice() {
            [TreeNode::DefinitionList(items)] => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].term, "at");
                assert_eq!(items[1].term, "temperature");
            }
            other => panic!("expected one definition list, got {other:?}"),
        }
    }

    #[test]
    fn mixed_siblings_alternate_node_kinds() {
        let text = ":summary: Status updates\n\nmessage\n  :contentType: application/json\n";
        let (nodes, diags) = parse_outline(text).unwrap();
        assert_eq!(diags, vec![]);
        assert_eq!(nodes.len(), 2);
        assert!(matches!(nodes[0], TreeNode::FieldList(_)));
        assert!(matches!(nodes[1], TreeNode::DefinitionList(_)));
    }

    #[test]
    fn field_value_continues_on_deeper_lines() {
        let text = ":summary: a very\n  long summary\n";
        let (nodes, _) = parse_outline(text).unwrap();
        assert_eq!(
            nodes,
            vec![TreeNode::FieldList(vec![field("summary", "a very long summary")])]
        );
    }

    #[test]
    fn parses_a_full_channel_outline() {
        let text = "crazy_horse/<id>/state\n\
                    \x20 publish\n\
                    \x20   :summary: Current crazy horse status\n\
                    \n\
                    \x20   message\n\
                    \x20     :contentType: application/json\n\
                    \n\
                    \x20     payload\n\
                    \x20       properties\n\
                    \x20         at\n\
                    \x20           :type: number\n";
        let (nodes, diags) = parse_outline(text).unwrap();
        assert_eq!(diags, vec![]);
        let [TreeNode::DefinitionList(topics)] = nodes.as_slice() else {
            panic!("expected one definition list, got {nodes:?}");
        };
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].term, "crazy_horse/<id>/state");
        let [TreeNode::DefinitionList(ops)] = topics[0].definition.as_slice() else {
            panic!("expected operation list");
        };
        assert_eq!(ops[0].term, "publish");
        // publish has two siblings: the summary field list and `message`.
        assert_eq!(ops[0].definition.len(), 2);
    }

    #[test]
    fn stray_over_indented_line_warns_and_is_skipped() {
        let text = "    dangling\ntopic\n  publish\n";
        let (nodes, diags) = parse_outline(text).unwrap();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("over-indented"));
        assert_eq!(nodes.len(), 1);
    }
}
