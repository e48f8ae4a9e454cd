//! Render one processed document to a self-contained HTML page.
//!
//! Channel blocks come out as anchored admonition-style boxes (topic
//! heading, PUB/SUB label, content-type label, summary, then the field
//! tree), overview placeholders as two-column tables with back-reference
//! links into the defining documents.

use crate::channel::ChannelNode;
use crate::outline::{DefinitionItem, Field, TreeNode};
use crate::overview::{OverviewTable, build_overview};
use crate::registry::Registry;
use crate::session::{ProcessedBlock, ProcessedDocument};
use std::fmt::Write;

const PAGE_HEADER: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  main { max-width: 860px; margin: 0 auto; padding: 16px; }
  .channel { border: 1px solid #ddd; border-radius: 6px; padding: 12px 16px; margin: 12px 0; }
  .channel h3 { margin: 0 0 6px 0; font-size: 16px; }
  .op-label { display: inline-block; padding: 1px 6px; border: 1px solid #bbb; border-radius: 4px; background: #f5f5f5; font-size: 12px; }
  .summary { font-style: italic; color: #444; }
  table { border-collapse: collapse; width: 100%; margin: 12px 0; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; vertical-align: top; }
  th { border-bottom: 1px solid #ddd; }
  col.topic { width: 30%; }
  dl { margin: 4px 0 4px 12px; }
  dt { font-weight: 600; }
  dd { margin: 0 0 4px 16px; }
  .fields div { font-size: 14px; }
  .field-name { font-weight: 600; }
</style>
</head>
<body>
<main>
"#;

const PAGE_FOOTER: &str = "</main>\n</body>\n</html>\n";

/// Render a full page. Overview placeholders resolve against the registry,
/// so this must run after every document has been processed.
pub fn render_document(doc: &ProcessedDocument, registry: &Registry) -> String {
    let mut out = String::new();
    out.push_str(&PAGE_HEADER.replace("__TITLE__", &escape(&doc.docname)));
    for block in &doc.blocks {
        match block {
            ProcessedBlock::Prose(text) => render_prose(&mut out, text),
            ProcessedBlock::Channels(nodes) => {
                for node in nodes {
                    render_channel(&mut out, node);
                }
            }
            ProcessedBlock::Overview(operation) => {
                let table = build_overview(registry, *operation);
                render_overview(&mut out, &table, &doc.docname);
            }
        }
    }
    out.push_str(PAGE_FOOTER);
    out
}

/// Relative URI from one rendered document to another. `None` means the
/// target cannot be addressed from the current output; callers keep the
/// reference text and drop the hyperlink.
pub fn relative_uri(from_doc: &str, to_doc: &str) -> Option<String> {
    if to_doc.is_empty() {
        return None;
    }
    if from_doc == to_doc {
        // Same page, the fragment alone is enough.
        return Some(String::new());
    }
    Some(format!("{to_doc}.html"))
}

fn render_prose(out: &mut String, text: &str) {
    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if !paragraph.is_empty() {
            let _ = writeln!(out, "<p>{}</p>", escape(paragraph));
        }
    }
}

fn render_channel(out: &mut String, node: &ChannelNode) {
    let mut classes = String::from("channel");
    for class in &node.classes {
        classes.push(' ');
        classes.push_str(class);
    }
    let _ = writeln!(
        out,
        "<div class=\"{}\" id=\"{}\">",
        escape(&classes),
        escape(&node.anchor)
    );
    let _ = writeln!(out, "<h3>{}</h3>", escape(&node.topic));
    let _ = write!(out, "<p><span class=\"op-label\">{}</span>", node.operation.label());
    if let Some(content_type) = node.content_type() {
        let _ = write!(out, " <span class=\"op-label\">{}</span>", escape(content_type));
    }
    out.push_str("</p>\n");
    if let Some(summary) = node.summary() {
        if !summary.is_empty() {
            let _ = writeln!(out, "<p class=\"summary\">{}</p>", escape(summary));
        }
    }
    for tree in &node.content {
        render_tree(out, tree);
    }
    out.push_str("</div>\n");
}

fn render_tree(out: &mut String, node: &TreeNode) {
    match node {
        TreeNode::FieldList(fields) => {
            out.push_str("<div class=\"fields\">\n");
            for Field { name, value } in fields {
                let _ = writeln!(
                    out,
                    "<div><span class=\"field-name\">{}:</span> {}</div>",
                    escape(name),
                    escape(value)
                );
            }
            out.push_str("</div>\n");
        }
        TreeNode::DefinitionList(items) => {
            out.push_str("<dl>\n");
            for DefinitionItem { term, definition } in items {
                let _ = writeln!(out, "<dt>{}</dt>", escape(term));
                out.push_str("<dd>\n");
                for child in definition {
                    render_tree(out, child);
                }
                out.push_str("</dd>\n");
            }
            out.push_str("</dl>\n");
        }
        TreeNode::Text(text) => {
            let _ = writeln!(out, "<p>{}</p>", escape(text));
        }
    }
}

fn render_overview(out: &mut String, table: &OverviewTable, current_doc: &str) {
    out.push_str("<table>\n<colgroup><col class=\"topic\"><col></colgroup>\n");
    let _ = writeln!(
        out,
        "<thead><tr><th>Topic</th><th>{}</th></tr></thead>",
        escape(table.operation.as_str())
    );
    out.push_str("<tbody>\n");
    for row in &table.rows {
        let mut cell = escape(&row.summary);
        for reference in &row.refs {
            cell.push_str(", ");
            let text = escape(&reference.docname);
            match relative_uri(current_doc, &reference.docname) {
                Some(uri) => {
                    let _ = write!(
                        cell,
                        "<a href=\"{}#{}\"><em>{}</em></a>",
                        uri,
                        escape(&reference.anchor),
                        text
                    );
                }
                // An unaddressable target keeps its source text, unlinked.
                None => {
                    let _ = write!(cell, "<em>{text}</em>");
                }
            }
        }
        let _ = writeln!(out, "<tr><td>{}</td><td>{}</td></tr>", escape(&row.topic), cell);
    }
    out.push_str("</tbody>\n</table>\n");
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Operation;
    use crate::fields::{FieldValue, NestedMapping, build_nodes};
    use pretty_assertions::assert_eq;

    fn sample_node() -> ChannelNode {
        let mut op_spec = NestedMapping::new();
        op_spec.insert("summary", FieldValue::leaf("Status <updates>"));
        let mut message = NestedMapping::new();
        message.insert("contentType", FieldValue::leaf("application/json"));
        op_spec.insert("message", FieldValue::Node(message));
        let content = build_nodes(&op_spec);
        let mut spec = NestedMapping::new();
        spec.insert("publish", FieldValue::Node(op_spec));
        ChannelNode {
            topic: "t/<id>/state".to_string(),
            operation: Operation::Publish,
            spec,
            docname: "doc".to_string(),
            line: 1,
            anchor: "channel-t-id-state-publish".to_string(),
            classes: Vec::new(),
            content,
        }
    }

    #[test]
    fn channel_block_is_anchored_and_escaped() {
        let mut out = String::new();
        render_channel(&mut out, &sample_node());
        assert!(out.contains("id=\"channel-t-id-state-publish\""));
        assert!(out.contains("<h3>t/&lt;id&gt;/state</h3>"));
        assert!(out.contains("<span class=\"op-label\">PUB</span>"));
        assert!(out.contains("<span class=\"op-label\">application/json</span>"));
        assert!(out.contains("Status &lt;updates&gt;"));
    }

    #[test]
    fn relative_uri_distinguishes_same_and_cross_document() {
        assert_eq!(relative_uri("a", "a"), Some(String::new()));
        assert_eq!(relative_uri("a", "b"), Some("b.html".to_string()));
        assert_eq!(relative_uri("a", ""), None);
    }

    #[test]
    fn overview_rows_link_back_to_their_definitions() {
        let mut registry = Registry::new();
        registry.extend_doc("other", vec![sample_node()]);
        let table = build_overview(&registry, Operation::Publish);
        let mut out = String::new();
        render_overview(&mut out, &table, "index");
        assert!(out.contains("<td>t/&lt;id&gt;/state</td>"));
        assert!(out.contains("href=\"other.html#channel-t-id-state-publish\""));
        assert!(out.contains("Status &lt;updates&gt;, "));
    }

    #[test]
    fn page_wraps_blocks_in_order() {
        let doc = ProcessedDocument {
            docname: "doc".to_string(),
            blocks: vec![
                ProcessedBlock::Prose("Hello.".to_string()),
                ProcessedBlock::Channels(vec![sample_node()]),
                ProcessedBlock::Overview(Operation::Publish),
            ],
        };
        let mut registry = Registry::new();
        registry.extend_doc("doc", vec![sample_node()]);
        let html = render_document(&doc, &registry);
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>doc</title>"));
        let prose = html.find("<p>Hello.</p>").unwrap();
        let channel = html.find("<div class=\"channel\"").unwrap();
        let table = html.find("<table>").unwrap();
        assert!(prose < channel && channel < table);
        // Same-page reference uses a bare fragment.
        assert!(html.contains("href=\"#channel-t-id-state-publish\""));
    }
}
