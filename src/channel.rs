//! Channel blocks: options, structured loading and the per-(topic,
//! operation) fan-out.
//!
//! A block describes one or more topics, either as an outline:
//!
//! crazy_horse/<id>/state
//!   publish
//!     :summary: Current crazy horse status
//!
//! or, with `:format: yaml`, as structured text:
//!
//! crazy_horse/<id>/state:
//!   publish:
//!     summary: Current crazy horse status
//!
//! Either way the block reduces to `{topic: {operation: spec}}` and every
//! (topic, operation) pair becomes one independent channel node.

use crate::Result;
use crate::diagnostics::Diagnostic;
use crate::fields::{NestedMapping, build_nodes, extract_nodes};
use crate::fields::mapping::FieldValue;
use crate::outline::{TreeNode, parse_outline};
use anyhow::{Context, bail};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Direction of a channel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Publish,
    Subscribe,
}

impl Operation {
    /// Accepts the keyword and the table abbreviation, case-insensitively:
    /// `publish`/`PUB` and `subscribe`/`SUB`.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "publish" | "pub" => Some(Self::Publish),
            "subscribe" | "sub" => Some(Self::Subscribe),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Subscribe => "subscribe",
        }
    }

    /// Short form shown next to a topic.
    pub fn label(self) -> &'static str {
        match self {
            Self::Publish => "PUB",
            Self::Subscribe => "SUB",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockFormat {
    #[default]
    Outline,
    Yaml,
}

impl BlockFormat {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            // `rst` kept as an alias; the original convention wrote
            // `:format: rst` for outline blocks.
            "outline" | "rst" => Some(Self::Outline),
            "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Options of one `asyncapi_channels` block.
#[derive(Debug, Clone, Default)]
pub struct BlockOptions {
    pub format: BlockFormat,
    /// Load the structured text from this file instead of the block body,
    /// resolved relative to the owning document's directory.
    pub from_file: Option<String>,
    /// Pass-through display name.
    pub name: Option<String>,
    /// Pass-through CSS classes.
    pub classes: Vec<String>,
}

/// One discovered (topic, operation) documentation unit. Never mutated
/// after creation.
#[derive(Debug, Clone)]
pub struct ChannelNode {
    pub topic: String,
    pub operation: Operation,
    /// Exactly one entry: `{operation: operation-spec}`.
    pub spec: NestedMapping,
    pub docname: String,
    /// Source line of the owning block.
    pub line: usize,
    /// Unique cross-reference target within the owning document.
    pub anchor: String,
    /// Pass-through CSS classes from the owning block.
    pub classes: Vec<String>,
    /// Renderable body, built from the operation spec.
    pub content: Vec<TreeNode>,
}

impl ChannelNode {
    pub fn operation_spec(&self) -> Option<&NestedMapping> {
        self.spec
            .get(self.operation.as_str())
            .and_then(FieldValue::as_node)
    }

    pub fn summary(&self) -> Option<&str> {
        self.operation_spec()?
            .get("summary")
            .and_then(FieldValue::as_leaf)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.operation_spec()?
            .get("message")
            .and_then(FieldValue::as_node)?
            .get("contentType")
            .and_then(FieldValue::as_leaf)
    }
}

/// Per-block expansion context supplied by the session.
pub struct ExpandContext<'a> {
    pub docname: &'a str,
    /// Source line of the block's directive.
    pub line: usize,
    /// Directory for resolving `from_file` references.
    pub doc_dir: Option<&'a Path>,
    /// Anchor ids already taken in the owning document.
    pub anchors: &'a mut BTreeSet<String>,
}

impl ExpandContext<'_> {
    fn location(&self) -> String {
        format!("{}:{}", self.docname, self.line)
    }
}

/// Expand one channel block into its channel nodes.
///
/// Malformed entries (unsupported operations, topics without an operation
/// mapping, unparseable structured text) surface as warnings and are
/// skipped; valid siblings in the same block still produce nodes. A
/// missing structured loader is a fatal configuration error.
pub fn expand_block(
    options: &BlockOptions,
    content: &str,
    ctx: &mut ExpandContext<'_>,
) -> Result<(Vec<ChannelNode>, Vec<Diagnostic>)> {
    let mut diags = Vec::new();

    let spec = match options.format {
        BlockFormat::Outline => {
            let (nodes, mut parse_diags) = parse_outline(content)?;
            diags.append(&mut parse_diags);
            let (fields, extract_diags) = extract_nodes(&nodes);
            diags.extend(
                extract_diags
                    .into_iter()
                    .map(|diag| relocate(diag, &ctx.location())),
            );
            fields
        }
        BlockFormat::Yaml => {
            let text;
            let mut json = false;
            match &options.from_file {
                Some(relative) => {
                    let path = resolve_path(ctx.doc_dir, relative);
                    json = relative.ends_with(".json");
                    text = fs::read_to_string(&path)
                        .with_context(|| format!("read channel file {}", path.display()))?;
                }
                None => text = content.to_string(),
            }
            match load_structured(&text, json) {
                Ok(fields) => fields,
                Err(LoadError::Parse(message)) => {
                    diags.push(
                        Diagnostic::warning(format!("invalid channel spec: {message}"))
                            .at(ctx.location()),
                    );
                    return Ok((Vec::new(), diags));
                }
                Err(LoadError::MissingLoader) => {
                    bail!(
                        "channel block with :format: yaml requires the optional \
                         'yaml' cargo feature (rebuild with --features yaml)"
                    )
                }
            }
        }
    };

    let mut nodes = Vec::new();
    for (topic, topic_value) in spec.iter() {
        let Some(topic_spec) = topic_value.as_node() else {
            diags.push(
                Diagnostic::warning(format!(
                    "channel '{topic}' does not contain an operation mapping"
                ))
                .at(ctx.location()),
            );
            continue;
        };
        for (op_key, op_value) in topic_spec.iter() {
            let Some(operation) = Operation::parse(op_key) else {
                diags.push(
                    Diagnostic::warning(format!("operation '{op_key}' not supported"))
                        .at(ctx.location()),
                );
                continue;
            };
            let Some(op_spec) = op_value.as_node() else {
                diags.push(
                    Diagnostic::warning(format!(
                        "operation '{op_key}' of channel '{topic}' has no field mapping"
                    ))
                    .at(ctx.location()),
                );
                continue;
            };

            let mut node_spec = NestedMapping::new();
            node_spec.insert(operation.as_str(), FieldValue::Node(op_spec.clone()));

            // An explicit :name: takes over as the anchor base, like an
            // explicit target on the block.
            let base = match &options.name {
                Some(name) => slug(name),
                None => format!("channel-{}-{}", slug(topic), operation.as_str()),
            };

            nodes.push(ChannelNode {
                topic: topic.to_string(),
                operation,
                spec: node_spec,
                docname: ctx.docname.to_string(),
                line: ctx.line,
                anchor: allocate_anchor(ctx.anchors, &base),
                classes: options.classes.clone(),
                content: build_nodes(op_spec),
            });
        }
    }

    Ok((nodes, diags))
}

enum LoadError {
    Parse(String),
    MissingLoader,
}

fn load_structured(text: &str, json: bool) -> std::result::Result<NestedMapping, LoadError> {
    if json {
        return serde_json::from_str(text).map_err(|e| LoadError::Parse(e.to_string()));
    }
    #[cfg(feature = "yaml")]
    {
        serde_yaml::from_str(text).map_err(|e| LoadError::Parse(e.to_string()))
    }
    #[cfg(not(feature = "yaml"))]
    {
        let _ = text;
        Err(LoadError::MissingLoader)
    }
}

fn resolve_path(doc_dir: Option<&Path>, relative: &str) -> PathBuf {
    match doc_dir {
        Some(dir) => dir.join(relative),
        None => PathBuf::from(relative),
    }
}

/// Keep the field-path location from extraction, qualified by the block's
/// document position.
fn relocate(mut diag: Diagnostic, block_location: &str) -> Diagnostic {
    let qualified = match diag.location.take() {
        Some(path) => format!("{block_location}: {path}"),
        None => block_location.to_string(),
    };
    diag.at(qualified)
}

fn allocate_anchor(used: &mut BTreeSet<String>, base: &str) -> String {
    let mut anchor = base.to_string();
    let mut n = 1;
    while !used.insert(anchor.clone()) {
        n += 1;
        anchor = format!("{base}-{n}");
    }
    anchor
}

/// Lowercase alphanumeric id segment; runs of anything else collapse to a
/// single dash.
fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
