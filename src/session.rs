//! Build-session controller.
//!
//! The session owns what the host build environment would otherwise hold
//! ambiently: the configuration, the cross-document registry and the
//! discovery hooks. Every processing step receives it explicitly, and
//! partial registries from independently processed batches merge through
//! it. Aggregation and emission read the registry only after every
//! document has been processed; the driver enforces that barrier.

use crate::Result;
use crate::channel::{ChannelNode, ExpandContext, Operation, expand_block};
use crate::config::ApiConfig;
use crate::diagnostics::Diagnostic;
use crate::document::{DocBlock, parse_document};
use crate::registry::Registry;
use std::collections::BTreeSet;
use std::path::Path;

/// Fired once per discovered channel node.
pub type ChannelHook = Box<dyn FnMut(&ChannelNode)>;

pub struct BuildSession {
    pub config: ApiConfig,
    pub registry: Registry,
    hooks: Vec<ChannelHook>,
}

/// A document after its channel blocks have been expanded. Overview
/// placeholders stay unresolved until rendering, when the full registry is
/// available.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub docname: String,
    pub blocks: Vec<ProcessedBlock>,
}

#[derive(Debug, Clone)]
pub enum ProcessedBlock {
    Prose(String),
    Channels(Vec<ChannelNode>),
    Overview(Operation),
}

impl BuildSession {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            hooks: Vec::new(),
        }
    }

    /// Register a hook observing channel discovery. The payload is the
    /// node itself; hooks cannot mutate it.
    pub fn on_channel_defined(&mut self, hook: impl FnMut(&ChannelNode) + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn process_document(
        &mut self,
        docname: &str,
        text: &str,
    ) -> Result<(ProcessedDocument, Vec<Diagnostic>)> {
        self.process_document_at(docname, text, None)
    }

    /// Process one document; `doc_dir` resolves `:from_file:` references.
    /// Reprocessing a document replaces its registry bucket.
    pub fn process_document_at(
        &mut self,
        docname: &str,
        text: &str,
        doc_dir: Option<&Path>,
    ) -> Result<(ProcessedDocument, Vec<Diagnostic>)> {
        let (document, mut diags) = parse_document(docname, text)?;
        self.registry.clear_doc(docname);

        let mut anchors = BTreeSet::new();
        let mut blocks = Vec::new();
        for block in document.blocks {
            match block {
                DocBlock::Prose(text) => blocks.push(ProcessedBlock::Prose(text)),
                DocBlock::Overview { operation, .. } => {
                    blocks.push(ProcessedBlock::Overview(operation));
                }
                DocBlock::Channels {
                    options,
                    content,
                    line,
                } => {
                    let mut ctx = ExpandContext {
                        docname,
                        line,
                        doc_dir,
                        anchors: &mut anchors,
                    };
                    let (nodes, mut block_diags) = expand_block(&options, &content, &mut ctx)?;
                    diags.append(&mut block_diags);
                    for node in &nodes {
                        for hook in &mut self.hooks {
                            hook(node);
                        }
                    }
                    self.registry.extend_doc(docname, nodes.iter().cloned());
                    blocks.push(ProcessedBlock::Channels(nodes));
                }
            }
        }

        Ok((
            ProcessedDocument {
                docname: docname.to_string(),
                blocks,
            },
            diags,
        ))
    }

    /// Union partial results from another worker's registry.
    pub fn merge_registry(&mut self, other: Registry) {
        self.registry.merge(other);
    }
}
