//! Cross-document index of discovered channel nodes.
//!
//! One bucket per document, in discovery order within the document. The
//! registry is owned by the build session and passed explicitly; merging
//! partial registries from independently processed batches replaces whole
//! buckets, so merges commute at document granularity.

use crate::channel::ChannelNode;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    docs: BTreeMap<String, Vec<ChannelNode>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a document's bucket ahead of a rebuild.
    pub fn clear_doc(&mut self, docname: &str) {
        self.docs.remove(docname);
    }

    pub fn extend_doc(&mut self, docname: &str, nodes: impl IntoIterator<Item = ChannelNode>) {
        self.docs
            .entry(docname.to_string())
            .or_default()
            .extend(nodes);
    }

    /// Union partial results from another registry. An incoming bucket
    /// replaces any existing bucket for the same document.
    pub fn merge(&mut self, other: Registry) {
        for (docname, nodes) in other.docs {
            self.docs.insert(docname, nodes);
        }
    }

    pub fn channels(&self, docname: &str) -> &[ChannelNode] {
        self.docs.get(docname).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every node: documents in name order, discovery order within each.
    pub fn all(&self) -> impl Iterator<Item = &ChannelNode> {
        self.docs.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.docs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.values().all(Vec::is_empty)
    }
}
