//! Overview aggregation: group discovered channels per topic for the
//! summary tables.

use crate::channel::{ChannelNode, Operation};
use crate::registry::Registry;

/// A back-reference to one defining location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub docname: String,
    pub anchor: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewRow {
    pub topic: String,
    /// The first contributor's summary stands for the topic.
    pub summary: String,
    pub refs: Vec<ChannelRef>,
}

#[derive(Debug, Clone)]
pub struct OverviewTable {
    pub operation: Operation,
    pub rows: Vec<OverviewRow>,
}

/// One row per topic with at least one channel for `operation`. Row order
/// follows the first occurrence over the registry scan; every contributing
/// node adds a back-reference.
pub fn build_overview(registry: &Registry, operation: Operation) -> OverviewTable {
    let mut rows: Vec<OverviewRow> = Vec::new();
    for node in registry.all() {
        if node.operation != operation {
            continue;
        }
        let reference = ChannelRef {
            docname: node.docname.clone(),
            anchor: node.anchor.clone(),
        };
        match rows.iter_mut().find(|row| row.topic == node.topic) {
            Some(row) => row.refs.push(reference),
            None => rows.push(OverviewRow {
                topic: node.topic.clone(),
                summary: node.summary().unwrap_or("").to_string(),
                refs: vec![reference],
            }),
        }
    }
    OverviewTable { operation, rows }
}
