//! Artifact emission: the machine-readable `asyncapi.yaml`.

use crate::Result;
use crate::config::ApiConfig;
use crate::fields::{FieldValue, NestedMapping};
use crate::registry::Registry;
use anyhow::Context;
use std::fs;
use std::path::Path;

pub const ARTIFACT_FILE_NAME: &str = "asyncapi.yaml";

/// Flatten every channel spec under `channels` and merge the configured
/// metadata: `{asyncapi: <version>, <metadata...>, channels: {...}}`.
/// Operation specs for the same topic from different nodes merge under one
/// topic key; a repeated (topic, operation) pair is last-write-wins.
pub fn build_artifact(config: &ApiConfig, registry: &Registry) -> NestedMapping {
    let mut root = NestedMapping::new();
    root.insert("asyncapi", FieldValue::leaf(config.asyncapi.clone()));
    for (key, value) in config.data.iter() {
        root.insert(key, value.clone());
    }

    let mut channels = NestedMapping::new();
    for node in registry.all() {
        if channels.get(&node.topic).is_none() {
            channels.insert(node.topic.clone(), FieldValue::Node(NestedMapping::new()));
        }
        if let Some(FieldValue::Node(topic_spec)) = channels.get_mut(&node.topic) {
            for (operation, op_spec) in node.spec.iter() {
                topic_spec.insert(operation, op_spec.clone());
            }
        }
    }
    root.insert("channels", FieldValue::Node(channels));
    root
}

#[cfg(feature = "yaml")]
pub fn artifact_to_yaml(artifact: &NestedMapping) -> Result<String> {
    Ok(serde_yaml::to_string(artifact)?)
}

#[cfg(not(feature = "yaml"))]
pub fn artifact_to_yaml(_artifact: &NestedMapping) -> Result<String> {
    anyhow::bail!(
        "emitting {} requires the optional 'yaml' cargo feature \
         (rebuild with --features yaml)",
        ARTIFACT_FILE_NAME
    )
}

/// Serialize and write the artifact in one step, so a missing serializer
/// fails before the file is touched.
pub fn write_artifact(path: &Path, config: &ApiConfig, registry: &Registry) -> Result<()> {
    let text = artifact_to_yaml(&build_artifact(config, registry))?;
    fs::write(path, text).with_context(|| format!("write artifact {}", path.display()))?;
    Ok(())
}
