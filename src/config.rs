//! Build configuration merged into the emitted artifact.

use crate::fields::NestedMapping;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_API_VERSION: &str = "2.0.0";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// AsyncAPI version tag written at the top of the artifact.
    pub asyncapi: String,
    /// Arbitrary user metadata merged into the artifact root.
    pub data: NestedMapping,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            asyncapi: DEFAULT_API_VERSION.to_string(),
            data: NestedMapping::new(),
        }
    }
}

impl ApiConfig {
    #[cfg(feature = "yaml")]
    pub fn from_yaml_file(path: &Path) -> crate::Result<Self> {
        use anyhow::Context;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Ok(serde_yaml::from_str(&text)?)
    }

    #[cfg(not(feature = "yaml"))]
    pub fn from_yaml_file(_path: &Path) -> crate::Result<Self> {
        anyhow::bail!("loading a config file requires the optional 'yaml' cargo feature")
    }
}
