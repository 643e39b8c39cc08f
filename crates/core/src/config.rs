//! Engine configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the node under the cursor is picked when the position tracker and the
/// tree walk disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeSelectionPolicy {
    /// Use the tracked node unless it is a broad container and the tree walk
    /// found a narrower node inside it.
    #[default]
    PreferNarrower,
    TrackedOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root of the content-addressed artifact cache.
    pub cache_dir: PathBuf,
    /// Library roots searched for `vars/<name>.groovy` script units.
    pub script_roots: Vec<PathBuf>,
    pub node_selection: NodeSelectionPolicy,
    /// Whether the client can open `jar:` URIs for binary-only classes.
    pub client_supports_archive_uris: bool,
    /// Start a background classpath scan as soon as the classpath changes.
    pub eager_classpath_indexing: bool,
    /// Bound on receiver/supertype chasing during one resolution.
    pub max_resolution_depth: usize,
    pub default_prefix_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_dir: Self::default_cache_dir(),
            script_roots: Vec::new(),
            node_selection: NodeSelectionPolicy::default(),
            client_supports_archive_uris: false,
            eager_classpath_indexing: true,
            max_resolution_depth: 32,
            default_prefix_limit: 50,
        }
    }
}

impl EngineConfig {
    pub fn default_cache_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".groovyscope")
            .join("cache")
    }

    /// Load from a JSON file; missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_script_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.script_roots = roots;
        self
    }
}
