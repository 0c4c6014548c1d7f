//! Type definitions for the plugin system

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Argument and result type of plugin methods
pub type PluginValue = serde_json::Value;

/// Registry identity of a plugin
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PluginKey {
    pub author: String,
    pub name: String,
}

impl PluginKey {
    pub fn new(author: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.author, self.name)
    }
}

/// Metadata a plugin reports about itself
///
/// `version` is kept as the plugin's own text; it is parsed again on every
/// version check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDescriptor {
    pub author: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub methods: Vec<String>,
}

impl PluginDescriptor {
    pub fn key(&self) -> PluginKey {
        PluginKey::new(&self.author, &self.name)
    }
}

/// Outcome of loading one module
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub path: PathBuf,
    /// Plugins newly registered from this module
    pub registered: Vec<PluginKey>,
    /// Plugins skipped because the same identity was already registered
    pub duplicates: Vec<PluginKey>,
    /// Open, instantiation and initialisation failures
    pub failures: Vec<crate::plugin::error::PluginError>,
}

impl LoadReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// A module load succeeds only if nothing failed; duplicates are warnings
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}
