//! Path queries consumed by the plugin core

use crate::paths::types::{RootPath, StdPath};
use std::path::PathBuf;

/// Narrow path interface handed to the loader and to plugins
pub trait PathResolver: Send + Sync {
    /// Candidate plugin module files, in search order
    fn list_plugin_module_paths(&self) -> Vec<PathBuf>;

    /// Every existing `<runtime path>/<file_name>`
    fn resolve_named_file(&self, file_name: &str) -> Vec<PathBuf>;

    fn std_path(&self, what: StdPath) -> PathBuf;

    /// `None` unless installed for all users
    fn root_path(&self, what: RootPath) -> Option<PathBuf>;
}
