//! Capabilities handed to plugins

use crate::core::constants::Constants;
use crate::notifications::api::{MessageManager, Payload};
use crate::paths::api::{PathResolver, RootPath, StdPath};
use std::path::PathBuf;
use std::sync::Arc;

/// What a plugin may see of its host
///
/// Constants, path queries and the notification bus. It cannot
/// load, unload or invoke plugins.
#[derive(Clone)]
pub struct HostHandle {
    constants: Arc<Constants>,
    paths: Arc<dyn PathResolver>,
    messages: Arc<dyn MessageManager>,
}

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("constants", &self.constants)
            .finish_non_exhaustive()
    }
}

impl HostHandle {
    pub fn new(
        constants: Arc<Constants>,
        paths: Arc<dyn PathResolver>,
        messages: Arc<dyn MessageManager>,
    ) -> Self {
        Self {
            constants,
            paths,
            messages,
        }
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn messages(&self) -> &Arc<dyn MessageManager> {
        &self.messages
    }

    /// Publish on the host bus
    pub fn notify(&self, topic: &str, payload: impl Into<Payload>) {
        self.messages.notify_all(topic, payload.into());
    }

    /// Every runtime-path location of `file_name`, in search order
    pub fn resolve_file(&self, file_name: &str) -> Vec<PathBuf> {
        self.paths.resolve_named_file(file_name)
    }

    pub fn std_path(&self, what: StdPath) -> PathBuf {
        self.paths.std_path(what)
    }

    pub fn root_path(&self, what: RootPath) -> Option<PathBuf> {
        self.paths.root_path(what)
    }
}
