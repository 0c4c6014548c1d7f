//! Plugin Manager
//!
//! The host facade: owns the registry, loader, dispatcher and bus, and
//! provides load, unload and invoke to the rest of the application.

use crate::core::constants::Constants;
use crate::notifications::api::{topics, MessageBus, MessageManager, Payload};
use crate::paths::api::PathResolver;
use crate::plugin::dispatcher::InvocationDispatcher;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::host::HostHandle;
use crate::plugin::loader::PluginLoader;
use crate::plugin::module::{HostModuleSource, ModuleSource};
use crate::plugin::registry::{PluginEntry, SharedPluginRegistry};
use crate::plugin::traits::unload_guarded;
use crate::plugin::types::{LoadReport, PluginDescriptor, PluginValue};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Central plugin manager responsible for:
/// - Loading modules into the registry
/// - Unloading plugins
/// - Versioned method invocation
pub struct PluginManager {
    /// The plugin registry (owned by this manager)
    registry: SharedPluginRegistry,
    loader: Arc<PluginLoader>,
    dispatcher: InvocationDispatcher,
    messages: Arc<MessageBus>,
    host: HostHandle,
}

impl PluginManager {
    /// Manager that opens builtin and shared-library modules
    pub fn new(
        constants: Arc<Constants>,
        paths: Arc<dyn PathResolver>,
        messages: Arc<MessageBus>,
    ) -> Self {
        Self::with_source(constants, paths, messages, Arc::new(HostModuleSource::default()))
    }

    pub fn with_source(
        constants: Arc<Constants>,
        paths: Arc<dyn PathResolver>,
        messages: Arc<MessageBus>,
        source: Arc<dyn ModuleSource>,
    ) -> Self {
        let bus: Arc<dyn MessageManager> = messages.clone();
        let registry = SharedPluginRegistry::new();
        let host = HostHandle::new(constants, paths, bus.clone());
        let loader = Arc::new(PluginLoader::new(
            source,
            registry.clone(),
            bus.clone(),
            host.clone(),
        ));
        let dispatcher = InvocationDispatcher::new(registry.clone(), bus);

        Self {
            registry,
            loader,
            dispatcher,
            messages,
            host,
        }
    }

    /// Load one module; true if every candidate loaded
    pub fn load_plugin(&self, path: &Path) -> bool {
        self.loader.load_from(path).succeeded()
    }

    pub fn load_plugins<I, P>(&self, paths: I) -> Vec<LoadReport>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.loader.load_all(paths)
    }

    pub async fn load_plugins_parallel(&self, paths: Vec<PathBuf>) -> Vec<LoadReport> {
        self.loader.load_all_parallel(paths).await
    }

    /// Unregister a plugin, then unload it
    ///
    /// Removal decides ownership: of concurrent callers only the one that
    /// took the entry out of the registry runs `unload` and announces it.
    /// A missing plugin is reported as a `"Warning"`.
    pub fn unload_plugin(&self, author: &str, name: &str) -> bool {
        let entry = match self.registry.unregister(author, name) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                let warning = PluginError::PluginNotFound {
                    author: author.to_string(),
                    name: name.to_string(),
                };
                self.messages
                    .notify_all(topics::WARNING, Payload::from(warning.to_string()));
                return false;
            }
            Err(err) => {
                self.report_error(&err);
                return false;
            }
        };

        if let Err(err) = self.unload_entry(&entry) {
            self.report_error(&err);
            return false;
        }
        log::debug!("Unloaded plugin {}.{}", author, name);
        self.messages
            .notify_all(topics::UNLOAD_PLUGIN, Payload::from(name.to_string()));
        true
    }

    /// Unload every registered plugin; returns how many were unloaded
    pub fn unload_all(&self) -> usize {
        let entries = match self.registry.drain() {
            Ok(entries) => entries,
            Err(err) => {
                self.report_error(&err);
                return 0;
            }
        };

        let mut unloaded = 0;
        for entry in entries {
            match self.unload_entry(&entry) {
                Ok(()) => {
                    unloaded += 1;
                    self.messages.notify_all(
                        topics::UNLOAD_PLUGIN,
                        Payload::from(entry.descriptor().name.clone()),
                    );
                }
                Err(err) => self.report_error(&err),
            }
        }
        log::debug!("Unloaded {} plugin(s)", unloaded);
        unloaded
    }

    pub fn invoke_plugin_method(
        &self,
        author: &str,
        name: &str,
        method: &str,
        version_range: &str,
        args: &[PluginValue],
    ) -> PluginResult<PluginValue> {
        self.dispatcher
            .invoke(author, name, version_range, method, args)
    }

    /// Loaded plugins sorted by author, then name
    pub fn plugins(&self) -> PluginResult<Vec<PluginDescriptor>> {
        self.registry.descriptors()
    }

    pub fn registry(&self) -> &SharedPluginRegistry {
        &self.registry
    }

    pub fn host_handle(&self) -> HostHandle {
        self.host.clone()
    }

    pub fn messages(&self) -> &Arc<MessageBus> {
        &self.messages
    }

    fn unload_entry(&self, entry: &PluginEntry) -> PluginResult<()> {
        let mut plugin = entry.lock()?;
        unload_guarded(plugin.as_mut(), &entry.key().to_string());
        Ok(())
    }

    fn report_error(&self, err: &PluginError) {
        log::debug!("{}", err);
        self.messages
            .notify_all(topics::ERROR, Payload::from(err.to_string()));
    }
}
