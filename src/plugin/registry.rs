//! Plugin Registry
//!
//! Thread-safe table of loaded plugin instances keyed by author, then name.

use crate::core::sync::poisoned_as_error;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::Plugin;
use crate::plugin::types::{PluginDescriptor, PluginKey};
use libloading::Library;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// A registered plugin instance
///
/// Fields drop in declaration order: the instance goes before the library
/// its code lives in.
pub struct PluginEntry {
    instance: Mutex<Box<dyn Plugin>>,
    descriptor: PluginDescriptor,
    module: Option<Arc<Library>>,
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("descriptor", &self.descriptor)
            .field("dynamic", &self.module.is_some())
            .finish()
    }
}

impl PluginEntry {
    /// Pair an instance with metadata already read from it
    ///
    /// Reading the metadata runs plugin code, so the loader does it under a
    /// panic guard before the entry reaches the registry.
    pub fn new(
        instance: Box<dyn Plugin>,
        descriptor: PluginDescriptor,
        module: Option<Arc<Library>>,
    ) -> Self {
        Self {
            instance: Mutex::new(instance),
            descriptor,
            module,
        }
    }

    /// Metadata captured at registration
    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    pub fn key(&self) -> PluginKey {
        self.descriptor.key()
    }

    /// Exclusive access to the instance for one call
    pub fn lock(&self) -> PluginResult<MutexGuard<'_, Box<dyn Plugin>>> {
        poisoned_as_error(self.instance.lock(), "plugin instance", sync_error)
    }
}

/// Outcome of [`PluginRegistry::register`]
pub enum RegisterResult {
    Registered(PluginKey),
    /// The identity was taken; the rejected entry is handed back
    AlreadyPresent(PluginKey, PluginEntry),
}

impl RegisterResult {
    pub fn is_registered(&self) -> bool {
        matches!(self, RegisterResult::Registered(_))
    }

    pub fn key(&self) -> &PluginKey {
        match self {
            RegisterResult::Registered(key) => key,
            RegisterResult::AlreadyPresent(key, _) => key,
        }
    }
}

impl std::fmt::Debug for RegisterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterResult::Registered(key) => f.debug_tuple("Registered").field(key).finish(),
            RegisterResult::AlreadyPresent(key, _) => {
                f.debug_tuple("AlreadyPresent").field(key).finish()
            }
        }
    }
}

/// Plugin registry for managing loaded plugins
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, HashMap<String, Arc<PluginEntry>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the author and name captured in the entry
    pub fn register(&mut self, entry: PluginEntry) -> RegisterResult {
        let key = entry.key();
        let by_name = self.plugins.entry(key.author.clone()).or_default();
        if by_name.contains_key(&key.name) {
            return RegisterResult::AlreadyPresent(key, entry);
        }
        by_name.insert(key.name.clone(), Arc::new(entry));
        RegisterResult::Registered(key)
    }

    pub fn lookup(&self, author: &str, name: &str) -> Option<Arc<PluginEntry>> {
        self.plugins.get(author)?.get(name).cloned()
    }

    /// Remove without unloading; drops the author when it has no plugins left
    pub fn unregister(&mut self, author: &str, name: &str) -> Option<Arc<PluginEntry>> {
        let by_name = self.plugins.get_mut(author)?;
        let removed = by_name.remove(name);
        if by_name.is_empty() {
            self.plugins.remove(author);
        }
        removed
    }

    pub fn contains(&self, author: &str, name: &str) -> bool {
        self.lookup(author, name).is_some()
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.values().map(HashMap::len).sum()
    }

    pub fn author_count(&self) -> usize {
        self.plugins.len()
    }

    /// Registered identities sorted by author, then name
    pub fn keys(&self) -> Vec<PluginKey> {
        let mut keys: Vec<PluginKey> = self
            .plugins
            .iter()
            .flat_map(|(author, by_name)| {
                by_name.keys().map(move |name| PluginKey::new(author, name))
            })
            .collect();
        keys.sort();
        keys
    }

    /// Descriptors sorted by author, then name
    pub fn descriptors(&self) -> Vec<PluginDescriptor> {
        let mut descriptors: Vec<PluginDescriptor> = self
            .plugins
            .values()
            .flat_map(|by_name| by_name.values().map(|entry| entry.descriptor().clone()))
            .collect();
        descriptors.sort_by(|a, b| a.key().cmp(&b.key()));
        descriptors
    }

    /// Remove every entry, sorted by author, then name
    pub fn drain(&mut self) -> Vec<Arc<PluginEntry>> {
        let mut entries: Vec<Arc<PluginEntry>> = self
            .plugins
            .drain()
            .flat_map(|(_, by_name)| by_name.into_values())
            .collect();
        entries.sort_by_key(|entry| entry.key());
        entries
    }
}

/// Registry shared between the loader, the dispatcher and the host
///
/// Each operation takes the lock only for its own duration. A poisoned lock
/// surfaces as [`PluginError::Synchronisation`].
#[derive(Debug, Clone, Default)]
pub struct SharedPluginRegistry {
    inner: Arc<RwLock<PluginRegistry>>,
}

fn sync_error(message: String) -> PluginError {
    PluginError::Synchronisation { message }
}

impl SharedPluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get access to the inner registry for read/write operations
    pub fn inner(&self) -> &Arc<RwLock<PluginRegistry>> {
        &self.inner
    }

    pub fn register(&self, entry: PluginEntry) -> PluginResult<RegisterResult> {
        let mut registry = poisoned_as_error(self.inner.write(), "registry write", sync_error)?;
        Ok(registry.register(entry))
    }

    pub fn lookup(&self, author: &str, name: &str) -> PluginResult<Option<Arc<PluginEntry>>> {
        let registry = poisoned_as_error(self.inner.read(), "registry read", sync_error)?;
        Ok(registry.lookup(author, name))
    }

    pub fn unregister(&self, author: &str, name: &str) -> PluginResult<Option<Arc<PluginEntry>>> {
        let mut registry = poisoned_as_error(self.inner.write(), "registry write", sync_error)?;
        Ok(registry.unregister(author, name))
    }

    pub fn plugin_count(&self) -> PluginResult<usize> {
        let registry = poisoned_as_error(self.inner.read(), "registry read", sync_error)?;
        Ok(registry.plugin_count())
    }

    pub fn keys(&self) -> PluginResult<Vec<PluginKey>> {
        let registry = poisoned_as_error(self.inner.read(), "registry read", sync_error)?;
        Ok(registry.keys())
    }

    pub fn descriptors(&self) -> PluginResult<Vec<PluginDescriptor>> {
        let registry = poisoned_as_error(self.inner.read(), "registry read", sync_error)?;
        Ok(registry.descriptors())
    }

    pub fn drain(&self) -> PluginResult<Vec<Arc<PluginEntry>>> {
        let mut registry = poisoned_as_error(self.inner.write(), "registry write", sync_error)?;
        Ok(registry.drain())
    }
}
