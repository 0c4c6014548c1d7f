//! Plugin Trait System
//!
//! A plugin is a value implementing [`Plugin`]. The host only ever talks to
//! it through this trait: identity accessors, the lifecycle hooks, and
//! by-name method dispatch. Plugins usually keep their methods in a
//! [`MethodTable`](crate::plugin::methods::MethodTable) and forward
//! `method_names` and `call` to it.

use crate::plugin::error::{panic_message, PluginFault};
use crate::plugin::host::HostHandle;
use crate::plugin::types::{PluginDescriptor, PluginValue};

/// Base plugin trait that all plugins must implement
///
/// Instances are created by a module's candidate factory, initialised once,
/// and owned by the registry until they are unloaded. The host serialises
/// access to a single instance, so methods take `&mut self`.
pub trait Plugin: Send {
    /// Author part of the registry identity
    fn author(&self) -> &str;

    /// Name part of the registry identity
    fn name(&self) -> &str;

    /// Semantic version text; checked against the caller's range on every call
    fn version(&self) -> &str;

    fn description(&self) -> &str;

    /// Called once after construction, before registration
    fn initialize(&mut self, host: HostHandle) -> Result<(), PluginFault>;

    /// Release resources; called once before the instance is dropped
    fn unload(&mut self) {}

    /// Names of the methods callable through [`Plugin::call`]
    fn method_names(&self) -> Vec<String>;

    fn has_method(&self, method: &str) -> bool {
        self.method_names().iter().any(|name| name == method)
    }

    /// Invoke `method` with positional arguments
    fn call(&mut self, method: &str, args: &[PluginValue]) -> Result<PluginValue, PluginFault>;

    fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor {
            author: self.author().to_string(),
            name: self.name().to_string(),
            version: self.version().to_string(),
            description: self.description().to_string(),
            methods: self.method_names(),
        }
    }
}

/// Call `unload`, containing a panic to this plugin
///
/// `label` names the plugin in the log without calling back into it.
pub(crate) fn unload_guarded(plugin: &mut dyn Plugin, label: &str) -> bool {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| plugin.unload()));
    match result {
        Ok(()) => true,
        Err(payload) => {
            log::error!(
                "Plugin '{}' {} while unloading",
                label,
                panic_message(payload.as_ref())
            );
            false
        }
    }
}
