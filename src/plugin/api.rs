//! Public API for the plugin system
//!
//! External modules and plugin authors should import from here rather than
//! directly from internal modules.

// Core plugin management
pub use crate::plugin::dispatcher::InvocationDispatcher;
pub use crate::plugin::loader::PluginLoader;
pub use crate::plugin::manager::PluginManager;

// Error handling
pub use crate::plugin::error::{PluginError, PluginErrorKind, PluginFault, PluginResult};

// Plugin authoring
pub use crate::plugin::host::HostHandle;
pub use crate::plugin::methods::{arg_i64, arg_str, arg_value, expect_arity, MethodFn, MethodTable};
pub use crate::plugin::traits::Plugin;

// Plugin metadata and information
pub use crate::plugin::types::{LoadReport, PluginDescriptor, PluginKey, PluginValue};

// Plugin registry for management
pub use crate::plugin::registry::{PluginEntry, PluginRegistry, RegisterResult, SharedPluginRegistry};

// Module sources
pub use crate::plugin::builtin::api::{builtin_module_paths, BuiltinModuleSource, BUILTIN_PREFIX};
pub use crate::plugin::module::{
    HostModuleSource, LibraryModuleSource, ModuleEntry, ModuleSource, OpenedModule,
    PluginCandidate, PluginFactory, PluginModuleDecl, StaticModuleSource, ENTRY_SYMBOL,
};
