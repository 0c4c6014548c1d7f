//! API for builtin module registration and discovery
//!
//! Builtin modules are compiled into the host and register themselves with
//! the `builtin!` macro. They are loaded through the same path as shared
//! libraries, addressed as `builtin:<name>`.

use crate::plugin::error::PluginResult;
use crate::plugin::module::{call_entry, open_failed, ModuleEntry, ModuleSource, OpenedModule};
use std::path::{Path, PathBuf};

/// Path prefix that selects a builtin module
pub const BUILTIN_PREFIX: &str = "builtin:";

/// Entry for a builtin module in the dynamic registry
pub struct BuiltinModuleEntry {
    pub name: &'static str,
    pub entry: ModuleEntry,
}

// Collect all builtin module entries
inventory::collect!(BuiltinModuleEntry);

/// Macro for registering builtin modules
#[macro_export]
macro_rules! builtin {
    ($name:expr, $entry:expr) => {
        inventory::submit!($crate::plugin::builtin::api::BuiltinModuleEntry {
            name: $name,
            entry: $entry
        });
    };
}

/// Module paths of every registered builtin, sorted by name
pub fn builtin_module_paths() -> Vec<PathBuf> {
    let mut names: Vec<&str> = inventory::iter::<BuiltinModuleEntry>()
        .map(|entry| entry.name)
        .collect();
    names.sort_unstable();
    names.dedup();
    names
        .into_iter()
        .map(|name| PathBuf::from(format!("{}{}", BUILTIN_PREFIX, name)))
        .collect()
}

fn find_builtin(name: &str) -> Option<&'static BuiltinModuleEntry> {
    inventory::iter::<BuiltinModuleEntry>().find(|entry| entry.name == name)
}

/// Opens `builtin:<name>` paths from the inventory
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinModuleSource;

impl ModuleSource for BuiltinModuleSource {
    fn open(&self, path: &Path) -> PluginResult<OpenedModule> {
        let text = path.to_string_lossy();
        let name = text
            .strip_prefix(BUILTIN_PREFIX)
            .ok_or_else(|| open_failed(path, "not a builtin module path"))?;
        let builtin =
            find_builtin(name).ok_or_else(|| open_failed(path, "no builtin module with this name"))?;

        Ok(OpenedModule {
            decl: call_entry(path, builtin.entry)?,
            library: None,
        })
    }
}
