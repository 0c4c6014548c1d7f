//! Plugin modules and the sources that open them
//!
//! A module is anything that can hand the loader a [`PluginModuleDecl`]:
//! a shared library exporting [`ENTRY_SYMBOL`], a builtin compiled into the
//! host, or an in-process table entry. The declaration lists the candidate
//! plugin types together with a no-argument factory for each.
//!
//! Shared libraries must be built with the same compiler as the host, since
//! the entry point and the plugin trait objects use the Rust ABI.

use crate::core::version;
use crate::plugin::builtin::api::{BuiltinModuleSource, BUILTIN_PREFIX};
use crate::plugin::error::{panic_message, PluginError, PluginFault, PluginResult};
use crate::plugin::traits::Plugin;
use libloading::Library;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Exported symbol every plugin library provides
pub const ENTRY_SYMBOL: &str = "wim_plugin_entry";

/// Builds one plugin instance
pub type PluginFactory = fn() -> Result<Box<dyn Plugin>, PluginFault>;

/// Module entry point signature
pub type ModuleEntry = fn() -> PluginModuleDecl;

/// One instantiable plugin type declared by a module
#[derive(Clone, Copy)]
pub struct PluginCandidate {
    pub type_name: &'static str,
    pub factory: PluginFactory,
}

impl std::fmt::Debug for PluginCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginCandidate")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

fn default_factory<T: Plugin + Default + 'static>() -> Result<Box<dyn Plugin>, PluginFault> {
    Ok(Box::new(T::default()))
}

impl PluginCandidate {
    pub const fn new(type_name: &'static str, factory: PluginFactory) -> Self {
        Self { type_name, factory }
    }

    /// Candidate built with `T::default()`
    pub fn of<T: Plugin + Default + 'static>() -> Self {
        Self::new(std::any::type_name::<T>(), default_factory::<T>)
    }
}

/// What a module's entry point returns
#[derive(Debug, Clone)]
pub struct PluginModuleDecl {
    /// Plugin API version the module was built against
    pub api_version: u32,
    pub candidates: Vec<PluginCandidate>,
}

impl PluginModuleDecl {
    /// Declaration stamped with the API version of this build
    pub fn new(candidates: Vec<PluginCandidate>) -> Self {
        Self {
            api_version: version::plugin_api_version(),
            candidates,
        }
    }
}

/// Generate the module entry point for a plugin library
///
/// ```ignore
/// wim::declare_plugin_module!(EchoPlugin, ClockPlugin);
/// ```
#[macro_export]
macro_rules! declare_plugin_module {
    ($($plugin:ty),+ $(,)?) => {
        #[no_mangle]
        pub fn wim_plugin_entry() -> $crate::plugin::api::PluginModuleDecl {
            $crate::plugin::api::PluginModuleDecl::new(vec![
                $($crate::plugin::api::PluginCandidate::of::<$plugin>()),+
            ])
        }
    };
}

/// An opened module
///
/// `library` is set for shared libraries and must outlive every instance
/// created from the declaration's factories.
pub struct OpenedModule {
    pub decl: PluginModuleDecl,
    pub library: Option<Arc<Library>>,
}

/// Something that turns a module path into a declaration
pub trait ModuleSource: Send + Sync {
    fn open(&self, path: &Path) -> PluginResult<OpenedModule>;
}

pub(crate) fn open_failed(path: &Path, cause: impl std::fmt::Display) -> PluginError {
    PluginError::ModuleOpenFailed {
        path: path.display().to_string(),
        cause: cause.to_string(),
    }
}

/// Run an entry point, turning a panic into an open failure
pub(crate) fn call_entry(path: &Path, entry: ModuleEntry) -> PluginResult<PluginModuleDecl> {
    catch_unwind(AssertUnwindSafe(entry))
        .map_err(|payload| open_failed(path, panic_message(payload.as_ref())))
}

/// Shared libraries opened with `libloading`
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryModuleSource;

impl ModuleSource for LibraryModuleSource {
    fn open(&self, path: &Path) -> PluginResult<OpenedModule> {
        log::trace!("Opening library {}", path.display());

        // SAFETY: loading a library runs its initialisers; plugin libraries
        // are trusted code by contract.
        let library = unsafe { Library::new(path) }.map_err(|e| open_failed(path, e))?;

        let entry: ModuleEntry = {
            // SAFETY: the symbol is declared by `declare_plugin_module!` with
            // exactly the `ModuleEntry` signature.
            let symbol = unsafe { library.get::<ModuleEntry>(ENTRY_SYMBOL.as_bytes()) }
                .map_err(|e| open_failed(path, e))?;
            *symbol
        };

        let decl = call_entry(path, entry)?;
        Ok(OpenedModule {
            decl,
            library: Some(Arc::new(library)),
        })
    }
}

/// In-process module table keyed by path
#[derive(Debug, Default, Clone)]
pub struct StaticModuleSource {
    modules: HashMap<PathBuf, ModuleEntry>,
}

impl StaticModuleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, path: impl Into<PathBuf>, entry: ModuleEntry) -> Self {
        self.insert(path, entry);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, entry: ModuleEntry) {
        self.modules.insert(path.into(), entry);
    }
}

impl ModuleSource for StaticModuleSource {
    fn open(&self, path: &Path) -> PluginResult<OpenedModule> {
        let entry = self
            .modules
            .get(path)
            .ok_or_else(|| open_failed(path, "no module registered at this path"))?;
        Ok(OpenedModule {
            decl: call_entry(path, *entry)?,
            library: None,
        })
    }
}

/// The host's default source: `builtin:<name>` paths, otherwise libraries
#[derive(Debug, Default, Clone, Copy)]
pub struct HostModuleSource {
    builtins: BuiltinModuleSource,
    libraries: LibraryModuleSource,
}

impl ModuleSource for HostModuleSource {
    fn open(&self, path: &Path) -> PluginResult<OpenedModule> {
        if path.to_string_lossy().starts_with(BUILTIN_PREFIX) {
            self.builtins.open(path)
        } else {
            self.libraries.open(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::error::PluginErrorKind;
    use crate::plugin::host::HostHandle;
    use crate::plugin::types::PluginValue;

    #[derive(Default)]
    struct Probe;

    impl Plugin for Probe {
        fn author(&self) -> &str {
            "test"
        }
        fn name(&self) -> &str {
            "probe"
        }
        fn version(&self) -> &str {
            "1.0.0"
        }
        fn description(&self) -> &str {
            "probe"
        }
        fn initialize(&mut self, _host: HostHandle) -> Result<(), PluginFault> {
            Ok(())
        }
        fn method_names(&self) -> Vec<String> {
            Vec::new()
        }
        fn call(&mut self, method: &str, _args: &[PluginValue]) -> Result<PluginValue, PluginFault> {
            Err(PluginFault::new(format!("no method {}", method)))
        }
    }

    fn probe_module() -> PluginModuleDecl {
        PluginModuleDecl::new(vec![PluginCandidate::of::<Probe>()])
    }

    fn panicking_module() -> PluginModuleDecl {
        panic!("entry exploded")
    }

    #[test]
    fn test_candidate_of_uses_default() {
        let candidate = PluginCandidate::of::<Probe>();
        assert!(candidate.type_name.ends_with("Probe"));
        let plugin = (candidate.factory)().unwrap();
        assert_eq!(plugin.name(), "probe");
    }

    #[test]
    fn test_static_source_opens_registered_paths() {
        let source = StaticModuleSource::new().with_module("mem://probe", probe_module);

        let opened = source.open(Path::new("mem://probe")).unwrap();
        assert_eq!(opened.decl.candidates.len(), 1);
        assert_eq!(opened.decl.api_version, version::plugin_api_version());
        assert!(opened.library.is_none());

        let err = source.open(Path::new("mem://other")).err().unwrap();
        assert_eq!(err.kind(), PluginErrorKind::ModuleOpenFailed);
    }

    #[test]
    fn test_panicking_entry_is_an_open_failure() {
        let source = StaticModuleSource::new().with_module("mem://boom", panicking_module);
        let err = source.open(Path::new("mem://boom")).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Failed to load plugin from mem://boom: panicked: entry exploded"
        );
    }

    #[test]
    fn test_library_source_reports_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("missing.so");
        let err = LibraryModuleSource.open(&path).err().unwrap();
        match err {
            PluginError::ModuleOpenFailed { path: reported, cause } => {
                assert_eq!(reported, path.display().to_string());
                assert!(!cause.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_library_source_rejects_non_library_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp
            .path()
            .join(format!("garbage.{}", std::env::consts::DLL_EXTENSION));
        std::fs::write(&path, b"not a shared library").unwrap();

        let err = HostModuleSource::default().open(&path).err().unwrap();
        assert_eq!(err.kind(), PluginErrorKind::ModuleOpenFailed);
    }
}
