//! Runtime path manager
//!
//! Keeps the ordered list of runtime directories searched for plugin modules
//! and named files, and answers the standard and system-wide directory
//! queries.

use crate::core::constants::Constants;
use crate::core::sync::recover_poison;
use crate::notifications::api::{topics, MessageManager, Payload};
use crate::paths::error::{PathError, PathResult};
use crate::paths::installation::{app_dir, system_data_dir, InstallationChecker};
use crate::paths::traits::PathResolver;
use crate::paths::types::{RootPath, StdPath};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub struct RuntimePathManager {
    std_root: PathBuf,
    cache: PathBuf,
    root: Option<PathBuf>,
    paths: RwLock<Vec<PathBuf>>,
    messages: Arc<dyn MessageManager>,
}

impl std::fmt::Debug for RuntimePathManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimePathManager")
            .field("std_root", &self.std_root)
            .field("cache", &self.cache)
            .field("root", &self.root)
            .field("paths", &self.runtime_paths())
            .finish()
    }
}

impl RuntimePathManager {
    /// Build from the running executable's location
    ///
    /// If the executable directory cannot be determined, an `"Error"` is
    /// published and portable directories fall back to the working
    /// directory.
    pub fn new(
        constants: &Constants,
        installation: InstallationChecker,
        messages: Arc<dyn MessageManager>,
    ) -> Self {
        let exe_dir = match executable_dir() {
            Ok(dir) => Some(dir),
            Err(err) => {
                messages.notify_all(topics::ERROR, Payload::from(err.to_string()));
                None
            }
        };
        Self::with_executable_dir(constants, installation, exe_dir, messages)
    }

    pub fn with_executable_dir(
        constants: &Constants,
        installation: InstallationChecker,
        exe_dir: Option<PathBuf>,
        messages: Arc<dyn MessageManager>,
    ) -> Self {
        let portable_root = exe_dir
            .as_ref()
            .map(|dir| dir.join(".."))
            .unwrap_or_else(|| PathBuf::from("."));

        let std_root = match dirs::data_local_dir() {
            Some(local) if installation.is_installed() => app_dir(&local, constants),
            _ => portable_root.clone(),
        };
        let cache = if installation.is_installed() {
            app_dir(&std::env::temp_dir(), constants)
        } else {
            portable_root.join("temp")
        };
        let root = if installation.is_root() {
            system_data_dir().map(|dir| app_dir(&dir, constants))
        } else {
            None
        };

        let manager = Self {
            std_root,
            cache,
            root,
            paths: RwLock::new(Vec::new()),
            messages,
        };

        let initial: Vec<PathBuf> = exe_dir
            .map(|dir| dir.join(".."))
            .into_iter()
            .chain(manager.root_path(RootPath::Config))
            .chain(manager.root_path(RootPath::Data))
            .chain([
                manager.std_path(StdPath::Config),
                manager.std_path(StdPath::Data),
            ])
            .collect();
        manager.set_runtime_paths(initial);

        log::debug!("Runtime paths: {:?}", manager.runtime_paths());
        manager
    }

    pub fn runtime_paths(&self) -> Vec<PathBuf> {
        recover_poison(self.paths.read(), "runtime paths").clone()
    }

    /// Replace the runtime paths, dropping duplicates but keeping order
    pub fn set_runtime_paths<I>(&self, new_paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut paths = recover_poison(self.paths.write(), "runtime paths");
        paths.clear();
        for path in new_paths {
            if !path.as_os_str().is_empty() && !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    /// Append a runtime path; false if already present
    pub fn add_path(&self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        let mut paths = recover_poison(self.paths.write(), "runtime paths");
        if path.as_os_str().is_empty() || paths.contains(&path) {
            return false;
        }
        paths.push(path);
        true
    }

    pub fn remove_path(&self, path: &Path) -> bool {
        let mut paths = recover_poison(self.paths.write(), "runtime paths");
        match paths.iter().position(|existing| existing == path) {
            Some(index) => {
                paths.remove(index);
                true
            }
            None => false,
        }
    }

    /// Dynamic libraries in the top level of each existing runtime path
    pub fn plugin_paths(&self) -> PathResult<Vec<PathBuf>> {
        let mut found = Vec::new();
        for dir in self.runtime_paths().iter().filter(|dir| dir.is_dir()) {
            let pattern = format!(
                "{}/*.{}",
                glob::Pattern::escape(&dir.to_string_lossy()),
                std::env::consts::DLL_EXTENSION
            );
            let entries = glob::glob(&pattern).map_err(|e| PathError::InvalidPattern {
                pattern: pattern.clone(),
                cause: e.to_string(),
            })?;
            for entry in entries.flatten() {
                if entry.is_file() && !found.contains(&entry) {
                    found.push(entry);
                }
            }
        }
        Ok(found)
    }

    /// Existing `<runtime path>/<file_name>` entries; empty name gives none
    pub fn paths(&self, file_name: &str) -> Vec<PathBuf> {
        if file_name.is_empty() {
            return Vec::new();
        }
        self.runtime_paths()
            .iter()
            .map(|dir| dir.join(file_name))
            .filter(|path| path.is_file())
            .collect()
    }

    pub fn std_path(&self, what: StdPath) -> PathBuf {
        match what {
            StdPath::Root => self.std_root.clone(),
            StdPath::Config => self.std_root.join("config"),
            StdPath::Data => self.std_root.join("data"),
            StdPath::State => self.std_path(StdPath::Data).join("state"),
            StdPath::Log => self.std_path(StdPath::Data).join("log"),
            StdPath::PluginData => self.std_path(StdPath::Data).join("plugins"),
            StdPath::Cache => self.cache.clone(),
        }
    }

    pub fn root_path(&self, what: RootPath) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        Some(match what {
            RootPath::Root => root.clone(),
            RootPath::Config => root.join("config"),
            RootPath::Data => root.join("data"),
            RootPath::PluginData => root.join("data").join("plugins"),
        })
    }

    /// Delete everything inside the cache directory
    ///
    /// Each entry that cannot be deleted is published as a `"Warning"` and
    /// returned; the remaining entries are still attempted.
    pub fn clean_cache(&self) -> Vec<PathError> {
        let cache = self.std_path(StdPath::Cache);
        let entries = match std::fs::read_dir(&cache) {
            Ok(entries) => entries,
            Err(_) => {
                log::debug!("No cache directory at {}", cache.display());
                return Vec::new();
            }
        };

        let mut failures = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let result = if path.is_dir() {
                std::fs::remove_dir_all(&path).map_err(|source| PathError::DeleteDirectoryFailed {
                    path: path.display().to_string(),
                    source,
                })
            } else {
                std::fs::remove_file(&path).map_err(|source| PathError::DeleteFileFailed {
                    path: path.display().to_string(),
                    source,
                })
            };
            if let Err(err) = result {
                self.messages
                    .notify_all(topics::WARNING, Payload::from(err.to_string()));
                failures.push(err);
            }
        }
        failures
    }
}

impl PathResolver for RuntimePathManager {
    fn list_plugin_module_paths(&self) -> Vec<PathBuf> {
        match self.plugin_paths() {
            Ok(paths) => paths,
            Err(err) => {
                self.messages
                    .notify_all(topics::ERROR, Payload::from(err.to_string()));
                Vec::new()
            }
        }
    }

    fn resolve_named_file(&self, file_name: &str) -> Vec<PathBuf> {
        self.paths(file_name)
    }

    fn std_path(&self, what: StdPath) -> PathBuf {
        RuntimePathManager::std_path(self, what)
    }

    fn root_path(&self, what: RootPath) -> Option<PathBuf> {
        RuntimePathManager::root_path(self, what)
    }
}

fn executable_dir() -> PathResult<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| PathError::ExecutableDirUnknown {
        cause: e.to_string(),
    })?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| PathError::ExecutableDirUnknown {
            cause: format!("{} has no parent directory", exe.display()),
        })
}
