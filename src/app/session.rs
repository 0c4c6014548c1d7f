//! A configured host: bus, paths and plugin manager built from the arguments

use crate::app::cli::args::Args;
use crate::app::event_log::bridge_to_log;
use crate::core::constants::Constants;
use crate::notifications::api::{topics, MessageBus, MessageManager, Payload};
use crate::paths::api::{InstallationChecker, RuntimePathManager};
use crate::plugin::api::{builtin_module_paths, LoadReport, PluginManager, BUILTIN_PREFIX};
use std::path::PathBuf;
use std::sync::Arc;

pub struct Session {
    pub args: Args,
    pub use_color: bool,
    pub paths: Arc<RuntimePathManager>,
    pub manager: PluginManager,
}

impl Session {
    /// Detect the installation and build the host for these arguments
    pub fn new(args: Args, use_color: bool) -> Self {
        let constants = Arc::new(Constants::default());
        let bus = Arc::new(MessageBus::new());
        bridge_to_log(&bus);

        let installation = InstallationChecker::detect(&constants);
        log::debug!(
            "Installation: installed={}, root={}",
            installation.is_installed(),
            installation.is_root()
        );
        let paths = Arc::new(RuntimePathManager::new(&constants, installation, bus.clone()));
        let manager = PluginManager::new(constants, paths.clone(), bus);
        Self::with_parts(args, use_color, paths, manager)
    }

    /// Assemble from prebuilt parts; `--plugin-dir` entries are added to `paths`
    pub fn with_parts(
        args: Args,
        use_color: bool,
        paths: Arc<RuntimePathManager>,
        manager: PluginManager,
    ) -> Self {
        for dir in &args.plugin_dirs {
            paths.add_path(dir.clone());
        }
        Self {
            args,
            use_color,
            paths,
            manager,
        }
    }

    /// Builtins then discovered libraries, minus exclusions
    pub fn module_paths(&self) -> Vec<PathBuf> {
        let mut modules = Vec::new();

        if !self.args.no_builtins {
            modules.extend(builtin_module_paths().into_iter().filter(|path| {
                let text = path.to_string_lossy();
                let name = text.strip_prefix(BUILTIN_PREFIX).unwrap_or(&text);
                !self.args.is_excluded(name)
            }));
        }

        match self.paths.plugin_paths() {
            Ok(found) => modules.extend(found.into_iter().filter(|path| {
                path.file_stem()
                    .map(|stem| !self.args.is_excluded(&stem.to_string_lossy()))
                    .unwrap_or(true)
            })),
            Err(err) => self
                .manager
                .messages()
                .notify_all(topics::WARNING, Payload::from(err.to_string())),
        }

        log::debug!("{} plugin module(s) to load", modules.len());
        modules
    }

    pub async fn load(&self) -> Vec<LoadReport> {
        let modules = self.module_paths();
        if self.args.parallel {
            self.manager.load_plugins_parallel(modules).await
        } else {
            self.manager.load_plugins(modules)
        }
    }
}
