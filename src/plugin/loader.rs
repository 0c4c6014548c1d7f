//! Plugin Loader
//!
//! Turns module paths into registered, initialised plugin instances and
//! reports every outcome on the notification bus.

use crate::core::version;
use crate::notifications::api::{topics, MessageManager, Payload};
use crate::plugin::error::{panic_message, PluginError, PluginResult};
use crate::plugin::host::HostHandle;
use crate::plugin::module::{open_failed, ModuleSource, OpenedModule, PluginCandidate};
use crate::plugin::registry::{PluginEntry, RegisterResult, SharedPluginRegistry};
use crate::plugin::traits::unload_guarded;
use crate::plugin::types::LoadReport;
use futures::future::join_all;
use libloading::Library;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct PluginLoader {
    source: Arc<dyn ModuleSource>,
    registry: SharedPluginRegistry,
    messages: Arc<dyn MessageManager>,
    host: HostHandle,
}

impl PluginLoader {
    pub fn new(
        source: Arc<dyn ModuleSource>,
        registry: SharedPluginRegistry,
        messages: Arc<dyn MessageManager>,
        host: HostHandle,
    ) -> Self {
        Self {
            source,
            registry,
            messages,
            host,
        }
    }

    /// Load every candidate a module declares
    ///
    /// Candidates are independent: one failing does not stop the others, and
    /// those already registered stay registered when a later one fails.
    pub fn load_from(&self, path: &Path) -> LoadReport {
        let mut report = LoadReport::new(path);
        log::debug!("Loading plugin module {}", path.display());

        let module = match self.open(path) {
            Ok(module) => module,
            Err(err) => {
                self.fail(&mut report, err);
                return report;
            }
        };

        for candidate in &module.decl.candidates {
            match self.instantiate(path, candidate, module.library.clone()) {
                Ok(entry) => self.register(&mut report, entry),
                Err(err) => self.fail(&mut report, err),
            }
        }

        log::debug!(
            "Module {}: {} registered, {} duplicate(s), {} failure(s)",
            path.display(),
            report.registered.len(),
            report.duplicates.len(),
            report.failures.len()
        );
        report
    }

    /// Load modules one after another, in order
    pub fn load_all<I, P>(&self, paths: I) -> Vec<LoadReport>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .map(|path| self.load_from(path.as_ref()))
            .collect()
    }

    /// Load modules concurrently on the blocking pool
    ///
    /// Reports come back in input order; bus notifications arrive in
    /// whatever order the loads finish.
    pub async fn load_all_parallel(self: &Arc<Self>, paths: Vec<PathBuf>) -> Vec<LoadReport> {
        let tasks = paths.iter().cloned().map(|path| {
            let loader = Arc::clone(self);
            tokio::task::spawn_blocking(move || loader.load_from(&path))
        });
        let results = join_all(tasks).await;

        results
            .into_iter()
            .zip(paths)
            .map(|(result, path)| {
                result.unwrap_or_else(|join_error| {
                    let mut report = LoadReport::new(&path);
                    let err = open_failed(&path, format!("load task failed: {}", join_error));
                    self.fail(&mut report, err);
                    report
                })
            })
            .collect()
    }

    fn open(&self, path: &Path) -> PluginResult<OpenedModule> {
        let module = self.source.open(path)?;
        if !version::is_api_compatible(module.decl.api_version) {
            return Err(open_failed(
                path,
                format!(
                    "module targets plugin API {} but the host provides {}",
                    module.decl.api_version,
                    version::plugin_api_version()
                ),
            ));
        }
        Ok(module)
    }

    /// Construct, initialise and describe one candidate
    ///
    /// Every call into plugin code here is panic-guarded and happens before
    /// the registry lock is taken.
    fn instantiate(
        &self,
        path: &Path,
        candidate: &PluginCandidate,
        library: Option<Arc<Library>>,
    ) -> PluginResult<PluginEntry> {
        let failed = |cause: String| PluginError::InstantiationFailed {
            type_name: candidate.type_name.to_string(),
            path: path.display().to_string(),
            cause,
        };

        let mut instance = match catch_unwind(candidate.factory) {
            Ok(Ok(instance)) => instance,
            Ok(Err(fault)) => return Err(failed(fault.to_string())),
            Err(payload) => return Err(failed(panic_message(payload.as_ref()))),
        };

        let host = self.host.clone();
        match catch_unwind(AssertUnwindSafe(|| instance.initialize(host))) {
            Ok(Ok(())) => {}
            Ok(Err(fault)) => return Err(failed(format!("initialisation failed: {}", fault))),
            Err(payload) => {
                return Err(failed(format!(
                    "initialisation {}",
                    panic_message(payload.as_ref())
                )))
            }
        }

        match catch_unwind(AssertUnwindSafe(|| instance.descriptor())) {
            Ok(descriptor) => Ok(PluginEntry::new(instance, descriptor, library)),
            Err(payload) => {
                unload_guarded(instance.as_mut(), candidate.type_name);
                Err(failed(format!(
                    "describing the plugin {}",
                    panic_message(payload.as_ref())
                )))
            }
        }
    }

    fn register(&self, report: &mut LoadReport, entry: PluginEntry) {
        match self.registry.register(entry) {
            Ok(RegisterResult::Registered(key)) => {
                log::debug!("Registered plugin {}", key);
                self.messages
                    .notify_all(topics::LOAD_PLUGIN, Payload::from(key.name.clone()));
                report.registered.push(key);
            }
            Ok(RegisterResult::AlreadyPresent(key, rejected)) => {
                let warning = PluginError::DuplicateRegistration {
                    author: key.author.clone(),
                    name: key.name.clone(),
                };
                self.messages
                    .notify_all(topics::WARNING, Payload::from(warning.to_string()));
                match rejected.lock() {
                    Ok(mut plugin) => {
                        unload_guarded(plugin.as_mut(), &key.to_string());
                    }
                    Err(err) => log::debug!("{}", err),
                }
                drop(rejected);
                report.duplicates.push(key);
            }
            Err(err) => self.fail(report, err),
        }
    }

    fn fail(&self, report: &mut LoadReport, err: PluginError) {
        log::debug!("{}", err);
        self.messages
            .notify_all(topics::ERROR, Payload::from(err.to_string()));
        report.failures.push(err);
    }
}
