//! Common test utilities and helpers
//!
//! An out-of-crate plugin module written the way a plugin author would,
//! plus a host wired to an in-process module source.

#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wim::core::constants::Constants;
use wim::notifications::api::{topics, MessageBus, Payload};
use wim::paths::api::{InstallationChecker, RuntimePathManager};
use wim::plugin::api::{
    arg_i64, expect_arity, HostHandle, MethodTable, Plugin, PluginFault, PluginManager,
    PluginValue, StaticModuleSource,
};

pub const CLOCK_MODULE: &str = "mem://tick";

static CLOCK_METHODS: Lazy<MethodTable<ClockPlugin>> = Lazy::new(|| {
    MethodTable::<ClockPlugin>::new()
        .with("Now", |plugin, args| {
            expect_arity(args, 0)?;
            Ok(PluginValue::from(plugin.ticks))
        })
        .with("Advance", |plugin, args| {
            expect_arity(args, 1)?;
            let by = arg_i64(args, 0)?;
            if by < 0 {
                return Err(PluginFault::new("clocks only move forward"));
            }
            plugin.ticks += by;
            Ok(PluginValue::from(plugin.ticks))
        })
});

/// Monotonic counter exposed as `tick.clock`
#[derive(Default)]
pub struct ClockPlugin {
    ticks: i64,
    host: Option<HostHandle>,
}

impl Plugin for ClockPlugin {
    fn author(&self) -> &str {
        "tick"
    }

    fn name(&self) -> &str {
        "clock"
    }

    fn version(&self) -> &str {
        "3.1.4"
    }

    fn description(&self) -> &str {
        "Counts ticks"
    }

    fn initialize(&mut self, host: HostHandle) -> Result<(), PluginFault> {
        self.host = Some(host);
        Ok(())
    }

    fn unload(&mut self) {
        if let Some(host) = self.host.take() {
            host.notify("ClockStopped", PluginValue::from(self.ticks));
        }
    }

    fn method_names(&self) -> Vec<String> {
        CLOCK_METHODS.names()
    }

    fn call(&mut self, method: &str, args: &[PluginValue]) -> Result<PluginValue, PluginFault> {
        CLOCK_METHODS.call(self, method, args)
    }
}

/// A second plugin in the same module, with a prerelease version
#[derive(Default)]
pub struct AlarmPlugin;

impl Plugin for AlarmPlugin {
    fn author(&self) -> &str {
        "tick"
    }

    fn name(&self) -> &str {
        "alarm"
    }

    fn version(&self) -> &str {
        "0.9.0-rc.2"
    }

    fn description(&self) -> &str {
        "Rings"
    }

    fn initialize(&mut self, _host: HostHandle) -> Result<(), PluginFault> {
        Ok(())
    }

    fn method_names(&self) -> Vec<String> {
        vec!["Ring".to_string()]
    }

    fn call(&mut self, method: &str, _args: &[PluginValue]) -> Result<PluginValue, PluginFault> {
        match method {
            "Ring" => Ok(PluginValue::from("ring ring")),
            other => Err(PluginFault::new(format!("unknown method '{}'", other))),
        }
    }
}

wim::declare_plugin_module!(ClockPlugin, AlarmPlugin);

pub fn clock_source() -> StaticModuleSource {
    StaticModuleSource::new().with_module(CLOCK_MODULE, wim_plugin_entry)
}

/// Path manager rooted in a temporary directory
pub fn temp_paths(temp: &TempDir, bus: Arc<MessageBus>) -> Arc<RuntimePathManager> {
    let constants = Constants::default();
    std::fs::create_dir_all(temp.path().join("bin")).unwrap();
    let paths = RuntimePathManager::with_executable_dir(
        &constants,
        InstallationChecker::new(false, false),
        Some(temp.path().join("bin")),
        bus,
    );
    paths.set_runtime_paths(Vec::<PathBuf>::new());
    Arc::new(paths)
}

/// Everything published on the standard topics, as `topic: text`
pub fn record(bus: &MessageBus) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for topic in [
        topics::LOAD_PLUGIN,
        topics::UNLOAD_PLUGIN,
        topics::REQUEST_METHOD,
        topics::ERROR,
        topics::WARNING,
        "ClockStopped",
    ] {
        let sink = seen.clone();
        bus.subscribe_fn(topic, move |payload: &Payload| {
            sink.lock().unwrap().push(format!("{}: {}", topic, payload))
        });
    }
    seen
}

pub fn manager_with(source: StaticModuleSource, temp: &TempDir) -> (PluginManager, Arc<MessageBus>) {
    let bus = Arc::new(MessageBus::new());
    let paths = temp_paths(temp, bus.clone());
    let manager = PluginManager::with_source(
        Arc::new(Constants::default()),
        paths,
        bus.clone(),
        Arc::new(source),
    );
    (manager, bus)
}
