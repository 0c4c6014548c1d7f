//! Plugin Test Utilities
//!
//! Mock plugins, module entries and a bus-recording harness shared by the
//! plugin test suites.

use crate::core::constants::Constants;
use crate::notifications::api::{topics, MessageBus, Payload};
use crate::paths::api::{PathResolver, RootPath, StdPath};
use crate::plugin::api::{
    arg_i64, arg_str, arg_value, expect_arity, HostHandle, MethodTable, ModuleSource, Plugin,
    PluginCandidate, PluginFault, PluginManager, PluginModuleDecl, PluginValue,
    StaticModuleSource,
};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Topic the mock plugins publish on when `unload` runs
pub const UNLOADED: &str = "Unloaded";

/// Path resolver with no runtime paths
pub struct NoPaths;

impl PathResolver for NoPaths {
    fn list_plugin_module_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    fn resolve_named_file(&self, _file_name: &str) -> Vec<PathBuf> {
        Vec::new()
    }

    fn std_path(&self, _what: StdPath) -> PathBuf {
        PathBuf::new()
    }

    fn root_path(&self, _what: RootPath) -> Option<PathBuf> {
        None
    }
}

static METHODS: Lazy<MethodTable<MockPlugin>> = Lazy::new(|| {
    MethodTable::<MockPlugin>::new()
        .with("Echo", |_, args| {
            expect_arity(args, 1)?;
            Ok(arg_value(args, 0)?.clone())
        })
        .with("Add", |_, args| {
            expect_arity(args, 2)?;
            Ok(PluginValue::from(arg_i64(args, 0)? + arg_i64(args, 1)?))
        })
        .with("Count", |plugin, _| {
            plugin.calls += 1;
            Ok(PluginValue::from(plugin.calls))
        })
        .with("Nothing", |_, _| Ok(PluginValue::Null))
        .with("Fail", |_, _| Err(PluginFault::new("deliberate failure")))
        .with("Panic", |_, _| panic!("plugin exploded"))
        .with("Sabotage", |plugin, args| {
            plugin.sabotaged = Some(arg_str(args, 0)?.to_string());
            Ok(PluginValue::Null)
        })
});

/// Configurable mock plugin
#[derive(Debug)]
pub struct MockPlugin {
    author: &'static str,
    name: &'static str,
    version: &'static str,
    fail_initialize: bool,
    name_panics: bool,
    /// `"version"` or `"methods"`: that query panics from now on
    sabotaged: Option<String>,
    unload_delay: Duration,
    calls: u64,
    host: Option<HostHandle>,
}

impl MockPlugin {
    pub fn new(author: &'static str, name: &'static str, version: &'static str) -> Self {
        Self {
            author,
            name,
            version,
            fail_initialize: false,
            name_panics: false,
            sabotaged: None,
            unload_delay: Duration::ZERO,
            calls: 0,
            host: None,
        }
    }

    pub fn failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    pub fn panicking_name(mut self) -> Self {
        self.name_panics = true;
        self
    }

    pub fn slow_unload(mut self, delay: Duration) -> Self {
        self.unload_delay = delay;
        self
    }

    fn is_sabotaged(&self, query: &str) -> bool {
        self.sabotaged.as_deref() == Some(query)
    }
}

impl Plugin for MockPlugin {
    fn author(&self) -> &str {
        self.author
    }

    fn name(&self) -> &str {
        if self.name_panics {
            panic!("name unavailable");
        }
        self.name
    }

    fn version(&self) -> &str {
        if self.is_sabotaged("version") {
            panic!("version unavailable");
        }
        self.version
    }

    fn description(&self) -> &str {
        "Mock plugin for testing"
    }

    fn initialize(&mut self, host: HostHandle) -> Result<(), PluginFault> {
        if self.fail_initialize {
            return Err(PluginFault::new("refusing to start"));
        }
        self.host = Some(host);
        Ok(())
    }

    fn unload(&mut self) {
        std::thread::sleep(self.unload_delay);
        if let Some(host) = self.host.take() {
            host.notify(UNLOADED, format!("{}.{}", self.author, self.name));
        }
    }

    fn method_names(&self) -> Vec<String> {
        if self.is_sabotaged("methods") {
            panic!("method list unavailable");
        }
        METHODS.names()
    }

    fn call(&mut self, method: &str, args: &[PluginValue]) -> Result<PluginValue, PluginFault> {
        METHODS.call(self, method, args)
    }
}

fn boxed(plugin: MockPlugin) -> Result<Box<dyn Plugin>, PluginFault> {
    Ok(Box::new(plugin))
}

pub fn echo_factory() -> Result<Box<dyn Plugin>, PluginFault> {
    boxed(MockPlugin::new("acme", "echo", "1.4.0"))
}

pub fn other_factory() -> Result<Box<dyn Plugin>, PluginFault> {
    boxed(MockPlugin::new("acme", "other", "2.0.0-beta.1"))
}

pub fn bad_version_factory() -> Result<Box<dyn Plugin>, PluginFault> {
    boxed(MockPlugin::new("acme", "broken", "one point oh"))
}

pub fn failing_init_factory() -> Result<Box<dyn Plugin>, PluginFault> {
    boxed(MockPlugin::new("acme", "sulky", "1.0.0").failing_initialize())
}

pub fn nameless_factory() -> Result<Box<dyn Plugin>, PluginFault> {
    boxed(MockPlugin::new("acme", "nameless", "1.0.0").panicking_name())
}

pub fn slow_factory() -> Result<Box<dyn Plugin>, PluginFault> {
    boxed(MockPlugin::new("acme", "slow", "1.0.0").slow_unload(Duration::from_millis(200)))
}

pub fn failing_factory() -> Result<Box<dyn Plugin>, PluginFault> {
    Err(PluginFault::new("no resources"))
}

pub fn panicking_factory() -> Result<Box<dyn Plugin>, PluginFault> {
    panic!("constructor exploded")
}

/// Numbered single-plugin factories for parallel loading
macro_rules! numbered_modules {
    ($($entry:ident => $name:literal),* $(,)?) => {
        $(
            pub fn $entry() -> PluginModuleDecl {
                fn factory() -> Result<Box<dyn Plugin>, PluginFault> {
                    boxed(MockPlugin::new("batch", $name, "1.0.0"))
                }
                PluginModuleDecl::new(vec![PluginCandidate::new($name, factory)])
            }
        )*
        pub const NUMBERED_MODULES: &[(&str, fn() -> PluginModuleDecl)] = &[$(($name, $entry)),*];
    };
}

numbered_modules!(
    batch_module_0 => "p0",
    batch_module_1 => "p1",
    batch_module_2 => "p2",
    batch_module_3 => "p3",
    batch_module_4 => "p4",
    batch_module_5 => "p5",
    batch_module_6 => "p6",
    batch_module_7 => "p7",
);

pub fn echo_module() -> PluginModuleDecl {
    PluginModuleDecl::new(vec![PluginCandidate::new("EchoPlugin", echo_factory)])
}

pub fn pair_module() -> PluginModuleDecl {
    PluginModuleDecl::new(vec![
        PluginCandidate::new("EchoPlugin", echo_factory),
        PluginCandidate::new("OtherPlugin", other_factory),
    ])
}

pub fn bad_version_module() -> PluginModuleDecl {
    PluginModuleDecl::new(vec![PluginCandidate::new("BrokenPlugin", bad_version_factory)])
}

/// One good candidate between two failing ones
pub fn partial_module() -> PluginModuleDecl {
    PluginModuleDecl::new(vec![
        PluginCandidate::new("Exploding", panicking_factory),
        PluginCandidate::new("OtherPlugin", other_factory),
        PluginCandidate::new("SulkyPlugin", failing_init_factory),
        PluginCandidate::new("Starved", failing_factory),
    ])
}

/// A plugin that panics when asked its name, then a good one
pub fn nameless_module() -> PluginModuleDecl {
    PluginModuleDecl::new(vec![
        PluginCandidate::new("Nameless", nameless_factory),
        PluginCandidate::new("OtherPlugin", other_factory),
    ])
}

pub fn slow_module() -> PluginModuleDecl {
    PluginModuleDecl::new(vec![PluginCandidate::new("SlowPlugin", slow_factory)])
}

pub fn empty_module() -> PluginModuleDecl {
    PluginModuleDecl::new(Vec::new())
}

pub fn old_api_module() -> PluginModuleDecl {
    let mut decl = echo_module();
    decl.api_version -= 10_000;
    decl
}

pub fn test_source() -> StaticModuleSource {
    let mut source = StaticModuleSource::new()
        .with_module("mem://echo", echo_module)
        .with_module("mem://pair", pair_module)
        .with_module("mem://bad-version", bad_version_module)
        .with_module("mem://partial", partial_module)
        .with_module("mem://nameless", nameless_module)
        .with_module("mem://slow", slow_module)
        .with_module("mem://empty", empty_module)
        .with_module("mem://old-api", old_api_module);
    for (name, entry) in NUMBERED_MODULES {
        source.insert(format!("mem://batch/{}", name), *entry);
    }
    source
}

/// Manager over [`test_source`] with every bus event recorded in order
pub struct Harness {
    pub manager: PluginManager,
    events: Arc<Mutex<Vec<(String, Payload)>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_source(Arc::new(test_source()))
    }

    pub fn with_source(source: Arc<dyn ModuleSource>) -> Self {
        let bus = Arc::new(MessageBus::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        for topic in [
            topics::LOAD_PLUGIN,
            topics::UNLOAD_PLUGIN,
            topics::REQUEST_METHOD,
            topics::ERROR,
            topics::WARNING,
            UNLOADED,
        ] {
            let sink = events.clone();
            let name = topic.to_string();
            bus.subscribe_fn(topic, move |payload| {
                sink.lock().unwrap().push((name.clone(), payload.clone()))
            });
        }

        let manager = PluginManager::with_source(
            Arc::new(Constants::default()),
            Arc::new(NoPaths),
            bus,
            source,
        );
        Self { manager, events }
    }

    pub fn load(&self, path: &str) -> bool {
        self.manager.load_plugin(Path::new(path))
    }

    /// Every recorded topic, in delivery order
    pub fn topics(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    /// Payload text for one topic, in delivery order
    pub fn texts(&self, topic: &str) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(recorded, _)| recorded == topic)
            .map(|(_, payload)| payload.to_string())
            .collect()
    }

    pub fn payloads(&self, topic: &str) -> Vec<Payload> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(recorded, _)| recorded == topic)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}
