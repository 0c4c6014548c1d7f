//! Host information plugin
//!
//! `Wim.host` exposes the host's identity and file lookup to callers of
//! `invoke`, and doubles as a smoke test for the dispatch path.

use crate::builtin;
use crate::plugin::api::{
    arg_str, arg_value, expect_arity, HostHandle, MethodTable, Plugin, PluginCandidate,
    PluginFault, PluginModuleDecl, PluginValue,
};
use once_cell::sync::Lazy;

builtin!("host", host_module);

fn host_module() -> PluginModuleDecl {
    PluginModuleDecl::new(vec![PluginCandidate::of::<HostInfoPlugin>()])
}

static METHODS: Lazy<MethodTable<HostInfoPlugin>> = Lazy::new(|| {
    MethodTable::<HostInfoPlugin>::new()
        .with("Echo", |_, args| {
            expect_arity(args, 1)?;
            Ok(arg_value(args, 0)?.clone())
        })
        .with("ApplicationName", |plugin, args| {
            expect_arity(args, 0)?;
            Ok(PluginValue::from(plugin.host()?.constants().application_name()))
        })
        .with("ApplicationVersion", |plugin, args| {
            expect_arity(args, 0)?;
            Ok(PluginValue::from(plugin.host()?.constants().application_version()))
        })
        .with("ResolveFile", |plugin, args| {
            expect_arity(args, 1)?;
            let found = plugin
                .host()?
                .resolve_file(arg_str(args, 0)?)
                .into_iter()
                .map(|path| PluginValue::from(path.display().to_string()))
                .collect();
            Ok(PluginValue::Array(found))
        })
        .with("Notify", |plugin, args| {
            expect_arity(args, 2)?;
            let topic = arg_str(args, 0)?;
            let payload = arg_value(args, 1)?.clone();
            plugin.host()?.notify(topic, payload);
            Ok(PluginValue::Null)
        })
});

#[derive(Debug, Default)]
pub struct HostInfoPlugin {
    host: Option<HostHandle>,
}

impl HostInfoPlugin {
    fn host(&self) -> Result<&HostHandle, PluginFault> {
        self.host
            .as_ref()
            .ok_or_else(|| PluginFault::new("plugin is not initialised"))
    }
}

impl Plugin for HostInfoPlugin {
    fn author(&self) -> &str {
        "Wim"
    }

    fn name(&self) -> &str {
        "host"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &str {
        "Host identity and runtime file lookup"
    }

    fn initialize(&mut self, host: HostHandle) -> Result<(), PluginFault> {
        self.host = Some(host);
        Ok(())
    }

    fn unload(&mut self) {
        self.host = None;
    }

    fn method_names(&self) -> Vec<String> {
        METHODS.names()
    }

    fn call(&mut self, method: &str, args: &[PluginValue]) -> Result<PluginValue, PluginFault> {
        METHODS.call(self, method, args)
    }
}
