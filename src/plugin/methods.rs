//! Named method dispatch for plugins

use crate::plugin::error::PluginFault;
use crate::plugin::types::PluginValue;

/// Signature of a plugin method
pub type MethodFn<P> = fn(&mut P, &[PluginValue]) -> Result<PluginValue, PluginFault>;

/// Ordered table of a plugin type's callable methods
///
/// Built once per plugin type, typically in a `Lazy` static:
///
/// ```
/// use once_cell::sync::Lazy;
/// use wim::plugin::api::{arg_str, MethodTable, PluginValue};
///
/// struct Greeter;
///
/// static METHODS: Lazy<MethodTable<Greeter>> = Lazy::new(|| {
///     MethodTable::<Greeter>::new().with("Greet", |_, args| {
///         Ok(PluginValue::from(format!("hello {}", arg_str(args, 0)?)))
///     })
/// });
///
/// let result = METHODS.call(&mut Greeter, "Greet", &["wim".into()]).unwrap();
/// assert_eq!(result, "hello wim");
/// ```
pub struct MethodTable<P> {
    entries: Vec<(&'static str, MethodFn<P>)>,
}

impl<P> MethodTable<P> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a method; a later entry with the same name replaces the earlier one
    pub fn with(mut self, name: &'static str, method: MethodFn<P>) -> Self {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = method,
            None => self.entries.push((name, method)),
        }
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.to_string()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<MethodFn<P>> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, method)| *method)
    }

    pub fn call(
        &self,
        plugin: &mut P,
        name: &str,
        args: &[PluginValue],
    ) -> Result<PluginValue, PluginFault> {
        let method = self
            .get(name)
            .ok_or_else(|| PluginFault::new(format!("unknown method '{}'", name)))?;
        method(plugin, args)
    }
}

impl<P> Default for MethodTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fail unless exactly `count` arguments were supplied
pub fn expect_arity(args: &[PluginValue], count: usize) -> Result<(), PluginFault> {
    if args.len() == count {
        Ok(())
    } else {
        Err(PluginFault::new(format!(
            "expected {} argument(s), got {}",
            count,
            args.len()
        )))
    }
}

pub fn arg_value(args: &[PluginValue], index: usize) -> Result<&PluginValue, PluginFault> {
    args.get(index)
        .ok_or_else(|| PluginFault::new(format!("missing argument {}", index)))
}

pub fn arg_str(args: &[PluginValue], index: usize) -> Result<&str, PluginFault> {
    arg_value(args, index)?
        .as_str()
        .ok_or_else(|| PluginFault::new(format!("argument {} must be a string", index)))
}

pub fn arg_i64(args: &[PluginValue], index: usize) -> Result<i64, PluginFault> {
    arg_value(args, index)?
        .as_i64()
        .ok_or_else(|| PluginFault::new(format!("argument {} must be an integer", index)))
}
