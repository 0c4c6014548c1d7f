//! Plugin System Module
//!
//! Discovers plugin modules, instantiates and registers the plugins they
//! declare, and dispatches versioned method calls to them. Outcomes are
//! reported on the notification bus.

// Internal modules - all access should go through api module
pub(crate) mod builtin;
pub(crate) mod dispatcher;
pub(crate) mod error;
pub(crate) mod host;
pub(crate) mod loader;
pub(crate) mod manager;
pub(crate) mod methods;
pub(crate) mod module;
pub(crate) mod registry;
pub(crate) mod traits;
pub(crate) mod types;

// Public API module - the only public interface for the plugin system
pub mod api;

#[cfg(test)]
mod tests;
