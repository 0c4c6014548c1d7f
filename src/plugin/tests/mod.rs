//! Test modules for the plugin system
//!
//! Suites run a real [`PluginManager`](crate::plugin::api::PluginManager)
//! over in-process modules and assert on both return values and the
//! notifications seen on the bus.

mod utils;
