//! Built-in Plugin Implementations
//!
//! Plugins that ship with the host. They are registered through the
//! inventory and loaded like any other module.

pub mod api;
pub mod host_info;
