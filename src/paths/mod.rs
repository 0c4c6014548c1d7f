//! Runtime path resolution
//!
//! Where the host looks for plugin modules and named files, and where it
//! keeps configuration, data and cache files, depending on how it was
//! installed.

// Internal modules - all access should go through api module
pub(crate) mod error;
pub(crate) mod installation;
pub(crate) mod manager;
pub(crate) mod traits;
pub(crate) mod types;

// Public API module - the only public interface for path resolution
pub mod api;
