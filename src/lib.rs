pub mod app;
pub mod core;
pub mod notifications;
pub mod paths;
pub mod plugin;
pub mod versioning;
