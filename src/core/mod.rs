//! Core services and infrastructure

pub mod constants;
pub mod error_handling;
pub mod logging;
pub mod shutdown;
pub mod styles;
pub mod sync;
pub mod version;
