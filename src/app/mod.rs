//! Application module

pub mod cli;
pub mod commands;
pub mod event_log;
pub mod session;
pub mod startup;
