//! Well-known directories

use strum_macros::{Display, EnumIter};

/// Per-user (or portable) directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum StdPath {
    Root,
    Config,
    Data,
    State,
    Log,
    PluginData,
    Cache,
}

/// System-wide directories, only present for an all-users install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RootPath {
    Root,
    Config,
    Data,
    PluginData,
}
