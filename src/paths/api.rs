//! Public API for runtime path resolution

pub use crate::paths::error::{PathError, PathResult};
pub use crate::paths::installation::{InstallationChecker, INSTALL_MODE_ENV};
pub use crate::paths::manager::RuntimePathManager;
pub use crate::paths::traits::PathResolver;
pub use crate::paths::types::{RootPath, StdPath};
