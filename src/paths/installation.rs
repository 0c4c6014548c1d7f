//! Installation state detection
//!
//! An all-users install leaves a non-empty configuration directory for the
//! organisation and application under the system configuration root; a
//! per-user install does the same under the user's configuration directory.
//! Anything else runs portable, next to the executable.

use crate::core::constants::Constants;
use std::path::{Path, PathBuf};

/// Overrides detection: `system`, `user` or `portable`
pub const INSTALL_MODE_ENV: &str = "WIM_INSTALL_MODE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallationChecker {
    installed: bool,
    root: bool,
}

impl InstallationChecker {
    /// A root install is always an install
    pub fn new(installed: bool, root: bool) -> Self {
        Self {
            installed: installed || root,
            root,
        }
    }

    /// Detect from the environment override, then the marker directories
    pub fn detect(constants: &Constants) -> Self {
        if let Some(checker) = std::env::var(INSTALL_MODE_ENV)
            .ok()
            .and_then(|mode| Self::from_mode(&mode))
        {
            log::debug!("Installation mode forced by {}: {:?}", INSTALL_MODE_ENV, checker);
            return checker;
        }

        let system_dir = system_config_dir().map(|dir| app_dir(&dir, constants));
        let user_dir = dirs::config_dir().map(|dir| app_dir(&dir, constants));
        let checker = Self::from_dirs(system_dir.as_deref(), user_dir.as_deref());
        log::debug!("Detected installation state: {:?}", checker);
        checker
    }

    /// Detect from explicit marker directories
    pub fn from_dirs(system_dir: Option<&Path>, user_dir: Option<&Path>) -> Self {
        if system_dir.is_some_and(dir_has_entries) {
            Self::new(true, true)
        } else if user_dir.is_some_and(dir_has_entries) {
            Self::new(true, false)
        } else {
            Self::new(false, false)
        }
    }

    fn from_mode(mode: &str) -> Option<Self> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "system" => Some(Self::new(true, true)),
            "user" => Some(Self::new(true, false)),
            "portable" => Some(Self::new(false, false)),
            other => {
                log::warn!("Ignoring unknown {} value '{}'", INSTALL_MODE_ENV, other);
                None
            }
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Installed for all users
    pub fn is_root(&self) -> bool {
        self.root
    }
}

pub(crate) fn app_dir(base: &Path, constants: &Constants) -> PathBuf {
    base.join(constants.organization_name())
        .join(constants.application_name())
}

fn dir_has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

pub(crate) fn system_config_dir() -> Option<PathBuf> {
    if cfg!(windows) {
        std::env::var_os("PROGRAMDATA").map(PathBuf::from)
    } else if cfg!(target_os = "macos") {
        Some(PathBuf::from("/Library/Application Support"))
    } else {
        Some(PathBuf::from("/etc"))
    }
}

pub(crate) fn system_data_dir() -> Option<PathBuf> {
    if cfg!(windows) {
        std::env::var_os("PROGRAMDATA").map(PathBuf::from)
    } else if cfg!(target_os = "macos") {
        Some(PathBuf::from("/Library/Application Support"))
    } else {
        Some(PathBuf::from("/var/lib"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_system_marker_wins() {
        let system = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        std::fs::write(system.path().join("marker"), "").unwrap();
        std::fs::write(user.path().join("marker"), "").unwrap();

        let checker = InstallationChecker::from_dirs(Some(system.path()), Some(user.path()));
        assert!(checker.is_installed());
        assert!(checker.is_root());
    }

    #[test]
    fn test_user_marker() {
        let system = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        std::fs::create_dir(user.path().join("config")).unwrap();

        let checker = InstallationChecker::from_dirs(Some(system.path()), Some(user.path()));
        assert!(checker.is_installed());
        assert!(!checker.is_root());
    }

    #[test]
    fn test_empty_or_missing_dirs_are_portable() {
        let empty = TempDir::new().unwrap();
        let missing = empty.path().join("missing");

        let checker = InstallationChecker::from_dirs(Some(empty.path()), Some(&missing));
        assert!(!checker.is_installed());
        assert!(!checker.is_root());
        assert_eq!(
            InstallationChecker::from_dirs(None, None),
            InstallationChecker::new(false, false)
        );
    }

    #[test]
    fn test_root_implies_installed() {
        let checker = InstallationChecker::new(false, true);
        assert!(checker.is_installed());
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        let constants = Constants::default();

        std::env::set_var(INSTALL_MODE_ENV, "system");
        assert!(InstallationChecker::detect(&constants).is_root());

        std::env::set_var(INSTALL_MODE_ENV, "User");
        let checker = InstallationChecker::detect(&constants);
        assert!(checker.is_installed() && !checker.is_root());

        std::env::set_var(INSTALL_MODE_ENV, "portable");
        assert!(!InstallationChecker::detect(&constants).is_installed());

        std::env::remove_var(INSTALL_MODE_ENV);
    }
}
