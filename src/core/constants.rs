//! Application constants shared with plugins

use crate::core::version;

/// Identity of the host application
///
/// Plugins receive these through their host handle; they are also used to
/// build the per-organisation data and cache directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constants {
    application_name: String,
    organization_name: String,
    application_version: String,
}

impl Constants {
    pub fn new(
        application_name: impl Into<String>,
        organization_name: impl Into<String>,
        application_version: impl Into<String>,
    ) -> Self {
        Self {
            application_name: application_name.into(),
            organization_name: organization_name.into(),
            application_version: application_version.into(),
        }
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn organization_name(&self) -> &str {
        &self.organization_name
    }

    pub fn application_version(&self) -> &str {
        &self.application_version
    }

    pub fn plugin_api_version(&self) -> u32 {
        version::plugin_api_version()
    }
}

impl Default for Constants {
    fn default() -> Self {
        Self::new("Wim", "Kuro Amami", env!("CARGO_PKG_VERSION"))
    }
}
