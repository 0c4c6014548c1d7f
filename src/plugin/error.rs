//! Plugin Error Handling
//!
//! Error types for module loading, registration and method invocation. Every
//! variant is also reported on the notification bus by the component that
//! raises it.

use crate::core::error_handling::ContextualError;
use crate::versioning::api::VersionError;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Host-side plugin errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    /// The module could not be opened or declared no usable entry point
    #[error("Failed to load plugin from {path}: {cause}")]
    ModuleOpenFailed { path: String, cause: String },

    /// A candidate's factory or `initialize` failed
    #[error("Failed to create instance of plugin type {type_name} from {path}: {cause}")]
    InstantiationFailed {
        type_name: String,
        path: String,
        cause: String,
    },

    /// Soft failure: reported as a warning, never returned from a load
    #[error("Plugin '{name}' is already loaded.")]
    DuplicateRegistration { author: String, name: String },

    #[error("Plugin '{author}.{name}' not found.")]
    PluginNotFound { author: String, name: String },

    #[error("Failed to parse version range '{range}': {cause}")]
    InvalidVersionRange { range: String, cause: String },

    #[error("Failed to parse version '{version}' for plugin '{author}.{name}': {cause}")]
    InvalidPluginVersion {
        author: String,
        name: String,
        version: String,
        cause: String,
    },

    #[error("Plugin '{author}.{name}' version '{version}' does not satisfy the range '{range}'.")]
    VersionMismatch {
        author: String,
        name: String,
        version: String,
        range: String,
    },

    #[error("Method '{method}' not found in plugin '{author}.{name}'.")]
    MethodNotFound {
        author: String,
        name: String,
        method: String,
    },

    /// The plugin method returned a fault or panicked
    #[error("Method '{method}' of plugin '{author}.{name}' failed: {cause}")]
    PluginInvocationFailed {
        author: String,
        name: String,
        method: String,
        cause: String,
    },

    #[error("Synchronisation error: {message}")]
    Synchronisation { message: String },
}

/// Discriminant of [`PluginError`], for matching and reporting
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
pub enum PluginErrorKind {
    ModuleOpenFailed,
    InstantiationFailed,
    DuplicateRegistration,
    PluginNotFound,
    InvalidVersionRange,
    InvalidPluginVersion,
    VersionMismatch,
    MethodNotFound,
    PluginInvocationFailed,
    Synchronisation,
}

impl PluginError {
    pub fn kind(&self) -> PluginErrorKind {
        match self {
            PluginError::ModuleOpenFailed { .. } => PluginErrorKind::ModuleOpenFailed,
            PluginError::InstantiationFailed { .. } => PluginErrorKind::InstantiationFailed,
            PluginError::DuplicateRegistration { .. } => PluginErrorKind::DuplicateRegistration,
            PluginError::PluginNotFound { .. } => PluginErrorKind::PluginNotFound,
            PluginError::InvalidVersionRange { .. } => PluginErrorKind::InvalidVersionRange,
            PluginError::InvalidPluginVersion { .. } => PluginErrorKind::InvalidPluginVersion,
            PluginError::VersionMismatch { .. } => PluginErrorKind::VersionMismatch,
            PluginError::MethodNotFound { .. } => PluginErrorKind::MethodNotFound,
            PluginError::PluginInvocationFailed { .. } => PluginErrorKind::PluginInvocationFailed,
            PluginError::Synchronisation { .. } => PluginErrorKind::Synchronisation,
        }
    }

    pub(crate) fn invalid_range(range: &str, error: &VersionError) -> Self {
        PluginError::InvalidVersionRange {
            range: range.to_string(),
            cause: error.cause().to_string(),
        }
    }
}

impl ContextualError for PluginError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self.kind(),
            PluginErrorKind::PluginNotFound
                | PluginErrorKind::InvalidVersionRange
                | PluginErrorKind::VersionMismatch
                | PluginErrorKind::MethodNotFound
                | PluginErrorKind::DuplicateRegistration
        )
    }

    fn user_message(&self) -> Option<&str> {
        if !self.is_user_actionable() {
            return None;
        }
        Some(match self {
            PluginError::PluginNotFound { .. } => "No loaded plugin matches that author and name",
            PluginError::InvalidVersionRange { .. } => "The version range could not be parsed",
            PluginError::VersionMismatch { .. } => {
                "The loaded plugin version does not satisfy the requested range"
            }
            PluginError::MethodNotFound { .. } => "The plugin does not provide that method",
            _ => "A plugin with the same author and name is already loaded",
        })
    }
}

/// Error raised by plugin code
///
/// Plugins return this from factories, `initialize` and methods; the host
/// wraps it into the matching [`PluginError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PluginFault {
    message: String,
}

impl PluginFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for PluginFault {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for PluginFault {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for PluginFault {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Message of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_messages_name_the_plugin() {
        let error = PluginError::PluginNotFound {
            author: "acme".to_string(),
            name: "echo".to_string(),
        };
        assert_eq!(error.to_string(), "Plugin 'acme.echo' not found.");

        let error = PluginError::VersionMismatch {
            author: "acme".to_string(),
            name: "echo".to_string(),
            version: "1.4.0".to_string(),
            range: ">=2.0.0".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Plugin 'acme.echo' version '1.4.0' does not satisfy the range '>=2.0.0'."
        );

        let error = PluginError::DuplicateRegistration {
            author: "acme".to_string(),
            name: "echo".to_string(),
        };
        assert_eq!(error.to_string(), "Plugin 'echo' is already loaded.");
    }

    #[test]
    fn test_kind_covers_every_variant() {
        let kinds: Vec<_> = PluginErrorKind::iter().collect();
        assert_eq!(kinds.len(), 10);

        let error = PluginError::Synchronisation {
            message: "poisoned".to_string(),
        };
        assert_eq!(error.kind(), PluginErrorKind::Synchronisation);
        assert_eq!(error.kind().to_string(), "Synchronisation");
    }

    #[test]
    fn test_user_actionable_split() {
        let not_found = PluginError::PluginNotFound {
            author: "acme".to_string(),
            name: "echo".to_string(),
        };
        assert!(not_found.is_user_actionable());
        assert!(not_found.user_message().is_some());

        let open_failed = PluginError::ModuleOpenFailed {
            path: "/plugins/libecho.so".to_string(),
            cause: "file not found".to_string(),
        };
        assert!(!open_failed.is_user_actionable());
        assert!(open_failed.user_message().is_none());
    }

    #[test]
    fn test_invalid_range_keeps_parser_cause() {
        let version_error = crate::versioning::api::parse_range("banana").unwrap_err();
        let error = PluginError::invalid_range("banana", &version_error);
        let message = error.to_string();
        assert!(message.starts_with("Failed to parse version range 'banana': "));
        assert!(message.contains("unexpected token"));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "panicked: boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "panicked");
    }
}
