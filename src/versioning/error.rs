//! Version matching errors

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("'{text}' is not a valid semantic version: {cause}")]
    MalformedVersion { text: String, cause: String },

    #[error("'{text}' is not a valid version range: {cause}")]
    MalformedRange { text: String, cause: String },
}

impl VersionError {
    pub(crate) fn range(text: &str, cause: impl Into<String>) -> Self {
        VersionError::MalformedRange {
            text: text.to_string(),
            cause: cause.into(),
        }
    }

    /// The underlying parser message without the offending text
    pub fn cause(&self) -> &str {
        match self {
            VersionError::MalformedVersion { cause, .. } => cause,
            VersionError::MalformedRange { cause, .. } => cause,
        }
    }
}

/// Result type for version operations
pub type VersionResult<T> = Result<T, VersionError>;
