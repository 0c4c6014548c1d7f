//! Path resolution errors

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Unable to determine the directory of the running executable: {cause}")]
    ExecutableDirUnknown { cause: String },

    #[error("Failed to delete file: {path}")]
    DeleteFileFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete directory: {path}")]
    DeleteDirectoryFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid search pattern '{pattern}': {cause}")]
    InvalidPattern { pattern: String, cause: String },
}

/// Result type for path operations
pub type PathResult<T> = Result<T, PathError>;
