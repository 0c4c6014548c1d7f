//! Generic error handling utilities
//!
//! Unified top-level reporting for the domain error types of the host.

/// Errors that can tell user-actionable failures apart from system failures
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True if the message should be shown to the user as-is
    ///
    /// User-actionable: unknown plugin, malformed version range, bad
    /// configuration value. System: library loading failures, lock poisoning.
    fn is_user_actionable(&self) -> bool;

    /// The message to show when the error is user-actionable
    fn user_message(&self) -> Option<&str>;
}

/// Log an error with detail appropriate to its kind
///
/// User-actionable errors log their own message; system errors log the
/// operation context. Full details are always available at debug level.
///
/// # Examples
/// ```rust,no_run
/// # use wim::core::error_handling::log_error_with_context;
/// # use wim::app::cli::config::ConfigError;
/// let err = ConfigError::InvalidValue {
///     key: "log-level".to_string(),
///     message: "expected a string".to_string(),
/// };
/// log_error_with_context(&err, "Configuration loading");
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(message) if error.is_user_actionable() => log::error!("{}", message),
        _ => log::error!("{} failed", operation_context),
    }
    log::debug!("{} error: {} ({:?})", operation_context, error, error);
}
