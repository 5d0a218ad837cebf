//! Contextual error reporting
//!
//! Lets the binary decide, per error, whether to show the error's own
//! message or a generic description of the operation that failed.

/// Errors that know whether their message is meant for the user
///
/// When `is_user_actionable()` is true, `user_message()` must return
/// `Some`. System errors (I/O, store backends, worker failures) return
/// `false` and `None`; their detail is only logged at debug level.
pub trait ContextualError: std::error::Error {
    /// True for errors the user can fix: bad configuration, an invalid rule,
    /// a repository that does not exist, a report that is still running
    fn is_user_actionable(&self) -> bool;

    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error at the right level of detail
///
/// User-actionable errors print their own message, anything else prints
/// `operation_context`. Full detail always follows at debug level.
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(message) if error.is_user_actionable() => log::error!("FATAL: {}", message),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Text to print for an error before the logger is available
pub fn describe<E: ContextualError>(error: &E, operation_context: &str) -> String {
    match error.user_message() {
        Some(message) if error.is_user_actionable() => message.to_string(),
        _ => format!("{}: {}", operation_context, error),
    }
}
