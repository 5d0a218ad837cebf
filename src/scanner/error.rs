//! Scanner Error Types

use crate::model::RuleError;

/// Scanner error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// Clone/export of the remote failed (network, auth, missing ref)
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// Fetch exceeded its wall-clock ceiling
    #[error("Fetch timed out after {limit:?}")]
    Timeout { limit: std::time::Duration },

    /// The per-scan working directory could not be set up
    #[error("Cannot prepare scan workspace: {message}")]
    Workspace { message: String },

    /// IO failure while reading a candidate file
    #[error("IO error on '{path}': {message}")]
    Io { path: String, message: String },

    /// Invalid rule set or scanner settings
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Scan stopped before completion
    #[error("Scan cancelled")]
    Cancelled,

    /// A worker task died
    #[error("Scan task failed: {message}")]
    Task { message: String },
}

impl ScanError {
    pub fn fetch(message: impl std::fmt::Display) -> Self {
        ScanError::Fetch {
            message: message.to_string(),
        }
    }

    pub fn workspace(err: &std::io::Error) -> Self {
        ScanError::Workspace {
            message: err.to_string(),
        }
    }

    pub fn io(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        ScanError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<RuleError> for ScanError {
    fn from(err: RuleError) -> Self {
        ScanError::Configuration {
            message: err.to_string(),
        }
    }
}

impl crate::core::error_handling::ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ScanError::Configuration { .. } => true, // User can fix rules/settings
            ScanError::Fetch { .. } => true,         // Usually a bad URL or credentials
            ScanError::Workspace { .. } => true,     // workspace-root setting
            _ => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ScanError::Configuration { message } | ScanError::Fetch { message } => Some(message),
            _ => None,
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
