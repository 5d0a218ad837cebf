//! Report Controller Error Types

use crate::core::error_handling::ContextualError;
use crate::model::{ReportStatus, TransitionError};
use crate::queue::QueueError;
use crate::scanner::ScanError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    /// Repository or report missing
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The latest report for the repository has not finished yet
    #[error("the report for this repository already initialized, only completed/failed report can retry")]
    ReportInProgress,

    #[error("invalid report transition from {from} to {to}")]
    InvalidTransition { from: ReportStatus, to: ReportStatus },

    /// The job ran but left the report short of `Success` or `Failed`
    #[error("report {id} did not reach a terminal state (status {status})")]
    Unfinished { id: String, status: ReportStatus },

    #[error(transparent)]
    Store(StoreError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl From<StoreError> for ReportError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ReportError::NotFound { entity, id },
            other => ReportError::Store(other),
        }
    }
}

impl From<TransitionError> for ReportError {
    fn from(err: TransitionError) -> Self {
        ReportError::InvalidTransition {
            from: err.from,
            to: err.to,
        }
    }
}

impl ReportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReportError::NotFound { .. })
    }
}

impl ContextualError for ReportError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ReportError::NotFound { .. } | ReportError::ReportInProgress => true,
            ReportError::Scan(e) => e.is_user_actionable(),
            _ => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ReportError::ReportInProgress => Some(
                "the report for this repository already initialized, only completed/failed report can retry",
            ),
            ReportError::NotFound { entity, .. } => Some(match *entity {
                "repository" => "repository not found",
                "report" => "report not found",
                _ => "not found",
            }),
            ReportError::Scan(e) => e.user_message(),
            _ => None,
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
