//! Scan Reports and their lifecycle states
//!
//! A report moves `Initialized -> Enqueued -> InProgress -> {Success | Failed}`.
//! `Success` and `Failed` are terminal. Every transition stamps `updated_at`
//! together with the status so storage never holds one without the other.

use crate::model::issue::Issue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum ReportStatus {
    #[serde(rename = "initialized")]
    #[strum(serialize = "initialized")]
    Initialized,
    #[serde(rename = "enqueued")]
    #[strum(serialize = "enqueued")]
    Enqueued,
    #[serde(rename = "in-progress")]
    #[strum(serialize = "in-progress")]
    InProgress,
    #[serde(rename = "success")]
    #[strum(serialize = "success")]
    Success,
    #[serde(rename = "failed")]
    #[strum(serialize = "failed")]
    Failed,
}

impl ReportStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Success | ReportStatus::Failed)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step
    ///
    /// `InProgress -> InProgress` restarts an attempt that died without
    /// reaching a terminal state. Any non-terminal state may fail.
    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        match (self, next) {
            (Initialized, Enqueued) => true,
            (Enqueued, InProgress) | (InProgress, InProgress) => true,
            (InProgress, Success) => true,
            (Initialized | Enqueued | InProgress, Failed) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid report transition from {from} to {to}")]
pub struct TransitionError {
    pub from: ReportStatus,
    pub to: ReportStatus,
}

/// The persistent record of one scan attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub repository_id: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "enqueue_at", default, skip_serializing_if = "Option::is_none")]
    pub enqueued_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

impl Report {
    /// Create a new report in `Initialized` for a repository
    pub fn new(repository_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            repository_id: repository_id.into(),
            status: ReportStatus::Initialized,
            created_at: now,
            updated_at: now,
            enqueued_at: None,
            started_at: None,
            finished_at: None,
            failed_reason: None,
            issues: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a lifecycle transition, stamping the matching timestamp
    pub fn transition(
        &mut self,
        next: ReportStatus,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.updated_at = now;
        match next {
            ReportStatus::Initialized => {}
            ReportStatus::Enqueued => self.enqueued_at = Some(now),
            ReportStatus::InProgress => {
                self.started_at = Some(now);
                self.finished_at = None;
                self.failed_reason = None;
            }
            ReportStatus::Success | ReportStatus::Failed => self.finished_at = Some(now),
        }
        Ok(())
    }

    /// Move to `Failed`, recording why
    pub fn fail(
        &mut self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.transition(ReportStatus::Failed, now)?;
        self.failed_reason = Some(reason.into());
        Ok(())
    }

    /// Attach issues and move to `Success`
    pub fn succeed(&mut self, issues: Vec<Issue>, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(ReportStatus::Success, now)?;
        self.issues = issues;
        Ok(())
    }
}
