//! Report Lifecycle Controller
//!
//! Owns every mutation of a report. `create_report` admits at most one
//! unfinished report per repository and hands the new report to the task
//! queue; `run_scan` drives a queued report through the scan pipeline to
//! `Success` or `Failed`. Each transition is applied to an owned copy of the
//! report and persisted with a single `update`, so storage only ever sees a
//! status together with its timestamps.

use crate::model::{Issue, Report, ReportStatus};
use crate::queue::api::{JobHandler, ScanJob, TaskQueue};
use crate::report::error::{ReportError, ReportResult};
use crate::report::locks::ReportLocks;
use crate::scanner::api::{CompiledRuleSet, Fetcher, GitFetcher, ScanOrchestrator, Workspace};
use crate::scanner::ScanError;
use crate::store::{ReportStore, RepositoryStore, RuleStore};
use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reason recorded when the scan body panics
const PANIC_REASON: &str = "scan task panicked";

pub struct ReportController {
    repositories: Arc<dyn RepositoryStore>,
    reports: Arc<dyn ReportStore>,
    rules: Arc<dyn RuleStore>,
    queue: Arc<dyn TaskQueue>,
    fetcher: Arc<dyn Fetcher>,
    orchestrator: ScanOrchestrator,
    workspace_root: PathBuf,
    locks: ReportLocks,
}

/// Builder for creating ReportController instances with optional parameters
pub struct ReportControllerBuilder {
    repositories: Arc<dyn RepositoryStore>,
    reports: Arc<dyn ReportStore>,
    rules: Arc<dyn RuleStore>,
    queue: Arc<dyn TaskQueue>,
    fetcher: Option<Arc<dyn Fetcher>>,
    orchestrator: ScanOrchestrator,
    workspace_root: Option<PathBuf>,
}

impl ReportControllerBuilder {
    /// Create a new builder with the required collaborators
    pub fn new(
        repositories: Arc<dyn RepositoryStore>,
        reports: Arc<dyn ReportStore>,
        rules: Arc<dyn RuleStore>,
        queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self {
            repositories,
            reports,
            rules,
            queue,
            fetcher: None,
            orchestrator: ScanOrchestrator::default(),
            workspace_root: None,
        }
    }

    /// Replace the default gix fetcher
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_orchestrator(mut self, orchestrator: ScanOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    /// Directory under which per-repository workspaces are created
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn build(self) -> ReportController {
        ReportController {
            repositories: self.repositories,
            reports: self.reports,
            rules: self.rules,
            queue: self.queue,
            fetcher: self
                .fetcher
                .unwrap_or_else(|| Arc::new(GitFetcher::new())),
            orchestrator: self.orchestrator,
            workspace_root: self
                .workspace_root
                .unwrap_or_else(|| std::env::temp_dir().join("leakscan")),
            locks: ReportLocks::new(),
        }
    }
}

impl ReportController {
    pub fn builder(
        repositories: Arc<dyn RepositoryStore>,
        reports: Arc<dyn ReportStore>,
        rules: Arc<dyn RuleStore>,
        queue: Arc<dyn TaskQueue>,
    ) -> ReportControllerBuilder {
        ReportControllerBuilder::new(repositories, reports, rules, queue)
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Start a new scan report for a repository
    ///
    /// Fails with `ReportInProgress` while the repository's latest report is
    /// not terminal. The returned report is `Enqueued`.
    pub async fn create_report(&self, repository_id: &str) -> ReportResult<Report> {
        let repository = self.repositories.get_by_id(repository_id).await?;

        // Closes the window between the latest-report check and the insert
        let _admission = self
            .locks
            .lock(&format!("repository/{}", repository.id))
            .await;

        if let Some(latest) = self
            .reports
            .get_latest_by_repository_id(&repository.id)
            .await?
        {
            if !latest.is_terminal() {
                log::info!(
                    "Rejecting new report for repository_id={}: report_id={} is {}",
                    repository.id,
                    latest.id,
                    latest.status
                );
                return Err(ReportError::ReportInProgress);
            }
        }

        let mut report = Report::new(&repository.id);
        // Held until `Enqueued` is stored so a fast consumer waits for it
        let _guard = self.locks.lock(&report.id).await;
        self.reports.create(&report).await?;

        if let Err(e) = self.queue.enqueue(&report.id).await {
            log::error!("Failed to enqueue report_id={}: {}", report.id, e);
            match report.fail(format!("failed to enqueue scan: {}", e), Utc::now()) {
                Ok(()) => {
                    if let Err(se) = self.reports.update(&report).await {
                        log::error!("Failed to mark report_id={} failed: {}", report.id, se);
                    }
                }
                Err(te) => log::error!("{}", te),
            }
            return Err(e.into());
        }

        report.transition(ReportStatus::Enqueued, Utc::now())?;
        let report = self.reports.update(&report).await?;
        log::info!(
            "Created report_id={} for repository_id={}",
            report.id,
            repository.id
        );
        Ok(report)
    }

    /// Run the scan for a queued report and record its outcome
    ///
    /// Only a missing report or a store failure while recording progress is
    /// returned as an error; every scan failure ends as a `Failed` report.
    /// A report that is already terminal is returned unchanged.
    pub async fn run_scan(&self, report_id: &str) -> ReportResult<Report> {
        let _guard = self.locks.lock(report_id).await;
        let mut report = self.reports.get_by_id(report_id).await?;

        match report.status {
            ReportStatus::Success | ReportStatus::Failed => {
                log::info!(
                    "Skipping report_id={}: already {}",
                    report.id,
                    report.status
                );
                return Ok(report);
            }
            ReportStatus::InProgress => {
                log::warn!("Restarting interrupted scan for report_id={}", report.id);
            }
            ReportStatus::Initialized => {
                // Enqueued but the status update never landed
                report.transition(ReportStatus::Enqueued, Utc::now())?;
            }
            ReportStatus::Enqueued => {}
        }

        log::info!("Starting scan report_id={}", report.id);
        report.transition(ReportStatus::InProgress, Utc::now())?;
        let mut report = self.reports.update(&report).await?;

        let outcome = AssertUnwindSafe(self.execute_scan(&report))
            .catch_unwind()
            .await;

        let now = Utc::now();
        match outcome {
            Ok(Ok(issues)) => {
                log::info!(
                    "Scan complete report_id={} issues={}",
                    report.id,
                    issues.len()
                );
                report.succeed(issues, now)?;
            }
            Ok(Err(e)) => {
                log::error!("Scan failed report_id={}: {}", report.id, e);
                report.fail(e.to_string(), now)?;
            }
            Err(_) => {
                log::error!("Scan panicked report_id={}", report.id);
                report.fail(PANIC_REASON, now)?;
            }
        }

        self.reports.update(&report).await.map_err(|e| {
            log::error!(
                "Failed to record {} for report_id={}: {}",
                report.status,
                report.id,
                e
            );
            e.into()
        })
    }

    /// Fetch, scan and clean up; the workspace is gone when this returns
    async fn execute_scan(&self, report: &Report) -> ReportResult<Vec<Issue>> {
        let repository = self.repositories.get_by_id(&report.repository_id).await?;
        let rules = self.rules.get_all().await?;
        let rules = Arc::new(CompiledRuleSet::compile(&rules)?);

        let workspace = Workspace::acquire(&self.workspace_root, &repository.id).map_err(|e| {
            log::error!(
                "Cannot prepare workspace under {}: {}",
                self.workspace_root.display(),
                e
            );
            ScanError::workspace(&e)
        })?;

        let scanned = async {
            let paths = self
                .fetcher
                .fetch_file_list(workspace.path(), &repository.remote_url)
                .await?;
            self.orchestrator
                .scan_all(workspace.path(), paths, rules)
                .await
        }
        .await;

        workspace.release();
        Ok(scanned?)
    }

    /// The most recent report for a repository
    pub async fn latest_report(&self, repository_id: &str) -> ReportResult<Report> {
        let repository = self.repositories.get_by_id(repository_id).await?;
        self.reports
            .get_latest_by_repository_id(&repository.id)
            .await?
            .ok_or_else(|| ReportError::NotFound {
                entity: "report",
                id: repository.id,
            })
    }

    /// Issues recorded on a report
    pub async fn report_issues(&self, report_id: &str) -> ReportResult<Vec<Issue>> {
        Ok(self.reports.get_by_id(report_id).await?.issues)
    }
}

#[async_trait]
impl JobHandler for ReportController {
    type Error = ReportError;

    async fn handle(&self, job: ScanJob) -> Result<(), ReportError> {
        log::debug!("Received job report_id={}", job.report_id);
        self.run_scan(&job.report_id).await.map(|_| ())
    }
}
