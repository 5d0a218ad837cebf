//! Common test utilities and helpers
//!
//! Builds throwaway git repositories with the `git` CLI so fetch and scan
//! tests have a real remote to clone from.

#![allow(dead_code)]

pub mod source_repo;

use leakscan::model::{builtin_rules, ReportStatus};
use leakscan::queue::{JobReceiver, LocalTaskQueue};
use leakscan::report::ReportController;
use leakscan::scanner::api::{GitFetcher, ScanOrchestrator};
use leakscan::store::{MemoryReportStore, MemoryRepositoryStore, MemoryRuleStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Controller over in-memory stores, fetching with gix
pub struct TestPipeline {
    pub controller: ReportController,
    pub repositories: Arc<MemoryRepositoryStore>,
    pub reports: Arc<MemoryReportStore>,
    pub queue: Arc<LocalTaskQueue>,
    pub receiver: JobReceiver,
}

pub fn pipeline(workspace_root: &Path) -> TestPipeline {
    pipeline_with_fetcher(
        workspace_root,
        GitFetcher::new().with_timeout(Duration::from_secs(60)),
    )
}

pub fn pipeline_with_fetcher(workspace_root: &Path, fetcher: GitFetcher) -> TestPipeline {
    let repositories = Arc::new(MemoryRepositoryStore::new());
    let reports = Arc::new(MemoryReportStore::new());
    let rules = Arc::new(MemoryRuleStore::new(builtin_rules()).unwrap());
    let (queue, receiver) = LocalTaskQueue::new("integration");
    let queue = Arc::new(queue);

    let controller = ReportController::builder(
        repositories.clone(),
        reports.clone(),
        rules,
        queue.clone(),
    )
    .with_fetcher(Arc::new(fetcher))
    .with_orchestrator(ScanOrchestrator::new(2))
    .with_workspace_root(workspace_root)
    .build();

    TestPipeline {
        controller,
        repositories,
        reports,
        queue,
        receiver,
    }
}

pub fn assert_terminal(status: ReportStatus) {
    assert!(
        matches!(status, ReportStatus::Success | ReportStatus::Failed),
        "expected a terminal status, got {status}"
    );
}
