//! End-to-end scans through the report controller

use crate::common::{pipeline, pipeline_with_fetcher};
use crate::common::source_repo::{create_source_repository, file_url, leaky_repository};
use leakscan::model::ReportStatus;
use leakscan::queue::JobConsumer;
use leakscan::report::ReportError;
use leakscan::scanner::api::{GitFetcher, Workspace};
use leakscan::store::ReportStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

#[tokio::test]
async fn test_scan_finds_secrets_in_text_files_only() {
    let source = leaky_repository();
    let work = tempfile::tempdir().unwrap();
    let p = pipeline(work.path());
    let repo = p
        .repositories
        .add("leaky", &file_url(source.path()))
        .unwrap();

    let created = p.controller.create_report(&repo.id).await.unwrap();
    assert_eq!(created.status, ReportStatus::Enqueued);

    let report = p.controller.run_scan(&created.id).await.unwrap();
    assert_eq!(report.status, ReportStatus::Success, "{:?}", report.failed_reason);

    let mut found: Vec<_> = report
        .issues
        .iter()
        .map(|i| (i.location.path.as_str(), i.location.line, i.rule_id.as_str()))
        .collect();
    found.sort();
    // The image is denylisted, the gzip blob is binary, and the uppercase
    // comment passes the prefilter but not the case-sensitive pattern
    assert_eq!(
        found,
        vec![
            ("config/settings.env", 2, "G001"),
            ("config/settings.env", 3, "G002"),
        ]
    );
    assert_eq!(
        p.controller.report_issues(&report.id).await.unwrap(),
        report.issues
    );

    assert!(!Workspace::path_for(work.path(), &repo.id).exists());
}

#[tokio::test]
async fn test_clean_repository_succeeds_without_issues() {
    let source = create_source_repository(&[("notes.txt", &b"nothing secret\n"[..])]);
    let work = tempfile::tempdir().unwrap();
    let p = pipeline(work.path());
    let repo = p.repositories.add("clean", &file_url(source.path())).unwrap();

    let created = p.controller.create_report(&repo.id).await.unwrap();
    let report = p.controller.run_scan(&created.id).await.unwrap();

    assert_eq!(report.status, ReportStatus::Success);
    assert!(report.issues.is_empty());
    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("issues").is_none());
    assert!(json.get("failed_reason").is_none());
}

#[tokio::test]
async fn test_unreachable_remote_fails_and_cleans_up() {
    let work = tempfile::tempdir().unwrap();
    let p = pipeline(work.path());
    let repo = p
        .repositories
        .add("ghost", &file_url(&work.path().join("no-such-repo")))
        .unwrap();

    let created = p.controller.create_report(&repo.id).await.unwrap();
    let report = p.controller.run_scan(&created.id).await.unwrap();

    assert_eq!(report.status, ReportStatus::Failed);
    assert!(report.issues.is_empty());
    assert!(!report.failed_reason.unwrap_or_default().is_empty());
    assert!(!Workspace::path_for(work.path(), &repo.id).exists());
}

#[tokio::test]
async fn test_retry_after_completion_and_rejection_while_active() {
    let source = leaky_repository();
    let work = tempfile::tempdir().unwrap();
    let p = pipeline(work.path());
    let repo = p.repositories.add("leaky", &file_url(source.path())).unwrap();

    let first = p.controller.create_report(&repo.id).await.unwrap();
    assert_eq!(
        p.controller.create_report(&repo.id).await.unwrap_err(),
        ReportError::ReportInProgress
    );

    p.controller.run_scan(&first.id).await.unwrap();
    let second = p.controller.create_report(&repo.id).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(
        p.controller.latest_report(&repo.id).await.unwrap().id,
        second.id
    );
    assert_eq!(p.reports.list_by_repository_id(&repo.id).unwrap().len(), 2);
}

#[tokio::test]
async fn test_consumer_drives_queued_report() {
    let source = leaky_repository();
    let work = tempfile::tempdir().unwrap();
    let p = pipeline(work.path());
    let repo = p.repositories.add("leaky", &file_url(source.path())).unwrap();
    let created = p.controller.create_report(&repo.id).await.unwrap();

    let controller = Arc::new(p.controller);
    let mut consumer = JobConsumer::new(p.receiver, Arc::clone(&controller));
    let (_tx, mut shutdown) = broadcast::channel(1);
    assert!(consumer.process_next(&mut shutdown).await);
    assert_eq!(consumer.processed(), 1);

    let stored = p.reports.get_by_id(&created.id).await.unwrap();
    assert_eq!(stored.status, ReportStatus::Success);
    assert_eq!(stored.issues.len(), 2);
}

#[tokio::test]
async fn test_fetch_timeout_fails_report_and_removes_workspace() {
    let source = leaky_repository();
    let work = tempfile::tempdir().unwrap();
    let p = pipeline_with_fetcher(
        work.path(),
        GitFetcher::new().with_timeout(Duration::from_millis(1)),
    );
    let repo = p
        .repositories
        .add("slow", &file_url(source.path()))
        .unwrap();

    let created = p.controller.create_report(&repo.id).await.unwrap();
    let report = p.controller.run_scan(&created.id).await.unwrap();

    assert_eq!(report.status, ReportStatus::Failed);
    assert!(report.issues.is_empty());
    let reason = report.failed_reason.unwrap();
    assert_eq!(reason, "Fetch timed out after 1ms");
    assert!(!Workspace::path_for(work.path(), &repo.id).exists());
}

#[tokio::test]
async fn test_failed_reason_omits_workspace_location() {
    let source = leaky_repository();
    let scratch = tempfile::tempdir().unwrap();
    let root = scratch.path().join("private-workspace-root");
    std::fs::write(&root, "occupied").unwrap();

    let p = pipeline(&root);
    let repo = p
        .repositories
        .add("leaky", &file_url(source.path()))
        .unwrap();
    let created = p.controller.create_report(&repo.id).await.unwrap();
    let report = p.controller.run_scan(&created.id).await.unwrap();

    assert_eq!(report.status, ReportStatus::Failed);
    let reason = report.failed_reason.unwrap();
    assert!(!reason.contains("private-workspace-root"), "{reason}");
    assert!(!reason.contains(&*scratch.path().to_string_lossy()), "{reason}");
}
