//! Invariants that hold for any scan input

use crate::common::source_repo::{file_url, leaky_repository};
use crate::common::{assert_terminal, pipeline};
use leakscan::model::{builtin_rules, formatted_id, Rule, Severity};
use leakscan::scanner::api::{CompiledRuleSet, ScanOrchestrator};
use leakscan::scanner::fetcher::list_files;
use std::sync::Arc;

fn rules() -> Arc<CompiledRuleSet> {
    Arc::new(
        CompiledRuleSet::compile(&[
            Rule::new(1, "Public key leak", "public_key", "public", Severity::Low),
            Rule::new(2, "Private key leak", "private_key", "private", Severity::High),
            Rule::new(3, "Token", "token", "token", Severity::Medium),
        ])
        .unwrap(),
    )
}

async fn scan_tree(files: &[(&str, &str)]) -> Vec<leakscan::model::Issue> {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }
    let paths = list_files(dir.path()).unwrap();
    ScanOrchestrator::new(3)
        .scan_all(dir.path(), paths, rules())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_content_without_keywords_has_no_issues() {
    let issues = scan_tree(&[
        ("a.txt", "public key private key tokn"),
        ("b.txt", ""),
        ("c.txt", "publickey=1\nprivate-key=2\n"),
    ])
    .await;
    assert!(issues.is_empty(), "{issues:?}");
}

#[tokio::test]
async fn test_one_issue_per_occurrence() {
    for n in 1..=4 {
        let contents = (0..n)
            .map(|i| format!("line {i}: token=abc"))
            .collect::<Vec<_>>()
            .join("\n");
        let issues = scan_tree(&[("many.txt", contents.as_str())]).await;

        assert_eq!(issues.len(), n);
        let mut lines: Vec<u64> = issues.iter().map(|i| i.location.line).collect();
        lines.sort();
        assert_eq!(lines, (1..=n as u64).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn test_denylisted_files_are_never_scanned() {
    let issues = scan_tree(&[
        ("photo.JPG", "private_key=1"),
        ("archive.tar.gz", "private_key=2"),
        (".mp3", "private_key=4"),
        ("keys.txt", "private_key=3"),
    ])
    .await;

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].location.path, "keys.txt");
}

#[test]
fn test_prefilter_is_idempotent() {
    let set = rules();
    let content = "Token=1 PUBLIC_KEY=2 private_key=3 token again";
    let first = set.prefilter().matches(content);
    let second = set.prefilter().matches(content);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_formatted_ids() {
    assert_eq!(formatted_id(1), "G001");
    assert_eq!(formatted_id(23), "G023");
    assert_eq!(formatted_id(100), "G100");
    assert_eq!(builtin_rules()[1].formatted_id(), "G002");
}

#[tokio::test]
async fn test_terminal_reports_carry_consistent_timestamps() {
    let source = leaky_repository();
    let work = tempfile::tempdir().unwrap();
    let p = pipeline(work.path());
    let good = p.repositories.add("leaky", &file_url(source.path())).unwrap();
    let bad = p
        .repositories
        .add("ghost", &file_url(&work.path().join("missing")))
        .unwrap();

    for repo in [good, bad] {
        let created = p.controller.create_report(&repo.id).await.unwrap();
        let report = p.controller.run_scan(&created.id).await.unwrap();
        assert_terminal(report.status);

        let enqueued = report.enqueued_at.unwrap();
        let started = report.started_at.unwrap();
        let finished = report.finished_at.unwrap();
        assert!(report.created_at <= enqueued);
        assert!(enqueued <= started);
        assert!(started <= finished);
        assert_eq!(report.updated_at, finished);

        // Issues only on success, a reason only on failure
        match report.status {
            leakscan::model::ReportStatus::Success => assert!(report.failed_reason.is_none()),
            _ => {
                assert!(report.issues.is_empty());
                assert!(report.failed_reason.is_some());
            }
        }
    }
}
