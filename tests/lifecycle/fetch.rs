//! Fetching with gix from local repositories

use crate::common::source_repo::{create_source_repository, file_url, leaky_repository};
use leakscan::scanner::api::{Fetcher, GitFetcher};
use leakscan::scanner::ScanError;
use std::path::PathBuf;
use std::time::Duration;

fn relative(root: &std::path::Path, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect()
}

#[tokio::test]
async fn test_clone_lists_checked_out_files() {
    let source = leaky_repository();
    let scratch = tempfile::tempdir().unwrap();
    let work_dir = scratch.path().join("checkout");

    let files = GitFetcher::new()
        .fetch_file_list(&work_dir, &file_url(source.path()))
        .await
        .unwrap();

    // .git contents and denylisted extensions never show up
    assert_eq!(
        relative(&work_dir, &files),
        vec!["README.md", "bin/blob", "config/settings.env", "src/lib.rs"]
    );
    assert!(work_dir.join(".git").is_dir());
    assert!(work_dir.join("assets/logo.png").is_file());
}

#[tokio::test]
async fn test_plain_path_is_accepted_as_url() {
    let source = create_source_repository(&[("only.txt", &b"hello\n"[..])]);
    let scratch = tempfile::tempdir().unwrap();
    let work_dir = scratch.path().join("checkout");

    let files = GitFetcher::new()
        .with_timeout(Duration::from_secs(60))
        .fetch_file_list(&work_dir, &source.path().display().to_string())
        .await
        .unwrap();

    assert_eq!(relative(&work_dir, &files), vec!["only.txt"]);
}

#[tokio::test]
async fn test_missing_remote_is_a_fetch_error() {
    let scratch = tempfile::tempdir().unwrap();
    let missing = scratch.path().join("does-not-exist");

    let err = GitFetcher::new()
        .fetch_file_list(&scratch.path().join("checkout"), &file_url(&missing))
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::Fetch { .. }), "{err:?}");
}
