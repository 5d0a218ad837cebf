//! Repository Fetcher
//!
//! Clones a remote's current tree into a scan workspace and lists the files
//! worth scanning.

use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::filter::is_denylisted;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use walkdir::WalkDir;

/// How long an interrupted clone gets to wind down
const INTERRUPT_GRACE: Duration = Duration::from_secs(10);

/// Produces the candidate file list for one scan
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Materialise `remote_url` into `work_dir` and return the absolute paths
    /// of every regular, non-denylisted file in it
    ///
    /// On failure no partial list is returned. `work_dir` is left in place
    /// either way; removing it is the caller's job.
    async fn fetch_file_list(&self, work_dir: &Path, remote_url: &str)
        -> ScanResult<Vec<PathBuf>>;
}

/// Fetcher backed by a full gix clone and checkout
#[derive(Debug, Clone, Default)]
pub struct GitFetcher {
    timeout: Option<Duration>,
}

impl GitFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort fetches that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl Fetcher for GitFetcher {
    async fn fetch_file_list(
        &self,
        work_dir: &Path,
        remote_url: &str,
    ) -> ScanResult<Vec<PathBuf>> {
        log::info!("Fetching url={} into {}", redact(remote_url), work_dir.display());

        let interrupt = Arc::new(AtomicBool::new(false));
        let mut task = {
            let work_dir = work_dir.to_path_buf();
            let remote_url = remote_url.to_string();
            let interrupt = Arc::clone(&interrupt);
            tokio::task::spawn_blocking(move || {
                clone_worktree(&work_dir, &remote_url, &interrupt)?;
                list_files(&work_dir)
            })
        };

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    // gix polls this flag between pack and checkout steps
                    interrupt.store(true, Ordering::SeqCst);
                    log::warn!(
                        "Fetch of {} exceeded {:?}, interrupting",
                        redact(remote_url),
                        limit
                    );
                    // The clone must stop writing before the caller removes work_dir
                    if tokio::time::timeout(INTERRUPT_GRACE, task).await.is_err() {
                        log::warn!(
                            "Fetch of {} still running {:?} after interrupt",
                            redact(remote_url),
                            INTERRUPT_GRACE
                        );
                    }
                    return Err(ScanError::Timeout { limit });
                }
            },
            None => task.await,
        };

        let files = joined.map_err(|e| ScanError::Task {
            message: format!("fetch task failed: {}", e),
        })??;
        log::debug!("Fetched {} candidate files", files.len());
        Ok(files)
    }
}

/// Clone `remote_url` and check out its default branch into `work_dir`
fn clone_worktree(work_dir: &Path, remote_url: &str, interrupt: &AtomicBool) -> ScanResult<()> {
    std::fs::create_dir_all(work_dir).map_err(|e| ScanError::workspace(&e))?;

    let url = redact(remote_url);
    let failed = |step: &str, e: &dyn std::fmt::Display| {
        ScanError::fetch(format!(
            "cannot {} {}: {}",
            step,
            url,
            without_workspace(&e.to_string(), work_dir)
        ))
    };
    let mut prepare =
        gix::prepare_clone(remote_url, work_dir).map_err(|e| failed("clone", &e))?;
    let (mut checkout, _) = prepare
        .fetch_then_checkout(gix::progress::Discard, interrupt)
        .map_err(|e| failed("fetch", &e))?;
    checkout
        .main_worktree(gix::progress::Discard, interrupt)
        .map_err(|e| failed("check out", &e))?;
    Ok(())
}

/// gix names its destination in some errors; reasons only show the checkout
fn without_workspace(message: &str, work_dir: &Path) -> String {
    message.replace(&*work_dir.to_string_lossy(), "<checkout>")
}

/// Recursively list regular files below `root`
///
/// Directories and symlinks are skipped, as is the `.git` directory and any
/// path with a denylisted extension. The result is sorted.
pub fn list_files(root: &Path) -> ScanResult<Vec<PathBuf>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !(entry.depth() == 1 && entry.file_name() == ".git"));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| tree_error(root, &e))?;
        let file_type = entry.file_type();
        if file_type.is_symlink() {
            log::debug!("Skipping symlink {}", entry.path().display());
        } else if file_type.is_file() && !is_denylisted(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Describe a walk failure by its place in the checkout, never the host path
fn tree_error(root: &Path, err: &walkdir::Error) -> ScanError {
    let cause = match err.io_error() {
        Some(io) => io.to_string(),
        None => "filesystem loop".to_string(),
    };
    match err.path().and_then(|p| p.strip_prefix(root).ok()) {
        Some(relative) if !relative.as_os_str().is_empty() => ScanError::fetch(format!(
            "cannot read tree at {}: {}",
            relative.display(),
            cause
        )),
        _ => ScanError::fetch(format!("cannot read checked out tree: {}", cause)),
    }
}

/// Strip any userinfo from a URL before it reaches logs or report reasons
fn redact(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => {
            let host_end = rest.find('/').unwrap_or(rest.len());
            match rest[..host_end].rfind('@') {
                Some(at) => format!("{}://{}", scheme, &rest[at + 1..]),
                None => url.to_string(),
            }
        }
        None => url.to_string(),
    }
}
