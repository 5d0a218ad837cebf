//! Scan Orchestrator
//!
//! Fans a file list out over a bounded pool of blocking workers. Each worker
//! reads one file, drops it if it sniffs as binary, runs the prefilter once
//! and confirms every candidate rule with the detector. The first I/O error
//! cancels the whole scan.

use crate::model::Issue;
use crate::scanner::classifier::is_probably_text;
use crate::scanner::detector::{Detector, Fragment};
use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::ruleset::CompiledRuleSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Concurrent file scans per job unless configured otherwise
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct ScanOrchestrator {
    concurrency: usize,
    detector: Detector,
}

impl Default for ScanOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl ScanOrchestrator {
    /// A concurrency of zero is treated as one
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            detector: Detector::new(),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Scan `paths` (inside `work_dir`) against `rules`
    ///
    /// Issue paths are relative to `work_dir` with `/` separators. Issues from
    /// different files come back in completion order. On error nothing found
    /// so far is returned.
    pub async fn scan_all(
        &self,
        work_dir: &Path,
        paths: Vec<PathBuf>,
        rules: Arc<CompiledRuleSet>,
    ) -> ScanResult<Vec<Issue>> {
        log::info!(
            "Scanning {} files with {} rules ({} workers)",
            paths.len(),
            rules.len(),
            self.concurrency
        );

        let cancel = Arc::new(AtomicBool::new(false));
        let mut workers: JoinSet<ScanResult<Vec<Issue>>> = JoinSet::new();
        let mut issues = Vec::new();

        for path in paths {
            while workers.len() >= self.concurrency {
                if let Some(joined) = workers.join_next().await {
                    Self::collect(joined, &mut issues, &mut workers, &cancel)?;
                }
            }

            let relative = relative_path(work_dir, &path);
            let rules = Arc::clone(&rules);
            let cancel = Arc::clone(&cancel);
            let detector = self.detector;
            workers.spawn_blocking(move || scan_file(&path, relative, &rules, detector, &cancel));
        }

        while let Some(joined) = workers.join_next().await {
            Self::collect(joined, &mut issues, &mut workers, &cancel)?;
        }

        log::info!("Scan found {} issues", issues.len());
        Ok(issues)
    }

    fn collect(
        joined: Result<ScanResult<Vec<Issue>>, tokio::task::JoinError>,
        issues: &mut Vec<Issue>,
        workers: &mut JoinSet<ScanResult<Vec<Issue>>>,
        cancel: &AtomicBool,
    ) -> ScanResult<()> {
        let outcome = joined
            .map_err(|e| ScanError::Task {
                message: format!("file scan worker failed: {}", e),
            })
            .and_then(|result| result);

        match outcome {
            Ok(found) => {
                issues.extend(found);
                Ok(())
            }
            Err(err) => {
                log::debug!("Cancelling {} outstanding file scans: {}", workers.len(), err);
                cancel.store(true, Ordering::SeqCst);
                workers.abort_all();
                Err(err)
            }
        }
    }
}

/// Scan a single file; binary content and keyword-free text yield nothing
fn scan_file(
    path: &Path,
    relative: String,
    rules: &CompiledRuleSet,
    detector: Detector,
    cancel: &AtomicBool,
) -> ScanResult<Vec<Issue>> {
    if cancel.load(Ordering::SeqCst) {
        return Err(ScanError::Cancelled);
    }

    let bytes = std::fs::read(path).map_err(|e| ScanError::io(&relative, &e))?;
    if !is_probably_text(&bytes) {
        log::debug!("Skipping binary file {}", relative);
        return Ok(Vec::new());
    }

    let raw = String::from_utf8_lossy(&bytes).into_owned();
    let keywords = rules.prefilter().matches(&raw);
    if keywords.is_empty() {
        return Ok(Vec::new());
    }

    let fragment = Fragment::new(raw, relative, keywords);
    Ok(rules
        .candidates(&fragment)
        .flat_map(|rule| detector.confirm(&fragment, rule))
        .collect())
}

/// `path` relative to `root`, `/`-separated
fn relative_path(root: &Path, path: &Path) -> String {
    let stripped = path.strip_prefix(root).unwrap_or(path);
    stripped
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
