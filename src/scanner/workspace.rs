//! Ephemeral scan workspace
//!
//! Each scan run owns one directory under the workspace root, keyed by
//! repository id. The `Workspace` guard removes it when released or dropped,
//! whichever comes first, so every exit path of a scan cleans up exactly once.

use std::path::{Path, PathBuf};

/// Scoped ownership of a scan's working directory
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    released: bool,
}

impl Workspace {
    /// Directory a repository's scan runs in
    pub fn path_for(root: &Path, repository_id: &str) -> PathBuf {
        root.join(repository_id)
    }

    /// Take ownership of the workspace for `repository_id`
    ///
    /// Leftovers from an earlier run that died before cleanup are removed so
    /// the fetch always starts from an empty directory. The directory itself
    /// is created by the fetcher.
    pub fn acquire(root: &Path, repository_id: &str) -> std::io::Result<Self> {
        let path = Self::path_for(root, repository_id);
        match std::fs::remove_dir_all(&path) {
            Ok(()) => log::debug!("Removed stale workspace {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory now; failures are logged, never returned
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("Removed workspace {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove workspace {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        // Best effort cleanup on drop
        self.remove();
    }
}
