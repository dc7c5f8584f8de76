//! Scratch working tree for a group pass
//!
//! A workspace is acquired before a group pass starts and released when
//! the pass ends, however it ends. [`WorkspaceGuard`] ties the release to
//! scope exit.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Directory created below the project root for scratch state
pub const SCRATCH_DIR: &str = ".depgroup-work";

/// Memo file inside the scratch directory
const CHANGES_LOG: &str = "changes.log";

/// Working tree used while compiling one group
pub trait Workspace: Send + Sync {
    /// Prepare the working tree for `directory` of the project at `path`
    fn setup(&self, path: &Path, directory: &str) -> io::Result<()>;

    /// Record a confirmed change
    fn store_change(&self, memo: &str) -> io::Result<()>;

    /// Release the working tree; must not fail
    fn cleanup(&self);
}

/// Releases a workspace when dropped
pub struct WorkspaceGuard<'a> {
    workspace: &'a dyn Workspace,
}

impl<'a> WorkspaceGuard<'a> {
    /// Set up `workspace` and return a guard that cleans it up on drop
    pub fn acquire(workspace: &'a dyn Workspace, path: &Path, directory: &str) -> io::Result<Self> {
        workspace.setup(path, directory)?;
        Ok(Self { workspace })
    }

    /// Record a confirmed change, logging failures
    pub fn store_change(&self, memo: &str) {
        if let Err(e) = self.workspace.store_change(memo) {
            tracing::warn!(error = %e, "failed to store change memo");
        }
    }
}

impl Drop for WorkspaceGuard<'_> {
    fn drop(&mut self) {
        self.workspace.cleanup();
    }
}

/// Workspace backed by a scratch directory below the project
///
/// Memos are appended to `changes.log`; the directory is removed on cleanup.
#[derive(Debug, Default)]
pub struct ScratchWorkspace {
    current: Mutex<Option<PathBuf>>,
}

impl ScratchWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scratch directory for `directory` of the project at `path`
    pub fn scratch_path(path: &Path, directory: &str) -> PathBuf {
        let mut scratch = path.join(SCRATCH_DIR);
        for part in directory.split('/').filter(|p| !p.is_empty()) {
            scratch.push(part);
        }
        scratch
    }

    /// Scratch directory currently in use, if set up
    pub fn current_path(&self) -> Option<PathBuf> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Workspace for ScratchWorkspace {
    fn setup(&self, path: &Path, directory: &str) -> io::Result<()> {
        let scratch = Self::scratch_path(path, directory);
        fs::create_dir_all(&scratch)?;
        tracing::debug!(path = %scratch.display(), "workspace ready");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(scratch);
        Ok(())
    }

    fn store_change(&self, memo: &str) -> io::Result<()> {
        let Some(scratch) = self.current_path() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "workspace is not set up",
            ));
        };
        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(scratch.join(CHANGES_LOG))?;
        writeln!(log, "{}", memo)
    }

    fn cleanup(&self) {
        let Some(scratch) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return;
        };
        // Remove the whole scratch root, not just the per-directory subtree
        let root = scratch
            .ancestors()
            .find(|p| p.ends_with(SCRATCH_DIR))
            .map(Path::to_path_buf)
            .unwrap_or(scratch);
        if let Err(e) = fs::remove_dir_all(&root) {
            tracing::warn!(path = %root.display(), error = %e, "failed to clean up workspace");
        }
    }
}
