//! Per-attempt workspace allocation
//!
//! Every sandbox attempt gets a fresh, uniquely named directory that is
//! removed when the attempt ends. Two allocations never collide and never
//! observe each other's files.

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Handle to an allocated workspace directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    id: Uuid,
    path: PathBuf,
}

impl Workspace {
    /// Globally unique workspace identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Directory the workspace occupies
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Allocates and destroys isolated workspace directories
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    /// Create a manager rooted at the given directory
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory workspaces are created under
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a fresh isolated workspace
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn allocate(&self) -> io::Result<Workspace> {
        let id = Uuid::new_v4();
        let path = self.root.join(format!("run-{id}"));
        std::fs::create_dir_all(&path)?;
        tracing::debug!(workspace = %path.display(), "allocated sandbox workspace");
        Ok(Workspace { id, path })
    }

    /// Remove a workspace and all its contents
    ///
    /// Idempotent: releasing an already removed (or never fully allocated)
    /// workspace succeeds.
    pub fn release(&self, workspace: &Workspace) -> io::Result<()> {
        match std::fs::remove_dir_all(&workspace.path) {
            Ok(()) => {
                tracing::debug!(workspace = %workspace.path.display(), "released sandbox workspace");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
