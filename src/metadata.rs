//! Per-repository metadata
//!
//! Workers call a [`MetadataProvider`] once for each repository they find,
//! on their own thread. Providers must be safe to call concurrently with
//! different paths, and should report failure through `Err`. A failed
//! lookup, or a panicking one, still records the repository without
//! metadata.

use crate::error::MetadataError;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Lightweight repository metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Short name of the checked-out branch, or `HEAD` when detached
    pub branch: String,
}

impl Metadata {
    /// Metadata for a repository on `branch`
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
        }
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.branch)
    }
}

/// Looks up metadata for a repository root
pub trait MetadataProvider: Send + Sync {
    /// Describe the repository rooted at `repo_path` (an absolute path)
    fn describe(&self, repo_path: &Path) -> Result<Metadata, MetadataError>;
}

impl<F> MetadataProvider for F
where
    F: Fn(&Path) -> Result<Metadata, MetadataError> + Send + Sync,
{
    fn describe(&self, repo_path: &Path) -> Result<Metadata, MetadataError> {
        self(repo_path)
    }
}

/// Reads the current branch with gix
#[derive(Debug, Clone, Copy, Default)]
pub struct GitBranch;

impl MetadataProvider for GitBranch {
    fn describe(&self, repo_path: &Path) -> Result<Metadata, MetadataError> {
        let repo = gix::open(repo_path).map_err(|e| MetadataError::Open {
            path: repo_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let head = repo.head_name().map_err(|e| MetadataError::Head {
            path: repo_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let branch = match head {
            Some(name) => name.shorten().to_string(),
            None => "HEAD".to_string(),
        };

        Ok(Metadata { branch })
    }
}

/// Provider used when metadata is not wanted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataProvider for NoMetadata {
    fn describe(&self, _repo_path: &Path) -> Result<Metadata, MetadataError> {
        Err(MetadataError::Disabled)
    }
}
