//! Error types for repo-walker
//!
//! This module defines the error hierarchy for a scan:
//! - Root resolution errors (fatal, no partial results)
//! - Configuration and CLI errors
//! - Worker thread errors
//! - Metadata lookup errors (never fatal, recovered by the worker)
//!
//! Unreadable directories met mid-walk are not errors at this level. A worker
//! reports them as a [`WalkOutcome::Skipped`] and carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a repository scan
#[derive(Error, Debug)]
pub enum ScanError {
    /// The scan root could not be resolved to a canonical path
    #[error("Cannot resolve scan root '{path}': {source}")]
    RootResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scan root resolved, but is not a directory
    #[error("Scan root '{path}' is not a directory")]
    RootNotADirectory { path: PathBuf },
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Display width too narrow to hold a truncation marker
    #[error("Invalid width {width}: must be at least {min}")]
    InvalidWidth { width: usize, min: usize },

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    /// No directory given and no fallback available
    #[error("No directory given and HOME is not set")]
    MissingRoot,
}

/// Worker thread errors
///
/// Reported in logs; a scan never fails because one worker did.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker thread could not be started
    #[error("Failed to start worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },
}

/// Metadata lookup errors
///
/// These never leave a worker: a repository whose metadata cannot be read is
/// still recorded, just without metadata.
#[derive(Error, Debug, Clone)]
pub enum MetadataError {
    /// Repository could not be opened
    #[error("Failed to open repository '{path}': {reason}")]
    Open { path: PathBuf, reason: String },

    /// HEAD could not be resolved
    #[error("Failed to read HEAD of '{path}': {reason}")]
    Head { path: PathBuf, reason: String },

    /// The provider panicked while describing the repository
    #[error("Metadata lookup for '{path}' panicked: {message}")]
    Panicked { path: PathBuf, message: String },

    /// Metadata collection is switched off
    #[error("Metadata collection disabled")]
    Disabled,
}

/// Result type alias for ScanError
pub type Result<T> = std::result::Result<T, ScanError>;

/// Represents the outcome of visiting a single directory
#[derive(Debug)]
pub enum WalkOutcome {
    /// Directory was listed
    Success {
        path: PathBuf,
        repos: usize,
        subdirs: usize,
    },

    /// Directory could not be opened and was treated as empty
    Skipped { path: PathBuf, reason: String },
}

impl WalkOutcome {
    /// Returns true if this outcome represents success
    pub fn is_success(&self) -> bool {
        matches!(self, WalkOutcome::Success { .. })
    }

    /// Returns the path associated with this outcome
    pub fn path(&self) -> &std::path::Path {
        match self {
            WalkOutcome::Success { path, .. } => path,
            WalkOutcome::Skipped { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidWorkerCount { count: 0, max: 512 };
        assert_eq!(
            err.to_string(),
            "Invalid worker count 0: must be between 1 and 512"
        );
    }

    #[test]
    fn test_root_error_keeps_source() {
        let err = ScanError::RootResolution {
            path: PathBuf::from("/missing"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn test_outcome_path() {
        let outcome = WalkOutcome::Skipped {
            path: PathBuf::from("/locked"),
            reason: "Permission denied".into(),
        };
        assert!(!outcome.is_success());
        assert_eq!(outcome.path(), std::path::Path::new("/locked"));
    }
}
