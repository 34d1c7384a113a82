//! repo-walker - Parallel Git Repository Discovery
//!
//! Finds every git repository under a directory tree. A fixed pool of worker
//! threads walks the tree, stops descending at each repository root, and
//! optionally looks up the checked-out branch of every repository found.
//!
//! # Features
//!
//! - **Parallel Walk**: N worker threads share one directory queue; no
//!   central scheduler hands out work.
//!
//! - **Exact Termination**: the queue tracks queued and in-flight directories
//!   under one lock and ends the walk exactly once, when both reach zero.
//!
//! - **Repository Boundaries**: a directory holding a `.git` directory is
//!   reported and never entered, so nested repositories are not listed.
//!
//! - **Best-Effort Metadata**: branch lookup failures never drop a
//!   repository; unreadable directories are treated as empty.
//!
//! # Architecture
//!
//! ```text
//!   root ──► Scanner ──► TaskQueue ◄──── subdirectories ────┐
//!                            │                              │
//!                            ▼                              │
//!                   ┌─── Worker pool ───┐                   │
//!                   │ probe directory   │───────────────────┘
//!                   │ describe(repo)    │
//!                   └────────┬──────────┘
//!                            ▼
//!                     ResultCollector ──► Vec<RepoRecord>
//! ```
//!
//! # Example
//!
//! ```no_run
//! use repo_walker::metadata::GitBranch;
//! use std::sync::Arc;
//!
//! let repos = repo_walker::scan("/home/dev/src", Some(3), Arc::new(GitBranch))?;
//! for repo in &repos {
//!     println!("{} {}", repo.relative_path.display(), repo.branch().unwrap_or("-"));
//! }
//! # Ok::<(), repo_walker::ScanError>(())
//! ```

pub mod config;
pub mod error;
pub mod metadata;
pub mod output;
pub mod progress;
pub mod walker;

pub use config::{CliArgs, OutputMode, ScanConfig};
pub use error::{Result, ScanError};
pub use metadata::{GitBranch, Metadata, MetadataProvider, NoMetadata};
pub use walker::{scan, RepoRecord, ScanResult, Scanner};
