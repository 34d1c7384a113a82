//! Worker thread logic for the parallel repository search
//!
//! Each worker:
//! - Claims directory tasks from the shared task queue
//! - Lists the directory through the filesystem probe
//! - Records child directories that contain a `.git` directory
//! - Pushes every other child directory back onto the queue
//!
//! A worker only exits when the queue reports the walk is done (or the walk
//! is cancelled).

use crate::config::ScanConfig;
use crate::error::{MetadataError, WalkOutcome, WorkerError};
use crate::metadata::MetadataProvider;
use crate::walker::probe::{self, REPO_MARKER};
use crate::walker::queue::{DirTask, TaskQueue, WorkGuard};
use crate::walker::results::ResultCollector;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// Counters shared by all workers of one scan
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Directories listed
    pub dirs_visited: AtomicU64,

    /// Repositories recorded
    pub repos_found: AtomicU64,

    /// Directories that could not be opened
    pub unreadable: AtomicU64,

    /// Directories skipped by an exclude pattern
    pub excluded: AtomicU64,

    /// Repositories recorded without metadata because the lookup failed
    /// (not counted when metadata is disabled)
    pub metadata_failures: AtomicU64,
}

impl ScanStats {
    fn record_dir(&self) {
        self.dirs_visited.fetch_add(1, Ordering::Relaxed);
    }

    fn record_repo(&self) {
        self.repos_found.fetch_add(1, Ordering::Relaxed);
    }

    fn record_unreadable(&self) {
        self.unreadable.fetch_add(1, Ordering::Relaxed);
    }

    fn record_excluded(&self) {
        self.excluded.fetch_add(1, Ordering::Relaxed);
    }

    fn record_metadata_failure(&self) {
        self.metadata_failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// Everything a worker shares with the rest of the scan
#[derive(Clone)]
pub struct WorkerContext {
    /// Validated configuration
    pub config: Arc<ScanConfig>,

    /// Canonical scan root; record paths are relative to it
    pub root: Arc<PathBuf>,

    /// Shared task queue
    pub queue: Arc<TaskQueue>,

    /// Shared result collector
    pub results: Arc<ResultCollector>,

    /// Metadata lookup for discovered repositories
    pub provider: Arc<dyn MetadataProvider>,

    /// Cancellation flag
    pub shutdown: Arc<AtomicBool>,

    /// Shared counters
    pub stats: Arc<ScanStats>,
}

/// A worker thread that processes directory tasks
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(id: usize, ctx: WorkerContext) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("walker-{}", id))
            .spawn(move || worker_loop(id, &ctx))
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Check whether the thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|payload| WorkerError::Panicked {
                id: self.id,
                message: panic_message(payload.as_ref()),
            }),
            None => Ok(()),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".into()
    }
}

/// Main worker loop
///
/// Also run directly on the caller's thread when no worker thread could be
/// started.
pub fn worker_loop(id: usize, ctx: &WorkerContext) {
    debug!(worker = id, "Worker starting");
    let mut processed = 0u64;

    loop {
        if ctx.shutdown.load(Ordering::Relaxed) {
            ctx.queue.interrupt();
            break;
        }

        let task = match ctx.queue.pop() {
            Some(task) => task,
            None => break,
        };

        // The credit claimed by pop is released when this drops
        let _guard = WorkGuard::new(&ctx.queue);

        let outcome = process_directory(id, &task, ctx);
        processed += 1;

        match &outcome {
            WalkOutcome::Success { path, repos, subdirs } => {
                trace!(
                    worker = id,
                    path = %path.display(),
                    repos = repos,
                    subdirs = subdirs,
                    "Directory processed"
                );
            }
            WalkOutcome::Skipped { path, reason } => {
                debug!(worker = id, path = %path.display(), reason = %reason, "Directory skipped");
            }
        }
    }

    debug!(worker = id, dirs = processed, "Worker shutting down");
}

/// Process a single directory
fn process_directory(worker_id: usize, task: &DirTask, ctx: &WorkerContext) -> WalkOutcome {
    let children = probe::list_children(&task.path, ctx.config.follow_symlinks);

    // Unreadable directories count as empty
    if let Some(e) = children.open_error() {
        ctx.stats.record_unreadable();
        return WalkOutcome::Skipped {
            path: task.path.clone(),
            reason: e.to_string(),
        };
    }

    ctx.stats.record_dir();

    let descend = ctx.config.should_descend(task.depth);
    let mut repos = 0;
    let mut subdirs = 0;

    for child in children {
        if probe::is_special(&child.name) || child.name == REPO_MARKER {
            continue;
        }

        if !child.is_dir_in(&task.path) {
            continue;
        }

        let child_path = task.path.join(&child.name);

        if ctx.config.is_excluded(&child_path) {
            ctx.stats.record_excluded();
            continue;
        }

        if probe::has_repository_marker(&child_path) {
            record_repository(worker_id, &child_path, ctx);
            repos += 1;
            // Repository interiors are not walked
            continue;
        }

        if descend {
            ctx.queue.push(DirTask::new(child_path, task.depth + 1));
            subdirs += 1;
        }
    }

    WalkOutcome::Success {
        path: task.path.clone(),
        repos,
        subdirs,
    }
}

/// Look up metadata and add the repository to the results
fn record_repository(worker_id: usize, repo_path: &Path, ctx: &WorkerContext) {
    // A panicking provider must not take the repository down with it
    let described = panic::catch_unwind(AssertUnwindSafe(|| ctx.provider.describe(repo_path)))
        .unwrap_or_else(|payload| {
            Err(MetadataError::Panicked {
                path: repo_path.to_path_buf(),
                message: panic_message(payload.as_ref()),
            })
        });

    let metadata = match described {
        Ok(metadata) => Some(metadata),
        Err(MetadataError::Disabled) => None,
        Err(e) => {
            ctx.stats.record_metadata_failure();
            debug!(worker = worker_id, path = %repo_path.display(), error = %e, "No metadata");
            None
        }
    };

    let relative = repo_path
        .strip_prefix(ctx.root.as_path())
        .unwrap_or(repo_path)
        .to_path_buf();

    trace!(worker = worker_id, repo = %relative.display(), "Repository found");
    ctx.results.record(relative, metadata);
    ctx.stats.record_repo();
}
