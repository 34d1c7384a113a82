//! Scan coordinator - orchestrates the parallel repository search
//!
//! The coordinator is responsible for:
//! - Resolving the scan root
//! - Creating the per-scan task queue and result collector
//! - Starting the workers and seeding the queue
//! - Waiting for quiescence (or cancellation)
//! - Final statistics

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::metadata::MetadataProvider;
use crate::walker::probe;
use crate::walker::queue::{DirTask, TaskQueue, WorkGuard};
use crate::walker::results::{RepoRecord, ResultCollector};
use crate::walker::worker::{worker_loop, ScanStats, Worker, WorkerContext};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How often the coordinator checks on the pool
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How often progress callbacks fire
const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Result of a completed scan
#[derive(Debug)]
pub struct ScanResult {
    /// Canonical scan root
    pub root: PathBuf,

    /// Discovered repositories, in discovery order
    pub repos: Vec<RepoRecord>,

    /// Directories listed
    pub dirs_visited: u64,

    /// Directories that could not be opened
    pub unreadable: u64,

    /// Directories skipped by exclude patterns
    pub excluded: u64,

    /// Repositories recorded without metadata because the lookup failed
    pub metadata_failures: u64,

    /// Number of worker threads that ran
    pub workers: usize,

    /// Time taken for the scan
    pub duration: Duration,

    /// Whether the walk reached quiescence (vs was interrupted)
    pub completed: bool,
}

/// Progress information for display
#[derive(Debug, Clone, Default)]
pub struct ScanProgress {
    /// Directories listed
    pub dirs: u64,

    /// Repositories found
    pub repos: u64,

    /// Directories that could not be opened
    pub unreadable: u64,

    /// Elapsed time
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Calculate directories per second
    pub fn dirs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.dirs as f64 / secs
        } else {
            0.0
        }
    }
}

/// Runs one repository scan
pub struct Scanner {
    /// Configuration
    config: Arc<ScanConfig>,

    /// Metadata lookup
    provider: Arc<dyn MetadataProvider>,

    /// Shutdown signal
    shutdown: Arc<AtomicBool>,

    /// Counters, shared with workers and progress reporting
    stats: Arc<ScanStats>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: ScanConfig, provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            shutdown: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(ScanStats::default()),
        }
    }

    /// Get a clone of the shutdown flag (for signal handlers)
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run the scan
    pub fn run(self) -> Result<ScanResult> {
        let start = Instant::now();

        let root = resolve_root(&self.config.root)?;

        info!(
            root = %root.display(),
            workers = self.config.worker_count,
            max_depth = ?self.config.max_depth,
            "Starting repository scan"
        );

        // Per-scan shared state; the queue starts out holding our seed credit
        let queue = Arc::new(TaskQueue::new());
        let results = Arc::new(ResultCollector::new());

        let ctx = WorkerContext {
            config: Arc::clone(&self.config),
            root: Arc::new(root.clone()),
            queue: Arc::clone(&queue),
            results: Arc::clone(&results),
            provider: Arc::clone(&self.provider),
            shutdown: Arc::clone(&self.shutdown),
            stats: Arc::clone(&self.stats),
        };

        let workers = spawn_workers(&ctx, self.config.worker_count);

        // Seed the queue, then hand back the credit that kept the pool alive
        {
            let _seed = WorkGuard::new(&queue);
            queue.push(DirTask::root(root.clone()));
        }

        let spawned = workers.len();
        let mut panicked = 0;
        if spawned == 0 {
            warn!("No worker threads could be started, scanning on the calling thread");
        } else {
            panicked = self.wait_for_workers(&queue, workers);
        }

        // Work the pool left behind (no threads, or every thread died) is
        // finished here rather than lost
        let state = queue.snapshot();
        if !state.terminated && !state.interrupted {
            if spawned > 0 {
                warn!(
                    pending = state.pending,
                    "Worker pool exited before the walk finished, continuing on the calling thread"
                );
            }
            worker_loop(spawned, &ctx);
        }

        drop(ctx);
        // A panic part way through a directory loses the rest of it
        let completed = queue.is_terminated() && !queue.snapshot().interrupted && panicked == 0;

        let repos = match Arc::try_unwrap(results) {
            Ok(collector) => collector.into_records(),
            Err(shared) => shared.snapshot(),
        };

        let duration = start.elapsed();
        let result = ScanResult {
            root,
            repos,
            dirs_visited: self.stats.dirs_visited.load(Ordering::Relaxed),
            unreadable: self.stats.unreadable.load(Ordering::Relaxed),
            excluded: self.stats.excluded.load(Ordering::Relaxed),
            metadata_failures: self.stats.metadata_failures.load(Ordering::Relaxed),
            workers: spawned.max(1),
            duration,
            completed,
        };

        info!(
            repos = result.repos.len(),
            dirs = result.dirs_visited,
            unreadable = result.unreadable,
            metadata_failures = result.metadata_failures,
            duration_ms = duration.as_millis() as u64,
            completed = completed,
            "Scan finished"
        );

        Ok(result)
    }

    /// Run the scan, reporting progress to `progress_callback` periodically
    pub fn run_with_progress<F>(self, progress_callback: F) -> Result<ScanResult>
    where
        F: Fn(ScanProgress) + Send + 'static,
    {
        let start = Instant::now();
        let done = Arc::new(AtomicBool::new(false));
        let stats = Arc::clone(&self.stats);

        let progress_handle = {
            let done = Arc::clone(&done);
            thread::spawn(move || loop {
                progress_callback(ScanProgress {
                    dirs: stats.dirs_visited.load(Ordering::Relaxed),
                    repos: stats.repos_found.load(Ordering::Relaxed),
                    unreadable: stats.unreadable.load(Ordering::Relaxed),
                    elapsed: start.elapsed(),
                });
                if done.load(Ordering::Relaxed) {
                    break;
                }
                thread::sleep(PROGRESS_INTERVAL);
            })
        };

        let result = self.run();

        done.store(true, Ordering::SeqCst);
        let _ = progress_handle.join();

        result
    }

    /// Wait for every worker to exit, forwarding cancellation to the queue
    ///
    /// Returns how many workers panicked.
    fn wait_for_workers(&self, queue: &TaskQueue, workers: Vec<Worker>) -> usize {
        let mut interrupted = false;

        while !workers.iter().all(Worker::is_finished) {
            if !interrupted && self.shutdown.load(Ordering::Relaxed) {
                info!("Shutdown signal received");
                queue.interrupt();
                interrupted = true;
            }
            thread::sleep(POLL_INTERVAL);
        }

        let mut panicked = 0;
        for worker in workers {
            if let Err(e) = worker.join() {
                warn!(error = %e, "Worker failed to join cleanly");
                panicked += 1;
            }
        }
        panicked
    }
}

/// Start up to `count` workers
///
/// Spawn failures are logged and the scan goes on with the workers that did
/// start.
fn spawn_workers(ctx: &WorkerContext, count: usize) -> Vec<Worker> {
    let mut workers = Vec::with_capacity(count);

    for id in 0..count {
        match Worker::spawn(id, ctx.clone()) {
            Ok(worker) => workers.push(worker),
            Err(e) => {
                warn!(error = %e, "Continuing with {} workers", workers.len());
                break;
            }
        }
    }

    workers
}

/// Canonicalize the scan root and check it is a directory
fn resolve_root(path: &Path) -> Result<PathBuf> {
    let root = probe::canonical_root(path).map_err(|source| ScanError::RootResolution {
        path: path.to_path_buf(),
        source,
    })?;

    if !probe::is_directory(&root) {
        return Err(ScanError::RootNotADirectory { path: root });
    }

    Ok(root)
}

/// Scan `root` for repositories with the default worker count
///
/// Convenience wrapper around [`Scanner`].
pub fn scan(
    root: impl AsRef<Path>,
    max_depth: Option<usize>,
    provider: Arc<dyn MetadataProvider>,
) -> Result<Vec<RepoRecord>> {
    let config = ScanConfig::new(root.as_ref()).max_depth(max_depth);
    Scanner::new(config, provider).run().map(|result| result.repos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::NoMetadata;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scan_progress_rate() {
        let progress = ScanProgress {
            dirs: 1000,
            repos: 10,
            unreadable: 0,
            elapsed: Duration::from_secs(10),
        };
        assert!((progress.dirs_per_second() - 100.0).abs() < 0.1);
        assert_eq!(ScanProgress::default().dirs_per_second(), 0.0);
    }

    #[test]
    fn test_resolve_root_errors() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(
            resolve_root(&dir.path().join("missing")),
            Err(ScanError::RootResolution { .. })
        ));
        assert!(matches!(
            resolve_root(&file),
            Err(ScanError::RootNotADirectory { .. })
        ));
        assert!(resolve_root(dir.path()).unwrap().is_absolute());
    }

    #[test]
    fn test_preset_shutdown_reports_incomplete() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/.git")).unwrap();

        let scanner = Scanner::new(ScanConfig::new(dir.path()).workers(2), Arc::new(NoMetadata));
        scanner.shutdown_flag().store(true, Ordering::SeqCst);

        let result = scanner.run().unwrap();
        assert!(!result.completed);
        assert!(result.repos.is_empty());
    }

    #[test]
    fn test_run_with_progress_calls_back() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/.git")).unwrap();

        let calls = Arc::new(std::sync::atomic::AtomicU64::new(0));
        let counter = Arc::clone(&calls);

        let scanner = Scanner::new(ScanConfig::new(dir.path()), Arc::new(NoMetadata));
        let result = scanner
            .run_with_progress(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();

        assert!(result.completed);
        assert_eq!(result.repos.len(), 1);
        // The poller reports once more after the scan ends
        assert!(calls.load(Ordering::Relaxed) >= 1);
    }
}
