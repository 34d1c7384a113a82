//! Task queue with quiescence detection
//!
//! A FIFO of directory tasks shared by every worker. The queue also keeps the
//! count of tasks that have been claimed but not yet finished, which is what
//! lets the pool agree on one moment when the walk is exhausted:
//!
//! ```text
//!   done  <=>  pending == 0  &&  active == 0
//! ```
//!
//! Both counts live under the same mutex as the FIFO, so the check cannot
//! interleave with a push or a finish. `active` goes up when a task is
//! claimed by `pop`, not when its children are pushed: a worker that is
//! still listing a directory holds no queued tasks, but must still count as
//! outstanding work.
//!
//! The queue is created already holding one credit, owned by the scanner
//! until it has pushed the root task. Without it, a worker that starts before
//! the root is pushed would see an empty queue with nobody active and end the
//! walk before it began.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// A task to visit a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirTask {
    /// Absolute path to the directory
    pub path: PathBuf,

    /// Depth from root (0 = root)
    pub depth: u32,
}

impl DirTask {
    /// Create a new directory task
    pub fn new(path: PathBuf, depth: u32) -> Self {
        Self { path, depth }
    }

    /// Create the root task
    pub fn root(path: PathBuf) -> Self {
        Self { path, depth: 0 }
    }
}

/// Statistics for the task queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total tasks enqueued
    pub enqueued: AtomicU64,

    /// Total tasks dequeued
    pub dequeued: AtomicU64,
}

impl QueueStats {
    /// Get queue throughput (dequeued tasks)
    pub fn throughput(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of the queue's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueState {
    /// Tasks waiting in the FIFO
    pub pending: usize,

    /// Tasks claimed and not yet finished, plus the seed credit if held
    pub active_workers: usize,

    /// Set once, when quiescence was observed
    pub terminated: bool,

    /// Set when the walk was cancelled
    pub interrupted: bool,
}

struct Inner {
    tasks: VecDeque<DirTask>,
    active_workers: usize,
    terminated: bool,
    interrupted: bool,
}

impl Inner {
    fn is_quiescent(&self) -> bool {
        self.tasks.is_empty() && self.active_workers == 0
    }
}

/// Shared FIFO of directory tasks
pub struct TaskQueue {
    inner: Mutex<Inner>,
    available: Condvar,
    stats: QueueStats,
}

impl TaskQueue {
    /// Create an empty queue holding the seed credit
    ///
    /// The credit must be released with [`TaskQueue::finish_work`] (or by
    /// dropping a [`WorkGuard`]) once the root task has been pushed.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                tasks: VecDeque::new(),
                active_workers: 1,
                terminated: false,
                interrupted: false,
            }),
            available: Condvar::new(),
            stats: QueueStats::default(),
        }
    }

    /// Append a task and wake one waiting worker
    pub fn push(&self, task: DirTask) {
        let mut inner = self.inner.lock();
        inner.tasks.push_back(task);
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        self.available.notify_one();
    }

    /// Claim the next task, blocking while other workers may still produce one
    ///
    /// Returns `None` once the walk is complete or interrupted. A claimed
    /// task must be released with [`TaskQueue::finish_work`].
    pub fn pop(&self) -> Option<DirTask> {
        let mut inner = self.inner.lock();
        loop {
            if inner.terminated || inner.interrupted {
                return None;
            }

            if let Some(task) = inner.tasks.pop_front() {
                inner.active_workers += 1;
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                return Some(task);
            }

            if inner.active_workers == 0 {
                inner.terminated = true;
                self.available.notify_all();
                return None;
            }

            // Spurious wakeups and lost races both land back at the top
            self.available.wait(&mut inner);
        }
    }

    /// Release one claimed task (or the seed credit)
    pub fn finish_work(&self) {
        let mut inner = self.inner.lock();
        debug_assert!(inner.active_workers > 0, "finish_work without a claim");
        inner.active_workers = inner.active_workers.saturating_sub(1);

        if inner.is_quiescent() {
            inner.terminated = true;
            self.available.notify_all();
        } else {
            self.available.notify_one();
        }
    }

    /// Cancel the walk: every current and future `pop` returns `None`
    ///
    /// The pending/active counts are left alone.
    pub fn interrupt(&self) {
        let mut inner = self.inner.lock();
        inner.interrupted = true;
        self.available.notify_all();
    }

    /// Check if quiescence has been reached
    pub fn is_terminated(&self) -> bool {
        self.inner.lock().terminated
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.inner.lock().tasks.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().tasks.is_empty()
    }

    /// Snapshot of the queue counters
    pub fn snapshot(&self) -> QueueState {
        let inner = self.inner.lock();
        QueueState {
            pending: inner.tasks.len(),
            active_workers: inner.active_workers,
            terminated: inner.terminated,
            interrupted: inner.interrupted,
        }
    }

    /// Get queue statistics
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard that releases one credit when dropped
///
/// Held around the processing of a claimed task so that the credit is given
/// back even if processing panics.
pub struct WorkGuard<'a> {
    queue: &'a TaskQueue,
}

impl<'a> WorkGuard<'a> {
    /// Take responsibility for releasing a credit already held
    pub fn new(queue: &'a TaskQueue) -> Self {
        Self { queue }
    }
}

impl<'a> Drop for WorkGuard<'a> {
    fn drop(&mut self) {
        self.queue.finish_work();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn task(path: &str, depth: u32) -> DirTask {
        DirTask::new(PathBuf::from(path), depth)
    }

    #[test]
    fn test_queue_basic() {
        let queue = TaskQueue::new();
        queue.push(DirTask::root("/test".into()));
        queue.finish_work();

        assert_eq!(queue.len(), 1);
        let popped = queue.pop().unwrap();
        assert_eq!(popped.path, PathBuf::from("/test"));
        assert_eq!(popped.depth, 0);

        let state = queue.snapshot();
        assert_eq!(state.pending, 0);
        assert_eq!(state.active_workers, 1);
        assert!(!state.terminated);
    }

    #[test]
    fn test_queue_is_fifo() {
        let queue = TaskQueue::new();
        queue.push(task("/a", 1));
        queue.push(task("/b", 1));
        queue.push(task("/c", 1));

        assert_eq!(queue.pop().unwrap().path, PathBuf::from("/a"));
        assert_eq!(queue.pop().unwrap().path, PathBuf::from("/b"));
        assert_eq!(queue.pop().unwrap().path, PathBuf::from("/c"));
    }

    #[test]
    fn test_seed_credit_blocks_termination() {
        let queue = TaskQueue::new();
        let state = queue.snapshot();
        assert_eq!(state.active_workers, 1);
        assert!(!state.terminated);

        queue.finish_work();
        assert!(queue.is_terminated());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_queue_completion() {
        let queue = TaskQueue::new();
        queue.push(task("/root", 0));
        queue.finish_work();
        assert!(!queue.is_terminated());

        // Claim the only task: queue empty but a worker is active
        let _task = queue.pop().unwrap();
        assert!(!queue.is_terminated());

        // Child pushed while still active
        queue.push(task("/root/child", 1));
        queue.finish_work();
        assert!(!queue.is_terminated());

        let _child = queue.pop().unwrap();
        {
            let _guard = WorkGuard::new(&queue);
        }

        assert!(queue.is_terminated());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_terminated_latch_is_sticky() {
        let queue = TaskQueue::new();
        queue.finish_work();
        assert!(queue.is_terminated());

        for _ in 0..3 {
            assert!(queue.pop().is_none());
            assert!(queue.snapshot().terminated);
        }
    }

    #[test]
    fn test_workers_wait_for_seed() {
        let queue = Arc::new(TaskQueue::new());
        let finished = Arc::new(AtomicBool::new(false));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let finished = Arc::clone(&finished);
                thread::spawn(move || {
                    let mut claimed = Vec::new();
                    while let Some(task) = queue.pop() {
                        let _guard = WorkGuard::new(&queue);
                        claimed.push(task);
                    }
                    finished.store(true, Ordering::SeqCst);
                    claimed
                })
            })
            .collect();

        // Workers are running against an empty queue; the seed credit must
        // keep every one of them waiting.
        thread::sleep(Duration::from_millis(50));
        assert!(!finished.load(Ordering::SeqCst));
        assert!(!queue.is_terminated());

        queue.push(DirTask::root("/seed".into()));
        queue.finish_work();

        let claimed: Vec<DirTask> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(claimed, vec![DirTask::root("/seed".into())]);
        assert!(queue.is_terminated());
    }

    #[test]
    fn test_dynamic_fan_out_terminates_once() {
        // Each task at depth < 4 spawns 3 children: 1 + 3 + 9 + 27 + 81 tasks
        let queue = Arc::new(TaskQueue::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut processed = 0u64;
                    while let Some(task) = queue.pop() {
                        let _guard = WorkGuard::new(&queue);
                        if task.depth < 4 {
                            for i in 0..3 {
                                queue.push(DirTask::new(
                                    task.path.join(i.to_string()),
                                    task.depth + 1,
                                ));
                            }
                        }
                        processed += 1;
                    }
                    processed
                })
            })
            .collect();

        queue.push(DirTask::root("/".into()));
        queue.finish_work();

        let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 121);

        let state = queue.snapshot();
        assert_eq!(state.pending, 0);
        assert_eq!(state.active_workers, 0);
        assert!(state.terminated);
        assert_eq!(queue.stats().enqueued.load(Ordering::Relaxed), 121);
        assert_eq!(queue.stats().throughput(), 121);
    }

    #[test]
    fn test_interrupt_wakes_waiters() {
        let queue = Arc::new(TaskQueue::new());
        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };

        thread::sleep(Duration::from_millis(20));
        queue.interrupt();

        assert!(waiter.join().unwrap().is_none());
        let state = queue.snapshot();
        assert!(state.interrupted);
        assert!(!state.terminated);
        // Seed credit untouched by the interrupt
        assert_eq!(state.active_workers, 1);
    }

    #[test]
    fn test_interrupt_discards_pending_work() {
        let queue = TaskQueue::new();
        queue.push(task("/a", 1));
        queue.interrupt();

        assert!(queue.pop().is_none());
        assert_eq!(queue.len(), 1);
    }
}
