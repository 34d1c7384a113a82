//! Parallel repository walker
//!
//! A fixed pool of worker threads drains a shared queue of directories.
//! Workers push the subdirectories they find back onto the queue, and the
//! queue decides when nothing is left anywhere in the pool.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │        Scanner          │
//!                     │  - resolves root        │
//!                     │  - seeds queue          │
//!                     └───────────┬─────────────┘
//!                                 │ root task
//!                     ┌───────────▼─────────────┐
//!                     │       TaskQueue         │◄──────────────┐
//!                     │  FIFO + active count    │   subdirs     │
//!                     └───────────┬─────────────┘               │
//!       ┌─────────────────────────┼─────────────────────────┐   │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼───┴─┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │  readdir  │             │  readdir  │             │  readdir  │
//! └─────┬─────┘             └─────┬─────┘             └─────┬─────┘
//!       └────────────── repos ────┼─────────────────────────┘
//!                     ┌───────────▼─────────────┐
//!                     │    ResultCollector      │
//!                     └─────────────────────────┘
//! ```

pub mod coordinator;
pub mod probe;
pub mod queue;
pub mod results;
pub mod worker;

pub use coordinator::{scan, ScanProgress, ScanResult, Scanner};
pub use queue::{DirTask, QueueState, TaskQueue, WorkGuard};
pub use results::{RepoRecord, ResultCollector};
