//! Configuration types for repo-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - A builder-style constructor for library callers

use crate::error::ConfigError;
use clap::Parser;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Default number of worker threads
pub const DEFAULT_WORKERS: usize = 8;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Default display width for repository names
pub const DEFAULT_WIDTH: usize = 10;

/// Narrowest width that still fits one character plus the `..` marker
const MIN_WIDTH: usize = 3;

/// Find git repositories under a directory tree
#[derive(Parser, Debug, Clone)]
#[command(
    name = "repo-walker",
    version,
    about = "Find git repositories under a directory tree",
    long_about = "Walks a directory tree with a pool of worker threads and lists every git \
                  repository found, with its current branch.\n\n\
                  Descent stops at each repository: nested repositories are not reported.",
    after_help = "EXAMPLES:\n    \
        repo-walker                     # scan $HOME\n    \
        repo-walker ~/src -d 2          # at most two levels below ~/src\n    \
        repo-walker ~/src -c            # absolute paths only, no branch lookup\n    \
        repo-walker ~/src --exclude node_modules --json"
)]
pub struct CliArgs {
    /// Directory to scan (defaults to $HOME)
    #[arg(value_name = "DIR", env = "HOME", hide_env_values = true)]
    pub path: Option<PathBuf>,

    /// Maximum depth to search (unlimited if not set)
    #[arg(short = 'd', long, value_name = "NUM")]
    pub max_depth: Option<usize>,

    /// Maximum width for repository names
    #[arg(short = 'w', long, default_value_t = DEFAULT_WIDTH, value_name = "NUM")]
    pub width: usize,

    /// Clean mode: only print full repository paths
    #[arg(short = 'c', long)]
    pub clean: bool,

    /// Number of worker threads
    #[arg(
        short = 'j',
        long,
        default_value_t = DEFAULT_WORKERS,
        env = "REPO_WALKER_WORKERS",
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Exclude directories matching pattern (can be repeated)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Descend into symbolic links that point at directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Output results as JSON
    #[arg(long, conflicts_with = "clean")]
    pub json: bool,

    /// Show a progress spinner and a summary on stderr
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Aligned name and branch columns
    Columns,
    /// Absolute repository paths only
    Clean,
    /// JSON document
    Json,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory to scan, as given by the user
    pub root: PathBuf,

    /// Maximum traversal depth
    pub max_depth: Option<usize>,

    /// Number of worker threads
    pub worker_count: usize,

    /// Compiled exclude patterns
    pub exclude_patterns: Vec<Regex>,

    /// Treat symlinks to directories as directories
    pub follow_symlinks: bool,

    /// Look up branch metadata for each repository
    pub collect_metadata: bool,

    /// Display width for repository names
    pub width: usize,

    /// Output mode
    pub output_mode: OutputMode,

    /// Show progress indicator and summary
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl ScanConfig {
    /// Configuration with defaults for scanning `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: None,
            worker_count: DEFAULT_WORKERS,
            exclude_patterns: Vec::new(),
            follow_symlinks: false,
            collect_metadata: true,
            width: DEFAULT_WIDTH,
            output_mode: OutputMode::Columns,
            show_progress: false,
            verbose: false,
        }
    }

    /// Set the maximum depth
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the worker count
    pub fn workers(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Add an exclude pattern
    pub fn exclude(mut self, pattern: Regex) -> Self {
        self.exclude_patterns.push(pattern);
        self
    }

    /// Follow symlinks to directories
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let root = args.path.ok_or(ConfigError::MissingRoot)?;

        // Validate worker count
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        if args.width < MIN_WIDTH {
            return Err(ConfigError::InvalidWidth {
                width: args.width,
                min: MIN_WIDTH,
            });
        }

        // Compile exclude patterns
        let exclude_patterns = args
            .exclude_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output_mode = if args.json {
            OutputMode::Json
        } else if args.clean {
            OutputMode::Clean
        } else {
            OutputMode::Columns
        };

        Ok(Self {
            root,
            max_depth: args.max_depth,
            worker_count: args.workers,
            exclude_patterns,
            follow_symlinks: args.follow_symlinks,
            // Clean mode never shows branches, so don't pay for the lookup
            collect_metadata: !args.clean,
            width: args.width,
            output_mode,
            show_progress: args.progress,
            verbose: args.verbose,
        })
    }

    /// Check if a path should be excluded
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude_patterns.is_empty() {
            return false;
        }
        let path = path.to_string_lossy();
        self.exclude_patterns.iter().any(|re| re.is_match(&path))
    }

    /// Whether children of a directory at `depth` may be queued
    ///
    /// Checked before enqueueing, so no probe work is spent past the limit.
    pub fn should_descend(&self, depth: u32) -> bool {
        self.max_depth
            .map(|max| (depth as usize) < max)
            .unwrap_or(true)
    }
}
