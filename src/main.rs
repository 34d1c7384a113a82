//! repo-walker - Parallel Git Repository Discovery
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use repo_walker::config::{CliArgs, ScanConfig};
use repo_walker::metadata::{GitBranch, MetadataProvider, NoMetadata};
use repo_walker::output::write_results;
use repo_walker::progress::{print_summary, ProgressReporter};
use repo_walker::walker::Scanner;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = ScanConfig::from_args(args).context("Invalid configuration")?;

    let provider: Arc<dyn MetadataProvider> = if config.collect_metadata {
        Arc::new(GitBranch)
    } else {
        Arc::new(NoMetadata)
    };

    let scanner = Scanner::new(config.clone(), provider);

    // Setup signal handler for graceful shutdown
    let shutdown_flag = scanner.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    // Run the scan
    let outcome = if config.show_progress {
        let reporter = ProgressReporter::new();
        reporter.set_status(&format!("Scanning {}...", config.root.display()));

        let display = reporter.clone();
        let result = scanner.run_with_progress(move |progress| display.update(&progress));
        reporter.finish_and_clear();
        result
    } else {
        scanner.run()
    };
    let result = outcome.with_context(|| format!("Failed to scan {}", config.root.display()))?;

    let stdout = std::io::stdout();
    write_results(&mut stdout.lock(), &result, config.output_mode, config.width)
        .context("Failed to write results")?;

    if config.show_progress {
        print_summary(&result);
    }

    if !result.completed {
        info!("Scan was interrupted before completion");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("repo_walker=debug,warn"),
        Err(_) => EnvFilter::new("repo_walker=warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
