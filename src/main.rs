//! batchlint - Batch lint runner
//!
//! Main entry point for the CLI.
//!
//! # Overview
//!
//! This binary crate provides the command-line frontend for batchlint.
//! It initializes:
//! - Logging infrastructure (daily-rotating file + console output)
//! - Tokio async runtime (the runner is strictly sequential; workers only
//!   service subprocess I/O)
//! - State management ([`StateManager`])
//! - Configuration loading ([`ConfigManager`])
//!
//! # Execution Flow
//!
//! 1. Parse CLI arguments
//! 2. Load YAML configuration from the config directory and merge CLI
//!    overrides on top
//! 3. Initialize logging → logs/batchlint.<date>
//! 4. Assemble the ordered file list (positional args + `--file-list`),
//!    dropping ignore-listed entries
//! 5. Run the batch over the file list with the configured linter
//! 6. Log the metrics summary and shut the runtime down
//! 7. Exit 0 on a clean or forced run, 1 when violations are fatal,
//!    2 on a configuration error
//!
//! # Configuration Files
//!
//! Expected in the config directory (default `.batchlint/`):
//! - `batchlint.yaml`: lint options, linter command, logging settings
//! - `batchlint.ignore.yaml`: file names excluded from runs (optional)

use anyhow::Result;
use batchlint::config::read_file_list;
use batchlint::{APP_NAME, CommandLinter, ConfigManager, StateManager, VERSION, run_batch};
use camino::Utf8PathBuf;
use clap::Parser;

/// Batch lint runner: drives an external linter over a file list and
/// aggregates violations.
#[derive(Parser, Debug)]
#[command(name = "batchlint", version)]
struct Cli {
    /// Source files to lint, in order
    files: Vec<Utf8PathBuf>,

    /// Newline-delimited file of additional paths (`#` comments allowed)
    #[arg(long, value_name = "PATH")]
    file_list: Option<Utf8PathBuf>,

    /// Configuration directory
    #[arg(long, value_name = "DIR", default_value = ".batchlint")]
    config_dir: Utf8PathBuf,

    /// Override the configured formatter ("json" enables structured parsing)
    #[arg(long)]
    formatter: Option<String>,

    /// Write violation lines here instead of logging them
    #[arg(long, value_name = "PATH")]
    output_file: Option<Utf8PathBuf>,

    /// Publish the run report under this key in shared state
    #[arg(long, value_name = "KEY")]
    output_report: Option<String>,

    /// Preserve existing output file content before the first write
    #[arg(long)]
    append_to_output: bool,

    /// Complete without a fatal outcome even when violations are found
    #[arg(long)]
    force: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration is loaded before logging so the [logging] section can
    // shape the subscriber; load-time messages only reach the log after init.
    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let mut config = config_manager.load_runner_config()?;

    // CLI overrides take precedence over file configuration
    if let Some(formatter) = cli.formatter {
        config.lint.formatter = formatter;
    }
    if let Some(output_file) = cli.output_file {
        config.lint.output_file = Some(output_file);
    }
    if let Some(output_report) = cli.output_report {
        config.lint.output_report = Some(output_report);
    }
    if cli.append_to_output {
        config.lint.append_to_output = true;
    }
    if cli.force {
        config.lint.force = true;
    }
    if cli.debug {
        config.logging.debug_mode = true;
    }

    let _guard = batchlint::logging::setup_logging(
        &config.logging.log_dir,
        "batchlint",
        config.logging.debug_mode,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!("Configuration directory: {}", config_manager.config_dir());

    // Assemble the ordered file list: positional args first, then the
    // file-list file, with ignore-listed entries dropped.
    let mut files = cli.files;
    if let Some(list_path) = cli.file_list.as_deref() {
        files.extend(read_file_list(list_path)?);
    }

    let ignore = config_manager.load_ignore_config()?;
    files.retain(|file| {
        if ignore.should_ignore(file) {
            tracing::debug!("Skipping ignore-listed file: {}", file);
            false
        } else {
            true
        }
    });

    let linter = match CommandLinter::from_settings(&config.linter) {
        Ok(linter) => linter,
        Err(err) => {
            eprintln!(
                "batchlint: {} (set [linter].command in {}/batchlint.yaml)",
                err,
                config_manager.config_dir()
            );
            std::process::exit(2);
        }
    };

    // Create tokio runtime for subprocess execution and the per-file yield
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("batchlint-worker")
        .build()?;

    let state = StateManager::new();

    let outcome = runtime.block_on(run_batch(&files, &config.lint, &linter, &state));

    state.metrics().log_summary();

    // Shutdown the tokio runtime gracefully
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    let outcome = outcome?;
    if outcome.is_fatal() {
        std::process::exit(1);
    }

    Ok(())
}
