// batchlint - Batch lint runner
//
// This is the library crate containing the core runner logic and data
// structures. The binary crate (main.rs) provides the CLI entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{IgnoreConfig, LintOptions, LinterSettings, RunnerConfig, RunnerState};
pub use services::{
    BatchOutcome, BatchStatus, CommandLinter, LintError, LintReport, LintResult, Linter, Violation,
    run_batch,
};
pub use state::{RunEvent, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
