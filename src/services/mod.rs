//! Services module - Pure business logic for batch linting.
//!
//! This module contains the core logic for driving an external lint
//! capability over an ordered file list. The services are
//! **framework-agnostic** and have no dependencies on the CLI layer,
//! making them testable and reusable.
//!
//! # Components
//!
//! - [`Linter`]: the injected lint capability, one async call per file.
//! - [`CommandLinter`]: a [`Linter`] backed by an external command.
//!   Subprocess execution with timeout, violation-line selection via a
//!   pre-compiled regex.
//! - [`run_batch`]: the batch runner, a strictly sequential asynchronous
//!   fold over the file list with accumulated pass/fail state, output-file
//!   accumulation, and force-aware outcome signaling.
//! - [`LintResult`] / [`LintReport`] / [`Violation`]: per-file lint
//!   output, the publishable run snapshot, and a single parsed violation.
//! - [`BatchOutcome`] / [`BatchStatus`]: the terminal completion signal.
//!
//! # Design Philosophy
//!
//! - **Sequential**: no two files are linted concurrently; at most one
//!   linter subprocess is alive at a time.
//! - **Async**: all operations use tokio; one scheduler yield per file
//!   keeps progress observable on large file sets.
//! - **Explicit state**: the fold threads an accumulator value; there is
//!   no hidden shared mutable state.
//! - **Testable**: the lint capability is a trait, so tests inject
//!   scripted fakes.
//!
//! # Usage Example
//!
//! ```ignore
//! use batchlint::services::{run_batch, CommandLinter};
//!
//! let linter = CommandLinter::from_settings(&config.linter)?;
//! let outcome = run_batch(&files, &config.lint, &linter, &state).await?;
//! if outcome.is_fatal() {
//!     std::process::exit(1);
//! }
//! ```

pub mod linter;
pub mod runner;

pub use linter::{CommandLinter, LintError, LintResult, Linter};
pub use runner::{BatchOutcome, BatchStatus, LintReport, Violation, run_batch};
