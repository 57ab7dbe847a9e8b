//! Data models for the batchlint runner.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`RunnerState`]: the central observable state: run progress, per-outcome
//!   file sets, and the keyed report store
//! - [`LintOptions`]: options for a single run (formatter, output file,
//!   report key, append/force flags) loaded from `batchlint.yaml`
//! - [`LinterSettings`]: subprocess linter configuration
//! - [`LogSettings`]: logging configuration
//! - [`IgnoreConfig`]: file names excluded before a run starts
//!
//! # Architecture Note
//!
//! Config structs derive `Serialize`/`Deserialize` for YAML persistence.
//! `RunnerState` is wrapped in `Arc<RwLock<>>` by
//! [`StateManager`](crate::state::StateManager); all mutations go through
//! its `update()` method so change events fire consistently.

pub mod options;
pub mod run_state;

pub use options::{IgnoreConfig, LintOptions, LinterSettings, LogSettings, RunnerConfig};
pub use run_state::{FileOutcome, RunnerState};
