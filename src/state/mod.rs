// State management module
//
// Wraps RunnerState with thread-safe access using Arc<RwLock<T>> and emits
// change events so downstream consumers can observe run progress.

use crate::metrics::Metrics;
use crate::models::{FileOutcome, RunnerState};
use crate::services::runner::LintReport;
use camino::Utf8PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;

/// Change events emitted when runner state is modified.
///
/// Subscribers (a CLI progress display, a CI reporter, tests) receive
/// these without polling; the runner yields once per file so events flush
/// incrementally on large file sets.
#[derive(Clone, Debug, PartialEq)]
pub enum RunEvent {
    /// A batch run has started
    RunStarted { total_files: usize },

    /// Progress has been updated during a run
    ProgressUpdated {
        current: usize,
        total: usize,
        current_file: Option<Utf8PathBuf>,
    },

    /// A file has been linted
    FileLinted { file: Utf8PathBuf, failures: usize },

    /// A file path did not reference an existing file
    FileMissing { file: Utf8PathBuf },

    /// A batch run has finished
    RunFinished {
        clean: usize,
        violations: usize,
        missing: usize,
        failed: usize,
    },

    /// A report has been published into the keyed store
    ReportPublished { key: String },

    /// Run-scoped state has been reset
    StateReset,
}

/// Thread-safe state manager with event emission.
///
/// The central state component:
/// - Provides thread-safe access to [`RunnerState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`RunEvent`]s over a broadcast channel
/// - Owns the keyed report store and the "publish only when a key was
///   supplied" seam used by the batch runner
/// - Records [`Metrics`] counters on every update and broadcast
pub struct StateManager {
    /// Runner state protected by RwLock for thread-safe access
    state: Arc<RwLock<RunnerState>>,

    /// Broadcast channel for emitting change events
    state_tx: broadcast::Sender<RunEvent>,

    /// Lock-free performance counters
    metrics: Arc<Metrics>,
}

impl StateManager {
    /// Create a new StateManager with default state.
    ///
    /// The broadcast channel buffers 100 events.
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(RunnerState::default())),
            state_tx,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Get a read-only snapshot of the current state.
    pub fn snapshot(&self) -> RunnerState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&RunnerState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events.
    ///
    /// Captures the old state, applies the update function, detects what
    /// changed, and broadcasts the resulting events.
    ///
    /// # Returns
    /// The [`RunEvent`]s that were emitted.
    pub fn update<F>(&self, update_fn: F) -> Vec<RunEvent>
    where
        F: FnOnce(&mut RunnerState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);
        self.metrics.record_state_update();

        let changes = self.detect_changes(&old_state, &state);
        for change in &changes {
            self.send(change.clone());
        }

        changes
    }

    /// Subscribe to change events.
    ///
    /// Multiple subscribers can listen simultaneously.
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.state_tx.subscribe()
    }

    /// Access the metrics counters.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Broadcast one event. Send errors mean no one is listening; that is
    /// fine and not counted.
    fn send(&self, event: RunEvent) {
        if self.state_tx.send(event).is_ok() {
            self.metrics.record_state_broadcast();
        }
    }

    /// Detect what changed between two states and generate events.
    fn detect_changes(&self, old: &RunnerState, new: &RunnerState) -> Vec<RunEvent> {
        let mut changes = Vec::new();

        if old.is_running != new.is_running {
            if new.is_running {
                changes.push(RunEvent::RunStarted {
                    total_files: new.total_files,
                });
            } else {
                changes.push(RunEvent::RunFinished {
                    clean: new.clean_files.len(),
                    violations: new.violation_files.len(),
                    missing: new.missing_files.len(),
                    failed: new.total_failed,
                });
            }
        }

        if old.progress != new.progress
            || old.total_files != new.total_files
            || old.current_file != new.current_file
        {
            changes.push(RunEvent::ProgressUpdated {
                current: new.progress,
                total: new.total_files,
                current_file: new.current_file.clone(),
            });
        }

        changes
    }

    // Convenience methods for the batch runner

    /// Start a batch run over the given files.
    pub fn start_run(&self, files: Vec<Utf8PathBuf>) -> Vec<RunEvent> {
        self.update(|state| {
            state.reset_run_state();
            state.is_running = true;
            state.total_files = files.len();
            state.files_to_lint = files;
        })
    }

    /// Mark the run as finished.
    pub fn finish_run(&self) -> Vec<RunEvent> {
        self.update(|state| {
            state.is_running = false;
            state.current_file = None;
        })
    }

    /// Set the file currently being linted.
    pub fn update_progress(&self, file: Utf8PathBuf) -> Vec<RunEvent> {
        self.update(|state| {
            state.current_file = Some(file);
        })
    }

    /// Record the result of linting one file.
    pub fn record_file_linted(
        &self,
        file: Utf8PathBuf,
        failures: usize,
        duration: Duration,
    ) -> Vec<RunEvent> {
        let outcome = if failures > 0 {
            FileOutcome::Violations
        } else {
            FileOutcome::Clean
        };

        let mut changes = self.update(|state| {
            state.add_file_outcome(file.clone(), outcome, failures);
        });

        if failures > 0 {
            self.metrics.record_file_with_violations(failures);
        } else {
            self.metrics.record_file_clean();
        }
        self.metrics.record_lint_time(duration);

        let event = RunEvent::FileLinted { file, failures };
        self.send(event.clone());
        changes.push(event);
        changes
    }

    /// Record a file path that did not reference an existing file.
    pub fn record_file_missing(&self, file: Utf8PathBuf) -> Vec<RunEvent> {
        let mut changes = self.update(|state| {
            state.add_file_outcome(file.clone(), FileOutcome::Missing, 0);
        });

        self.metrics.record_file_missing();

        let event = RunEvent::FileMissing { file };
        self.send(event.clone());
        changes.push(event);
        changes
    }

    /// Publish a report under a caller-supplied key.
    ///
    /// Reports outlive the run that built them; a later run publishing
    /// under the same key replaces the earlier report.
    pub fn publish_report(&self, key: &str, report: LintReport) -> Vec<RunEvent> {
        if let Ok(json) = serde_json::to_string(&report) {
            tracing::debug!("Publishing report '{}': {}", key, json);
        }

        let mut changes = self.update(|state| {
            state.reports.insert(key.to_string(), report);
        });

        let event = RunEvent::ReportPublished {
            key: key.to_string(),
        };
        self.send(event.clone());
        changes.push(event);
        changes
    }

    /// Fetch a published report by key.
    pub fn report(&self, key: &str) -> Option<LintReport> {
        self.read(|state| state.reports.get(key).cloned())
    }

    /// Reset all run-scoped state, keeping published reports.
    pub fn reset_run_state(&self) -> Vec<RunEvent> {
        let mut changes = self.update(|state| {
            state.reset_run_state();
        });

        let event = RunEvent::StateReset;
        self.send(event.clone());
        changes.push(event);
        changes
    }

    /// Get an Arc reference to the state for use in worker threads.
    pub fn state_arc(&self) -> Arc<RwLock<RunnerState>> {
        Arc::clone(&self.state)
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Cloneable for sharing across tasks; clones share the same state
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::runner::LintReport;

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(!state.is_running);
        assert_eq!(state.progress, 0);
        assert!(state.reports.is_empty());
    }

    #[test]
    fn test_update_with_change_detection() {
        let manager = StateManager::new();

        let changes = manager.update(|state| {
            state.is_running = true;
            state.total_files = 10;
        });

        assert_eq!(changes.len(), 2);
        assert!(matches!(
            changes[0],
            RunEvent::RunStarted { total_files: 10 }
        ));
        assert!(matches!(changes[1], RunEvent::ProgressUpdated { .. }));
    }

    #[test]
    fn test_start_run() {
        let manager = StateManager::new();
        let files = vec![Utf8PathBuf::from("a.ts"), Utf8PathBuf::from("b.ts")];

        let changes = manager.start_run(files.clone());

        assert!(matches!(changes[0], RunEvent::RunStarted { total_files: 2 }));

        let state = manager.snapshot();
        assert!(state.is_running);
        assert_eq!(state.total_files, 2);
        assert_eq!(state.files_to_lint, files);
    }

    #[test]
    fn test_finish_run_reports_counts() {
        let manager = StateManager::new();
        manager.start_run(vec![Utf8PathBuf::from("a.ts"), Utf8PathBuf::from("b.ts")]);
        manager.record_file_linted(Utf8PathBuf::from("a.ts"), 0, Duration::ZERO);
        manager.record_file_linted(Utf8PathBuf::from("b.ts"), 3, Duration::ZERO);

        let changes = manager.finish_run();

        assert!(changes.iter().any(|c| matches!(
            c,
            RunEvent::RunFinished {
                clean: 1,
                violations: 1,
                missing: 0,
                failed: 3,
            }
        )));
    }

    #[test]
    fn test_record_file_linted_emits_event() {
        let manager = StateManager::new();
        manager.start_run(vec![Utf8PathBuf::from("a.ts")]);

        let changes = manager.record_file_linted(Utf8PathBuf::from("a.ts"), 2, Duration::ZERO);

        assert!(
            changes
                .iter()
                .any(|c| matches!(c, RunEvent::FileLinted { failures: 2, .. }))
        );

        let state = manager.snapshot();
        assert_eq!(state.violation_files.len(), 1);
        assert_eq!(state.total_failed, 2);
        assert_eq!(state.progress, 1);
    }

    #[test]
    fn test_record_file_missing() {
        let manager = StateManager::new();
        manager.start_run(vec![Utf8PathBuf::from("gone.ts")]);

        let changes = manager.record_file_missing(Utf8PathBuf::from("gone.ts"));

        assert!(
            changes
                .iter()
                .any(|c| matches!(c, RunEvent::FileMissing { .. }))
        );
        assert_eq!(manager.read(|s| s.missing_files.len()), 1);
        assert_eq!(manager.read(|s| s.total_failed), 0);
    }

    #[test]
    fn test_publish_and_fetch_report() {
        let manager = StateManager::new();
        let report = LintReport {
            failed: 2,
            files: vec![Utf8PathBuf::from("a.ts")],
            results: Vec::new(),
        };

        let changes = manager.publish_report("ci", report.clone());

        assert!(changes.iter().any(|c| matches!(
            c,
            RunEvent::ReportPublished { key } if key == "ci"
        )));
        assert_eq!(manager.report("ci"), Some(report));
        assert_eq!(manager.report("nightly"), None);
    }

    #[test]
    fn test_reports_survive_reset() {
        let manager = StateManager::new();
        manager.publish_report(
            "ci",
            LintReport {
                failed: 0,
                files: Vec::new(),
                results: Vec::new(),
            },
        );

        let changes = manager.reset_run_state();

        assert!(changes.iter().any(|c| matches!(c, RunEvent::StateReset)));
        assert!(manager.report("ci").is_some());
    }

    #[test]
    fn test_subscribe_to_changes() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.update(|state| {
            state.is_running = true;
        });

        let event = rx.try_recv();
        assert!(event.is_ok());
        assert!(matches!(event.unwrap(), RunEvent::RunStarted { .. }));
    }

    #[test]
    fn test_multiple_subscribers() {
        let manager = StateManager::new();
        let mut rx1 = manager.subscribe();
        let mut rx2 = manager.subscribe();

        manager.start_run(vec![Utf8PathBuf::from("a.ts")]);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_clone_shares_state() {
        let manager1 = StateManager::new();
        let manager2 = manager1.clone();

        manager1.update(|state| {
            state.progress = 10;
        });

        assert_eq!(manager2.read(|s| s.progress), 10);
    }
}
