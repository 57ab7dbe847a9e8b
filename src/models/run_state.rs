use crate::services::runner::LintReport;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Terminal disposition of a single file within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Linted, no violations.
    Clean,
    /// Linted, one or more violations.
    Violations,
    /// Path did not reference an existing file; skipped with a warning.
    Missing,
}

/// Single source of truth for observable runner state.
///
/// Holds progress tracking for the current run, per-outcome file sets,
/// and the keyed report store that outlives individual runs.
///
/// # Thread Safety
///
/// `RunnerState` is wrapped in `Arc<RwLock<RunnerState>>` by
/// [`crate::state::StateManager`]. Never mutate it directly; go through
/// [`StateManager`](crate::state::StateManager) so change events fire.
#[derive(Clone, Debug, Default)]
pub struct RunnerState {
    // Runtime state
    pub is_running: bool,
    pub current_file: Option<Utf8PathBuf>,

    // Progress state
    pub progress: usize,
    pub total_files: usize,
    pub files_to_lint: Vec<Utf8PathBuf>,

    // Per-outcome results
    pub clean_files: HashSet<Utf8PathBuf>,
    pub violation_files: HashSet<Utf8PathBuf>,
    pub missing_files: HashSet<Utf8PathBuf>,

    // Aggregate violation count across all linted files
    pub total_failed: usize,

    // Published reports, keyed by caller-supplied identifier.
    // Survives reset_run_state: reports outlive the run that built them.
    pub reports: IndexMap<String, LintReport>,
}

impl RunnerState {
    /// Get current run statistics.
    ///
    /// Returns a tuple of (clean, violations, missing, total).
    pub fn run_stats(&self) -> (usize, usize, usize, usize) {
        (
            self.clean_files.len(),
            self.violation_files.len(),
            self.missing_files.len(),
            self.total_files,
        )
    }

    /// Record the outcome of one file and advance progress.
    pub fn add_file_outcome(&mut self, file: Utf8PathBuf, outcome: FileOutcome, failures: usize) {
        match outcome {
            FileOutcome::Clean => {
                self.clean_files.insert(file);
            }
            FileOutcome::Violations => {
                self.total_failed += failures;
                self.violation_files.insert(file);
            }
            FileOutcome::Missing => {
                self.missing_files.insert(file);
            }
        }
        self.progress += 1;
    }

    /// Reset all run-scoped state to initial values.
    ///
    /// Published reports are retained.
    pub fn reset_run_state(&mut self) {
        self.is_running = false;
        self.current_file = None;
        self.progress = 0;
        self.total_files = 0;
        self.files_to_lint.clear();
        self.clean_files.clear();
        self.violation_files.clear();
        self.missing_files.clear();
        self.total_failed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = RunnerState::default();
        assert!(!state.is_running);
        assert_eq!(state.progress, 0);
        assert_eq!(state.total_failed, 0);
        assert!(state.reports.is_empty());
    }

    #[test]
    fn test_add_file_outcome() {
        let mut state = RunnerState::default();
        state.total_files = 3;

        state.add_file_outcome("a.ts".into(), FileOutcome::Clean, 0);
        state.add_file_outcome("b.ts".into(), FileOutcome::Violations, 2);
        state.add_file_outcome("c.ts".into(), FileOutcome::Missing, 0);

        let (clean, violations, missing, total) = state.run_stats();
        assert_eq!(clean, 1);
        assert_eq!(violations, 1);
        assert_eq!(missing, 1);
        assert_eq!(total, 3);
        assert_eq!(state.total_failed, 2);
        assert_eq!(state.progress, 3);
    }

    #[test]
    fn test_missing_files_do_not_count_failures() {
        let mut state = RunnerState::default();
        state.add_file_outcome("gone.ts".into(), FileOutcome::Missing, 0);
        assert_eq!(state.total_failed, 0);
    }

    #[test]
    fn test_reset_keeps_reports() {
        let mut state = RunnerState::default();
        state.is_running = true;
        state.progress = 2;
        state.total_files = 2;
        state.clean_files.insert("a.ts".into());
        state.total_failed = 4;
        state.reports.insert(
            "ci".to_string(),
            LintReport {
                failed: 4,
                files: vec!["a.ts".into()],
                results: Vec::new(),
            },
        );

        state.reset_run_state();

        assert!(!state.is_running);
        assert_eq!(state.progress, 0);
        assert_eq!(state.total_failed, 0);
        assert!(state.clean_files.is_empty());
        assert_eq!(state.reports.len(), 1);
    }
}
