// Performance metrics module
//
// Provides lightweight metrics tracking for monitoring runner performance

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Runner performance metrics
///
/// Uses atomic operations for thread-safe metric tracking without locks.
/// Counters accumulate across the process lifetime and are logged as a
/// summary at the end of a run.
#[derive(Debug)]
pub struct Metrics {
    /// Files linted with no violations
    pub files_clean: AtomicUsize,

    /// Files linted with one or more violations
    pub files_with_violations: AtomicUsize,

    /// File paths that did not reference an existing file
    pub files_missing: AtomicUsize,

    /// Total violations across all files
    pub total_violations: AtomicUsize,

    /// Total lint wall time in milliseconds
    pub total_lint_time_ms: AtomicU64,

    /// Number of state updates performed
    pub state_updates: AtomicU64,

    /// Number of state broadcasts delivered to subscribers
    pub state_broadcasts: AtomicU64,

    /// Process start time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            files_clean: AtomicUsize::new(0),
            files_with_violations: AtomicUsize::new(0),
            files_missing: AtomicUsize::new(0),
            total_violations: AtomicUsize::new(0),
            total_lint_time_ms: AtomicU64::new(0),
            state_updates: AtomicU64::new(0),
            state_broadcasts: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a file that linted clean
    pub fn record_file_clean(&self) {
        self.files_clean.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a file with violations
    pub fn record_file_with_violations(&self, violations: usize) {
        self.files_with_violations.fetch_add(1, Ordering::Relaxed);
        self.total_violations.fetch_add(violations, Ordering::Relaxed);
    }

    /// Record a missing source file
    pub fn record_file_missing(&self) {
        self.files_missing.fetch_add(1, Ordering::Relaxed);
    }

    /// Record lint wall time for a file
    pub fn record_lint_time(&self, duration: Duration) {
        self.total_lint_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a state update
    pub fn record_state_update(&self) {
        self.state_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a state broadcast
    pub fn record_state_broadcast(&self) {
        self.state_broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get average lint time per linted file in milliseconds
    pub fn avg_lint_time_ms(&self) -> f64 {
        let total = self.total_lint_time_ms.load(Ordering::Relaxed);
        let count = self.files_clean.load(Ordering::Relaxed)
            + self.files_with_violations.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let uptime = self.uptime();
        tracing::info!("=== Performance Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", uptime.as_secs_f64());
        tracing::info!(
            "Files: {} clean, {} with violations, {} missing",
            self.files_clean.load(Ordering::Relaxed),
            self.files_with_violations.load(Ordering::Relaxed),
            self.files_missing.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Violations: {} total, lint time {:.2}s (avg: {:.2}ms per file)",
            self.total_violations.load(Ordering::Relaxed),
            self.total_lint_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_lint_time_ms()
        );
        tracing::info!(
            "State updates: {}, broadcasts: {}",
            self.state_updates.load(Ordering::Relaxed),
            self.state_broadcasts.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
