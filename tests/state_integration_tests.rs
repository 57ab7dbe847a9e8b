//! Integration tests for StateManager with change events
//!
//! These tests verify that the StateManager correctly:
//! - Emits change events on mutations
//! - Supports multiple subscribers
//! - Handles concurrent access from multiple tasks
//! - Streams incremental progress from a real batch run

use anyhow::Result;
use batchlint::{
    LintOptions, LintReport, LintResult, Linter, RunEvent, StateManager, run_batch,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::time::{Duration, timeout};

/// Linter that reports one violation per file, unconditionally.
struct OneViolationLinter;

impl Linter for OneViolationLinter {
    async fn lint(
        &self,
        path: &Utf8Path,
        _contents: &str,
        _options: &LintOptions,
    ) -> Result<LintResult> {
        Ok(LintResult {
            failure_count: 1,
            output: format!("problem in {}\n", path),
        })
    }
}

async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<RunEvent>) -> RunEvent {
    timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed")
}

#[tokio::test]
async fn test_run_started_event_emitted() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    state.start_run(vec![Utf8PathBuf::from("a.ts"), Utf8PathBuf::from("b.ts")]);

    let event = next_event(&mut rx).await;
    assert!(
        matches!(event, RunEvent::RunStarted { total_files: 2 }),
        "Expected RunStarted event, got: {:?}",
        event
    );
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let state = Arc::new(StateManager::new());
    let mut rx1 = state.subscribe();
    let mut rx2 = state.subscribe();
    let mut rx3 = state.subscribe();

    state.update(|s| {
        s.is_running = true;
        s.total_files = 5;
    });

    let event1 = next_event(&mut rx1).await;
    let event2 = next_event(&mut rx2).await;
    let event3 = next_event(&mut rx3).await;

    assert_eq!(event1, event2);
    assert_eq!(event2, event3);
    assert!(matches!(event1, RunEvent::RunStarted { total_files: 5 }));
}

#[tokio::test]
async fn test_batch_run_streams_progress_events() {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let files: Vec<Utf8PathBuf> = ["a.ts", "b.ts"]
        .iter()
        .map(|name| {
            let path = root.join(name);
            fs::write(&path, "// fixture\n").unwrap();
            path
        })
        .collect();

    let state = StateManager::new();
    let mut rx = state.subscribe();
    let options = LintOptions {
        force: true,
        output_report: Some("ci".to_string()),
        ..LintOptions::default()
    };

    run_batch(&files, &options, &OneViolationLinter, &state)
        .await
        .unwrap();

    // Drain everything the run broadcast and check the milestones in order
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    let started = events
        .iter()
        .position(|e| matches!(e, RunEvent::RunStarted { total_files: 2 }));
    let first_linted = events
        .iter()
        .position(|e| matches!(e, RunEvent::FileLinted { failures: 1, .. }));
    let published = events
        .iter()
        .position(|e| matches!(e, RunEvent::ReportPublished { key } if key == "ci"));
    let finished = events
        .iter()
        .position(|e| matches!(e, RunEvent::RunFinished { failed: 2, .. }));

    assert!(started.is_some(), "no RunStarted in {:?}", events);
    assert!(first_linted.is_some(), "no FileLinted in {:?}", events);
    assert!(published.is_some(), "no ReportPublished in {:?}", events);
    assert!(finished.is_some(), "no RunFinished in {:?}", events);
    assert!(started < first_linted);
    assert!(first_linted < published);
    assert!(published < finished);
}

#[tokio::test]
async fn test_missing_file_event_from_batch_run() {
    let state = StateManager::new();
    let mut rx = state.subscribe();
    let files = vec![Utf8PathBuf::from("does/not/exist.ts")];

    run_batch(
        &files,
        &LintOptions::default(),
        &OneViolationLinter,
        &state,
    )
    .await
    .unwrap();

    let mut saw_missing = false;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, RunEvent::FileMissing { .. }) {
            saw_missing = true;
        }
    }
    assert!(saw_missing);
}

#[tokio::test]
async fn test_concurrent_readers_and_writer() {
    let state = Arc::new(StateManager::new());

    let writer = {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            for i in 0..50 {
                state.update(|s| s.progress = i);
                tokio::task::yield_now().await;
            }
        })
    };

    let reader = {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            for _ in 0..50 {
                let _ = state.read(|s| s.progress);
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();

    assert_eq!(state.read(|s| s.progress), 49);
}

#[tokio::test]
async fn test_report_store_keeps_insertion_order() {
    let state = StateManager::new();

    for key in ["first", "second", "third"] {
        state.publish_report(
            key,
            LintReport {
                failed: 0,
                files: Vec::new(),
                results: Vec::new(),
            },
        );
    }

    let keys: Vec<String> = state.read(|s| s.reports.keys().cloned().collect());
    assert_eq!(keys, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_republish_replaces_report() {
    let state = StateManager::new();

    state.publish_report(
        "ci",
        LintReport {
            failed: 1,
            files: vec![Utf8PathBuf::from("a.ts")],
            results: Vec::new(),
        },
    );
    state.publish_report(
        "ci",
        LintReport {
            failed: 7,
            files: vec![Utf8PathBuf::from("b.ts")],
            results: Vec::new(),
        },
    );

    let report = state.report("ci").unwrap();
    assert_eq!(report.failed, 7);
    assert_eq!(state.read(|s| s.reports.len()), 1);
}
