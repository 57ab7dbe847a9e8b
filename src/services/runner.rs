use crate::models::LintOptions;
use crate::services::linter::{LintError, LintResult, Linter};
use crate::state::StateManager;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fs;
use std::time::Instant;

/// One reported violation.
///
/// A parsed JSON record under the `"json"` formatter, a raw line under
/// every other formatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Violation {
    Json(serde_json::Value),
    Text(String),
}

/// Snapshot published into shared state when a report key is supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintReport {
    /// Sum of failure counts across all linted files.
    pub failed: usize,

    /// The full input file list, in processing order, missing files included.
    pub files: Vec<Utf8PathBuf>,

    /// All violations, in file order and line order within a file.
    pub results: Vec<Violation>,
}

/// Terminal status of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// No violations anywhere.
    Clean,
    /// Violations found, downgraded to non-fatal by the force option.
    Forced,
    /// Violations found; the run counts as a failure.
    Failed,
}

/// Outcome of a completed batch run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub status: BatchStatus,
    pub failed: usize,
    pub files: usize,
}

impl BatchOutcome {
    /// Whether the caller should treat the run as a fatal failure.
    pub fn is_fatal(&self) -> bool {
        self.status == BatchStatus::Failed
    }
}

/// Accumulator threaded through the fold, one instance per run.
#[derive(Debug)]
struct RunState {
    failed: usize,
    results: Vec<Violation>,
    success: bool,
    append_to_output: bool,
}

impl RunState {
    fn new(append_to_output: bool) -> Self {
        Self {
            failed: 0,
            results: Vec::new(),
            success: true,
            append_to_output,
        }
    }
}

/// Run the injected linter over `files` in order and aggregate the results.
///
/// This is a strictly sequential asynchronous fold: one file is linted at
/// a time, followed by a single scheduler yield so state subscribers see
/// progress between files. A missing file is warned about and skipped; a
/// read error, a linter error, or a malformed JSON violation line aborts
/// the run immediately and no report is published.
///
/// When `options.output_file` is set, violation lines accumulate there:
/// the file is truncated before the first write of the run (unless
/// `options.append_to_output` preserves its prior content) and appended to
/// for every later file. Without an output file, each violation line is
/// logged at error level as it is found.
///
/// The report is published under `options.output_report` (when supplied)
/// on both the clean and the violations path.
pub async fn run_batch<L: Linter>(
    files: &[Utf8PathBuf],
    options: &LintOptions,
    linter: &L,
    state: &StateManager,
) -> Result<BatchOutcome> {
    let json_lines = options.json_formatter();
    let mut run = RunState::new(options.append_to_output);

    state.start_run(files.to_vec());

    for path in files {
        if !path.exists() {
            tracing::warn!("Source file \"{}\" not found.", path);
            state.record_file_missing(path.clone());
        } else {
            state.update_progress(path.clone());

            let started = Instant::now();
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read source file: {}", path))?;
            let result = linter
                .lint(path, &contents, options)
                .await
                .with_context(|| format!("Linter failed on {}", path))?;

            if result.failure_count > 0 {
                lint_failures(path, &result, options, json_lines, &mut run)?;
            }

            state.record_file_linted(path.clone(), result.failure_count, started.elapsed());
        }

        // One yield per file: lets progress subscribers and log flushing
        // interleave with large file sets. Strictly sequential otherwise.
        tokio::task::yield_now().await;
    }

    let report = LintReport {
        failed: run.failed,
        files: files.to_vec(),
        results: run.results,
    };

    let outcome = if run.success {
        tracing::info!(
            "{} {} lint free.",
            files.len(),
            pluralize(files.len(), "file", "files")
        );
        BatchOutcome {
            status: BatchStatus::Clean,
            failed: 0,
            files: files.len(),
        }
    } else {
        tracing::error!(
            "{} {} in {} {}",
            run.failed,
            pluralize(run.failed, "error", "errors"),
            files.len(),
            pluralize(files.len(), "file", "files")
        );
        BatchOutcome {
            status: if options.force {
                BatchStatus::Forced
            } else {
                BatchStatus::Failed
            },
            failed: run.failed,
            files: files.len(),
        }
    };

    if let Some(key) = options.output_report.as_deref() {
        state.publish_report(key, report);
    }
    state.finish_run();

    Ok(outcome)
}

/// Fold one file's violations into the run accumulator.
///
/// Splits the lint output on newlines, parses each non-empty line (JSON
/// under the json formatter, raw otherwise), and either buffers the lines
/// into the output file or logs them at error level.
fn lint_failures(
    path: &Utf8Path,
    result: &LintResult,
    options: &LintOptions,
    json_lines: bool,
    run: &mut RunState,
) -> Result<()> {
    run.failed += result.failure_count;

    let mut buffer = String::new();
    if let Some(output_file) = options.output_file.as_deref() {
        if output_file.exists() {
            if run.append_to_output {
                buffer = fs::read_to_string(output_file)
                    .with_context(|| format!("Failed to read output file: {}", output_file))?;
            } else {
                fs::remove_file(output_file)
                    .with_context(|| format!("Failed to truncate output file: {}", output_file))?;
            }
        }
    }

    for line in result.output.split('\n') {
        if line.is_empty() {
            continue;
        }

        let violation = if json_lines {
            let value = serde_json::from_str(line).map_err(|source| LintError::MalformedJson {
                file: path.to_path_buf(),
                source,
            })?;
            Violation::Json(value)
        } else {
            Violation::Text(line.to_string())
        };
        run.results.push(violation);

        if options.output_file.is_some() {
            buffer.push_str(line);
            buffer.push('\n');
        } else {
            tracing::error!("{}", line);
        }
    }

    if let Some(output_file) = options.output_file.as_deref() {
        fs::write(output_file, &buffer)
            .with_context(|| format!("Failed to write output file: {}", output_file))?;
        run.append_to_output = true;
    }

    run.success = false;
    Ok(())
}

fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}
