use crate::models::{LintOptions, LinterSettings};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use regex::Regex;
use std::future::Future;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// Result of linting a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintResult {
    /// Number of violations found. Zero means the file is clean.
    pub failure_count: usize,

    /// Newline-delimited violation records, one per line. Plain text, or
    /// one JSON object per line under the `"json"` formatter.
    pub output: String,
}

/// Errors raised by lint capabilities and violation parsing.
#[derive(Error, Debug)]
pub enum LintError {
    #[error("linter command is not configured")]
    CommandNotConfigured,

    #[error("linter timed out after {0:?}")]
    Timeout(Duration),

    #[error("linter process error: {0}")]
    Process(#[from] std::io::Error),

    #[error("invalid violation pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("malformed json violation line from {file}")]
    MalformedJson {
        file: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The injected lint capability.
///
/// One call per existing file, in file order. Implementations may be slow
/// or blocking; the runner awaits each call before moving to the next
/// file. An `Err` aborts the whole run.
pub trait Linter: Send + Sync {
    fn lint(
        &self,
        path: &Utf8Path,
        contents: &str,
        options: &LintOptions,
    ) -> impl Future<Output = Result<LintResult>> + Send;
}

/// Lint capability backed by an external command, one invocation per file.
///
/// The configured command is spawned with the file path appended as the
/// final argument. Stdout lines matching the violation pattern become the
/// violation records; everything else is dropped. The pattern is compiled
/// once at construction.
///
/// Execution is bounded by the configured timeout. The runner serializes
/// invocations, so at most one linter process is alive at a time.
pub struct CommandLinter {
    command: String,
    args: Vec<String>,
    env: IndexMap<String, String>,

    /// Pre-compiled pattern selecting violation lines from stdout.
    violation_pattern: Regex,

    timeout: Duration,
}

impl CommandLinter {
    /// Build a CommandLinter from `[linter]` settings.
    ///
    /// # Errors
    ///
    /// Fails when no command is configured or the violation pattern does
    /// not compile.
    pub fn from_settings(settings: &LinterSettings) -> Result<Self, LintError> {
        if settings.command.trim().is_empty() {
            return Err(LintError::CommandNotConfigured);
        }

        Ok(Self {
            command: settings.command.clone(),
            args: settings.args.clone(),
            env: settings.env.clone(),
            violation_pattern: Regex::new(&settings.violation_pattern)?,
            timeout: Duration::from_secs(u64::from(settings.timeout_secs)),
        })
    }

    /// Collect violation lines from raw linter stdout.
    fn select_violations(&self, stdout: &str) -> LintResult {
        let mut output = String::new();
        let mut failure_count = 0;

        for line in stdout.lines() {
            if !line.is_empty() && self.violation_pattern.is_match(line) {
                failure_count += 1;
                output.push_str(line);
                output.push('\n');
            }
        }

        LintResult {
            failure_count,
            output,
        }
    }
}

impl Linter for CommandLinter {
    async fn lint(
        &self,
        path: &Utf8Path,
        _contents: &str,
        _options: &LintOptions,
    ) -> Result<LintResult> {
        let start = Instant::now();

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg(path.as_str())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn linter '{}'", self.command))?;

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                tracing::warn!("Linter timed out on {} after {:?}", path, self.timeout);
                LintError::Timeout(self.timeout)
            })?
            .with_context(|| format!("Failed to wait for linter '{}'", self.command))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = self.select_violations(&stdout);

        tracing::debug!(
            "Linted {} in {:.2}s: {} violation(s)",
            path,
            start.elapsed().as_secs_f32(),
            result.failure_count
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinterSettings;

    fn settings_with_command(command: &str) -> LinterSettings {
        LinterSettings {
            command: command.to_string(),
            ..LinterSettings::default()
        }
    }

    #[test]
    fn test_unconfigured_command_rejected() {
        let result = CommandLinter::from_settings(&LinterSettings::default());
        assert!(matches!(result, Err(LintError::CommandNotConfigured)));

        let result = CommandLinter::from_settings(&settings_with_command("   "));
        assert!(matches!(result, Err(LintError::CommandNotConfigured)));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut settings = settings_with_command("true");
        settings.violation_pattern = "[unclosed".to_string();

        let result = CommandLinter::from_settings(&settings);
        assert!(matches!(result, Err(LintError::InvalidPattern(_))));
    }

    #[test]
    fn test_select_violations_filters_by_pattern() {
        let mut settings = settings_with_command("true");
        settings.violation_pattern = r"^ERROR:".to_string();
        let linter = CommandLinter::from_settings(&settings).unwrap();

        let result =
            linter.select_violations("ERROR: bad indent\ninfo: fine\n\nERROR: unused var\n");

        assert_eq!(result.failure_count, 2);
        assert_eq!(result.output, "ERROR: bad indent\nERROR: unused var\n");
    }

    #[test]
    fn test_select_violations_default_pattern_counts_every_line() {
        let linter = CommandLinter::from_settings(&settings_with_command("true")).unwrap();

        let result = linter.select_violations("line1\nline2\n");

        assert_eq!(result.failure_count, 2);
        assert_eq!(result.output, "line1\nline2\n");
    }

    #[test]
    fn test_clean_stdout_yields_no_failures() {
        let linter = CommandLinter::from_settings(&settings_with_command("true")).unwrap();

        let result = linter.select_violations("");

        assert_eq!(result.failure_count, 0);
        assert!(result.output.is_empty());
    }
}
