use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Options controlling a single lint run.
///
/// Loaded from the `[lint]` section of `batchlint.yaml` and overridable
/// from the command line. Unrecognized keys in the file are ignored;
/// absent keys take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintOptions {
    /// Output rendering mode. Only `"json"` (case-insensitive) is
    /// semantically special: violation lines are parsed as JSON records.
    #[serde(default = "default_formatter")]
    pub formatter: String,

    /// When set, violation lines are written here instead of logged.
    #[serde(default)]
    pub output_file: Option<Utf8PathBuf>,

    /// When set, the run report is published under this key in shared state.
    #[serde(default)]
    pub output_report: Option<String>,

    /// Preserve existing `output_file` content before the first write of
    /// the run. Later writes within a run always append.
    #[serde(default)]
    pub append_to_output: bool,

    /// Complete without a fatal outcome even when violations were found.
    #[serde(default)]
    pub force: bool,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            formatter: default_formatter(),
            output_file: None,
            output_report: None,
            append_to_output: false,
            force: false,
        }
    }
}

impl LintOptions {
    /// Whether violation lines should be parsed as JSON records.
    pub fn json_formatter(&self) -> bool {
        self.formatter.eq_ignore_ascii_case("json")
    }
}

fn default_formatter() -> String {
    "prose".to_string()
}

/// Settings for the external subprocess linter, from `[linter]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinterSettings {
    /// Executable to run per file. The file path is appended as the final
    /// argument. Empty means not configured.
    #[serde(default)]
    pub command: String,

    /// Arguments passed before the file path.
    #[serde(default)]
    pub args: Vec<String>,

    /// Stdout lines matching this pattern count as violations; everything
    /// else is dropped.
    #[serde(default = "default_violation_pattern")]
    pub violation_pattern: String,

    /// Maximum seconds to wait for one linter invocation.
    #[serde(default = "default_lint_timeout")]
    pub timeout_secs: u32,

    /// Extra environment for the linter process, applied in order.
    #[serde(default)]
    pub env: IndexMap<String, String>,
}

impl Default for LinterSettings {
    fn default() -> Self {
        Self {
            command: String::new(),
            args: Vec::new(),
            violation_pattern: default_violation_pattern(),
            timeout_secs: default_lint_timeout(),
            env: IndexMap::new(),
        }
    }
}

fn default_violation_pattern() -> String {
    ".+".to_string()
}

fn default_lint_timeout() -> u32 {
    300
}

/// Logging settings, from `[logging]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            debug_mode: false,
            log_dir: default_log_dir(),
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

/// Complete runner configuration from `batchlint.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub lint: LintOptions,

    #[serde(default)]
    pub linter: LinterSettings,

    #[serde(default)]
    pub logging: LogSettings,
}

/// File names excluded from a run, from `batchlint.ignore.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IgnoreConfig {
    #[serde(default)]
    pub files: Vec<String>,
}

impl IgnoreConfig {
    /// Check whether a path is on the ignore list.
    ///
    /// Entries match either the full path or the bare file name,
    /// case-insensitively.
    pub fn should_ignore(&self, path: &camino::Utf8Path) -> bool {
        self.files.iter().any(|entry| {
            entry.eq_ignore_ascii_case(path.as_str())
                || path
                    .file_name()
                    .is_some_and(|name| entry.eq_ignore_ascii_case(name))
        })
    }
}
