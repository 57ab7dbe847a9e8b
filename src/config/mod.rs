use crate::models::{IgnoreConfig, RunnerConfig};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Configuration manager for loading and saving YAML configuration files.
///
/// Manages two files inside the configuration directory:
/// - Runner config (`batchlint.yaml`): lint options, linter command,
///   logging settings
/// - Ignore config (`batchlint.ignore.yaml`): file names excluded from
///   runs
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    runner_config_path: Utf8PathBuf,
    ignore_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it does not exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            runner_config_path: config_dir.join("batchlint.yaml"),
            ignore_config_path: config_dir.join("batchlint.ignore.yaml"),
            config_dir,
        })
    }

    /// Load the runner configuration file.
    ///
    /// # Returns
    /// The loaded RunnerConfig, or defaults if the file doesn't exist
    pub fn load_runner_config(&self) -> Result<RunnerConfig> {
        if !self.runner_config_path.exists() {
            tracing::warn!(
                "Runner config file not found at {}, using defaults",
                self.runner_config_path
            );
            return Ok(RunnerConfig::default());
        }

        let file_contents = fs::read_to_string(&self.runner_config_path).with_context(|| {
            format!("Failed to read runner config: {}", self.runner_config_path)
        })?;

        let config: RunnerConfig = serde_yaml_ng::from_str(&file_contents).with_context(|| {
            format!("Failed to parse runner config: {}", self.runner_config_path)
        })?;

        tracing::info!("Loaded runner config from {}", self.runner_config_path);
        Ok(config)
    }

    /// Save the runner configuration file.
    pub fn save_runner_config(&self, config: &RunnerConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize runner config to YAML")?;

        fs::write(&self.runner_config_path, yaml_string).with_context(|| {
            format!("Failed to write runner config: {}", self.runner_config_path)
        })?;

        tracing::info!("Saved runner config to {}", self.runner_config_path);
        Ok(())
    }

    /// Load the ignore configuration file.
    ///
    /// # Returns
    /// The loaded IgnoreConfig, or defaults if the file doesn't exist
    pub fn load_ignore_config(&self) -> Result<IgnoreConfig> {
        if !self.ignore_config_path.exists() {
            tracing::debug!(
                "Ignore config file not found at {}, using defaults",
                self.ignore_config_path
            );
            return Ok(IgnoreConfig::default());
        }

        let file_contents = fs::read_to_string(&self.ignore_config_path).with_context(|| {
            format!("Failed to read ignore config: {}", self.ignore_config_path)
        })?;

        let config: IgnoreConfig = serde_yaml_ng::from_str(&file_contents).with_context(|| {
            format!("Failed to parse ignore config: {}", self.ignore_config_path)
        })?;

        tracing::info!("Loaded ignore config from {}", self.ignore_config_path);
        Ok(config)
    }

    /// Save the ignore configuration file.
    pub fn save_ignore_config(&self, config: &IgnoreConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize ignore config to YAML")?;

        fs::write(&self.ignore_config_path, yaml_string).with_context(|| {
            format!("Failed to write ignore config: {}", self.ignore_config_path)
        })?;

        tracing::info!("Saved ignore config to {}", self.ignore_config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

/// Read an ordered file list from a newline-delimited text file.
///
/// Blank lines and `#` comment lines are skipped. Order is preserved.
pub fn read_file_list(path: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read file list: {}", path))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Utf8PathBuf::from)
        .collect())
}
