//! Project-level configuration support
//!
//! Loads per-project configuration from `codestink.toml` in the analysed
//! root, or from an explicit path.
//!
//! # Configuration Format
//!
//! ```toml
//! # codestink.toml
//! workers = 8
//!
//! [duplication]
//! min_tokens = 4      # shortest fingerprint that can be a duplicate
//! min_functions = 3   # below this a file gets a fixed low score
//!
//! [metrics]
//! disabled = ["naming"]
//!
//! [exclude]
//! paths = ["generated/", "**/vendor/**"]
//! ```

use crate::error::ConfigError;
use crate::models::MetricKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "codestink.toml";
pub const DEFAULT_WORKERS: usize = 8;
pub const MAX_WORKERS: usize = 64;

/// Project-level configuration loaded from codestink.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Upper bound on concurrent workers
    pub workers: usize,

    pub duplication: DuplicationConfig,

    pub metrics: MetricsConfig,

    /// Path exclusion patterns
    pub exclude: ExcludeConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            duplication: DuplicationConfig::default(),
            metrics: MetricsConfig::default(),
            exclude: ExcludeConfig::default(),
        }
    }
}

/// Duplicate detection thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DuplicationConfig {
    pub min_tokens: usize,
    pub min_functions: usize,
}

impl Default for DuplicationConfig {
    fn default() -> Self {
        Self {
            min_tokens: 4,
            min_functions: 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Metric names to leave out of every file's weighted sum
    pub disabled: Vec<String>,
}

/// Path exclusion configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcludeConfig {
    /// Paths/patterns to exclude from analysis
    pub paths: Vec<String>,
}

impl ProjectConfig {
    /// Reject values that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_WORKERS).contains(&self.workers) {
            return Err(ConfigError::Invalid {
                field: "workers",
                message: format!("{} is not in 1..={}", self.workers, MAX_WORKERS),
            });
        }
        if self.duplication.min_tokens == 0 {
            return Err(ConfigError::Invalid {
                field: "duplication.min_tokens",
                message: "must be at least 1".to_string(),
            });
        }
        for name in &self.metrics.disabled {
            if MetricKind::from_name(&normalize_metric_name(name)).is_none() {
                return Err(ConfigError::Invalid {
                    field: "metrics.disabled",
                    message: format!("unknown metric '{}'", name),
                });
            }
        }
        Ok(())
    }

    /// Check if a metric is enabled (defaults to true)
    pub fn is_metric_enabled(&self, kind: MetricKind) -> bool {
        !self
            .metrics
            .disabled
            .iter()
            .any(|name| MetricKind::from_name(&normalize_metric_name(name)) == Some(kind))
    }

    /// Check if a path (relative to the analysed root) should be excluded
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.exclude
            .paths
            .iter()
            .any(|pattern| glob_match(pattern, &path_str))
    }
}

/// Load `codestink.toml` from `root`, or defaults if there is none.
pub fn load_project_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    let toml_path = root.join(CONFIG_FILE_NAME);
    if !toml_path.is_file() {
        debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, root.display());
        return Ok(ProjectConfig::default());
    }
    load_config_file(&toml_path)
}

/// Load and validate a specific config file.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ProjectConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    debug!("Loaded project config from {}", path.display());
    Ok(config)
}

/// Normalize a metric name for lookup
/// `Function-Length`, `function length` and `function_length` all match.
pub fn normalize_metric_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Minimal glob matching: `**/dir/**`, `prefix/**/suffix`, `*` within a
/// pattern, and plain directory prefixes.
pub(crate) fn glob_match(pattern: &str, path: &str) -> bool {
    if pattern.starts_with("**/") && pattern.ends_with("/**") {
        let middle = pattern.trim_start_matches("**/").trim_end_matches("/**");
        return path.contains(&format!("/{}/", middle)) || path.starts_with(&format!("{}/", middle));
    }

    if let Some((prefix, suffix)) = pattern.split_once("**") {
        let prefix = prefix.trim_end_matches('/');
        let suffix = suffix.trim_start_matches('/');
        return (prefix.is_empty() || path.starts_with(prefix))
            && (suffix.is_empty() || tail_match(suffix, path));
    }

    if let Some((prefix, suffix)) = pattern.split_once('*') {
        if !suffix.contains('*') {
            // a bare `*.ext` may match at any depth
            let name = if prefix.is_empty() {
                path.rsplit('/').next().unwrap_or(path)
            } else {
                path
            };
            return name.starts_with(prefix) && name.ends_with(suffix);
        }
    }

    path.starts_with(pattern) || path == pattern
}

/// The part of a `**` pattern after the double star, which may itself hold
/// one `*` (`**/*.min.js`).
fn tail_match(suffix: &str, path: &str) -> bool {
    match suffix.split_once('*') {
        None => path.ends_with(suffix),
        Some((before, after)) if !after.contains('*') => {
            if before.contains('/') {
                path.contains(before) && path.ends_with(after)
            } else {
                let name = path.rsplit('/').next().unwrap_or(path);
                name.len() >= before.len() + after.len()
                    && name.starts_with(before)
                    && name.ends_with(after)
            }
        }
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests;
