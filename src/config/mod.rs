//! Configuration module for codestink
//!
//! This module handles:
//! - Project-level configuration (codestink.toml)
//! - Worker count bounds
//! - Duplication thresholds and disabled metrics

mod project_config;

pub use project_config::{
    load_config_file, load_project_config, normalize_metric_name, DuplicationConfig,
    ExcludeConfig, MetricsConfig, ProjectConfig, CONFIG_FILE_NAME, DEFAULT_WORKERS, MAX_WORKERS,
};
pub(crate) use project_config::glob_match;
