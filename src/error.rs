//! Error types
//!
//! Per-file problems (unparsable content, panicking metrics) never surface
//! here; they degrade or skip a single file. These errors cover the few
//! things that stop a run before it starts.

use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or validating `codestink.toml`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Errors from driving an analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Coordinator has already run; create a new one for another run")]
    AlreadyRun,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
