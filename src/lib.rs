//! codestink - multi-language code badness analysis
//!
//! Files go through classify → parse → seven metrics → weighted
//! aggregation, on a bounded worker pool. The core never walks
//! directories or renders reports; it takes [`SourceFile`]s and returns a
//! [`ProjectAnalysis`].
//!
//! ```no_run
//! use codestink::{analyze_files, config::ProjectConfig, models::SourceFile};
//!
//! let files = vec![SourceFile::new("main.go", "package main\n\nfunc main() {}\n")];
//! let project = analyze_files(files, &ProjectConfig::default())?;
//! println!("{:.2}", project.overall_score);
//! # Ok::<(), codestink::error::AnalysisError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod scoring;

pub use error::{AnalysisError, AnalysisResult};
pub use models::{FileAnalysis, ProjectAnalysis, SourceFile};
pub use parsers::{classify, Language};
pub use pipeline::{analyze_file, Coordinator, CoordinatorState, RunStats};

use config::ProjectConfig;

/// One-shot analysis of `files` with a fresh [`Coordinator`].
pub fn analyze_files(
    files: Vec<SourceFile>,
    config: &ProjectConfig,
) -> AnalysisResult<ProjectAnalysis> {
    config.validate()?;
    Coordinator::new(config.clone()).run(files)
}
