//! Weighted aggregation
//!
//! ```text
//! file_score    = Σ(score × weight) / Σ(weight)   over applicable metrics
//! project_score = mean(file_score)                 over analyzed files
//! ```
//!
//! Every file counts equally toward the project verdict regardless of its
//! size. Metrics that do not apply to a file are left out of both sums, so
//! they neither help nor hurt it.

use crate::models::{clamp_unit, FileAnalysis, MetricKind, MetricResult, ParseResult, ProjectAnalysis};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Combine one file's metric results into its verdict.
pub fn aggregate_file(
    path: impl Into<PathBuf>,
    parsed: &ParseResult,
    metrics: BTreeMap<MetricKind, MetricResult>,
) -> FileAnalysis {
    let total_weight: f64 = metrics.values().map(|m| m.weight).sum();
    let file_score = if metrics.is_empty() || total_weight <= 0.0 {
        0.0
    } else {
        let weighted: f64 = metrics.values().map(|m| m.score * m.weight).sum();
        clamp_unit(weighted / total_weight)
    };

    // BTreeMap order is registry order
    let issues = metrics
        .iter()
        .flat_map(|(kind, result)| {
            result
                .issues
                .iter()
                .map(move |issue| format!("[{}] {}", kind.as_str(), issue))
        })
        .collect();

    FileAnalysis {
        file_path: path.into(),
        language: parsed.language.to_string(),
        total_lines: parsed.total_lines,
        comment_lines: parsed.comment_lines,
        function_count: parsed.functions.len(),
        file_score,
        metrics,
        issues,
    }
}

/// Combine file verdicts, kept in the order given.
pub fn aggregate_project(files: Vec<FileAnalysis>) -> ProjectAnalysis {
    if files.is_empty() {
        return ProjectAnalysis::default();
    }

    let overall_score =
        clamp_unit(files.iter().map(|f| f.file_score).sum::<f64>() / files.len() as f64);

    let mut sums: BTreeMap<MetricKind, (f64, f64, usize)> = BTreeMap::new();
    for file in &files {
        for (kind, result) in &file.metrics {
            let entry = sums.entry(*kind).or_insert((0.0, result.weight, 0));
            entry.0 += result.score;
            entry.2 += 1;
        }
    }
    let metrics = sums
        .into_iter()
        .map(|(kind, (sum, weight, count))| {
            let description = files
                .iter()
                .find_map(|f| f.metrics.get(&kind))
                .map(|m| m.description.as_str())
                .unwrap_or_default();
            (
                kind,
                MetricResult::new(sum / count as f64, weight, description),
            )
        })
        .collect();

    ProjectAnalysis {
        total_files: files.len(),
        total_lines: files.iter().map(|f| f.total_lines).sum(),
        overall_score,
        metrics,
        files,
    }
}

/// Rescale a [0, 1] score to the 0-100 badness shown to users.
pub fn badness_100(score: f64) -> f64 {
    (clamp_unit(score) * 1000.0).round() / 10.0
}

/// Presentation bucket for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Clean,
    Fair,
    Smelly,
    Rotten,
    Toxic,
}

impl Level {
    pub fn from_score(score: f64) -> Self {
        let badness = badness_100(score);
        if badness < 20.0 {
            Level::Clean
        } else if badness < 40.0 {
            Level::Fair
        } else if badness < 60.0 {
            Level::Smelly
        } else if badness < 80.0 {
            Level::Rotten
        } else {
            Level::Toxic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Clean => "clean",
            Level::Fair => "fair",
            Level::Smelly => "smelly",
            Level::Rotten => "rotten",
            Level::Toxic => "toxic",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
