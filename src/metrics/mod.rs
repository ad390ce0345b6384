//! Metric engine
//!
//! Seven independent analyzers, each turning one [`ParseResult`] into a
//! [`MetricResult`] with a score in [0, 1] (0 = clean). A metric that does
//! not apply to a file is left out of that file's weighted sum entirely.
//!
//! # Example Implementation
//!
//! ```ignore
//! pub struct MyMetric;
//!
//! impl Metric for MyMetric {
//!     fn kind(&self) -> MetricKind {
//!         MetricKind::Naming
//!     }
//!
//!     fn description(&self) -> &'static str {
//!         "Checks something about names"
//!     }
//!
//!     fn weight(&self) -> f64 {
//!         0.10
//!     }
//!
//!     fn analyze(&self, parsed: &ParseResult) -> MetricResult {
//!         MetricResult::new(0.0, self.weight(), self.description())
//!     }
//! }
//! ```

mod comment_ratio;
mod cyclomatic;
mod duplication;
mod error_handling;
mod function_length;
mod naming;
mod structure;
pub mod tree;

pub use comment_ratio::CommentRatioMetric;
pub use cyclomatic::CyclomaticMetric;
pub use duplication::DuplicationMetric;
pub use error_handling::ErrorHandlingMetric;
pub use function_length::FunctionLengthMetric;
pub use naming::NamingMetric;
pub use structure::StructureMetric;

use crate::config::ProjectConfig;
use crate::models::{MetricKind, MetricResult, ParseResult};
use crate::parsers::Language;
use std::collections::BTreeMap;

/// Trait for all file metrics
pub trait Metric: Send + Sync {
    fn kind(&self) -> MetricKind;

    /// Stable snake_case name, used for config lookup and issue prefixes
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Human-readable description of what this metric measures
    fn description(&self) -> &'static str;

    /// Share of the composite score. Fixed per metric, never per file.
    fn weight(&self) -> f64;

    /// Languages this metric understands. Empty means all of them.
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    /// Whether the metric needs an exact syntax tree
    fn requires_tree(&self) -> bool {
        false
    }

    /// Score one file. Only called when [`Metric::applies_to`] holds.
    fn analyze(&self, parsed: &ParseResult) -> MetricResult;

    fn applies_to(&self, parsed: &ParseResult) -> bool {
        let supported = self.supported_languages();
        (supported.is_empty() || supported.contains(&parsed.language))
            && (!self.requires_tree() || parsed.has_tree())
    }
}

/// All seven metrics in registry order, with default thresholds.
pub fn default_metrics() -> Vec<Box<dyn Metric>> {
    registry(&ProjectConfig::default())
}

/// Metrics enabled by `config`, in registry order.
pub fn registry(config: &ProjectConfig) -> Vec<Box<dyn Metric>> {
    let all: Vec<Box<dyn Metric>> = vec![
        Box::new(CyclomaticMetric),
        Box::new(FunctionLengthMetric),
        Box::new(CommentRatioMetric),
        Box::new(ErrorHandlingMetric),
        Box::new(NamingMetric),
        Box::new(DuplicationMetric::new(
            config.duplication.min_tokens,
            config.duplication.min_functions,
        )),
        Box::new(StructureMetric),
    ];
    all.into_iter()
        .filter(|m| config.is_metric_enabled(m.kind()))
        .collect()
}

/// Run every applicable metric over one parse result.
pub fn analyze_all(
    metrics: &[Box<dyn Metric>],
    parsed: &ParseResult,
) -> BTreeMap<MetricKind, MetricResult> {
    metrics
        .iter()
        .filter(|m| m.applies_to(parsed))
        .map(|m| (m.kind(), m.analyze(parsed)))
        .collect()
}

/// Linear interpolation of `value` from `[lo, hi]` onto `[from, to]`.
pub(crate) fn lerp(value: f64, lo: f64, hi: f64, from: f64, to: f64) -> f64 {
    if hi <= lo {
        return to;
    }
    from + (value - lo) / (hi - lo) * (to - from)
}

/// First band whose upper bound admits `value`, else `otherwise`.
pub(crate) fn step(value: f64, bands: &[(f64, f64)], otherwise: f64) -> f64 {
    bands
        .iter()
        .find(|(limit, _)| value <= *limit)
        .map(|(_, score)| *score)
        .unwrap_or(otherwise)
}

/// Share of `part` in `whole`, 0 when `whole` is 0.
pub(crate) fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
