//! Cyclomatic complexity
//!
//! Scores the file on the mean complexity of its functions and flags each
//! function above the high/very-high thresholds.

use super::{lerp, Metric};
use crate::models::{clamp_unit, MetricKind, MetricResult, ParseResult};

const HIGH: u32 = 10;
const VERY_HIGH: u32 = 15;

pub struct CyclomaticMetric;

impl Metric for CyclomaticMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::Cyclomatic
    }

    fn description(&self) -> &'static str {
        "Average number of independent paths through each function"
    }

    fn weight(&self) -> f64 {
        0.25
    }

    fn analyze(&self, parsed: &ParseResult) -> MetricResult {
        if parsed.functions.is_empty() {
            return MetricResult::new(0.0, self.weight(), self.description());
        }

        let issues = parsed
            .functions
            .iter()
            .filter_map(|f| {
                let level = if f.complexity > VERY_HIGH {
                    "very high"
                } else if f.complexity > HIGH {
                    "high"
                } else {
                    return None;
                };
                Some(format!(
                    "function '{}' (line {}) has {} cyclomatic complexity {}",
                    f.name, f.start_line, level, f.complexity
                ))
            })
            .collect();

        MetricResult::new(
            complexity_score(parsed.average_complexity()),
            self.weight(),
            self.description(),
        )
        .with_issues(issues)
    }
}

/// Piecewise-linear: ≤5 clean, 0.5 at 10, 0.8 at 20, 1.0 at 30.
pub fn complexity_score(average: f64) -> f64 {
    let score = if average <= 5.0 {
        0.0
    } else if average <= 10.0 {
        lerp(average, 5.0, 10.0, 0.0, 0.5)
    } else if average <= 20.0 {
        lerp(average, 10.0, 20.0, 0.5, 0.8)
    } else {
        lerp(average, 20.0, 30.0, 0.8, 1.0)
    };
    clamp_unit(score)
}
