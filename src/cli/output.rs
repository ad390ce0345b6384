//! Text and JSON rendering of a finished run

use crate::models::{MetricKind, ProjectAnalysis};
use crate::pipeline::RunStats;
use crate::scoring::{badness_100, Level};
use anyhow::{Context, Result};
use console::{style, StyledObject};
use std::path::Path;
use std::time::Duration;

pub(super) fn print_json(project: &ProjectAnalysis) -> Result<()> {
    let json = serde_json::to_string_pretty(project).context("Failed to serialize results")?;
    println!("{}", json);
    Ok(())
}

fn styled_level(level: Level) -> StyledObject<&'static str> {
    let text = style(level.as_str()).bold();
    match level {
        Level::Clean => text.green(),
        Level::Fair => text.cyan(),
        Level::Smelly => text.yellow(),
        Level::Rotten => text.red(),
        Level::Toxic => text.red().reverse(),
    }
}

pub(super) fn print_text(
    root: &Path,
    project: &ProjectAnalysis,
    stats: &RunStats,
    top: usize,
    elapsed: Duration,
) {
    let level = Level::from_score(project.overall_score);
    println!(
        "\n{} {}",
        style("Analyzed:").bold(),
        style(root.display()).cyan()
    );
    println!(
        "  {} files, {} lines, {} workers, {:.2}s",
        style(project.total_files).cyan(),
        style(project.total_lines).cyan(),
        stats.workers,
        elapsed.as_secs_f64()
    );
    if stats.skipped > 0 {
        println!("  {} {} files skipped", style("⚠").yellow(), stats.skipped);
    }
    println!(
        "\n{} {:.1}/100 ({})",
        style("Badness:").bold(),
        badness_100(project.overall_score),
        styled_level(level)
    );

    if !project.metrics.is_empty() {
        println!("\n{}", style("Metrics").bold().underlined());
        for kind in MetricKind::ALL {
            if let Some(metric) = project.metrics.get(&kind) {
                println!(
                    "  {:<16} {:>5.1}  (weight {:.2})",
                    kind.as_str(),
                    badness_100(metric.score),
                    metric.weight
                );
            }
        }
    }

    let ranked = project.ranked();
    if ranked.is_empty() || top == 0 {
        return;
    }
    println!("\n{}", style("Worst files").bold().underlined());
    for file in ranked.into_iter().take(top) {
        let shown = file.file_path.strip_prefix(root).unwrap_or(&file.file_path);
        println!(
            "  {:>5.1}  {:<7} {}",
            badness_100(file.file_score),
            styled_level(Level::from_score(file.file_score)),
            shown.display()
        );
        for issue in file.issues.iter().take(3) {
            println!("         {}", style(issue).dim());
        }
        if file.issues.len() > 3 {
            println!(
                "         {}",
                style(format!("... and {} more", file.issues.len() - 3)).dim()
            );
        }
    }
}
