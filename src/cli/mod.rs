//! Command-line entry point

mod files;
mod output;

use crate::config::{self, ProjectConfig, MAX_WORKERS};
use crate::pipeline::Coordinator;
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > MAX_WORKERS {
        Err(format!("workers cannot exceed {}", MAX_WORKERS))
    } else {
        Ok(n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// codestink - how bad does this code smell?
#[derive(Parser, Debug)]
#[command(name = "codestink")]
#[command(
    version,
    about = "Score source files for complexity, length, comments, error handling, naming, duplication and structure",
    after_help = "\
Examples:
  codestink .                          Analyze current directory
  codestink src --format json          JSON output for scripting
  codestink . --exclude 'gen/**'       Skip generated code

Supported languages: Go, Rust, Python, JavaScript, TypeScript, Java, C, C++, C#, Razor"
)]
pub struct Cli {
    /// Path to analyze (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Number of parallel workers (1-64), overrides the config file
    #[arg(long, env = "CODESTINK_WORKERS", value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: Format,

    /// Config file (default: codestink.toml in PATH)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Glob patterns to exclude, in addition to the config file's
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Number of worst files listed in text output
    #[arg(long, default_value = "10")]
    pub top: usize,
}

pub fn run(cli: Cli) -> Result<()> {
    let start = Instant::now();
    if !cli.path.exists() {
        bail!("Path does not exist: {}", cli.path.display());
    }
    let root = cli.path.clone();

    let mut config = load_config(&cli)?;
    config.exclude.paths.extend(cli.exclude.iter().cloned());

    let files = files::collect_source_files(&root, &config)
        .with_context(|| format!("Failed to read source files under {}", root.display()))?;
    info!("Found {} source files in {}", files.len(), root.display());

    let show_progress = cli.format == Format::Text && !files.is_empty();
    let bar = if show_progress {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(create_bar_style());
        bar
    } else {
        ProgressBar::hidden()
    };

    let tick = bar.clone();
    let mut coordinator = Coordinator::new(config)
        .with_progress(Box::new(move |_: &Path| tick.inc(1)));
    let project = coordinator.run(files)?;
    bar.finish_and_clear();

    match cli.format {
        Format::Json => output::print_json(&project)?,
        Format::Text => output::print_text(&root, &project, coordinator.stats(), cli.top, start.elapsed()),
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ProjectConfig> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let dir = if cli.path.is_dir() {
                cli.path.clone()
            } else {
                cli.path.parent().map(|p| p.to_path_buf()).unwrap_or_default()
            };
            config::load_project_config(&dir).context("Failed to load project config")?
        }
    };
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    Ok(config)
}

/// Create bar progress style
fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}
