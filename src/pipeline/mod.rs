//! Bounded-parallel analysis of a static file list
//!
//! ```text
//!   files ──► job channel (bounded) ──► N workers ──► result channel ──► collector
//!                                       parse → metrics → file verdict
//! ```
//!
//! N is `min(workers, file_count)`. Workers share nothing mutable; every
//! result carries its input index and the collector restores input order
//! with a stable sort, so completion order never reaches the output. A
//! file whose analysis panics is logged and skipped without disturbing its
//! siblings, and is left out of the project averages.

use crate::config::{ProjectConfig, MAX_WORKERS};
use crate::error::{AnalysisError, AnalysisResult};
use crate::metrics::{self, Metric};
use crate::models::{FileAnalysis, ProjectAnalysis, SourceFile};
use crate::parsers;
use crate::scoring;
use crossbeam_channel::{bounded, unbounded};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Lifecycle of a coordinator. There is no way back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Dispatching,
    Draining,
    Done,
}

/// Counters from a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub files: usize,
    pub analyzed: usize,
    /// Panicked or cancelled files
    pub skipped: usize,
    pub workers: usize,
}

/// Called from worker threads once per finished file.
pub type ProgressFn = Box<dyn Fn(&Path) + Send + Sync>;

pub struct Coordinator {
    config: ProjectConfig,
    metrics: Vec<Box<dyn Metric>>,
    state: CoordinatorState,
    cancel: Option<Arc<AtomicBool>>,
    on_file: Option<ProgressFn>,
    stats: RunStats,
}

impl Coordinator {
    pub fn new(config: ProjectConfig) -> Self {
        let metrics = metrics::registry(&config);
        Self {
            config,
            metrics,
            state: CoordinatorState::Idle,
            cancel: None,
            on_file: None,
            stats: RunStats::default(),
        }
    }

    /// Replace the metric set built from the config.
    pub fn with_metrics(mut self, metrics: Vec<Box<dyn Metric>>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Stop picking up new files once `flag` is set. Files already being
    /// analyzed finish; the rest are counted as skipped.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_progress(mut self, on_file: ProgressFn) -> Self {
        self.on_file = Some(on_file);
        self
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Analyze `files` to completion. A coordinator runs once.
    pub fn run(&mut self, files: Vec<SourceFile>) -> AnalysisResult<ProjectAnalysis> {
        if self.state != CoordinatorState::Idle {
            return Err(AnalysisError::AlreadyRun);
        }

        let total = files.len();
        let workers = self.config.workers.clamp(1, MAX_WORKERS).min(total);
        self.stats = RunStats {
            files: total,
            workers,
            ..RunStats::default()
        };
        if total == 0 {
            self.state = CoordinatorState::Done;
            return Ok(ProjectAnalysis::default());
        }

        info!("Analyzing {} files with {} workers", total, workers);
        self.state = CoordinatorState::Dispatching;

        let (job_tx, job_rx) = bounded::<(usize, SourceFile)>(workers * 2);
        let (result_tx, result_rx) = unbounded::<(usize, Option<FileAnalysis>)>();
        let metrics = self.metrics.as_slice();
        let cancel = self.cancel.as_deref();
        let on_file = self.on_file.as_deref();
        let mut collected: Vec<(usize, Option<FileAnalysis>)> = Vec::with_capacity(total);

        thread::scope(|scope| {
            for _ in 0..workers {
                let rx = job_rx.clone();
                let tx = result_tx.clone();
                scope.spawn(move || {
                    for (index, file) in rx {
                        let outcome = if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                            debug!("{}: cancelled before analysis", file.path.display());
                            None
                        } else {
                            analyze_guarded(&file, metrics)
                        };
                        if let Some(on_file) = on_file {
                            on_file(&file.path);
                        }
                        if tx.send((index, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            // Workers hold the only receivers and senders from here on
            drop(job_rx);
            drop(result_tx);

            for job in files.into_iter().enumerate() {
                if job_tx.send(job).is_err() {
                    break;
                }
            }
            drop(job_tx);

            self.state = CoordinatorState::Draining;
            collected.extend(result_rx.iter());
        });

        collected.sort_by_key(|(index, _)| *index);
        let analyses: Vec<FileAnalysis> = collected
            .into_iter()
            .filter_map(|(_, analysis)| analysis)
            .collect();

        self.stats.analyzed = analyses.len();
        self.stats.skipped = total - analyses.len();
        if self.stats.skipped > 0 {
            warn!("Skipped {} of {} files", self.stats.skipped, total);
        }
        self.state = CoordinatorState::Done;
        Ok(scoring::aggregate_project(analyses))
    }
}

/// Run the per-file pipeline, turning a panic into a skip.
fn analyze_guarded(file: &SourceFile, metrics: &[Box<dyn Metric>]) -> Option<FileAnalysis> {
    match panic::catch_unwind(AssertUnwindSafe(|| analyze_file(file, metrics))) {
        Ok(analysis) => Some(analysis),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!("{}: analysis failed, skipping: {}", file.path.display(), reason);
            None
        }
    }
}

/// Classify, parse and score one file.
pub fn analyze_file(file: &SourceFile, metrics: &[Box<dyn Metric>]) -> FileAnalysis {
    let parsed = parsers::parse(&file.path, &file.content);
    debug!(
        "{}: {} as {}, {} functions",
        file.path.display(),
        if parsed.has_tree() { "parsed" } else { "scanned" },
        parsed.language,
        parsed.functions.len()
    );
    let results = metrics::analyze_all(metrics, &parsed);
    scoring::aggregate_file(file.path.clone(), &parsed, results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricKind, MetricResult, ParseResult};
    use crate::parsers::Language;

    struct ExplodingMetric;

    impl Metric for ExplodingMetric {
        fn kind(&self) -> MetricKind {
            MetricKind::Naming
        }

        fn description(&self) -> &'static str {
            "panics on files it cannot classify"
        }

        fn weight(&self) -> f64 {
            0.10
        }

        fn analyze(&self, parsed: &ParseResult) -> MetricResult {
            if parsed.language == Language::Generic {
                panic!("boom");
            }
            MetricResult::new(0.5, self.weight(), self.description())
        }
    }

    fn sample_files(n: usize) -> Vec<SourceFile> {
        (0..n)
            .map(|i| {
                SourceFile::new(
                    format!("src/file{i:02}.py"),
                    format!("def f{i}(x):\n    if x > {i}:\n        return x\n    return {i}\n"),
                )
            })
            .collect()
    }

    #[test]
    fn test_state_transitions_and_single_shot() {
        let mut coordinator = Coordinator::new(ProjectConfig::default());
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
        let project = coordinator.run(sample_files(3)).expect("first run");
        assert_eq!(coordinator.state(), CoordinatorState::Done);
        assert_eq!(project.total_files, 3);

        let err = coordinator.run(sample_files(1)).unwrap_err();
        assert!(matches!(err, AnalysisError::AlreadyRun));
    }

    #[test]
    fn test_empty_list() {
        let mut coordinator = Coordinator::new(ProjectConfig::default());
        let project = coordinator.run(Vec::new()).expect("run");
        assert_eq!(project, ProjectAnalysis::default());
        assert_eq!(coordinator.stats().workers, 0);
        assert_eq!(coordinator.state(), CoordinatorState::Done);
    }

    #[test]
    fn test_worker_count_is_bounded_by_files() {
        let config = ProjectConfig {
            workers: 16,
            ..ProjectConfig::default()
        };
        let mut coordinator = Coordinator::new(config);
        coordinator.run(sample_files(3)).expect("run");
        assert_eq!(coordinator.stats().workers, 3);
    }

    #[test]
    fn test_results_keep_input_order() {
        let files = sample_files(40);
        let expected: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        let mut coordinator = Coordinator::new(ProjectConfig::default());
        let project = coordinator.run(files).expect("run");
        let paths: Vec<_> = project.files.iter().map(|f| f.file_path.clone()).collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_panicking_file_is_skipped() {
        let mut files = sample_files(4);
        files.insert(2, SourceFile::new("boom.txt", "plain text\n"));
        let mut coordinator =
            Coordinator::new(ProjectConfig::default()).with_metrics(vec![Box::new(ExplodingMetric)]);
        let project = coordinator.run(files).expect("run");

        assert_eq!(project.total_files, 4);
        assert!(project.files.iter().all(|f| f.file_path.to_str() != Some("boom.txt")));
        assert!((project.overall_score - 0.5).abs() < 1e-12);
        assert_eq!(coordinator.stats().skipped, 1);
        assert_eq!(coordinator.stats().analyzed, 4);
    }

    #[test]
    fn test_cancelled_run_skips_remaining_files() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut coordinator =
            Coordinator::new(ProjectConfig::default()).with_cancel(Arc::clone(&flag));
        let project = coordinator.run(sample_files(5)).expect("run");
        assert_eq!(project.total_files, 0);
        assert_eq!(coordinator.stats().skipped, 5);
    }

    #[test]
    fn test_progress_sees_every_file() {
        use std::sync::atomic::AtomicUsize;
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let mut coordinator = Coordinator::new(ProjectConfig::default()).with_progress(Box::new(
            move |_: &Path| {
                counter.fetch_add(1, Ordering::Relaxed);
            },
        ));
        coordinator.run(sample_files(7)).expect("run");
        assert_eq!(seen.load(Ordering::Relaxed), 7);
    }
}
