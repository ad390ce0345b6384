//! Core data models for codestink
//!
//! Parsers produce a [`ParseResult`] per file, metrics turn it into
//! [`MetricResult`]s, and the aggregator folds those into
//! [`FileAnalysis`] and [`ProjectAnalysis`] values.

use crate::parsers::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tree_sitter::{Node, Tree};

/// Byte span of a function node inside its file's syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeSpan {
    pub start_byte: usize,
    pub end_byte: usize,
}

/// One unit of analyzable code: a function, method, closure, or a
/// synthesized template hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    pub name: String,
    /// 1-based, inclusive
    pub start_line: usize,
    /// 1-based, inclusive, never before `start_line`
    pub end_line: usize,
    pub parameter_count: usize,
    /// Cyclomatic complexity, at least 1
    pub complexity: u32,
    /// Span of the native node when an exact parser produced this record
    pub node: Option<NodeSpan>,
}

impl FunctionRecord {
    pub fn new(
        name: impl Into<String>,
        start_line: usize,
        end_line: usize,
        parameter_count: usize,
        complexity: u32,
    ) -> Self {
        let start_line = start_line.max(1);
        Self {
            name: name.into(),
            start_line,
            end_line: end_line.max(start_line),
            parameter_count,
            complexity: complexity.max(1),
            node: None,
        }
    }

    pub fn with_node(mut self, span: NodeSpan) -> Self {
        self.node = Some(span);
        self
    }

    /// Line span, `end_line - start_line + 1`
    pub fn length(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// A tree-sitter tree together with the text it was built from.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    tree: Tree,
    source: String,
    language: Language,
    /// File name without extension, used to spot self-imports
    stem: String,
}

impl SyntaxTree {
    pub fn new(tree: Tree, source: String, language: Language) -> Self {
        Self {
            tree,
            source,
            language,
            stem: String::new(),
        }
    }

    pub fn with_stem(mut self, stem: impl Into<String>) -> Self {
        self.stem = stem.into();
        self
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Text covered by `node`, empty if the span is not valid UTF-8.
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Resolve a function span back to its node.
    pub fn node_at(&self, span: NodeSpan) -> Option<Node<'_>> {
        let mut node = self
            .root()
            .descendant_for_byte_range(span.start_byte, span.end_byte)?;
        // descendant_for_byte_range can land on a wrapper that shares the span
        while let Some(parent) = node.parent() {
            if parent.start_byte() == span.start_byte && parent.end_byte() == span.end_byte {
                if crate::parsers::grammar::for_language(self.language)
                    .is_some_and(|g| g.is_function(parent.kind()))
                {
                    node = parent;
                    continue;
                }
            }
            break;
        }
        Some(node)
    }
}

/// Everything a parser recovered from one file.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub total_lines: usize,
    pub comment_lines: usize,
    pub language: Language,
    /// Source order
    pub functions: Vec<FunctionRecord>,
    pub tree: Option<SyntaxTree>,
}

impl ParseResult {
    pub fn new(language: Language, total_lines: usize, comment_lines: usize) -> Self {
        Self {
            total_lines,
            comment_lines: comment_lines.min(total_lines),
            language,
            functions: Vec::new(),
            tree: None,
        }
    }

    pub fn empty(language: Language) -> Self {
        Self::new(language, 0, 0)
    }

    pub fn with_functions(mut self, mut functions: Vec<FunctionRecord>) -> Self {
        functions.sort_by_key(|f| (f.start_line, f.end_line));
        self.functions = functions;
        self
    }

    pub fn with_tree(mut self, tree: SyntaxTree) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    pub fn average_complexity(&self) -> f64 {
        if self.functions.is_empty() {
            return 0.0;
        }
        let total: u64 = self.functions.iter().map(|f| u64::from(f.complexity)).sum();
        total as f64 / self.functions.len() as f64
    }
}

/// The seven metrics, in registry order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Cyclomatic,
    FunctionLength,
    CommentRatio,
    ErrorHandling,
    Naming,
    Duplication,
    Structure,
}

impl MetricKind {
    pub const ALL: [MetricKind; 7] = [
        MetricKind::Cyclomatic,
        MetricKind::FunctionLength,
        MetricKind::CommentRatio,
        MetricKind::ErrorHandling,
        MetricKind::Naming,
        MetricKind::Duplication,
        MetricKind::Structure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Cyclomatic => "cyclomatic",
            MetricKind::FunctionLength => "function_length",
            MetricKind::CommentRatio => "comment_ratio",
            MetricKind::ErrorHandling => "error_handling",
            MetricKind::Naming => "naming",
            MetricKind::Duplication => "duplication",
            MetricKind::Structure => "structure",
        }
    }

    pub fn from_name(name: &str) -> Option<MetricKind> {
        MetricKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one metric on one file (or the project-level mean).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// 0 = best, 1 = worst
    pub score: f64,
    pub weight: f64,
    #[serde(default)]
    pub issues: Vec<String>,
    pub description: String,
}

impl MetricResult {
    pub fn new(score: f64, weight: f64, description: &str) -> Self {
        Self {
            score: clamp_unit(score),
            weight,
            issues: Vec::new(),
            description: description.to_string(),
        }
    }

    pub fn with_issues(mut self, issues: Vec<String>) -> Self {
        self.issues = issues;
        self
    }
}

/// Clamp to [0, 1], mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Per-file verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub file_path: PathBuf,
    pub language: String,
    pub total_lines: usize,
    pub comment_lines: usize,
    pub function_count: usize,
    pub file_score: f64,
    pub metrics: BTreeMap<MetricKind, MetricResult>,
    pub issues: Vec<String>,
}

/// Top-level result of a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub total_files: usize,
    pub total_lines: usize,
    pub overall_score: f64,
    pub metrics: BTreeMap<MetricKind, MetricResult>,
    /// Input order
    pub files: Vec<FileAnalysis>,
}

impl ProjectAnalysis {
    /// Files sorted worst first, ties broken by path.
    pub fn ranked(&self) -> Vec<&FileAnalysis> {
        let mut files: Vec<&FileAnalysis> = self.files.iter().collect();
        files.sort_by(|a, b| {
            b.file_score
                .total_cmp(&a.file_score)
                .then_with(|| a.file_path.cmp(&b.file_path))
        });
        files
    }
}

/// A file handed to the core by whoever walked the tree.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: Vec<u8>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}
