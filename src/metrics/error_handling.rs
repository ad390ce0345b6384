//! Error handling
//!
//! Go: call sites that can fail (a known error-returning API, or any call
//! whose results are bound to `err` or `_`) are checked for a discarded
//! error, either bound to `_` in the last position or the call used as a
//! bare statement. Exception languages: every handler clause is a site, and
//! an empty handler (nothing but `pass` or comments) swallows the error.

use super::tree::{tree_and_grammar, visit};
use super::{ratio, step, Metric};
use crate::models::{MetricKind, MetricResult, ParseResult, SyntaxTree};
use crate::parsers::grammar::Grammar;
use crate::parsers::Language;
use tree_sitter::Node;

/// Go APIs whose error result should never be dropped.
const ERROR_PRONE_CALLS: &[&str] = &[
    "os.Create",
    "os.Open",
    "os.OpenFile",
    "os.Remove",
    "os.RemoveAll",
    "os.Rename",
    "os.Mkdir",
    "os.MkdirAll",
    "os.ReadFile",
    "os.WriteFile",
    "io.Copy",
    "io.ReadAll",
    "io.WriteString",
    "ioutil.ReadFile",
    "ioutil.WriteFile",
    "ioutil.ReadAll",
    "json.Marshal",
    "json.Unmarshal",
    "json.MarshalIndent",
    "http.Get",
    "http.Post",
    "http.Do",
    "http.NewRequest",
    "sql.Open",
    "strconv.Atoi",
    "strconv.ParseInt",
    "strconv.ParseFloat",
    "strconv.ParseBool",
    "template.ParseFiles",
];

const SUPPORTED: &[Language] = &[
    Language::Go,
    Language::Python,
    Language::JavaScript,
    Language::TypeScript,
    Language::Java,
    Language::CSharp,
    Language::Cpp,
];

pub struct ErrorHandlingMetric;

/// One place where an error can surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub line: usize,
    /// Callee text for Go calls, `None` for exception handlers
    pub callee: Option<String>,
    pub discarded: bool,
}

impl Metric for ErrorHandlingMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::ErrorHandling
    }

    fn description(&self) -> &'static str {
        "Errors and exceptions that are silently discarded"
    }

    fn weight(&self) -> f64 {
        0.15
    }

    fn supported_languages(&self) -> &'static [Language] {
        SUPPORTED
    }

    fn requires_tree(&self) -> bool {
        true
    }

    fn analyze(&self, parsed: &ParseResult) -> MetricResult {
        let Some((tree, grammar)) = tree_and_grammar(parsed) else {
            return MetricResult::new(0.0, self.weight(), self.description());
        };
        let sites = if tree.language() == Language::Go {
            go_sites(tree)
        } else {
            handler_sites(tree, grammar)
        };

        let issues: Vec<String> = sites
            .iter()
            .filter(|s| s.discarded)
            .map(|s| match &s.callee {
                Some(callee) => format!("error from '{}' ignored at line {}", callee, s.line),
                None => format!("exception swallowed by empty handler at line {}", s.line),
            })
            .collect();

        let discard_ratio = ratio(issues.len(), sites.len());
        MetricResult::new(discard_score(discard_ratio), self.weight(), self.description())
            .with_issues(issues)
    }
}

pub fn discard_score(discard_ratio: f64) -> f64 {
    step(
        discard_ratio,
        &[
            (0.0, 0.0),
            (0.05, 0.1),
            (0.1, 0.2),
            (0.2, 0.35),
            (0.3, 0.5),
            (0.4, 0.65),
            (0.6, 0.75),
            (0.8, 0.85),
        ],
        0.95,
    )
}

pub fn go_sites(tree: &SyntaxTree) -> Vec<Site> {
    let mut sites = Vec::new();
    visit(tree.root(), |node| {
        if node.kind() != "call_expression" {
            return true;
        }
        let callee = node
            .child_by_field_name("function")
            .map(|f| tree.text(f))
            .unwrap_or("");
        let binding = bound_names(node, tree);
        let error_prone = ERROR_PRONE_CALLS.contains(&callee);
        let assigned_error = binding
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| *n == "err" || *n == "_"));
        if !error_prone && !assigned_error {
            return true;
        }

        let discarded = match &binding {
            Some(names) => names.last().is_some_and(|n| *n == "_"),
            None => node.parent().is_some_and(|p| p.kind() == "expression_statement"),
        };
        sites.push(Site {
            line: node.start_position().row + 1,
            callee: Some(callee.to_string()),
            discarded,
        });
        true
    });
    sites
}

/// Names on the left of the assignment whose right side is `call`.
fn bound_names<'t>(call: Node<'_>, tree: &'t SyntaxTree) -> Option<Vec<&'t str>> {
    let mut parent = call.parent()?;
    if parent.kind() == "expression_list" {
        parent = parent.parent()?;
    }
    let names: Vec<Node<'_>> = match parent.kind() {
        "assignment_statement" | "short_var_declaration" => {
            let left = parent.child_by_field_name("left")?;
            if call.start_byte() < left.end_byte() {
                return None;
            }
            left.named_children(&mut left.walk()).collect()
        }
        "var_spec" => parent
            .children_by_field_name("name", &mut parent.walk())
            .collect(),
        _ => return None,
    };
    Some(names.into_iter().map(|n| tree.text(n)).collect())
}

pub fn handler_sites(tree: &SyntaxTree, grammar: &Grammar) -> Vec<Site> {
    let mut sites = Vec::new();
    visit(tree.root(), |node| {
        if grammar.is_catch(node.kind()) {
            sites.push(Site {
                line: node.start_position().row + 1,
                callee: None,
                discarded: handler_body(node, grammar).is_some_and(|b| is_empty_body(b, grammar)),
            });
        }
        true
    });
    sites
}

fn handler_body<'t>(handler: Node<'t>, grammar: &Grammar) -> Option<Node<'t>> {
    handler.child_by_field_name("body").or_else(|| {
        handler
            .named_children(&mut handler.walk())
            .filter(|c| grammar.is_block(c.kind()))
            .last()
    })
}

fn is_empty_body(body: Node<'_>, grammar: &Grammar) -> bool {
    body.named_children(&mut body.walk()).all(|c| {
        let kind = c.kind();
        grammar.is_comment(kind) || kind == "pass_statement" || kind == "empty_statement"
    })
}
