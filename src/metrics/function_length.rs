//! Function length and state management
//!
//! Long functions are bucketed into tiers and blended with the mean
//! complexity. For Go, Rust, C and C++ with an exact tree the blend also
//! takes a state penalty: the share of file-scope mutable variables and
//! pointer/reference parameters in the file's variable population.

use super::tree::{at_file_scope, field_children, has_child_kind, tree_and_grammar, visit};
use super::{ratio, step, Metric};
use crate::models::{clamp_unit, FunctionRecord, MetricKind, MetricResult, ParseResult, SyntaxTree};
use crate::parsers::grammar::Grammar;
use crate::parsers::Language;
use tree_sitter::Node;

const MODERATE: usize = 20;
const LONG: usize = 30;
const VERY_LONG: usize = 50;
const EXTREME: usize = 100;

const MANY_PARAMS: usize = 5;
const TOO_MANY_PARAMS: usize = 7;

const MAX_GLOBAL_MUTABLES: usize = 5;

pub struct FunctionLengthMetric;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Moderate,
    Long,
    VeryLong,
    Extreme,
}

impl Tier {
    fn of(length: usize) -> Option<Tier> {
        if length > EXTREME {
            Some(Tier::Extreme)
        } else if length > VERY_LONG {
            Some(Tier::VeryLong)
        } else if length > LONG {
            Some(Tier::Long)
        } else if length > MODERATE {
            Some(Tier::Moderate)
        } else {
            None
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tier::Moderate => "moderately long",
            Tier::Long => "long",
            Tier::VeryLong => "very long",
            Tier::Extreme => "extremely long",
        }
    }
}

impl Metric for FunctionLengthMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::FunctionLength
    }

    fn description(&self) -> &'static str {
        "Function length, parameter lists and mutable state"
    }

    fn weight(&self) -> f64 {
        0.15
    }

    fn analyze(&self, parsed: &ParseResult) -> MetricResult {
        let functions = &parsed.functions;
        if functions.is_empty() {
            return MetricResult::new(0.0, self.weight(), self.description());
        }

        let mut issues = Vec::new();
        let mut tiers = [0usize; 4];
        for f in functions {
            if let Some(tier) = Tier::of(f.length()) {
                tiers[tier as usize] += 1;
                issues.push(format!(
                    "function '{}' (lines {}-{}) is {}: {} lines",
                    f.name,
                    f.start_line,
                    f.end_line,
                    tier.label(),
                    f.length()
                ));
            }
            issues.extend(signature_issues(f));
        }

        let total = functions.len();
        let length_score = clamp_unit(
            0.1 * ratio(tiers[Tier::Moderate as usize], total)
                + 0.3 * ratio(tiers[Tier::Long as usize], total)
                + 0.5 * ratio(tiers[Tier::VeryLong as usize], total)
                + 0.8 * ratio(tiers[Tier::Extreme as usize], total),
        );
        let complexity_score = average_complexity_score(parsed.average_complexity());

        let state = tree_and_grammar(parsed).and_then(|(tree, grammar)| state_counts(tree, grammar));
        let score = match state {
            Some(state) => {
                if state.global_mutables > MAX_GLOBAL_MUTABLES {
                    issues.push(format!(
                        "{} mutable variables at file scope make state hard to track",
                        state.global_mutables
                    ));
                }
                0.5 * length_score + 0.2 * complexity_score + 0.3 * state.penalty()
            }
            None => 0.7 * length_score + 0.3 * complexity_score,
        };

        MetricResult::new(score, self.weight(), self.description()).with_issues(issues)
    }
}

fn signature_issues(f: &FunctionRecord) -> Vec<String> {
    let mut issues = Vec::new();
    if f.complexity > 15 {
        issues.push(format!(
            "function '{}' (line {}) is very complex: complexity {}",
            f.name, f.start_line, f.complexity
        ));
    } else if f.complexity > 10 {
        issues.push(format!(
            "function '{}' (line {}) is complex: complexity {}",
            f.name, f.start_line, f.complexity
        ));
    }
    if f.parameter_count > TOO_MANY_PARAMS {
        issues.push(format!(
            "function '{}' (line {}) has too many parameters: {}",
            f.name, f.start_line, f.parameter_count
        ));
    } else if f.parameter_count > MANY_PARAMS {
        issues.push(format!(
            "function '{}' (line {}) has many parameters: {}",
            f.name, f.start_line, f.parameter_count
        ));
    }
    issues
}

fn average_complexity_score(average: f64) -> f64 {
    step(
        average,
        &[(3.0, 0.0), (5.0, 0.2), (7.0, 0.4), (10.0, 0.6), (15.0, 0.8)],
        1.0,
    )
}

/// Variable population of one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub global_mutables: usize,
    pub mutable_params: usize,
    pub total_vars: usize,
}

impl StateCounts {
    pub fn penalty(&self) -> f64 {
        clamp_unit(
            0.6 * ratio(self.global_mutables, self.total_vars)
                + 0.4 * ratio(self.mutable_params, self.total_vars),
        )
    }
}

/// Count variables for languages with a state model; `None` elsewhere.
pub fn state_counts(tree: &SyntaxTree, grammar: &Grammar) -> Option<StateCounts> {
    let count: fn(Node<'_>, &SyntaxTree, &Grammar, &mut StateCounts) = match tree.language() {
        Language::Go => go_state,
        Language::Rust => rust_state,
        Language::C | Language::Cpp => c_state,
        _ => return None,
    };
    let mut counts = StateCounts::default();
    visit(tree.root(), |node| {
        count(node, tree, grammar, &mut counts);
        true
    });
    Some(counts)
}

fn go_state(node: Node<'_>, tree: &SyntaxTree, grammar: &Grammar, counts: &mut StateCounts) {
    match node.kind() {
        "var_spec" | "const_spec" => {
            let names = field_children(node, "name")
                .into_iter()
                .filter(|n| tree.text(*n) != "_")
                .count();
            counts.total_vars += names;
            if node.kind() == "var_spec" && at_file_scope(node, grammar) {
                counts.global_mutables += names;
            }
        }
        "short_var_declaration" => {
            if let Some(left) = node.child_by_field_name("left") {
                counts.total_vars += left
                    .named_children(&mut left.walk())
                    .filter(|n| tree.text(*n) != "_")
                    .count();
            }
        }
        "parameter_declaration" => {
            let names = field_children(node, "name").len().max(1);
            counts.total_vars += names;
            if node
                .child_by_field_name("type")
                .is_some_and(|t| t.kind() == "pointer_type")
            {
                counts.mutable_params += names;
            }
        }
        "variadic_parameter_declaration" => counts.total_vars += 1,
        _ => {}
    }
}

fn rust_state(node: Node<'_>, _tree: &SyntaxTree, grammar: &Grammar, counts: &mut StateCounts) {
    match node.kind() {
        "static_item" => {
            counts.total_vars += 1;
            if has_child_kind(node, "mutable_specifier") && at_file_scope(node, grammar) {
                counts.global_mutables += 1;
            }
        }
        "const_item" | "let_declaration" => counts.total_vars += 1,
        "parameter" => {
            counts.total_vars += 1;
            if node
                .child_by_field_name("type")
                .is_some_and(|t| t.kind() == "reference_type" && has_child_kind(t, "mutable_specifier"))
            {
                counts.mutable_params += 1;
            }
        }
        _ => {}
    }
}

fn c_state(node: Node<'_>, tree: &SyntaxTree, grammar: &Grammar, counts: &mut StateCounts) {
    match node.kind() {
        "declaration" => {
            let variables = field_children(node, "declarator")
                .into_iter()
                .filter(|d| !declares_function(*d))
                .count();
            counts.total_vars += variables;
            if at_file_scope(node, grammar) && !is_const(node, tree) {
                counts.global_mutables += variables;
            }
        }
        "parameter_declaration" => {
            if tree.text(node).trim() == "void" {
                return;
            }
            counts.total_vars += 1;
            if node
                .child_by_field_name("declarator")
                .is_some_and(|d| matches!(d.kind(), "pointer_declarator" | "reference_declarator"))
            {
                counts.mutable_params += 1;
            }
        }
        _ => {}
    }
}

/// Prototype declarators (`int f(void);`) declare no variable.
fn declares_function(declarator: Node<'_>) -> bool {
    let mut current = declarator;
    for _ in 0..8 {
        match current.kind() {
            "function_declarator" => return true,
            "pointer_declarator" | "reference_declarator" => {
                match current
                    .child_by_field_name("declarator")
                    .or_else(|| current.named_child(0))
                {
                    Some(inner) => current = inner,
                    None => return false,
                }
            }
            _ => return false,
        }
    }
    false
}

fn is_const(declaration: Node<'_>, tree: &SyntaxTree) -> bool {
    declaration
        .children(&mut declaration.walk())
        .any(|c| c.kind() == "type_qualifier" && matches!(tree.text(c), "const" | "constexpr"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers;
    use std::path::PathBuf;

    fn parse(file: &str, src: &str) -> ParseResult {
        parsers::parse(&PathBuf::from(file), src.as_bytes())
    }

    #[test]
    fn test_tiers() {
        assert_eq!(Tier::of(20), None);
        assert_eq!(Tier::of(21), Some(Tier::Moderate));
        assert_eq!(Tier::of(31), Some(Tier::Long));
        assert_eq!(Tier::of(51), Some(Tier::VeryLong));
        assert_eq!(Tier::of(101), Some(Tier::Extreme));
    }

    #[test]
    fn test_length_and_complexity_blend_without_tree() {
        let parsed = ParseResult::new(Language::JavaScript, 300, 0).with_functions(vec![
            FunctionRecord::new("short", 1, 10, 1, 2),
            FunctionRecord::new("long", 20, 60, 8, 6),
        ]);
        let result = FunctionLengthMetric.analyze(&parsed);
        // length: 0.3 * 1/2; complexity mean 4 → 0.2
        let expected = 0.7 * 0.15 + 0.3 * 0.2;
        assert!((result.score - expected).abs() < 1e-9);
        assert_eq!(result.issues.len(), 2);
        assert!(result.issues[0].contains("'long' (lines 20-60) is long: 41 lines"));
        assert!(result.issues[1].contains("too many parameters: 8"));
    }

    #[test]
    fn test_go_state_counts() {
        let src = r#"package p

var a, b int
const limit = 3

func f(p *T, n int) {
	x := 1
	_ = x
}
"#;
        let parsed = parse("p.go", src);
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        let counts = state_counts(tree, grammar).expect("go has a state model");
        assert_eq!(
            counts,
            StateCounts {
                global_mutables: 2,
                mutable_params: 1,
                total_vars: 6,
            }
        );
        let expected = 0.6 * 2.0 / 6.0 + 0.4 * 1.0 / 6.0;
        assert!((counts.penalty() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rust_state_counts() {
        let src = r#"
static mut COUNTER: u32 = 0;
static NAME: &str = "x";
const MAX: u32 = 9;

fn bump(state: &mut State, by: u32, view: &State) {
    let total = by + 1;
}
"#;
        let parsed = parse("s.rs", src);
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        let counts = state_counts(tree, grammar).expect("rust has a state model");
        assert_eq!(counts.global_mutables, 1);
        assert_eq!(counts.mutable_params, 1);
        assert_eq!(counts.total_vars, 7);
    }

    #[test]
    fn test_c_state_counts() {
        let src = r#"
static int hits;
static const int limit = 4;
int helper(int x);

void fill(char *buf, int len) {
    int i = 0;
}
"#;
        let parsed = parse("fill.c", src);
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        let counts = state_counts(tree, grammar).expect("c has a state model");
        assert_eq!(counts.global_mutables, 1);
        // buf is a pointer; the prototype's `int x` counts as a parameter
        assert_eq!(counts.mutable_params, 1);
        assert_eq!(counts.total_vars, 6);
    }

    #[test]
    fn test_state_blend_with_tree() {
        let src = "package p\n\nvar g int\n\nfunc f(p *int) {\n}\n";
        let parsed = parse("p.go", src);
        let result = FunctionLengthMetric.analyze(&parsed);
        // no long functions, complexity 1; state = 0.6*1/2 + 0.4*1/2
        assert!((result.score - 0.3 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_python_has_no_state_model() {
        let parsed = parse("m.py", "counter = 0\n\ndef f(x):\n    return x\n");
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        assert!(state_counts(tree, grammar).is_none());
        let result = FunctionLengthMetric.analyze(&parsed);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_many_globals_flagged() {
        let src = "package p\n\nvar (\n\ta int\n\tb int\n\tc int\n\td int\n\te int\n\tf int\n)\n\nfunc g() {}\n";
        let parsed = parse("p.go", src);
        let result = FunctionLengthMetric.analyze(&parsed);
        assert!(result
            .issues
            .iter()
            .any(|i| i.contains("6 mutable variables at file scope")));
    }
}
