//! Structure analysis
//!
//! Nesting depth per function dominates the score; a module importing a path
//! that names itself and an oversized import list add fixed penalties.

use super::tree::{function_nodes, tree_and_grammar, visit};
use super::{step, Metric};
use crate::models::{clamp_unit, MetricKind, MetricResult, ParseResult, SyntaxTree};
use crate::parsers::grammar::Grammar;
use crate::parsers::Language;
use tree_sitter::Node;

const DEEP_NESTING: usize = 5;
const MODERATE_NESTING: usize = 3;
const MANY_IMPORTS: usize = 15;
const TOO_MANY_IMPORTS: usize = 20;

/// Stems that name a module by its directory rather than itself.
const ANONYMOUS_STEMS: &[&str] = &["mod", "index", "main", "lib", "__init__"];

const SCRIPT_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs"];

pub struct StructureMetric;

impl Metric for StructureMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::Structure
    }

    fn description(&self) -> &'static str {
        "Nesting depth, self-referencing imports and import count"
    }

    fn weight(&self) -> f64 {
        0.20
    }

    fn requires_tree(&self) -> bool {
        true
    }

    fn analyze(&self, parsed: &ParseResult) -> MetricResult {
        let Some((tree, grammar)) = tree_and_grammar(parsed) else {
            return MetricResult::new(0.0, self.weight(), self.description());
        };
        let mut issues = Vec::new();

        let mut max_depth: usize = 0;
        for (record, node) in function_nodes(parsed, tree) {
            let depth = nesting_depth(node, grammar);
            max_depth = max_depth.max(depth);
            if depth > DEEP_NESTING {
                issues.push(format!(
                    "function '{}' (line {}) has deep nesting: {} levels",
                    record.name, record.start_line, depth
                ));
            } else if depth > MODERATE_NESTING {
                issues.push(format!(
                    "function '{}' (line {}) has moderate nesting: {} levels",
                    record.name, record.start_line, depth
                ));
            }
        }

        let imports = import_paths(tree, grammar);
        let cycle = self_import(tree, &imports);
        if let Some(path) = &cycle {
            issues.push(format!("module imports a path naming itself: {path}"));
        }
        if imports.len() > TOO_MANY_IMPORTS {
            issues.push(format!("too many imports: {}", imports.len()));
        } else if imports.len() > MANY_IMPORTS {
            issues.push(format!("many imports: {}", imports.len()));
        }

        let nesting_score = clamp_unit((max_depth as f64 - MODERATE_NESTING as f64) * 0.25);
        let cycle_score = if cycle.is_some() { 1.0 } else { 0.0 };
        let import_score = step(
            imports.len() as f64,
            &[(MANY_IMPORTS as f64, 0.0), (TOO_MANY_IMPORTS as f64, 0.5)],
            1.0,
        );
        MetricResult::new(
            0.6 * nesting_score + 0.25 * cycle_score + 0.15 * import_score,
            self.weight(),
            self.description(),
        )
        .with_issues(issues)
    }
}

/// Deepest nesting inside `func`, counting the body itself as level 1.
/// Nested functions are measured on their own.
pub fn nesting_depth(func: Node<'_>, grammar: &Grammar) -> usize {
    let mut max: usize = 1;
    let mut stack: Vec<(Node<'_>, usize)> = vec![(func, 1)];
    while let Some((node, depth)) = stack.pop() {
        max = max.max(depth);
        for i in 0..node.child_count() {
            let Some(child) = node.child(i) else {
                continue;
            };
            if grammar.is_function(child.kind()) {
                continue;
            }
            let child_depth = if grammar.is_nesting(child.kind()) {
                depth + 1
            } else {
                depth
            };
            stack.push((child, child_depth));
        }
    }
    max
}

/// Import targets in source order, as written (quotes stripped).
pub fn import_paths(tree: &SyntaxTree, grammar: &Grammar) -> Vec<String> {
    let mut paths = Vec::new();
    visit(tree.root(), |node| {
        if !grammar.is_import(node.kind()) {
            return true;
        }
        let target = match tree.language() {
            Language::Go => node.child_by_field_name("path"),
            Language::JavaScript | Language::TypeScript => node.child_by_field_name("source"),
            Language::Python => node.child_by_field_name("module_name"),
            Language::Rust => node.child_by_field_name("argument"),
            Language::C | Language::Cpp => node.child_by_field_name("path"),
            _ => None,
        };
        let text = match target {
            Some(target) => tree.text(target).to_string(),
            None => named_text(node, tree),
        };
        let quotes: &[char] = &['"', '\'', '`', '<', '>'];
        paths.push(text.trim_matches(quotes).to_string());
        false
    });
    paths
}

/// Text of the node's named children, skipping the leading keyword.
fn named_text(node: Node<'_>, tree: &SyntaxTree) -> String {
    let parts: Vec<&str> = node
        .named_children(&mut node.walk())
        .filter(|c| !matches!(c.kind(), "comment" | "line_comment" | "block_comment"))
        .map(|c| tree.text(c))
        .collect();
    parts.join(" ")
}

/// The first import whose path names this module, if any.
pub fn self_import(tree: &SyntaxTree, imports: &[String]) -> Option<String> {
    let language = tree.language();
    if matches!(language, Language::C | Language::Cpp) {
        return None;
    }
    let own = if language == Language::Go {
        go_package(tree)?
    } else {
        let stem = tree.stem();
        if stem.is_empty() || ANONYMOUS_STEMS.contains(&stem) {
            return None;
        }
        stem.to_string()
    };

    imports
        .iter()
        .find(|path| segments(language, path).iter().any(|s| *s == own))
        .cloned()
}

fn go_package(tree: &SyntaxTree) -> Option<String> {
    let root = tree.root();
    let clause = root
        .named_children(&mut root.walk())
        .find(|c| c.kind() == "package_clause")?;
    let name = tree.text(clause.named_child(0)?);
    (name != "main").then(|| name.to_string())
}

fn segments(language: Language, path: &str) -> Vec<&str> {
    match language {
        Language::Go => path.split('/').collect(),
        Language::JavaScript | Language::TypeScript => path
            .split('/')
            .map(|s| {
                SCRIPT_EXTENSIONS
                    .iter()
                    .find_map(|ext| s.strip_suffix(ext))
                    .unwrap_or(s)
            })
            .collect(),
        Language::Python => path
            .split(|c: char| c == '.' || c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => path
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|s| !s.is_empty())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers;
    use std::path::PathBuf;

    fn parse(file: &str, src: &str) -> ParseResult {
        let parsed = parsers::parse(&PathBuf::from(file), src.as_bytes());
        assert!(parsed.has_tree(), "{file} should parse exactly");
        parsed
    }

    #[test]
    fn test_flat_function_has_depth_one() {
        let parsed = parse("a.go", "package a\n\nfunc f() int {\n\treturn 1\n}\n");
        let result = StructureMetric.analyze(&parsed);
        assert_eq!(result.score, 0.0);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_else_if_chain_nests() {
        let src = r#"package a

func f(x int) int {
	if x > 0 {
		return 1
	} else if x < 0 {
		return -1
	} else if x == 0 {
		return 0
	}
	return 2
}
"#;
        let parsed = parse("a.go", src);
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        let (_, node) = function_nodes(&parsed, tree)[0];
        assert_eq!(nesting_depth(node, grammar), 4);
        let result = StructureMetric.analyze(&parsed);
        assert_eq!(
            result.issues,
            vec!["function 'f' (line 3) has moderate nesting: 4 levels"]
        );
        assert!((result.score - 0.6 * 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_deep_python_nesting() {
        let src = r#"
def walk(rows):
    for row in rows:
        if row:
            while row:
                try:
                    if row[0]:
                        row = row[1:]
                except IndexError:
                    break
"#;
        let parsed = parse("walk.py", src);
        let result = StructureMetric.analyze(&parsed);
        // body, for, if, while, try, if
        assert_eq!(
            result.issues,
            vec!["function 'walk' (line 2) has deep nesting: 6 levels"]
        );
        assert!((result.score - 0.6 * 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_nested_function_measured_alone() {
        let src = "function outer() {\n  const inner = () => { if (a) { if (b) { if (c) { x(); } } } };\n  return inner;\n}\n";
        let parsed = parse("n.js", src);
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        let depths: Vec<(String, usize)> = function_nodes(&parsed, tree)
            .into_iter()
            .map(|(f, n)| (f.name.clone(), nesting_depth(n, grammar)))
            .collect();
        assert_eq!(
            depths,
            vec![("outer".to_string(), 1), ("inner".to_string(), 4)]
        );
    }

    #[test]
    fn test_go_self_import() {
        let src = r#"package widgets

import (
	"fmt"
	"example.com/app/widgets/util"
)

func f() { fmt.Println(util.X) }
"#;
        let parsed = parse("w.go", src);
        let result = StructureMetric.analyze(&parsed);
        assert_eq!(
            result.issues,
            vec!["module imports a path naming itself: example.com/app/widgets/util"]
        );
        assert!((result.score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_go_main_package_is_exempt() {
        let src = "package main\n\nimport \"example.com/main/cmd\"\n\nfunc main() { cmd.Run() }\n";
        let result = StructureMetric.analyze(&parse("m.go", src));
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_script_self_import() {
        let src = "import { a } from './helpers/button.js';\nimport b from 'react';\nexport const x = a + b;\n";
        let parsed = parse("src/button.ts", src);
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        assert_eq!(
            import_paths(tree, grammar),
            vec!["./helpers/button.js", "react"]
        );
        let result = StructureMetric.analyze(&parsed);
        assert_eq!(result.issues.len(), 1);

        // index files are never self-referencing
        let parsed = parse("src/index.ts", "import { index } from './index';\n");
        assert!(StructureMetric.analyze(&parsed).issues.is_empty());
    }

    #[test]
    fn test_python_self_import() {
        let parsed = parse("billing.py", "import os\nfrom app.billing import charge\n");
        let result = StructureMetric.analyze(&parsed);
        assert_eq!(
            result.issues,
            vec!["module imports a path naming itself: app.billing"]
        );
    }

    #[test]
    fn test_c_includes_never_cycle() {
        let parsed = parse("list.c", "#include \"list.h\"\n#include <list>\nint f(void) { return 0; }\n");
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        assert_eq!(import_paths(tree, grammar), vec!["list.h", "list"]);
        assert!(StructureMetric.analyze(&parsed).issues.is_empty());
    }

    #[test]
    fn test_import_count_thresholds() {
        let mut src = String::new();
        for i in 0..18 {
            src.push_str(&format!("import mod{i}\n"));
        }
        let result = StructureMetric.analyze(&parse("many.py", &src));
        assert_eq!(result.issues, vec!["many imports: 18"]);
        assert!((result.score - 0.15 * 0.5).abs() < 1e-9);

        let mut src = String::new();
        for i in 0..21 {
            src.push_str(&format!("import mod{i}\n"));
        }
        let result = StructureMetric.analyze(&parse("many.py", &src));
        assert_eq!(result.issues, vec!["too many imports: 21"]);
        assert!((result.score - 0.15).abs() < 1e-9);
    }
}
