//! Exact parsing with tree-sitter
//!
//! One walker serves every grammar; what counts as a function, a decision
//! point or a comment comes from the [`Grammar`] tables. A tree containing
//! syntax errors is rejected so the caller can fall back to the heuristic.

use super::grammar::{self, Grammar};
use super::heuristic::count_lines;
use super::Language;
use crate::models::{FunctionRecord, NodeSpan, ParseResult, SyntaxTree};
use rustc_hash::FxHashSet;
use std::path::Path;
use tree_sitter::{Node, Parser};
use tracing::debug;

/// Map a language (and, for TypeScript, the extension) to its grammar.
pub fn ts_language(language: Language, path: &Path) -> Option<tree_sitter::Language> {
    let is_tsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tsx"));
    match language {
        Language::Go => Some(tree_sitter_go::LANGUAGE.into()),
        Language::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
        Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
        Language::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
        Language::TypeScript if is_tsx => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
        Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        Language::Java => Some(tree_sitter_java::LANGUAGE.into()),
        Language::C => Some(tree_sitter_c::LANGUAGE.into()),
        Language::Cpp => Some(tree_sitter_cpp::LANGUAGE.into()),
        Language::CSharp => Some(tree_sitter_c_sharp::LANGUAGE.into()),
        Language::Razor | Language::Generic => None,
    }
}

/// Parse `text` into a full [`ParseResult`], or `None` if no clean tree
/// could be built.
pub fn parse(text: &str, language: Language, path: &Path) -> Option<ParseResult> {
    let grammar = grammar::for_language(language)?;
    let ts_lang = ts_language(language, path)?;

    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&ts_lang) {
        debug!("Failed to set {} grammar: {}", language, e);
        return None;
    }
    let tree = parser.parse(text, None)?;
    let root = tree.root_node();
    if root.has_error() {
        debug!("{}: syntax errors in {} tree", path.display(), language);
        return None;
    }

    let source = text.as_bytes();
    let mut comment_lines: FxHashSet<usize> = FxHashSet::default();
    let mut functions = Vec::new();

    visit(root, |node| {
        let kind = node.kind();
        if grammar.is_comment(kind) || is_docstring(node, language) {
            let (start, end) = line_span(node);
            comment_lines.extend(start..=end);
            return false;
        }
        if grammar.is_function(kind) {
            functions.push(function_record(node, source, grammar));
        }
        true
    });

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let result = ParseResult::new(language, count_lines(text), comment_lines.len())
        .with_functions(functions)
        .with_tree(SyntaxTree::new(tree, text.to_string(), language).with_stem(stem));
    Some(result)
}

/// Pre-order traversal. Returning `false` from `f` skips the node's children.
pub fn visit<'a>(root: Node<'a>, mut f: impl FnMut(Node<'a>) -> bool) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !f(node) {
            continue;
        }
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }
}

/// Visit the body of `func` without descending into nested functions.
pub fn visit_own<'a>(func: Node<'a>, grammar: &Grammar, mut f: impl FnMut(Node<'a>)) {
    visit(func, |node| {
        if node.id() != func.id() && grammar.is_function(node.kind()) {
            return false;
        }
        f(node);
        true
    });
}

/// 1-based inclusive line span. A node ending at column 0 does not own
/// that last line.
pub fn line_span(node: Node<'_>) -> (usize, usize) {
    let start = node.start_position().row + 1;
    let end_pos = node.end_position();
    let mut end = end_pos.row + 1;
    if end_pos.column == 0 && end > start {
        end -= 1;
    }
    (start, end)
}

fn function_record(node: Node<'_>, source: &[u8], grammar: &Grammar) -> FunctionRecord {
    let (start_line, end_line) = line_span(node);
    let name = function_name(node, source).unwrap_or_else(|| "anonymous".to_string());
    let parameter_count = parameters_node(node)
        .map(|p| count_parameters(p, source, grammar))
        .unwrap_or(0);
    FunctionRecord::new(
        name,
        start_line,
        end_line,
        parameter_count,
        complexity(node, grammar),
    )
    .with_node(NodeSpan {
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
    })
}

/// Cyclomatic complexity: 1 + decision points owned by this function.
pub fn complexity(func: Node<'_>, grammar: &Grammar) -> u32 {
    let mut complexity = 1;
    visit_own(func, grammar, |node| {
        let kind = node.kind();
        if grammar.is_decision(kind) {
            complexity += 1;
        } else if grammar.binary_kinds.contains(&kind) {
            for child in node.children(&mut node.walk()) {
                if grammar.boolean_operators.contains(&child.kind()) {
                    complexity += 1;
                }
            }
        }
    });
    complexity
}

fn text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Declared name, or the name of whatever the function is bound to.
pub fn function_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(text(name, source).to_string());
    }
    if node.kind() == "function_definition" {
        if let Some(declarator) = function_declarator(node) {
            if let Some(inner) = declarator.child_by_field_name("declarator") {
                return Some(text(inner, source).to_string());
            }
        }
    }
    bound_name(node, source)
}

/// `const f = () => {}`, `{ f: function() {} }`, `auto f = [](){}` ...
fn bound_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    let parent = node.parent()?;
    let field = match parent.kind() {
        "variable_declarator" | "public_field_definition" => "name",
        "pair" => "key",
        "assignment_expression" | "assignment" => "left",
        "field_definition" => "property",
        "init_declarator" => "declarator",
        "let_declaration" => "pattern",
        _ => return None,
    };
    let target = parent.child_by_field_name(field)?;
    if target.id() == node.id() {
        return None;
    }
    Some(text(target, source).to_string())
}

/// Follow a C/C++ declarator chain down to its `function_declarator`.
pub fn function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.child_by_field_name("declarator")?;
    for _ in 0..8 {
        if current.kind() == "function_declarator" {
            return Some(current);
        }
        current = current
            .child_by_field_name("declarator")
            .or_else(|| current.named_child(0))?;
    }
    None
}

pub fn parameters_node(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("parameters")
        .or_else(|| node.child_by_field_name("parameter"))
        .or_else(|| {
            if node.kind() == "function_definition" {
                function_declarator(node).and_then(|d| d.child_by_field_name("parameters"))
            } else {
                None
            }
        })
}

/// Node kinds inside a parameter list that are not parameters.
const NON_PARAMETERS: &[&str] = &[
    "self_parameter",
    "receiver_parameter",
    "keyword_separator",
    "positional_separator",
    "attribute_item",
    "attribute_list",
];

pub fn count_parameters(params: Node<'_>, source: &[u8], grammar: &Grammar) -> usize {
    if params.kind() == "identifier" {
        return 1;
    }
    let mut count = 0;
    for child in params.named_children(&mut params.walk()) {
        let kind = child.kind();
        if grammar.is_comment(kind) || NON_PARAMETERS.contains(&kind) {
            continue;
        }
        count += match (grammar.language, kind) {
            (Language::Go, "parameter_declaration") => child
                .children_by_field_name("name", &mut child.walk())
                .count()
                .max(1),
            (Language::C | Language::Cpp, "parameter_declaration")
                if text(child, source).trim() == "void" =>
            {
                0
            }
            (Language::Python, "identifier")
                if matches!(text(child, source), "self" | "cls") =>
            {
                0
            }
            _ => 1,
        };
    }
    count
}

/// Python docstring: a bare string that opens a module, class or function body.
fn is_docstring(node: Node<'_>, language: Language) -> bool {
    if language != Language::Python || node.kind() != "expression_statement" {
        return false;
    }
    let only_string = node.named_child_count() == 1
        && node.named_child(0).is_some_and(|c| c.kind() == "string");
    if !only_string {
        return false;
    }
    let Some(container) = node.parent() else {
        return false;
    };
    if !matches!(container.kind(), "module" | "block") {
        return false;
    }
    let first = container
        .named_children(&mut container.walk())
        .find(|c| c.kind() != "comment");
    first.is_some_and(|c| c.id() == node.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse_as(source: &str, file: &str) -> ParseResult {
        let path = PathBuf::from(file);
        let language = super::super::classify(&path);
        parse(source, language, &path).expect("should parse cleanly")
    }

    #[test]
    fn test_go_functions() {
        let source = r#"package main

// add sums two ints
func add(a, b int) int {
	return a + b
}

func (s *Server) Serve(ctx context.Context, addr string) error {
	if addr == "" || ctx == nil {
		return nil
	}
	for i := 0; i < 3; i++ {
		switch i {
		case 1:
		default:
		}
	}
	go func() {
		if true {
		}
	}()
	return nil
}
"#;
        let result = parse_as(source, "server.go");
        assert!(result.has_tree());
        assert_eq!(result.comment_lines, 1);
        let names: Vec<&str> = result.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["add", "Serve", "anonymous"]);

        let add = &result.functions[0];
        assert_eq!(add.parameter_count, 2);
        assert_eq!(add.complexity, 1);
        assert_eq!((add.start_line, add.end_line), (4, 6));

        let serve = &result.functions[1];
        assert_eq!(serve.parameter_count, 2);
        // if, ||, for, case, default
        assert_eq!(serve.complexity, 6);

        let lit = &result.functions[2];
        assert_eq!(lit.complexity, 2);
    }

    #[test]
    fn test_python_docstrings_and_params() {
        let source = r#""""Module doc."""

class Greeter:
    """Says hello."""

    def greet(self, name, *args, greeting="hi", **kw):
        # inline
        if name and greeting:
            return f"{greeting} {name}"
        return None
"#;
        let result = parse_as(source, "greeter.py");
        assert_eq!(result.comment_lines, 3);
        assert_eq!(result.functions.len(), 1);
        let greet = &result.functions[0];
        assert_eq!(greet.name, "greet");
        assert_eq!(greet.parameter_count, 4);
        assert_eq!(greet.complexity, 3);
        assert_eq!((greet.start_line, greet.end_line), (6, 10));
    }

    #[test]
    fn test_javascript_bound_names() {
        let source = r#"
const double = (x) => x * 2;
const obj = {
  run: function (a, b) { return a ?? b; },
};
class A {
  method() { return this.x ? 1 : 2; }
}
"#;
        let result = parse_as(source, "app.js");
        let names: Vec<&str> = result.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["double", "run", "method"]);
        assert_eq!(result.functions[0].parameter_count, 1);
        assert_eq!(result.functions[1].complexity, 2);
        assert_eq!(result.functions[2].complexity, 2);
    }

    #[test]
    fn test_c_declarator_names() {
        let source = r#"
static char *dup(const char *s) {
    return 0;
}

int main(void) {
    return dup("x") ? 0 : 1;
}
"#;
        let result = parse_as(source, "main.c");
        let names: Vec<&str> = result.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["dup", "main"]);
        assert_eq!(result.functions[0].parameter_count, 1);
        assert_eq!(result.functions[1].parameter_count, 0);
        assert_eq!(result.functions[1].complexity, 2);
    }

    #[test]
    fn test_rust_methods_skip_self() {
        let source = r#"
impl Counter {
    /// Bump.
    pub fn bump(&mut self, by: u32) -> u32 {
        match by {
            0 => self.n,
            _ if by > 10 && self.n > 0 => self.n,
            _ => self.n + by,
        }
    }
}
"#;
        let result = parse_as(source, "counter.rs");
        assert_eq!(result.comment_lines, 1);
        let bump = &result.functions[0];
        assert_eq!(bump.name, "bump");
        assert_eq!(bump.parameter_count, 1);
        // three arms and one &&
        assert_eq!(bump.complexity, 5);
    }

    #[test]
    fn test_syntax_errors_reject_tree() {
        let path = PathBuf::from("broken.go");
        assert!(parse("package main\nfunc (( {", Language::Go, &path).is_none());
    }

    #[test]
    fn test_tsx_uses_tsx_grammar() {
        let source = "export function App(props: Props) {\n  return <div>{props.x}</div>;\n}\n";
        let result = parse_as(source, "App.tsx");
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].name, "App");
        assert_eq!(result.functions[0].parameter_count, 1);
    }

    #[test]
    fn test_node_span_resolves() {
        let source = "package p\n\nfunc f() {\n\tif true {\n\t}\n}\n";
        let result = parse_as(source, "p.go");
        let tree = result.tree.as_ref().expect("tree");
        let span = result.functions[0].node.expect("span");
        let node = tree.node_at(span).expect("node");
        assert_eq!(node.kind(), "function_declaration");
    }
}
