//! Comment coverage
//!
//! The score only ever falls as the comment ratio rises; heavy commenting is
//! never penalized. With an exact tree, exported declarations that carry no
//! doc comment are reported as issues without affecting the score.

use super::tree::{at_file_scope, leading_comments, tree_and_grammar, visit};
use super::Metric;
use crate::models::{MetricKind, MetricResult, ParseResult, SyntaxTree};
use crate::parsers::grammar::Grammar;
use crate::parsers::Language;
use tree_sitter::Node;

pub struct CommentRatioMetric;

impl Metric for CommentRatioMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::CommentRatio
    }

    fn description(&self) -> &'static str {
        "Share of lines that are comments, and documentation of exported items"
    }

    fn weight(&self) -> f64 {
        0.15
    }

    fn analyze(&self, parsed: &ParseResult) -> MetricResult {
        if parsed.total_lines == 0 {
            return MetricResult::new(0.0, self.weight(), self.description());
        }

        let ratio = parsed.comment_lines as f64 / parsed.total_lines as f64;
        let mut issues = Vec::new();
        if ratio < 0.05 {
            issues.push(format!(
                "very low comment ratio: {:.1}% of lines",
                ratio * 100.0
            ));
        } else if ratio < 0.10 {
            issues.push(format!("low comment ratio: {:.1}% of lines", ratio * 100.0));
        }

        if let Some((tree, grammar)) = tree_and_grammar(parsed) {
            for item in undocumented_exports(tree, grammar) {
                issues.push(format!(
                    "exported {} '{}' (line {}) has no doc comment",
                    item.what, item.name, item.line
                ));
            }
        }

        MetricResult::new(ratio_score(ratio), self.weight(), self.description())
            .with_issues(issues)
    }
}

pub fn ratio_score(ratio: f64) -> f64 {
    const BANDS: [(f64, f64); 7] = [
        (0.25, 0.0),
        (0.20, 0.1),
        (0.15, 0.25),
        (0.10, 0.45),
        (0.07, 0.65),
        (0.05, 0.8),
        (0.02, 0.9),
    ];
    BANDS
        .iter()
        .find(|(floor, _)| ratio >= *floor)
        .map(|(_, score)| *score)
        .unwrap_or(1.0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub what: &'static str,
    pub name: String,
    pub line: usize,
}

/// Exported declarations with no attached doc comment, in source order.
pub fn undocumented_exports(tree: &SyntaxTree, grammar: &Grammar) -> Vec<Export> {
    let mut found = Vec::new();
    visit(tree.root(), |node| {
        let Some((what, name)) = export_kind(node, tree, grammar) else {
            return true;
        };
        let documented = leading_comments(node, grammar)
            .into_iter()
            .any(|c| is_doc(c, tree));
        if !documented {
            found.push(Export {
                what,
                name: tree.text(name).to_string(),
                line: node.start_position().row + 1,
            });
        }
        true
    });
    found
}

/// What kind of exported declaration `node` is, and its name node.
fn export_kind<'t>(
    node: Node<'t>,
    tree: &SyntaxTree,
    grammar: &Grammar,
) -> Option<(&'static str, Node<'t>)> {
    let what = match (tree.language(), node.kind()) {
        (Language::Go, "function_declaration") => "function",
        (Language::Go, "method_declaration") => "method",
        (Language::Go, "type_declaration") => "type",
        (Language::Rust, "function_item") => "function",
        (Language::Rust, "struct_item" | "enum_item" | "union_item") => "type",
        (Language::Rust, "trait_item") => "trait",
        (Language::Rust, "const_item" | "static_item") => "constant",
        (Language::Java | Language::CSharp, "method_declaration") => "method",
        (
            Language::Java | Language::CSharp,
            "class_declaration" | "interface_declaration" | "enum_declaration"
            | "record_declaration" | "struct_declaration",
        ) => "type",
        _ => return None,
    };

    let name = if node.kind() == "type_declaration" {
        node.named_children(&mut node.walk())
            .find(|c| matches!(c.kind(), "type_spec" | "type_alias"))
            .and_then(|spec| spec.child_by_field_name("name"))
    } else {
        node.child_by_field_name("name")
    }?;

    let exported = match tree.language() {
        Language::Go => {
            at_file_scope(node, grammar)
                && tree.text(name).starts_with(|c: char| c.is_ascii_uppercase())
        }
        Language::Rust => node
            .named_children(&mut node.walk())
            .any(|c| c.kind() == "visibility_modifier" && tree.text(c) == "pub"),
        Language::Java => node
            .named_children(&mut node.walk())
            .find(|c| c.kind() == "modifiers")
            .is_some_and(|m| {
                m.children(&mut m.walk())
                    .any(|c| tree.text(c) == "public")
            }),
        Language::CSharp => node
            .named_children(&mut node.walk())
            .any(|c| c.kind() == "modifier" && tree.text(c) == "public"),
        _ => false,
    };
    exported.then_some((what, name))
}

fn is_doc(comment: Node<'_>, tree: &SyntaxTree) -> bool {
    let text = tree.text(comment);
    match tree.language() {
        Language::Go => text.starts_with("//") || text.starts_with("/*"),
        Language::Rust => {
            text.starts_with("///")
                || text.starts_with("//!")
                || text.starts_with("/**")
                || (comment.kind() == "attribute_item" && text.contains("doc"))
        }
        _ => text.starts_with("/**") || text.starts_with("///"),
    }
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
    fn test_ratio_bands_are_monotone() {
        assert_eq!(ratio_score(0.30), 0.0);
        assert_eq!(ratio_score(0.25), 0.0);
        assert_eq!(ratio_score(0.22), 0.1);
        assert_eq!(ratio_score(0.12), 0.45);
        assert_eq!(ratio_score(0.05), 0.8);
        assert_eq!(ratio_score(0.03), 0.9);
        assert_eq!(ratio_score(0.0), 1.0);
        let mut last = f64::MAX;
        for i in 0..=100 {
            let score = ratio_score(i as f64 / 100.0);
            assert!(score <= last);
            last = score;
        }
    }

    #[test]
    fn test_empty_file() {
        let parsed = ParseResult::new(Language::Generic, 0, 0);
        let result = CommentRatioMetric.analyze(&parsed);
        assert_eq!(result.score, 0.0);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_low_ratio_issue() {
        let parsed = ParseResult::new(Language::Generic, 100, 8);
        let result = CommentRatioMetric.analyze(&parsed);
        assert_eq!(result.score, 0.65);
        assert_eq!(result.issues, vec!["low comment ratio: 8.0% of lines"]);
    }

    #[test]
    fn test_go_exports() {
        let src = r#"package p

// Documented does things.
func Documented() {}

func Undocumented() {}

func private() {}

type Thing struct{}

func (t Thing) Method() {}
"#;
        let parsed = parse("p.go", src);
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        let names: Vec<String> = undocumented_exports(tree, grammar)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Undocumented", "Thing", "Method"]);

        let result = CommentRatioMetric.analyze(&parsed);
        assert!(result
            .issues
            .iter()
            .any(|i| i == "exported function 'Undocumented' (line 6) has no doc comment"));
    }

    #[test]
    fn test_rust_exports() {
        let src = r#"
/// Documented.
pub fn documented() {}

#[inline]
/// Also documented, attribute first.
pub fn attributed() {}

// plain comment is not a doc
pub fn plain() {}

fn private() {}

pub(crate) fn crate_only() {}
"#;
        let parsed = parse("lib.rs", src);
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        let names: Vec<String> = undocumented_exports(tree, grammar)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["plain"]);
    }

    #[test]
    fn test_java_exports() {
        let src = r#"
/** A widget. */
public class Widget {
    /** Spins. */
    public void spin() {}

    public void wobble() {}

    void hidden() {}
}
"#;
        let parsed = parse("Widget.java", src);
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        let names: Vec<String> = undocumented_exports(tree, grammar)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["wobble"]);
    }

    #[test]
    fn test_csharp_exports() {
        let src = r#"
/// <summary>Service.</summary>
public class Service
{
    public int Run() { return 1; }

    /// <summary>Stops.</summary>
    public void Stop() { }
}
"#;
        let parsed = parse("Service.cs", src);
        let (tree, grammar) = tree_and_grammar(&parsed).expect("tree");
        let names: Vec<String> = undocumented_exports(tree, grammar)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Run"]);
    }
}
