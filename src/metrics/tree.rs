//! Syntax-tree helpers shared by the tree-based metrics

use crate::models::{FunctionRecord, ParseResult, SyntaxTree};
use crate::parsers::grammar::{self, Grammar};
pub use crate::parsers::exact::{line_span, visit, visit_own};
use tree_sitter::Node;

/// Tree plus its grammar table, when the file was parsed exactly.
pub fn tree_and_grammar(parsed: &ParseResult) -> Option<(&SyntaxTree, &'static Grammar)> {
    let tree = parsed.tree.as_ref()?;
    let grammar = grammar::for_language(tree.language())?;
    Some((tree, grammar))
}

/// Function records paired with their nodes. Records without a node span
/// (heuristic ones) are skipped.
pub fn function_nodes<'t>(
    parsed: &'t ParseResult,
    tree: &'t SyntaxTree,
) -> Vec<(&'t FunctionRecord, Node<'t>)> {
    parsed
        .functions
        .iter()
        .filter_map(|f| {
            let span = f.node?;
            tree.node_at(span).map(|n| (f, n))
        })
        .collect()
}

/// True when no enclosing function or statement block sits between `node`
/// and the root.
pub fn at_file_scope(node: Node<'_>, grammar: &Grammar) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        let kind = parent.kind();
        if grammar.is_function(kind) || grammar.is_block(kind) {
            return false;
        }
        current = parent.parent();
    }
    true
}

/// Comment (and, for Rust, attribute) siblings stacked directly above `node`,
/// nearest first. A blank line breaks the stack.
pub fn leading_comments<'t>(node: Node<'t>, grammar: &Grammar) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    // 0-based row of the line below the next candidate
    let mut below = node.start_position().row;
    let mut current = node.prev_named_sibling();
    while let Some(sibling) = current {
        let kind = sibling.kind();
        if !grammar.is_comment(kind) && kind != "attribute_item" {
            break;
        }
        // 1-based last line == 0-based row of the line after it
        let (_, end) = line_span(sibling);
        if end < below {
            break;
        }
        below = sibling.start_position().row;
        found.push(sibling);
        current = sibling.prev_named_sibling();
    }
    found
}

/// Innermost identifier of a C/C++ declarator (`*p`, `a[3]`, `x = 1`, `ns::f`).
pub fn declarator_name(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node;
    for _ in 0..8 {
        match current.kind() {
            "identifier" | "field_identifier" | "type_identifier" | "operator_name"
            | "destructor_name" => return Some(current),
            "qualified_identifier" => {
                current = current.child_by_field_name("name")?;
            }
            _ => {
                current = current
                    .child_by_field_name("declarator")
                    .or_else(|| current.named_child(0))?;
            }
        }
    }
    None
}

/// Named children with the given field name.
pub fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    node.children_by_field_name(field, &mut node.walk())
        .collect()
}

/// Whether `node` has a direct child of `kind`.
pub fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    node.children(&mut node.walk()).any(|c| c.kind() == kind)
}
