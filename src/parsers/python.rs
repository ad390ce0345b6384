//! Indentation heuristic for Python
//!
//! Used when the tree-sitter grammar rejects a file. A `def` header opens a
//! function; its body runs until the first code line indented no deeper
//! than the header.

use super::clike::count_params;
use super::heuristic::{
    indent_width, keywords_for, matching_close, scan, Scan, PYTHON_STYLE,
};
use super::language::Family;
use super::Language;
use crate::models::{FunctionRecord, ParseResult};
use regex::Regex;
use std::sync::OnceLock;

fn def_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:async[ \t]+)?def[ \t]+(?P<name>[A-Za-z_]\w*)[ \t]*\(")
            .expect("valid regex")
    })
}

pub fn parse_heuristic(text: &str) -> ParseResult {
    let scanned = scan(text, &PYTHON_STYLE);
    let functions = indented_functions(&scanned, def_regex(), Family::Python);
    ParseResult::new(
        Language::Python,
        scanned.lines.total_lines(),
        scanned.comment_line_count(),
    )
    .with_functions(functions)
}

/// Functions whose headers match `header` (must capture `indent` and `name`
/// and end at the opening paren), with bodies delimited by indentation.
pub(crate) fn indented_functions(
    scanned: &Scan,
    header: &Regex,
    family: Family,
) -> Vec<FunctionRecord> {
    let masked = scanned.masked.as_str();
    let lines: Vec<&str> = masked.split('\n').collect();
    let keywords = keywords_for(family);
    let mut functions = Vec::new();

    for caps in header.captures_iter(masked) {
        let (Some(name), Some(indent), Some(whole)) =
            (caps.name("name"), caps.name("indent"), caps.get(0))
        else {
            continue;
        };
        let open = whole.end() - 1;
        let Some(close) = matching_close(masked, open, b'(', b')') else {
            continue;
        };
        let parameter_count = count_params(&masked[open + 1..close], Language::Python);

        let header_indent = indent_width(indent.as_str());
        let start_line = scanned.lines.line_of(name.start());
        let header_end = masked[close..]
            .find(':')
            .map(|p| scanned.lines.line_of(close + p))
            .unwrap_or_else(|| scanned.lines.line_of(close));

        let end_line = body_end(&lines, header_end, header_indent);
        let from = scanned.lines.start_of(start_line);
        let to = scanned
            .lines
            .start_of(end_line + 1)
            .max(from)
            .min(masked.len());
        let to = if end_line >= scanned.lines.total_lines() {
            masked.len()
        } else {
            to
        };
        let complexity = keywords.complexity(&masked[from..to]);

        functions.push(FunctionRecord::new(
            name.as_str(),
            start_line,
            end_line,
            parameter_count,
            complexity,
        ));
    }

    functions
}

/// Last line (1-based) of an indented body whose header ends on `header_end`.
fn body_end(lines: &[&str], header_end: usize, header_indent: usize) -> usize {
    let mut last = header_end;
    for (idx, line) in lines.iter().enumerate().skip(header_end) {
        if line.trim().is_empty() {
            continue;
        }
        if indent_width(line) <= header_indent {
            break;
        }
        last = idx + 1;
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_bounds() {
        let src = r#"import os

def first(a, b):
    """Docstring
with a column-zero line
    """
    if a and b:
        return 1

    return 2

class Thing:
    def method(self, x):
        # comment
        for i in x:
            pass

def last():
    return None
"#;
        let result = parse_heuristic(src);
        let names: Vec<&str> = result.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first", "method", "last"]);

        let first = &result.functions[0];
        assert_eq!((first.start_line, first.end_line), (3, 10));
        assert_eq!(first.parameter_count, 2);
        assert_eq!(first.complexity, 3);

        let method = &result.functions[1];
        assert_eq!((method.start_line, method.end_line), (13, 16));
        assert_eq!(method.parameter_count, 1);
        assert_eq!(method.complexity, 2);

        let last = &result.functions[2];
        assert_eq!((last.start_line, last.end_line), (18, 19));
        assert_eq!(result.total_lines, 19);
        assert_eq!(result.comment_lines, 4);
    }

    #[test]
    fn test_one_line_def() {
        let result = parse_heuristic("def f(): return 1\n");
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].start_line, 1);
        assert_eq!(result.functions[0].end_line, 1);
    }

    #[test]
    fn test_multiline_signature() {
        let src = "def f(\n    a,\n    b,\n):\n    return a\n";
        let result = parse_heuristic(src);
        assert_eq!(result.functions[0].parameter_count, 2);
        assert_eq!(result.functions[0].end_line, 5);
    }
}
