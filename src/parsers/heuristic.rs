//! Lexical building blocks for the heuristic parsers
//!
//! Nothing here builds a token stream. A single forward scan blanks out
//! string literals and comments (keeping byte offsets and newlines intact),
//! remembers which lines carried a comment, and the masked text is then safe
//! to search for keywords, braces and parentheses.

use super::language::Family;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Comment and literal syntax of a language family.
#[derive(Debug, Clone, Copy)]
pub struct LexStyle {
    pub line_comments: &'static [&'static str],
    pub block_comments: &'static [(&'static str, &'static str)],
    pub double_quote_strings: bool,
    /// `'...'` is a full string, not a char literal
    pub single_quote_strings: bool,
    /// Backtick template or raw strings
    pub backtick_strings: bool,
    /// Python `"""` / `'''`
    pub triple_quotes: bool,
    /// A triple-quoted string opening a line counts as commentary
    pub docstrings: bool,
}

pub const C_STYLE: LexStyle = LexStyle {
    line_comments: &["//"],
    block_comments: &[("/*", "*/")],
    double_quote_strings: true,
    single_quote_strings: false,
    backtick_strings: false,
    triple_quotes: false,
    docstrings: false,
};

pub const GO_STYLE: LexStyle = LexStyle {
    backtick_strings: true,
    ..C_STYLE
};

pub const SCRIPT_STYLE: LexStyle = LexStyle {
    single_quote_strings: true,
    backtick_strings: true,
    ..C_STYLE
};

pub const PYTHON_STYLE: LexStyle = LexStyle {
    line_comments: &["#"],
    block_comments: &[],
    double_quote_strings: true,
    single_quote_strings: true,
    backtick_strings: false,
    triple_quotes: true,
    docstrings: true,
};

pub const GENERIC_STYLE: LexStyle = LexStyle {
    line_comments: &["//", "#"],
    block_comments: &[("/*", "*/")],
    double_quote_strings: true,
    single_quote_strings: true,
    backtick_strings: false,
    triple_quotes: false,
    docstrings: false,
};

/// Razor markup: only comments are blanked, attribute values stay visible.
pub const RAZOR_MARKUP_STYLE: LexStyle = LexStyle {
    line_comments: &[],
    block_comments: &[("@*", "*@"), ("<!--", "-->")],
    double_quote_strings: false,
    single_quote_strings: false,
    backtick_strings: false,
    triple_quotes: false,
    docstrings: false,
};

pub fn style_for(family: Family) -> LexStyle {
    match family {
        Family::CFamily | Family::Rust => C_STYLE,
        Family::Go => GO_STYLE,
        Family::Script => SCRIPT_STYLE,
        Family::Python => PYTHON_STYLE,
        Family::Other => GENERIC_STYLE,
    }
}

/// Result of a lexical scan.
#[derive(Debug, Clone)]
pub struct Scan {
    /// Same byte length as the input; literal contents and comments are
    /// spaces, newlines preserved.
    pub masked: String,
    /// 1-based line numbers touched by a comment
    pub comment_lines: FxHashSet<usize>,
    pub lines: LineIndex,
}

impl Scan {
    pub fn comment_line_count(&self) -> usize {
        self.comment_lines.len()
    }
}

/// Byte offset → line lookup.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    total_lines: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut starts = vec![0];
        starts.extend(memchr::memchr_iter(b'\n', bytes).map(|i| i + 1));
        Self {
            total_lines: count_lines(text),
            starts,
        }
    }

    /// 1-based line containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset)
    }

    /// Byte offset where 1-based `line` starts
    pub fn start_of(&self, line: usize) -> usize {
        self.starts
            .get(line.saturating_sub(1))
            .copied()
            .unwrap_or_else(|| self.starts.last().copied().unwrap_or(0))
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }
}

/// Number of lines in `text`. A trailing newline does not open a new line.
pub fn count_lines(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    let newlines = memchr::memchr_iter(b'\n', text.as_bytes()).count();
    if text.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}

/// Blank out literals and comments in `text`.
pub fn scan(text: &str, style: &LexStyle) -> Scan {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut out = bytes.to_vec();
    let lines = LineIndex::new(text);
    let mut comment_lines = FxHashSet::default();
    let mut line_start = true;
    let mut i = 0;

    // `to` is pushed past continuation bytes so no character is split
    let blank = |out: &mut Vec<u8>, from: usize, mut to: usize| {
        while to < out.len() && out[to] & 0xC0 == 0x80 {
            to += 1;
        }
        for b in &mut out[from..to] {
            if *b != b'\n' {
                *b = b' ';
            }
        }
    };

    while i < len {
        let b = bytes[i];
        if b == b'\n' {
            line_start = true;
            i += 1;
            continue;
        }
        if b == b' ' || b == b'\t' || b == b'\r' {
            i += 1;
            continue;
        }
        let at_line_start = line_start;
        line_start = false;
        let rest = &bytes[i..];

        if let Some(marker) = style
            .line_comments
            .iter()
            .find(|m| rest.starts_with(m.as_bytes()))
        {
            let end = memchr::memchr(b'\n', &rest[marker.len()..])
                .map(|p| i + marker.len() + p)
                .unwrap_or(len);
            comment_lines.insert(lines.line_of(i));
            blank(&mut out, i, end);
            i = end;
            continue;
        }

        if let Some((open, close)) = style
            .block_comments
            .iter()
            .find(|(open, _)| rest.starts_with(open.as_bytes()))
        {
            let body_start = i + open.len();
            let end = find_bytes(&bytes[body_start..], close.as_bytes())
                .map(|p| body_start + p + close.len())
                .unwrap_or(len);
            mark_lines(&lines, i, end, &mut comment_lines);
            blank(&mut out, i, end);
            i = end;
            continue;
        }

        if style.triple_quotes && (rest.starts_with(b"\"\"\"") || rest.starts_with(b"'''")) {
            let body_start = i + 3;
            let (end, body_end) = match find_bytes(&bytes[body_start..], &rest[..3]) {
                Some(p) => (body_start + p + 3, body_start + p),
                None => (len, len),
            };
            if style.docstrings && at_line_start {
                mark_lines(&lines, i, end, &mut comment_lines);
            }
            blank(&mut out, body_start, body_end);
            i = end;
            continue;
        }

        let quote = match b {
            b'"' => style.double_quote_strings,
            b'`' => style.backtick_strings,
            b'\'' if style.single_quote_strings => true,
            _ => false,
        };
        if quote {
            let (end, closed) = string_end(bytes, i, b, b != b'`');
            let body_end = if closed { end - 1 } else { end };
            blank(&mut out, i + 1, body_end);
            i = end;
            continue;
        }

        if b == b'\'' && style.double_quote_strings {
            if let Some(end) = char_literal_end(bytes, i) {
                blank(&mut out, i + 1, end - 1);
                i = end;
                continue;
            }
        }

        i += 1;
    }

    Scan {
        masked: into_masked(out),
        comment_lines,
        lines,
    }
}

/// Blanked ranges never split a character, so this is valid UTF-8. If it
/// somehow is not, stray non-ASCII bytes become spaces and offsets survive.
fn into_masked(out: Vec<u8>) -> String {
    match String::from_utf8(out) {
        Ok(masked) => masked,
        Err(e) => e
            .into_bytes()
            .into_iter()
            .map(|b| if b.is_ascii() { b as char } else { ' ' })
            .collect(),
    }
}

fn mark_lines(lines: &LineIndex, from: usize, to: usize, set: &mut FxHashSet<usize>) {
    let first = lines.line_of(from);
    let last = lines.line_of(to.saturating_sub(1).max(from));
    set.extend(first..=last);
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    memchr::memmem::find(haystack, needle)
}

/// End offset (exclusive) of a string literal opened at `start`, and
/// whether a closing quote was found.
fn string_end(bytes: &[u8], start: usize, quote: u8, stop_at_newline: bool) -> (usize, bool) {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if stop_at_newline => return (i, false),
            c if c == quote => return (i + 1, true),
            _ => i += 1,
        }
    }
    (bytes.len(), false)
}

/// `'x'` or `'\n'`-style char literal. A lone `'` (Rust lifetime, English
/// apostrophe in markup) is not a literal.
fn char_literal_end(bytes: &[u8], start: usize) -> Option<usize> {
    let next = *bytes.get(start + 1)?;
    if next == b'\\' {
        let from = (start + 3).min(bytes.len());
        let window = &bytes[from..bytes.len().min(start + 12).max(from)];
        return memchr::memchr(b'\'', window).map(|p| from + p + 1);
    }
    if next == b'\'' || next == b'\n' {
        return None;
    }
    // one UTF-8 scalar, then the closing quote
    let width = utf8_width(next);
    match bytes.get(start + 1 + width) {
        Some(b'\'') => Some(start + 2 + width),
        _ => None,
    }
}

fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}

/// Given the offset of an opening delimiter in masked text, return the
/// offset of its matching closer.
pub fn matching_close(masked: &str, open_at: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = masked.as_bytes();
    if bytes.get(open_at) != Some(&open) {
        return None;
    }
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open_at) {
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Where a function body lives once the parameter list has been closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRule {
    /// `{ ... }` only
    Braces,
    /// `{ ... }` or `=> expr;`
    BracesOrArrow,
    /// Arrow function: `=>` required before the body
    Arrow,
}

/// Locate the body that follows a closed parameter list at `after`.
/// Returns `(body_start, body_end)` byte offsets, `body_end` inclusive.
pub fn find_body(masked: &str, after: usize, rule: BodyRule) -> Option<(usize, usize)> {
    const MAX_TAIL: usize = 400;
    let bytes = masked.as_bytes();
    let mut i = after;
    let mut angle = 0i32;
    while i < bytes.len() && i - after <= MAX_TAIL {
        match bytes[i] {
            b'<' => {
                angle += 1;
                i += 1;
            }
            b'>' if i > 0 && !matches!(bytes[i - 1], b'-' | b'=') => {
                angle -= 1;
                i += 1;
            }
            b'{' => {
                if rule == BodyRule::Arrow {
                    return None;
                }
                let close = matching_close(masked, i, b'{', b'}')?;
                return Some((i, close));
            }
            b'=' if bytes.get(i + 1) == Some(&b'>') => {
                if rule == BodyRule::Braces {
                    return None;
                }
                let start = skip_ws(bytes, i + 2);
                // nothing but a closer after the arrow: truncated input
                if start >= bytes.len()
                    || matches!(bytes[start], b')' | b']' | b'}' | b',' | b';')
                {
                    return None;
                }
                if bytes.get(start) == Some(&b'{') {
                    let close = matching_close(masked, start, b'{', b'}')?;
                    return Some((start, close));
                }
                return Some((start, expression_end(bytes, start)));
            }
            b'=' if angle > 0 => i += 1,
            b';' | b'=' | b'}' => return None,
            _ => i += 1,
        }
    }
    None
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// End of an expression body: the first `;`, `,` or newline at depth zero.
/// `start` must be in bounds; the result is always `>= start` and in bounds.
fn expression_end(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0i32;
    let mut last = start;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                if depth == 0 {
                    return last;
                }
                depth -= 1;
            }
            b';' if depth == 0 => return i,
            b',' | b'\n' if depth == 0 => return last,
            _ => {}
        }
        if !b.is_ascii_whitespace() {
            last = i;
        }
    }
    last
}

/// Split a parameter list at top-level commas, ignoring commas nested in
/// `()`, `[]`, `{}` and `<>`.
pub fn split_params(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, b) in params.bytes().enumerate() {
        match b {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'>' if i > 0 && params.as_bytes()[i - 1] != b'=' && params.as_bytes()[i - 1] != b'-' => {
                depth -= 1
            }
            b',' if depth <= 0 => {
                parts.push(params[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(params[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Decision keywords and operators of a syntax family.
pub struct KeywordSet {
    keywords: Regex,
    operators: &'static [&'static str],
    /// Count ` ? ` as a ternary
    ternary: bool,
    /// Count `=>` (Rust match arms)
    arms: bool,
}

impl KeywordSet {
    /// Cyclomatic complexity of a masked body: 1 plus one per decision point.
    pub fn complexity(&self, masked_body: &str) -> u32 {
        let mut count = self.keywords.find_iter(masked_body).count();
        for op in self.operators {
            count += masked_body.matches(op).count();
        }
        if self.ternary {
            count += masked_body.matches(" ? ").count();
        }
        if self.arms {
            count += masked_body.matches("=>").count();
        }
        1 + count as u32
    }
}

fn keyword_regex(words: &[&str]) -> Regex {
    let pattern = format!(r"\b(?:{})\b", words.join("|"));
    Regex::new(&pattern).expect("valid regex")
}

pub fn keywords_for(family: Family) -> &'static KeywordSet {
    static C_FAMILY: OnceLock<KeywordSet> = OnceLock::new();
    static GO: OnceLock<KeywordSet> = OnceLock::new();
    static RUST: OnceLock<KeywordSet> = OnceLock::new();
    static PYTHON: OnceLock<KeywordSet> = OnceLock::new();
    static SCRIPT: OnceLock<KeywordSet> = OnceLock::new();
    static OTHER: OnceLock<KeywordSet> = OnceLock::new();

    match family {
        Family::CFamily => C_FAMILY.get_or_init(|| KeywordSet {
            keywords: keyword_regex(&["if", "for", "foreach", "while", "case", "catch"]),
            operators: &["&&", "||", "??"],
            ternary: true,
            arms: false,
        }),
        Family::Go => GO.get_or_init(|| KeywordSet {
            keywords: keyword_regex(&["if", "for", "case", "default"]),
            operators: &["&&", "||"],
            ternary: false,
            arms: false,
        }),
        Family::Rust => RUST.get_or_init(|| KeywordSet {
            keywords: keyword_regex(&["if", "for", "while"]),
            operators: &["&&", "||"],
            ternary: false,
            arms: true,
        }),
        Family::Python => PYTHON.get_or_init(|| KeywordSet {
            keywords: keyword_regex(&["if", "elif", "for", "while", "except", "and", "or"]),
            operators: &[],
            ternary: false,
            arms: false,
        }),
        Family::Script => SCRIPT.get_or_init(|| KeywordSet {
            keywords: keyword_regex(&["if", "for", "while", "case", "catch"]),
            operators: &["&&", "||", "??"],
            ternary: true,
            arms: false,
        }),
        Family::Other => OTHER.get_or_init(|| KeywordSet {
            keywords: keyword_regex(&["if", "elif", "elsif", "for", "while", "case", "catch"]),
            operators: &["&&", "||"],
            ternary: false,
            arms: false,
        }),
    }
}

/// Indentation width of a line, tabs counting as four columns.
pub fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("a"), 1);
        assert_eq!(count_lines("a\n"), 1);
        assert_eq!(count_lines("a\nb"), 2);
        assert_eq!(count_lines("a\n\n"), 2);
    }

    #[test]
    fn test_scan_masks_strings_and_comments() {
        let src = "x = \"if {\" // if }\ny = 1 /* for\nwhile */ z";
        let s = scan(src, &C_STYLE);
        assert_eq!(s.masked.len(), src.len());
        assert!(!s.masked.contains("if"));
        assert!(!s.masked.contains("while"));
        assert!(!s.masked.contains('{'));
        assert!(s.masked.contains('z'));
        assert_eq!(s.masked.matches('\n').count(), 2);
        let mut lines: Vec<usize> = s.comment_lines.iter().copied().collect();
        lines.sort();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_scan_leaves_rust_lifetimes_alone() {
        let src = "fn f<'a>(x: &'a str) -> char { 'x' }";
        let s = scan(src, &C_STYLE);
        assert!(s.masked.contains("<'a>"));
        assert!(s.masked.contains("' '"));
    }

    #[test]
    fn test_scan_python_docstrings_count_as_comments() {
        let src = "def f():\n    \"\"\"Doc\n    more\n    \"\"\"\n    return 1  # done\n";
        let s = scan(src, &PYTHON_STYLE);
        let mut lines: Vec<usize> = s.comment_lines.iter().copied().collect();
        lines.sort();
        assert_eq!(lines, vec![2, 3, 4, 5]);
        assert!(!s.masked.contains("more"));
    }

    #[test]
    fn test_line_index() {
        let idx = LineIndex::new("ab\ncd\nef");
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(2), 1);
        assert_eq!(idx.line_of(3), 2);
        assert_eq!(idx.line_of(7), 3);
        assert_eq!(idx.start_of(2), 3);
        assert_eq!(idx.total_lines(), 3);
    }

    #[test]
    fn test_matching_close_nested() {
        let text = "{ a { b } c }";
        assert_eq!(matching_close(text, 0, b'{', b'}'), Some(12));
        assert_eq!(matching_close(text, 4, b'{', b'}'), Some(8));
        assert_eq!(matching_close("{ open", 0, b'{', b'}'), None);
    }

    #[test]
    fn test_find_body_variants() {
        let braces = ") { return 1; }";
        assert_eq!(find_body(braces, 1, BodyRule::Braces), Some((2, 14)));
        assert_eq!(find_body(");", 1, BodyRule::Braces), None);

        let arrow = ") => x * 2;";
        let (start, end) = find_body(arrow, 1, BodyRule::BracesOrArrow).expect("arrow body");
        assert_eq!(&arrow[start..=end], "x * 2;");
        assert_eq!(find_body(") { }", 1, BodyRule::Arrow), None);
    }

    #[test]
    fn test_arrow_at_end_of_text_has_no_body() {
        let text = "(x) =>";
        assert_eq!(find_body(text, 3, BodyRule::BracesOrArrow), None);
        assert_eq!(find_body("(x) =>  \n\t", 3, BodyRule::Arrow), None);
        assert_eq!(find_body(") =>\n}", 1, BodyRule::BracesOrArrow), None);

        let (start, end) = find_body("() => x", 2, BodyRule::Arrow).expect("one-token body");
        assert_eq!((start, end), (6, 6));
    }

    #[test]
    fn test_unterminated_string_with_multibyte_tail_stays_masked() {
        let src = "f() {\n// if if if\n}\nlet s = 'caf\u{e9}\nlet t = \"\u{e9}";
        let s = scan(src, &SCRIPT_STYLE);
        assert_eq!(s.masked.len(), src.len());
        assert!(!s.masked.contains("if"));
        assert!(!s.masked.contains("caf"));
        assert!(s.masked.contains("let t"));
        assert!(s.masked.is_ascii());
    }

    #[test]
    fn test_unterminated_docstring_is_masked_to_the_end() {
        let src = "def f():\n    \"\"\"if while \u{fc}";
        let s = scan(src, &PYTHON_STYLE);
        assert_eq!(s.masked.len(), src.len());
        assert!(!s.masked.contains("while"));
    }

    #[test]
    fn test_split_params_respects_nesting() {
        assert_eq!(split_params("a, b"), vec!["a", "b"]);
        assert_eq!(
            split_params("Dictionary<string, int> map, int x"),
            vec!["Dictionary<string, int> map", "int x"]
        );
        assert_eq!(split_params("f func(a, b int) error, c"), vec!["f func(a, b int) error", "c"]);
        assert!(split_params("  ").is_empty());
    }

    #[test]
    fn test_keyword_complexity_is_word_bounded() {
        let kw = keywords_for(Family::CFamily);
        assert_eq!(kw.complexity("notify(); format(); iffy = 1;"), 1);
        assert_eq!(kw.complexity("if (a && b) { } else if (c) { }"), 4);
        assert_eq!(kw.complexity("x = a ? b : c;"), 2);
    }

    #[test]
    fn test_go_default_counts_like_case() {
        let kw = keywords_for(Family::Go);
        assert_eq!(kw.complexity("switch k {\ncase 1:\ncase 2:\ndefault:\n}"), 4);
    }

    #[test]
    fn test_python_keywords() {
        let kw = keywords_for(Family::Python);
        assert_eq!(kw.complexity("if a and b:\n    pass\nelif c:\n    pass\n"), 4);
        assert_eq!(kw.complexity("return orange"), 1);
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("    x"), 4);
        assert_eq!(indent_width("\tx"), 4);
        assert_eq!(indent_width("x"), 0);
    }
}
