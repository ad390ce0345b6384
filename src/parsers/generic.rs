//! Fallback parser for files no dedicated strategy understands
//!
//! Comment delimiters and decision keywords come from the language family
//! (a minimal default set for unknown languages). Functions are whatever a
//! loose `keyword name(` header pattern finds, bounded by braces or, for
//! `def`, by indentation.

use super::clike::count_params;
use super::heuristic::{
    find_body, keywords_for, matching_close, scan, style_for, BodyRule,
};
use super::python::indented_functions;
use super::Language;
use crate::models::{FunctionRecord, ParseResult};
use regex::Regex;
use std::sync::OnceLock;

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(?:function|func|fn|sub|void|int|bool|string|double|float)[ \t]+(?P<name>[A-Za-z_]\w*)[ \t]*\(",
        )
        .expect("valid regex")
    })
}

fn def_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^(?P<indent>[ \t]*)def[ \t]+(?P<name>[A-Za-z_]\w*)[ \t]*\(")
            .expect("valid regex")
    })
}

pub fn parse(text: &str, language: Language) -> ParseResult {
    let family = language.family();
    let scanned = scan(text, &style_for(family));
    let masked = scanned.masked.as_str();
    let keywords = keywords_for(family);

    let mut functions: Vec<FunctionRecord> = Vec::new();
    for caps in header_regex().captures_iter(masked) {
        let (Some(name), Some(whole)) = (caps.name("name"), caps.get(0)) else {
            continue;
        };
        let open = whole.end() - 1;
        let Some(close) = matching_close(masked, open, b'(', b')') else {
            continue;
        };
        let Some((body_start, body_end)) = find_body(masked, close + 1, BodyRule::Braces) else {
            continue;
        };
        functions.push(FunctionRecord::new(
            name.as_str(),
            scanned.lines.line_of(name.start()),
            scanned.lines.line_of(body_end),
            count_params(&masked[open + 1..close], language),
            keywords.complexity(&masked[body_start..=body_end]),
        ));
    }
    functions.extend(indented_functions(&scanned, def_regex(), family));

    ParseResult::new(
        language,
        scanned.lines.total_lines(),
        scanned.comment_line_count(),
    )
    .with_functions(functions)
}
