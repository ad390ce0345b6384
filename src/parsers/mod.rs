//! Source parsers
//!
//! Every file gets exactly one [`ParseResult`]. Languages with a tree-sitter
//! grammar are parsed exactly; when that fails (no grammar, syntax errors)
//! the brace or indentation heuristic for the language family takes over.
//! Razor templates and unknown languages have their own strategies. None of
//! these paths can fail: the worst case is a result with no functions.

mod clike;
pub mod exact;
mod generic;
pub mod grammar;
pub mod heuristic;
mod language;
mod python;
mod razor;

pub use language::{classify, Family, Language};

use crate::models::ParseResult;
use std::path::Path;
use tracing::debug;

/// Classify `path` and parse `content` with the best available strategy.
pub fn parse(path: &Path, content: &[u8]) -> ParseResult {
    let text = String::from_utf8_lossy(content);
    parse_text(&text, classify(path), path)
}

/// Parse already-decoded text as `language`.
pub fn parse_text(text: &str, language: Language, path: &Path) -> ParseResult {
    match language {
        Language::Razor => razor::parse(text),
        Language::Generic => generic::parse(text, language),
        _ => exact::parse(text, language, path).unwrap_or_else(|| {
            debug!("{}: falling back to heuristic parse", path.display());
            heuristic_parse(text, language)
        }),
    }
}

/// Brace/indentation parse for a language whose exact parse was rejected.
pub fn heuristic_parse(text: &str, language: Language) -> ParseResult {
    if language == Language::Python {
        return python::parse_heuristic(text);
    }
    let (functions, scanned) = clike::parse_functions(text, language);
    ParseResult::new(
        language,
        scanned.lines.total_lines(),
        scanned.comment_line_count(),
    )
    .with_functions(functions)
}
