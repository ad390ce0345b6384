//! Razor component / view templates
//!
//! C# lives inside `@code { }`, `@functions { }` and `@{ }` blocks. Each
//! block is cut out by brace matching, run through the C# heuristic, and
//! its line numbers shifted back into file coordinates. Lifecycle overrides
//! and `@onxxx="Handler"` bindings that the heuristic did not recover are
//! synthesized as zero-parameter records.

use super::clike;
use super::heuristic::{count_lines, matching_close, scan, LineIndex, C_STYLE, RAZOR_MARKUP_STYLE};
use super::Language;
use crate::models::{FunctionRecord, ParseResult};
use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Component lifecycle methods the framework calls by name.
pub const LIFECYCLE_METHODS: &[&str] = &[
    "OnInitialized",
    "OnInitializedAsync",
    "OnParametersSet",
    "OnParametersSetAsync",
    "OnAfterRender",
    "OnAfterRenderAsync",
    "Dispose",
    "DisposeAsync",
    "SetParametersAsync",
    "ShouldRender",
];

fn block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@(?:(?:code|functions)\b[ \t\r\n]*)?\{").expect("valid regex"))
}

fn lifecycle_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let names = LIFECYCLE_METHODS.join("|");
        Regex::new(&format!(
            r"(?:protected\s+)?(?:override\s+)?(?:async\s+)?(?:void|Task|ValueTask|bool)\s+(?P<name>{names})\s*\("
        ))
        .expect("valid regex")
    })
}

fn handler_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"@on\w+\s*=\s*"?(?P<name>[A-Za-z_]\w*)"?"#).expect("valid regex")
    })
}

/// A brace-delimited C# region inside the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CodeRegion {
    /// Offset just after the opening brace
    start: usize,
    /// Offset of the closing brace
    end: usize,
}

pub fn parse(text: &str) -> ParseResult {
    let markup = scan(text, &RAZOR_MARKUP_STYLE);
    let lines = LineIndex::new(text);
    let mut comment_lines: FxHashSet<usize> = markup.comment_lines.clone();
    let mut functions: Vec<FunctionRecord> = Vec::new();
    // markup with every code region's C# comments and strings blanked too
    let mut searchable = markup.masked.clone();

    for region in code_regions(&markup.masked) {
        let line_offset = lines.line_of(region.start) - 1;
        let (found, scanned) = clike::parse_functions(&text[region.start..region.end], Language::CSharp);
        searchable.replace_range(region.start..region.end, &scanned.masked);
        comment_lines.extend(scanned.comment_lines.iter().map(|l| l + line_offset));
        functions.extend(found.into_iter().map(|mut f| {
            f.start_line += line_offset;
            f.end_line += line_offset;
            f
        }));
    }

    let mut known: FxHashSet<String> = functions.iter().map(|f| f.name.clone()).collect();

    for caps in lifecycle_regex().captures_iter(&searchable) {
        let Some(name) = caps.name("name") else {
            continue;
        };
        if known.insert(name.as_str().to_string()) {
            let line = lines.line_of(name.start());
            functions.push(FunctionRecord::new(name.as_str(), line, line, 0, 1));
        }
    }

    for caps in handler_regex().captures_iter(&searchable) {
        let Some(name) = caps.name("name") else {
            continue;
        };
        if known.insert(name.as_str().to_string()) {
            let line = lines.line_of(name.start());
            functions.push(FunctionRecord::new(name.as_str(), line, line, 0, 1));
        }
    }

    ParseResult::new(Language::Razor, count_lines(text), comment_lines.len())
        .with_functions(functions)
}

/// Find `@code {}`, `@functions {}` and `@{}` regions in comment-masked markup.
fn code_regions(masked: &str) -> Vec<CodeRegion> {
    let mut regions = Vec::new();
    let mut resume = 0;
    for m in block_regex().find_iter(masked) {
        if m.start() < resume {
            continue;
        }
        let open = m.end() - 1;
        // braces inside C# strings or comments must not close the block
        let tail = scan(&masked[open..], &C_STYLE);
        // an unclosed block runs to the end of the file
        let close = matching_close(&tail.masked, 0, b'{', b'}').unwrap_or(tail.masked.len());
        let region = CodeRegion {
            start: open + 1,
            end: open + close,
        };
        resume = region.end;
        regions.push(region);
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = r#"@page "/counter"
@* Counter page *@
<h1>Counter</h1>
<!-- the button -->
<button @onclick="IncrementCount">Click</button>
<button @onclick="Reset">Reset</button>
<button @onclick="IncrementCount">Again</button>

@code {
    private int currentCount = 0;

    // bump the counter
    private void IncrementCount()
    {
        if (currentCount < 10)
        {
            currentCount++;
        }
    }

    protected override async Task OnInitializedAsync()
    {
        await Task.Delay(1);
    }

    private string Label(int n, string prefix) => prefix + n;
}
"#;

    #[test]
    fn test_component_functions() {
        let result = parse(COMPONENT);
        let names: Vec<&str> = result.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Reset", "IncrementCount", "OnInitializedAsync", "Label"]);

        let inc = &result.functions[1];
        assert_eq!(inc.start_line, 13);
        assert_eq!(inc.end_line, 19);
        assert_eq!(inc.complexity, 2);
        assert_eq!(inc.parameter_count, 0);

        let label = &result.functions[3];
        assert_eq!(label.parameter_count, 2);
        assert_eq!(label.start_line, 26);

        let reset = &result.functions[0];
        assert_eq!((reset.start_line, reset.end_line), (6, 6));
        assert_eq!(reset.parameter_count, 0);
    }

    #[test]
    fn test_component_comment_lines() {
        let result = parse(COMPONENT);
        // @* *@, <!-- -->, and the // comment inside @code
        assert_eq!(result.comment_lines, 3);
        assert_eq!(result.total_lines, 27);
    }

    #[test]
    fn test_lifecycle_outside_code_block_is_synthesized() {
        let src = "<p>hi</p>\n@functions {\n}\n@* protected override void OnInitialized() *@\n";
        let result = parse(src);
        assert!(result.functions.is_empty());

        let src = "<p>hi</p>\n@{\n    protected override void OnAfterRender(bool first) \n}\n";
        let result = parse(src);
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].name, "OnAfterRender");
        assert_eq!(result.functions[0].start_line, 3);
        assert_eq!(result.functions[0].parameter_count, 0);
    }

    #[test]
    fn test_commented_out_members_are_not_synthesized() {
        let src = "@code {\n    // protected override void OnInitialized() { }\n    /* void Dispose() */\n    string s = \"@onclick=\\\"Ghost\\\"\";\n}\n";
        let result = parse(src);
        assert!(result.functions.is_empty(), "got {:?}", result.functions);
        assert_eq!(result.comment_lines, 2);
    }

    #[test]
    fn test_expression_body_cut_off_at_block_end() {
        let result = parse("@code {\n    int F() =>\n}\n");
        assert!(result.functions.is_empty());
        assert_eq!(result.total_lines, 3);
    }

    #[test]
    fn test_unclosed_code_block_runs_to_end_of_file() {
        let src = "<p>hi</p>\n@code {\n    // protected override void OnInitialized() { }\n    private int Count() => items.Length;\n";
        let result = parse(src);
        let names: Vec<&str> = result.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Count"]);
        assert_eq!(result.functions[0].start_line, 4);
    }

    #[test]
    fn test_inline_block_functions() {
        let src = "@{\n    string Title() { return \"}\"; }\n}\n<p>@Title()</p>\n";
        let result = parse(src);
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].name, "Title");
        assert_eq!(result.functions[0].start_line, 2);
    }
}
