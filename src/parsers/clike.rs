//! Regex + brace heuristic for brace-delimited languages
//!
//! Each language gets a small set of header patterns. A pattern must end
//! right at the opening `(` of the parameter list (or at a lone arrow
//! parameter); the parameter list is then closed by paren matching on the
//! masked text and the body located with [`find_body`].

use super::heuristic::{
    find_body, keywords_for, matching_close, scan, split_params, style_for, BodyRule, Scan,
};
use super::Language;
use crate::models::FunctionRecord;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Words that look like a call or declaration head but introduce statements.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "for", "foreach", "while", "do", "switch", "case", "catch", "try", "return",
    "new", "throw", "delete", "sizeof", "typeof", "await", "yield", "using", "lock", "fixed",
    "synchronized", "goto", "when", "function", "defined", "elif", "match", "loop", "assert",
    "static_assert", "decltype", "alignof", "checked", "unchecked", "nameof", "default",
];

struct HeaderRule {
    pattern: Regex,
    body: BodyRule,
}

impl HeaderRule {
    fn new(pattern: &str, body: BodyRule) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid regex"),
            body,
        }
    }
}

const C_SIGNATURE: &str = r"(?m)^[ \t]*(?:@\w+(?:\([^)\n]*\))?[ \t]+)*(?:\[[^\]\n]*\][ \t]*)*(?P<sig>(?:[A-Za-z_~][\w:<>,\.\*&\[\]\?]*[ \t\*&]+)*)(?P<name>~?[A-Za-z_]\w*(?:::~?[A-Za-z_]\w*)*)[ \t]*\(";

fn rules_for(language: Language) -> &'static [HeaderRule] {
    static GO: OnceLock<Vec<HeaderRule>> = OnceLock::new();
    static RUST: OnceLock<Vec<HeaderRule>> = OnceLock::new();
    static SCRIPT: OnceLock<Vec<HeaderRule>> = OnceLock::new();
    static C_FAMILY: OnceLock<Vec<HeaderRule>> = OnceLock::new();
    static CSHARP: OnceLock<Vec<HeaderRule>> = OnceLock::new();

    match language {
        Language::Go => GO.get_or_init(|| {
            vec![
                HeaderRule::new(
                    r"(?m)^[ \t]*func[ \t]*(?:\([^)]*\)[ \t]*)?(?P<name>[A-Za-z_]\w*)[ \t]*(?:\[[^\]]*\])?\(",
                    BodyRule::Braces,
                ),
                HeaderRule::new(
                    r"(?P<name>[A-Za-z_]\w*)[ \t]*:?=[ \t]*func[ \t]*\(",
                    BodyRule::Braces,
                ),
            ]
        }),
        Language::Rust => RUST.get_or_init(|| {
            vec![HeaderRule::new(
                r#"(?m)^[ \t]*(?:pub(?:\([^)]*\))?[ \t]+)?(?:(?:const|async|unsafe|default)[ \t]+)*(?:extern[ \t]+"[^"]*"[ \t]+)?fn[ \t]+(?P<name>[A-Za-z_]\w*)[ \t]*(?:<[^{(]*>)?[ \t]*\("#,
                BodyRule::Braces,
            )]
        }),
        Language::JavaScript | Language::TypeScript => SCRIPT.get_or_init(|| {
            vec![
                HeaderRule::new(
                    r"(?m)^[ \t]*(?:export[ \t]+)?(?:default[ \t]+)?(?:async[ \t]+)?function[ \t]*\*?[ \t]*(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?:<[^>\n]*>)?[ \t]*\(",
                    BodyRule::Braces,
                ),
                HeaderRule::new(
                    r"(?P<name>[A-Za-z_$][\w$]*)[ \t]*[=:][ \t]*(?:async[ \t]+)?function\b[ \t]*\*?[ \t]*(?:[A-Za-z_$][\w$]*)?[ \t]*\(",
                    BodyRule::Braces,
                ),
                HeaderRule::new(
                    r"\b(?:const|let|var)[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?::[^=\n]+)?=[ \t]*(?:async[ \t]*)?(?:<[^>\n]*>)?\(",
                    BodyRule::Arrow,
                ),
                HeaderRule::new(
                    r"\b(?:const|let|var)[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*=[ \t]*(?:async[ \t]+)?(?P<param>[A-Za-z_$][\w$]*)[ \t]*=>",
                    BodyRule::Arrow,
                ),
                HeaderRule::new(
                    r"(?m)^[ \t]*(?:(?:public|private|protected|static|async|readonly|override|abstract|get|set)[ \t]+)*(?P<name>[A-Za-z_$#][\w$]*)[ \t]*(?:<[^>\n]*>)?\(",
                    BodyRule::Braces,
                ),
            ]
        }),
        Language::CSharp | Language::Razor => CSHARP.get_or_init(|| {
            vec![
                HeaderRule::new(C_SIGNATURE, BodyRule::BracesOrArrow),
                HeaderRule::new(
                    r"(?m)^[ \t]*(?:(?:public|private|protected|internal|static|virtual|override|abstract|sealed|new|required)[ \t]+)*(?P<sig>[\w<>\[\],\.\?]+[ \t]+)(?P<name>[A-Za-z_]\w*)[ \t]*\{[ \t\r\n]*(?:get|set|init)\b",
                    BodyRule::Braces,
                ),
            ]
        }),
        _ => C_FAMILY.get_or_init(|| vec![HeaderRule::new(C_SIGNATURE, BodyRule::Braces)]),
    }
}

/// Recover functions from `text` with the heuristic for `language`.
pub fn parse_functions(text: &str, language: Language) -> (Vec<FunctionRecord>, Scan) {
    let scanned = scan(text, &style_for(language.family()));
    let functions = functions_in(&scanned, language);
    (functions, scanned)
}

/// Same as [`parse_functions`] but on an already scanned text.
pub fn functions_in(scanned: &Scan, language: Language) -> Vec<FunctionRecord> {
    let masked = scanned.masked.as_str();
    let keywords = keywords_for(language.family());
    let mut found: BTreeMap<usize, FunctionRecord> = BTreeMap::new();

    for rule in rules_for(language) {
        for caps in rule.pattern.captures_iter(masked) {
            let Some(name) = caps.name("name") else {
                continue;
            };
            if found.contains_key(&name.start()) || is_control_word(name.as_str()) {
                continue;
            }
            if let Some(sig) = caps.name("sig") {
                let first = sig.as_str().split_whitespace().next().unwrap_or("");
                if is_control_word(first) || first == "else" {
                    continue;
                }
            }

            let whole = caps.get(0).map(|m| m.end()).unwrap_or(name.end());
            let mut is_property = false;
            let (parameter_count, after_params) = if let Some(param) = caps.name("param") {
                (1, param.end())
            } else if masked.as_bytes().get(whole.wrapping_sub(1)) == Some(&b'(') {
                let open = whole - 1;
                let Some(close) = matching_close(masked, open, b'(', b')') else {
                    continue;
                };
                (count_params(&masked[open + 1..close], language), close + 1)
            } else {
                // property accessor: the brace that matched is the body
                is_property = true;
                (0, name.end())
            };

            let Some((body_start, body_end)) = find_body(masked, after_params, rule.body) else {
                continue;
            };
            // auto-properties have no code of their own
            let inner = masked.get(body_start + 1..body_end).unwrap_or("");
            if is_property && !inner.contains(['{', '=']) {
                continue;
            }

            let start_line = scanned.lines.line_of(name.start());
            let end_line = scanned.lines.line_of(body_end);
            let complexity = keywords.complexity(&masked[body_start..=body_end]);
            found.insert(
                name.start(),
                FunctionRecord::new(
                    name.as_str(),
                    start_line,
                    end_line,
                    parameter_count,
                    complexity,
                ),
            );
        }
    }

    found.into_values().collect()
}

fn is_control_word(word: &str) -> bool {
    CONTROL_KEYWORDS.contains(&word)
}

/// Count declared parameters in a raw parameter list.
pub fn count_params(params: &str, language: Language) -> usize {
    let parts = split_params(params);
    if matches!(language, Language::C | Language::Cpp) && parts.len() == 1 && parts[0] == "void"
    {
        return 0;
    }
    parts
        .into_iter()
        .filter(|p| !is_receiver(p, language))
        .count()
}

fn is_receiver(param: &str, language: Language) -> bool {
    match language {
        Language::Rust => {
            let p = param.trim_start_matches('&').trim();
            let p = p.strip_prefix("mut ").unwrap_or(p).trim();
            p == "self" || p.starts_with("self:") || p.starts_with("self ")
                || param.starts_with("&'") && param.ends_with("self")
        }
        Language::Python => {
            let name = param.split([':', '=']).next().unwrap_or("").trim();
            name == "self" || name == "cls" || name == "*" || name == "/"
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(records: &[FunctionRecord]) -> Vec<&str> {
        records.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_go_functions_and_methods() {
        let src = r#"package main

func add(a, b int) int {
	return a + b
}

func (s *Server) Handle(w http.ResponseWriter, r *http.Request) {
	if r == nil {
		return
	}
	for _, h := range s.hooks {
		h()
	}
}
"#;
        let (funcs, _) = parse_functions(src, Language::Go);
        assert_eq!(names(&funcs), vec!["add", "Handle"]);
        assert_eq!(funcs[0].parameter_count, 2);
        assert_eq!(funcs[0].start_line, 3);
        assert_eq!(funcs[0].end_line, 5);
        assert_eq!(funcs[0].complexity, 1);
        assert_eq!(funcs[1].parameter_count, 2);
        assert_eq!(funcs[1].complexity, 3);
    }

    #[test]
    fn test_javascript_forms() {
        let src = r#"
function plain(a, b) {
  return a || b;
}
const arrow = (x) => {
  if (x) { return 1; }
  return 2;
};
const single = y => y * 2;
obj.handler = function (evt) {
  console.log("function fake() {");
};
class Widget {
  render(props) {
    return props;
  }
}
"#;
        let (funcs, _) = parse_functions(src, Language::JavaScript);
        let got = names(&funcs);
        assert_eq!(got, vec!["plain", "arrow", "single", "handler", "render"]);
        assert_eq!(funcs[0].complexity, 2);
        assert_eq!(funcs[1].complexity, 2);
        assert_eq!(funcs[2].parameter_count, 1);
        assert_eq!(funcs[2].start_line, funcs[2].end_line);
    }

    #[test]
    fn test_truncated_arrow_bodies_are_skipped() {
        let (funcs, _) = parse_functions("const f = (x) =>", Language::JavaScript);
        assert!(funcs.is_empty());

        let src = "const g = (x) => x + 1;\nconst f = (y) =>";
        let (funcs, _) = parse_functions(src, Language::TypeScript);
        assert_eq!(names(&funcs), vec!["g"]);

        let (funcs, _) = parse_functions("class A {\n    int F() =>\n}\n", Language::CSharp);
        assert!(funcs.is_empty());
    }

    #[test]
    fn test_c_family_skips_prototypes_and_control_flow() {
        let src = r#"
int helper(int x);

static int *make(void) {
    return 0;
}

int main(int argc, char **argv) {
    if (argc > 1) {
        while (argc--) { }
    }
    return helper(argc);
}
"#;
        let (funcs, _) = parse_functions(src, Language::C);
        assert_eq!(names(&funcs), vec!["make", "main"]);
        assert_eq!(funcs[0].parameter_count, 0);
        assert_eq!(funcs[1].parameter_count, 2);
        assert_eq!(funcs[1].complexity, 3);
    }

    #[test]
    fn test_java_annotated_method() {
        let src = r#"
public class Greeter {
    @Override public String toString() {
        return "x";
    }

    private Map<String, Integer> counts(List<String> words, boolean strict) {
        for (String w : words) { }
        return null;
    }
}
"#;
        let (funcs, _) = parse_functions(src, Language::Java);
        assert_eq!(names(&funcs), vec!["toString", "counts"]);
        assert_eq!(funcs[1].parameter_count, 2);
    }

    #[test]
    fn test_rust_functions_skip_self() {
        let src = r#"
impl Foo {
    pub fn new(a: u8, b: u8) -> Self {
        Self { a, b }
    }

    pub(crate) async fn run(&mut self, n: usize) {
        match n {
            0 => {}
            _ => {}
        }
    }
}
"#;
        let (funcs, _) = parse_functions(src, Language::Rust);
        assert_eq!(names(&funcs), vec!["new", "run"]);
        assert_eq!(funcs[0].parameter_count, 2);
        assert_eq!(funcs[1].parameter_count, 1);
        assert_eq!(funcs[1].complexity, 3);
    }

    #[test]
    fn test_count_params() {
        assert_eq!(count_params("void", Language::C), 0);
        assert_eq!(count_params("", Language::Go), 0);
        assert_eq!(count_params("&self, x: u8", Language::Rust), 1);
        assert_eq!(count_params("self, a, b=2", Language::Python), 2);
        assert_eq!(count_params("ref int a, out string b, params object[] rest", Language::CSharp), 3);
    }
}
