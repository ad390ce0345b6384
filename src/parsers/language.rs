//! Language classification by file extension

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every language the analyzer knows, plus a generic catch-all.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Java,
    C,
    Cpp,
    CSharp,
    Razor,
    Generic,
}

/// Syntax family, used to pick keyword and comment tables for heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    CFamily,
    Go,
    Rust,
    Python,
    Script,
    Other,
}

impl Language {
    pub const ALL: [Language; 11] = [
        Language::Go,
        Language::Rust,
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::CSharp,
        Language::Razor,
        Language::Generic,
    ];

    /// Map a bare extension (no dot) to a language. Case-insensitive.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "go" => Language::Go,
            "rs" => Language::Rust,
            "py" | "pyi" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "java" => Language::Java,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            "cs" => Language::CSharp,
            "razor" | "cshtml" => Language::Razor,
            _ => Language::Generic,
        }
    }

    /// Stable lowercase tag
    pub fn name(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Razor => "razor",
            Language::Generic => "generic",
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Language::Go => Family::Go,
            Language::Rust => Family::Rust,
            Language::Python => Family::Python,
            Language::JavaScript | Language::TypeScript => Family::Script,
            Language::Java | Language::C | Language::Cpp | Language::CSharp | Language::Razor => {
                Family::CFamily
            }
            Language::Generic => Family::Other,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a path by its extension. Unknown or missing extensions map to
/// [`Language::Generic`].
pub fn classify(path: &Path) -> Language {
    path.extension()
        .and_then(|e| e.to_str())
        .map(Language::from_extension)
        .unwrap_or(Language::Generic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(classify(&PathBuf::from("main.go")), Language::Go);
        assert_eq!(classify(&PathBuf::from("lib.rs")), Language::Rust);
        assert_eq!(classify(&PathBuf::from("app.py")), Language::Python);
        assert_eq!(classify(&PathBuf::from("ui.jsx")), Language::JavaScript);
        assert_eq!(classify(&PathBuf::from("ui.tsx")), Language::TypeScript);
        assert_eq!(classify(&PathBuf::from("Main.java")), Language::Java);
        assert_eq!(classify(&PathBuf::from("io.h")), Language::C);
        assert_eq!(classify(&PathBuf::from("io.hpp")), Language::Cpp);
        assert_eq!(classify(&PathBuf::from("Program.cs")), Language::CSharp);
        assert_eq!(classify(&PathBuf::from("Index.razor")), Language::Razor);
        assert_eq!(classify(&PathBuf::from("Index.cshtml")), Language::Razor);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify(&PathBuf::from("MAIN.GO")), Language::Go);
        assert_eq!(classify(&PathBuf::from("Widget.CPP")), Language::Cpp);
    }

    #[test]
    fn test_classify_unknown_is_generic() {
        assert_eq!(classify(&PathBuf::from("notes.txt")), Language::Generic);
        assert_eq!(classify(&PathBuf::from("Makefile")), Language::Generic);
        assert_eq!(classify(&PathBuf::from(".bashrc")), Language::Generic);
    }
}
