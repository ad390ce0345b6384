//! Per-language node-kind tables for the tree-sitter grammars
//!
//! The exact parser and the tree-based metrics are written once and driven
//! by these tables, so adding a grammar means adding a table here.

use super::Language;

/// Control-flow token emitted into a structural fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
    If,
    Loop,
    Switch,
    Case,
    Assign,
    Return,
    Try,
    Catch,
}

impl Token {
    pub fn as_str(&self) -> &'static str {
        match self {
            Token::If => "IF",
            Token::Loop => "LOOP",
            Token::Switch => "SWITCH",
            Token::Case => "CASE",
            Token::Assign => "ASSIGN",
            Token::Return => "RETURN",
            Token::Try => "TRY",
            Token::Catch => "CATCH",
        }
    }
}

#[derive(Debug)]
pub struct Grammar {
    pub language: Language,
    /// Function-like declarations, including anonymous ones
    pub function_kinds: &'static [&'static str],
    /// Nodes that add one to cyclomatic complexity by themselves
    pub decision_kinds: &'static [&'static str],
    /// Binary expression kinds whose operator token is checked against
    /// `boolean_operators`
    pub binary_kinds: &'static [&'static str],
    pub boolean_operators: &'static [&'static str],
    pub comment_kinds: &'static [&'static str],
    /// Constructs whose body sits one level deeper
    pub nesting_kinds: &'static [&'static str],
    pub import_kinds: &'static [&'static str],
    /// Exception handler clauses
    pub catch_kinds: &'static [&'static str],
    /// Statement block kinds
    pub block_kinds: &'static [&'static str],
    pub fingerprint: &'static [(&'static str, Token)],
}

impl Grammar {
    pub fn is_function(&self, kind: &str) -> bool {
        self.function_kinds.contains(&kind)
    }

    pub fn is_decision(&self, kind: &str) -> bool {
        self.decision_kinds.contains(&kind)
    }

    pub fn is_comment(&self, kind: &str) -> bool {
        self.comment_kinds.contains(&kind)
    }

    pub fn is_nesting(&self, kind: &str) -> bool {
        self.nesting_kinds.contains(&kind)
    }

    pub fn is_import(&self, kind: &str) -> bool {
        self.import_kinds.contains(&kind)
    }

    pub fn is_catch(&self, kind: &str) -> bool {
        self.catch_kinds.contains(&kind)
    }

    pub fn is_block(&self, kind: &str) -> bool {
        self.block_kinds.contains(&kind)
    }

    pub fn token_for(&self, kind: &str) -> Option<Token> {
        self.fingerprint
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, t)| *t)
    }
}

/// Grammar table for a language, `None` where no tree-sitter grammar exists.
pub fn for_language(language: Language) -> Option<&'static Grammar> {
    match language {
        Language::Go => Some(&GO),
        Language::Rust => Some(&RUST),
        Language::Python => Some(&PYTHON),
        Language::JavaScript => Some(&JAVASCRIPT),
        Language::TypeScript => Some(&TYPESCRIPT),
        Language::Java => Some(&JAVA),
        Language::C => Some(&C),
        Language::Cpp => Some(&CPP),
        Language::CSharp => Some(&CSHARP),
        Language::Razor | Language::Generic => None,
    }
}

static GO: Grammar = Grammar {
    language: Language::Go,
    function_kinds: &["function_declaration", "method_declaration", "func_literal"],
    decision_kinds: &[
        "if_statement",
        "for_statement",
        "expression_case",
        "type_case",
        "default_case",
        "communication_case",
    ],
    binary_kinds: &["binary_expression"],
    boolean_operators: &["&&", "||"],
    comment_kinds: &["comment"],
    nesting_kinds: &[
        "if_statement",
        "for_statement",
        "expression_switch_statement",
        "type_switch_statement",
        "select_statement",
        "expression_case",
        "type_case",
        "default_case",
        "communication_case",
    ],
    import_kinds: &["import_spec"],
    catch_kinds: &[],
    block_kinds: &["block"],
    fingerprint: &[
        ("if_statement", Token::If),
        ("for_statement", Token::Loop),
        ("expression_switch_statement", Token::Switch),
        ("type_switch_statement", Token::Switch),
        ("select_statement", Token::Switch),
        ("expression_case", Token::Case),
        ("type_case", Token::Case),
        ("default_case", Token::Case),
        ("communication_case", Token::Case),
        ("assignment_statement", Token::Assign),
        ("short_var_declaration", Token::Assign),
        ("inc_statement", Token::Assign),
        ("dec_statement", Token::Assign),
        ("return_statement", Token::Return),
    ],
};

static RUST: Grammar = Grammar {
    language: Language::Rust,
    function_kinds: &["function_item", "closure_expression"],
    decision_kinds: &[
        "if_expression",
        "while_expression",
        "for_expression",
        "match_arm",
    ],
    binary_kinds: &["binary_expression"],
    boolean_operators: &["&&", "||"],
    comment_kinds: &["line_comment", "block_comment"],
    nesting_kinds: &[
        "if_expression",
        "while_expression",
        "for_expression",
        "loop_expression",
        "match_expression",
        "match_arm",
    ],
    import_kinds: &["use_declaration"],
    catch_kinds: &[],
    block_kinds: &["block"],
    fingerprint: &[
        ("if_expression", Token::If),
        ("while_expression", Token::Loop),
        ("for_expression", Token::Loop),
        ("loop_expression", Token::Loop),
        ("match_expression", Token::Switch),
        ("match_arm", Token::Case),
        ("let_declaration", Token::Assign),
        ("assignment_expression", Token::Assign),
        ("compound_assignment_expr", Token::Assign),
        ("return_expression", Token::Return),
    ],
};

static PYTHON: Grammar = Grammar {
    language: Language::Python,
    function_kinds: &["function_definition", "lambda"],
    decision_kinds: &[
        "if_statement",
        "elif_clause",
        "for_statement",
        "while_statement",
        "except_clause",
        "conditional_expression",
        "boolean_operator",
        "if_clause",
        "case_clause",
    ],
    binary_kinds: &[],
    boolean_operators: &[],
    comment_kinds: &["comment"],
    nesting_kinds: &[
        "if_statement",
        "elif_clause",
        "for_statement",
        "while_statement",
        "try_statement",
        "with_statement",
        "match_statement",
        "case_clause",
    ],
    import_kinds: &["import_statement", "import_from_statement"],
    catch_kinds: &["except_clause"],
    block_kinds: &["block"],
    fingerprint: &[
        ("if_statement", Token::If),
        ("elif_clause", Token::If),
        ("for_statement", Token::Loop),
        ("while_statement", Token::Loop),
        ("match_statement", Token::Switch),
        ("case_clause", Token::Case),
        ("assignment", Token::Assign),
        ("augmented_assignment", Token::Assign),
        ("return_statement", Token::Return),
        ("try_statement", Token::Try),
        ("except_clause", Token::Catch),
    ],
};

const SCRIPT_FUNCTIONS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "function",
    "generator_function",
    "arrow_function",
    "method_definition",
];

const SCRIPT_DECISIONS: &[&str] = &[
    "if_statement",
    "for_statement",
    "for_in_statement",
    "while_statement",
    "do_statement",
    "switch_case",
    "catch_clause",
    "ternary_expression",
];

const SCRIPT_NESTING: &[&str] = &[
    "if_statement",
    "for_statement",
    "for_in_statement",
    "while_statement",
    "do_statement",
    "switch_statement",
    "switch_case",
    "switch_default",
    "try_statement",
];

const SCRIPT_FINGERPRINT: &[(&str, Token)] = &[
    ("if_statement", Token::If),
    ("for_statement", Token::Loop),
    ("for_in_statement", Token::Loop),
    ("while_statement", Token::Loop),
    ("do_statement", Token::Loop),
    ("switch_statement", Token::Switch),
    ("switch_case", Token::Case),
    ("switch_default", Token::Case),
    ("variable_declarator", Token::Assign),
    ("assignment_expression", Token::Assign),
    ("augmented_assignment_expression", Token::Assign),
    ("return_statement", Token::Return),
    ("try_statement", Token::Try),
    ("catch_clause", Token::Catch),
];

static JAVASCRIPT: Grammar = Grammar {
    language: Language::JavaScript,
    function_kinds: SCRIPT_FUNCTIONS,
    decision_kinds: SCRIPT_DECISIONS,
    binary_kinds: &["binary_expression"],
    boolean_operators: &["&&", "||", "??"],
    comment_kinds: &["comment"],
    nesting_kinds: SCRIPT_NESTING,
    import_kinds: &["import_statement"],
    catch_kinds: &["catch_clause"],
    block_kinds: &["statement_block"],
    fingerprint: SCRIPT_FINGERPRINT,
};

static TYPESCRIPT: Grammar = Grammar {
    language: Language::TypeScript,
    function_kinds: SCRIPT_FUNCTIONS,
    decision_kinds: SCRIPT_DECISIONS,
    binary_kinds: &["binary_expression"],
    boolean_operators: &["&&", "||", "??"],
    comment_kinds: &["comment"],
    nesting_kinds: SCRIPT_NESTING,
    import_kinds: &["import_statement"],
    catch_kinds: &["catch_clause"],
    block_kinds: &["statement_block"],
    fingerprint: SCRIPT_FINGERPRINT,
};

static JAVA: Grammar = Grammar {
    language: Language::Java,
    function_kinds: &[
        "method_declaration",
        "constructor_declaration",
        "compact_constructor_declaration",
        "lambda_expression",
    ],
    decision_kinds: &[
        "if_statement",
        "while_statement",
        "for_statement",
        "enhanced_for_statement",
        "do_statement",
        "catch_clause",
        "switch_block_statement_group",
        "switch_rule",
        "ternary_expression",
    ],
    binary_kinds: &["binary_expression"],
    boolean_operators: &["&&", "||"],
    comment_kinds: &["line_comment", "block_comment"],
    nesting_kinds: &[
        "if_statement",
        "while_statement",
        "for_statement",
        "enhanced_for_statement",
        "do_statement",
        "switch_expression",
        "switch_block_statement_group",
        "switch_rule",
        "try_statement",
        "try_with_resources_statement",
        "synchronized_statement",
    ],
    import_kinds: &["import_declaration"],
    catch_kinds: &["catch_clause"],
    block_kinds: &["block"],
    fingerprint: &[
        ("if_statement", Token::If),
        ("for_statement", Token::Loop),
        ("enhanced_for_statement", Token::Loop),
        ("while_statement", Token::Loop),
        ("do_statement", Token::Loop),
        ("switch_expression", Token::Switch),
        ("switch_block_statement_group", Token::Case),
        ("switch_rule", Token::Case),
        ("variable_declarator", Token::Assign),
        ("assignment_expression", Token::Assign),
        ("return_statement", Token::Return),
        ("try_statement", Token::Try),
        ("try_with_resources_statement", Token::Try),
        ("catch_clause", Token::Catch),
    ],
};

static CSHARP: Grammar = Grammar {
    language: Language::CSharp,
    function_kinds: &[
        "method_declaration",
        "constructor_declaration",
        "destructor_declaration",
        "operator_declaration",
        "local_function_statement",
        "lambda_expression",
        "anonymous_method_expression",
    ],
    decision_kinds: &[
        "if_statement",
        "while_statement",
        "for_statement",
        "foreach_statement",
        "do_statement",
        "catch_clause",
        "switch_section",
        "switch_expression_arm",
        "conditional_expression",
    ],
    binary_kinds: &["binary_expression"],
    boolean_operators: &["&&", "||", "??"],
    comment_kinds: &["comment"],
    nesting_kinds: &[
        "if_statement",
        "while_statement",
        "for_statement",
        "foreach_statement",
        "do_statement",
        "switch_statement",
        "switch_section",
        "try_statement",
        "using_statement",
        "lock_statement",
        "fixed_statement",
        "checked_statement",
    ],
    import_kinds: &["using_directive"],
    catch_kinds: &["catch_clause"],
    block_kinds: &["block"],
    fingerprint: &[
        ("if_statement", Token::If),
        ("for_statement", Token::Loop),
        ("foreach_statement", Token::Loop),
        ("while_statement", Token::Loop),
        ("do_statement", Token::Loop),
        ("switch_statement", Token::Switch),
        ("switch_expression", Token::Switch),
        ("switch_section", Token::Case),
        ("switch_expression_arm", Token::Case),
        ("variable_declarator", Token::Assign),
        ("assignment_expression", Token::Assign),
        ("return_statement", Token::Return),
        ("try_statement", Token::Try),
        ("catch_clause", Token::Catch),
    ],
};

const C_DECISIONS: &[&str] = &[
    "if_statement",
    "while_statement",
    "for_statement",
    "do_statement",
    "case_statement",
    "conditional_expression",
];

const C_FINGERPRINT: &[(&str, Token)] = &[
    ("if_statement", Token::If),
    ("for_statement", Token::Loop),
    ("while_statement", Token::Loop),
    ("do_statement", Token::Loop),
    ("switch_statement", Token::Switch),
    ("case_statement", Token::Case),
    ("init_declarator", Token::Assign),
    ("assignment_expression", Token::Assign),
    ("update_expression", Token::Assign),
    ("return_statement", Token::Return),
];

static C: Grammar = Grammar {
    language: Language::C,
    function_kinds: &["function_definition"],
    decision_kinds: C_DECISIONS,
    binary_kinds: &["binary_expression"],
    boolean_operators: &["&&", "||"],
    comment_kinds: &["comment"],
    nesting_kinds: &[
        "if_statement",
        "while_statement",
        "for_statement",
        "do_statement",
        "switch_statement",
        "case_statement",
    ],
    import_kinds: &["preproc_include"],
    catch_kinds: &[],
    block_kinds: &["compound_statement"],
    fingerprint: C_FINGERPRINT,
};

static CPP: Grammar = Grammar {
    language: Language::Cpp,
    function_kinds: &["function_definition", "lambda_expression"],
    decision_kinds: &[
        "if_statement",
        "while_statement",
        "for_statement",
        "for_range_loop",
        "do_statement",
        "case_statement",
        "conditional_expression",
        "catch_clause",
    ],
    binary_kinds: &["binary_expression"],
    boolean_operators: &["&&", "||", "and", "or"],
    comment_kinds: &["comment"],
    nesting_kinds: &[
        "if_statement",
        "while_statement",
        "for_statement",
        "for_range_loop",
        "do_statement",
        "switch_statement",
        "case_statement",
        "try_statement",
    ],
    import_kinds: &["preproc_include"],
    catch_kinds: &["catch_clause"],
    block_kinds: &["compound_statement"],
    fingerprint: &[
        ("if_statement", Token::If),
        ("for_statement", Token::Loop),
        ("for_range_loop", Token::Loop),
        ("while_statement", Token::Loop),
        ("do_statement", Token::Loop),
        ("switch_statement", Token::Switch),
        ("case_statement", Token::Case),
        ("init_declarator", Token::Assign),
        ("assignment_expression", Token::Assign),
        ("update_expression", Token::Assign),
        ("return_statement", Token::Return),
        ("try_statement", Token::Try),
        ("catch_clause", Token::Catch),
    ],
};
