//! Naming conventions
//!
//! Every declared identifier is classified by category (package, type,
//! function, parameter, variable, constant) and checked against the cases
//! that language expects for that category.

use super::tree::{declarator_name, field_children, tree_and_grammar, visit};
use super::{lerp, ratio, Metric};
use crate::models::{MetricKind, MetricResult, ParseResult, SyntaxTree};
use crate::parsers::grammar::Grammar;
use crate::parsers::Language;
use tree_sitter::Node;

pub struct NamingMetric;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Package,
    Type,
    Function,
    Parameter,
    Variable,
    Constant,
}

impl Category {
    fn label(self) -> &'static str {
        match self {
            Category::Package => "package",
            Category::Type => "type",
            Category::Function => "function",
            Category::Parameter => "parameter",
            Category::Variable => "variable",
            Category::Constant => "constant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    /// `lowercase`, no separators
    Flat,
    Camel,
    Pascal,
    Snake,
    UpperSnake,
}

impl Case {
    fn label(self) -> &'static str {
        match self {
            Case::Flat => "lowercase",
            Case::Camel => "camelCase",
            Case::Pascal => "PascalCase",
            Case::Snake => "snake_case",
            Case::UpperSnake => "UPPER_SNAKE_CASE",
        }
    }

    pub fn matches(self, name: &str) -> bool {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return true;
        };
        let rest_alnum = name.chars().all(|c| c.is_ascii_alphanumeric());
        match self {
            Case::Flat => name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
            Case::Camel => first.is_ascii_lowercase() && rest_alnum,
            Case::Pascal => first.is_ascii_uppercase() && rest_alnum,
            Case::Snake => {
                !first.is_ascii_digit()
                    && name
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            }
            Case::UpperSnake => {
                !first.is_ascii_digit()
                    && name
                        .chars()
                        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
            }
        }
    }
}

/// One declared identifier and the cases allowed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub category: Category,
    pub name: String,
    pub line: usize,
    pub allowed: &'static [Case],
}

impl Declaration {
    /// Private-marker underscores are stripped; one-letter names always pass.
    pub fn is_valid(&self) -> bool {
        let name = self.name.trim_start_matches('_');
        if name.chars().count() <= 1 {
            return true;
        }
        self.allowed.iter().any(|case| case.matches(name))
    }
}

/// Default cases per language and category.
pub fn conventions(language: Language, category: Category) -> &'static [Case] {
    use Case::*;
    use Category::*;
    match (language, category) {
        (Language::Go, Package) => &[Flat],
        (Language::Go, Constant) => &[UpperSnake, Pascal, Camel],
        (Language::Go, _) => &[Camel, Pascal],

        (Language::Rust, Type) => &[Pascal],
        (Language::Rust, Constant) => &[UpperSnake],
        (Language::Rust, _) => &[Snake],

        (Language::Python, Type) => &[Pascal],
        (Language::Python, Constant) => &[UpperSnake],
        (Language::Python, _) => &[Snake],

        (Language::JavaScript | Language::TypeScript, Type) => &[Pascal],
        (Language::JavaScript | Language::TypeScript, Function) => &[Camel, Pascal],
        (Language::JavaScript | Language::TypeScript, Constant) => &[UpperSnake, Camel, Pascal],
        (Language::JavaScript | Language::TypeScript, _) => &[Camel],

        (Language::Java, Type) => &[Pascal],
        (Language::Java, Constant) => &[UpperSnake],
        (Language::Java, _) => &[Camel],

        (Language::CSharp, Type | Function) => &[Pascal],
        (Language::CSharp, Constant) => &[Pascal, UpperSnake],
        (Language::CSharp, _) => &[Camel],

        (Language::C | Language::Cpp, Type) => &[Pascal, Snake],
        (Language::C | Language::Cpp, Constant) => &[UpperSnake],
        (Language::C | Language::Cpp, _) => &[Snake, Camel],

        (Language::Razor | Language::Generic, _) => &[],
    }
}

impl Metric for NamingMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::Naming
    }

    fn description(&self) -> &'static str {
        "Identifiers that break the language's naming conventions"
    }

    fn weight(&self) -> f64 {
        0.10
    }

    fn requires_tree(&self) -> bool {
        true
    }

    fn analyze(&self, parsed: &ParseResult) -> MetricResult {
        let Some((tree, grammar)) = tree_and_grammar(parsed) else {
            return MetricResult::new(0.0, self.weight(), self.description());
        };
        let declarations = declarations(tree, grammar);
        let issues: Vec<String> = declarations
            .iter()
            .filter(|d| !d.is_valid())
            .map(|d| {
                let expected: Vec<&str> = d.allowed.iter().map(|c| c.label()).collect();
                format!(
                    "{} '{}' (line {}) should be {}",
                    d.category.label(),
                    d.name,
                    d.line,
                    expected.join(" or ")
                )
            })
            .collect();

        let violation_ratio = ratio(issues.len(), declarations.len());
        MetricResult::new(violation_score(violation_ratio), self.weight(), self.description())
            .with_issues(issues)
    }
}

pub fn violation_score(violation_ratio: f64) -> f64 {
    if violation_ratio <= 0.0 {
        0.0
    } else if violation_ratio <= 0.05 {
        lerp(violation_ratio, 0.0, 0.05, 0.0, 0.3)
    } else if violation_ratio <= 0.15 {
        lerp(violation_ratio, 0.05, 0.15, 0.3, 0.7)
    } else if violation_ratio <= 0.3 {
        lerp(violation_ratio, 0.15, 0.3, 0.7, 1.0)
    } else {
        1.0
    }
}

/// Collects declarations in source order.
struct Collector<'t> {
    tree: &'t SyntaxTree,
    grammar: &'t Grammar,
    found: Vec<Declaration>,
}

impl<'t> Collector<'t> {
    fn push(&mut self, category: Category, name: Node<'_>) {
        let allowed = conventions(self.tree.language(), category);
        self.push_with(category, name, allowed);
    }

    fn push_with(&mut self, category: Category, name: Node<'_>, allowed: &'static [Case]) {
        let text = self.tree.text(name);
        self.record(category, text, name, allowed);
    }

    /// Checks `text` in place of the node's own text.
    fn push_text(&mut self, category: Category, text: &str, at: Node<'_>) {
        let allowed = conventions(self.tree.language(), category);
        self.record(category, text, at, allowed);
    }

    fn record(&mut self, category: Category, text: &str, at: Node<'_>, allowed: &'static [Case]) {
        if text.trim_start_matches('_').is_empty() {
            return;
        }
        self.found.push(Declaration {
            category,
            name: text.to_string(),
            line: at.start_position().row + 1,
            allowed,
        });
    }

    fn push_field(&mut self, category: Category, node: Node<'_>, field: &str) {
        for name in field_children(node, field) {
            self.push(category, name);
        }
    }

    fn text(&self, node: Node<'_>) -> &'t str {
        self.tree.text(node)
    }
}

pub fn declarations(tree: &SyntaxTree, grammar: &Grammar) -> Vec<Declaration> {
    let mut collector = Collector {
        tree,
        grammar,
        found: Vec::new(),
    };
    let collect: fn(&mut Collector<'_>, Node<'_>) = match tree.language() {
        Language::Go => go_declarations,
        Language::Rust => rust_declarations,
        Language::Python => python_declarations,
        Language::JavaScript | Language::TypeScript => script_declarations,
        Language::Java => java_declarations,
        Language::CSharp => csharp_declarations,
        Language::C | Language::Cpp => c_declarations,
        Language::Razor | Language::Generic => return Vec::new(),
    };
    visit(tree.root(), |node| {
        collect(&mut collector, node);
        true
    });
    collector.found
}

fn go_declarations(c: &mut Collector<'_>, node: Node<'_>) {
    match node.kind() {
        "package_clause" => {
            if let Some(name) = node.named_child(0) {
                // external test packages are `name_test`
                let text = c.text(name);
                let stem = text.strip_suffix("_test").unwrap_or(text);
                c.push_text(Category::Package, stem, name);
            }
        }
        "function_declaration" | "method_declaration" => c.push_field(Category::Function, node, "name"),
        "type_spec" | "type_alias" => c.push_field(Category::Type, node, "name"),
        "parameter_declaration" | "variadic_parameter_declaration" => {
            c.push_field(Category::Parameter, node, "name")
        }
        "var_spec" => c.push_field(Category::Variable, node, "name"),
        "const_spec" => c.push_field(Category::Constant, node, "name"),
        "short_var_declaration" => {
            if let Some(left) = node.child_by_field_name("left") {
                for name in left.named_children(&mut left.walk()) {
                    if name.kind() == "identifier" {
                        c.push(Category::Variable, name);
                    }
                }
            }
        }
        _ => {}
    }
}

fn rust_declarations(c: &mut Collector<'_>, node: Node<'_>) {
    match node.kind() {
        "function_item" | "function_signature_item" => c.push_field(Category::Function, node, "name"),
        "struct_item" | "enum_item" | "union_item" | "trait_item" | "type_item" => {
            c.push_field(Category::Type, node, "name")
        }
        "const_item" | "static_item" => c.push_field(Category::Constant, node, "name"),
        "mod_item" => c.push_field(Category::Package, node, "name"),
        "parameter" => {
            if let Some(pattern) = node.child_by_field_name("pattern") {
                if let Some(name) = binding_identifier(pattern) {
                    c.push(Category::Parameter, name);
                }
            }
        }
        "let_declaration" => {
            if let Some(pattern) = node.child_by_field_name("pattern") {
                if let Some(name) = binding_identifier(pattern) {
                    c.push(Category::Variable, name);
                }
            }
        }
        _ => {}
    }
}

/// `x` or `mut x`; destructuring patterns are not checked.
fn binding_identifier(pattern: Node<'_>) -> Option<Node<'_>> {
    match pattern.kind() {
        "identifier" => Some(pattern),
        "mut_pattern" => pattern
            .named_children(&mut pattern.walk())
            .find(|c| c.kind() == "identifier"),
        _ => None,
    }
}

fn python_declarations(c: &mut Collector<'_>, node: Node<'_>) {
    match node.kind() {
        "function_definition" => c.push_field(Category::Function, node, "name"),
        "class_definition" => c.push_field(Category::Type, node, "name"),
        "parameters" | "lambda_parameters" => {
            for param in node.named_children(&mut node.walk()) {
                let name = match param.kind() {
                    "identifier" => Some(param),
                    "default_parameter" | "typed_default_parameter" => {
                        param.child_by_field_name("name")
                    }
                    "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => param
                        .named_children(&mut param.walk())
                        .find(|n| n.kind() == "identifier"),
                    _ => None,
                };
                if let Some(name) = name {
                    if !matches!(c.text(name), "self" | "cls") {
                        c.push(Category::Parameter, name);
                    }
                }
            }
        }
        "assignment" => {
            let Some(left) = node.child_by_field_name("left") else {
                return;
            };
            if left.kind() != "identifier" {
                return;
            }
            let module_level = node
                .parent()
                .and_then(|p| p.parent())
                .is_some_and(|p| p.kind() == "module");
            if module_level && Case::UpperSnake.matches(c.text(left)) {
                c.push(Category::Constant, left);
            } else if module_level {
                // type aliases and other bindings of classes
                c.push_with(Category::Variable, left, &[Case::Snake, Case::Pascal]);
            } else {
                c.push(Category::Variable, left);
            }
        }
        _ => {}
    }
}

fn script_declarations(c: &mut Collector<'_>, node: Node<'_>) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" | "method_definition" => {
            if let Some(name) = node.child_by_field_name("name") {
                if matches!(name.kind(), "identifier" | "property_identifier") {
                    c.push(Category::Function, name);
                }
            }
        }
        "class_declaration" | "interface_declaration" | "type_alias_declaration"
        | "enum_declaration" | "abstract_class_declaration" => {
            c.push_field(Category::Type, node, "name")
        }
        "variable_declarator" => {
            let Some(name) = node.child_by_field_name("name") else {
                return;
            };
            if name.kind() != "identifier" {
                return;
            }
            let is_function = node
                .child_by_field_name("value")
                .is_some_and(|v| c.grammar.is_function(v.kind()));
            let is_const = node
                .parent()
                .is_some_and(|p| p.child(0).is_some_and(|k| c.text(k) == "const"));
            let category = if is_function {
                Category::Function
            } else if is_const {
                Category::Constant
            } else {
                Category::Variable
            };
            c.push(category, name);
        }
        "formal_parameters" => {
            for param in node.named_children(&mut node.walk()) {
                let target = match param.kind() {
                    "identifier" => Some(param),
                    "required_parameter" | "optional_parameter" => {
                        param.child_by_field_name("pattern")
                    }
                    "assignment_pattern" => param.child_by_field_name("left"),
                    _ => None,
                };
                if let Some(name) = target.filter(|t| t.kind() == "identifier") {
                    c.push(Category::Parameter, name);
                }
            }
        }
        _ => {}
    }
}

fn java_declarations(c: &mut Collector<'_>, node: Node<'_>) {
    match node.kind() {
        "class_declaration" | "interface_declaration" | "enum_declaration"
        | "record_declaration" | "annotation_type_declaration" => {
            c.push_field(Category::Type, node, "name")
        }
        "method_declaration" => c.push_field(Category::Function, node, "name"),
        "formal_parameter" | "spread_parameter" => {
            if let Some(name) = node.child_by_field_name("name").or_else(|| {
                node.named_children(&mut node.walk())
                    .find(|n| n.kind() == "variable_declarator")
                    .and_then(|d| d.child_by_field_name("name"))
            }) {
                c.push(Category::Parameter, name);
            }
        }
        "local_variable_declaration" => {
            for declarator in field_children(node, "declarator") {
                c.push_field(Category::Variable, declarator, "name");
            }
        }
        "field_declaration" | "constant_declaration" => {
            let modifiers = node
                .named_children(&mut node.walk())
                .find(|n| n.kind() == "modifiers")
                .map(|m| c.text(m))
                .unwrap_or("");
            let constant = node.kind() == "constant_declaration"
                || (modifiers.contains("static") && modifiers.contains("final"));
            let category = if constant {
                Category::Constant
            } else {
                Category::Variable
            };
            for declarator in field_children(node, "declarator") {
                c.push_field(category, declarator, "name");
            }
        }
        _ => {}
    }
}

fn csharp_declarations(c: &mut Collector<'_>, node: Node<'_>) {
    match node.kind() {
        "class_declaration" | "interface_declaration" | "struct_declaration"
        | "enum_declaration" | "record_declaration" | "delegate_declaration" => {
            c.push_field(Category::Type, node, "name")
        }
        "method_declaration" | "property_declaration" | "local_function_statement" => {
            c.push_field(Category::Function, node, "name")
        }
        "parameter" => c.push_field(Category::Parameter, node, "name"),
        "local_declaration_statement" => {
            let constant = node
                .children(&mut node.walk())
                .any(|m| c.text(m) == "const");
            let category = if constant {
                Category::Constant
            } else {
                Category::Variable
            };
            csharp_declarators(c, node, category, None);
        }
        "field_declaration" => {
            let modifiers: Vec<&str> = node
                .named_children(&mut node.walk())
                .filter(|m| m.kind() == "modifier")
                .map(|m| c.text(m))
                .collect();
            let constant = modifiers.contains(&"const")
                || (modifiers.contains(&"static") && modifiers.contains(&"readonly"));
            if constant {
                csharp_declarators(c, node, Category::Constant, None);
            } else if modifiers.contains(&"public") || modifiers.contains(&"protected") {
                csharp_declarators(c, node, Category::Variable, Some(&[Case::Pascal, Case::Camel]));
            } else {
                csharp_declarators(c, node, Category::Variable, None);
            }
        }
        _ => {}
    }
}

fn csharp_declarators(
    c: &mut Collector<'_>,
    node: Node<'_>,
    category: Category,
    allowed: Option<&'static [Case]>,
) {
    let mut declarators = Vec::new();
    visit(node, |n| {
        if n.kind() == "variable_declarator" {
            declarators.push(n);
            return false;
        }
        true
    });
    for declarator in declarators {
        let name = declarator.child_by_field_name("name").or_else(|| {
            declarator
                .named_children(&mut declarator.walk())
                .find(|n| n.kind() == "identifier")
        });
        if let Some(name) = name {
            match allowed {
                Some(allowed) => c.push_with(category, name, allowed),
                None => c.push(category, name),
            }
        }
    }
}

fn c_declarations(c: &mut Collector<'_>, node: Node<'_>) {
    match node.kind() {
        "function_definition" => {
            if let Some(name) = node.child_by_field_name("declarator").and_then(declarator_name) {
                // `Class::method` and operators follow the class's own rules
                if name.kind() == "identifier" || name.kind() == "field_identifier" {
                    c.push(Category::Function, name);
                }
            }
        }
        "struct_specifier" | "class_specifier" | "enum_specifier" | "union_specifier" => {
            if node.child_by_field_name("body").is_some() {
                c.push_field(Category::Type, node, "name");
            }
        }
        "type_definition" => {
            for declarator in field_children(node, "declarator") {
                if let Some(name) = declarator_name(declarator) {
                    c.push(Category::Type, name);
                }
            }
        }
        "preproc_def" | "preproc_function_def" => c.push_field(Category::Constant, node, "name"),
        "declaration" | "field_declaration" => {
            for declarator in field_children(node, "declarator") {
                if declarator.kind() == "function_declarator" {
                    continue;
                }
                if let Some(name) = declarator_name(declarator) {
                    if name.kind() == "identifier" || name.kind() == "field_identifier" {
                        c.push(Category::Variable, name);
                    }
                }
            }
        }
        "parameter_declaration" | "optional_parameter_declaration" => {
            if let Some(name) = node.child_by_field_name("declarator").and_then(declarator_name) {
                if name.kind() == "identifier" {
                    c.push(Category::Parameter, name);
                }
            }
        }
        _ => {}
    }
}
